use actix_cors::Cors;
use actix_web::web;

use crate::connection::ws_index;
use crate::handlers::admin::configure_admin_handlers;

mod admin;

pub fn root(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ws").route(web::get().to(ws_index)));
    cfg.service(web::resource("/ws/{session_id}").route(web::get().to(ws_index)));

    configure_admin_handlers(cfg);
}

pub fn cors(allowed_origins: &[String]) -> Cors {
    if allowed_origins.is_empty() {
        return Cors::permissive();
    }
    allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
}
