use actix_web::{web, App, HttpServer};
use clap::Parser;

use server::config::Config;
use server::connection::DefaultSession;
use server::handlers::{cors, root};
use server::server::spawn_server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    let srv_tx = spawn_server(config.server_options());
    let default_session = DefaultSession(config.default_session.clone());
    let allowed_origins = config.allowed_origin.clone();

    log::info!("Listening on {}", config.bind);
    HttpServer::new(move || {
        App::new()
            .wrap(cors(&allowed_origins))
            .app_data(web::Data::new(srv_tx.clone()))
            .app_data(web::Data::new(default_session.clone()))
            .configure(root)
    })
    .bind(&config.bind)?
    .run()
    .await
}
