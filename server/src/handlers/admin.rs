use actix_web::{web, HttpResponse};
use tokio::sync::oneshot;

use crate::admin::AdminCommand;
use crate::error::ServerError;
use crate::server::{ServerCommand, ServerTx};

pub fn configure_admin_handlers(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(web::resource("/sessions").route(web::get().to(list_sessions)))
            .service(web::resource("/sessions/{session_id}").route(web::get().to(show_session))),
    );
}

fn send_admin_command(srv_tx: &ServerTx, command: AdminCommand) -> Result<(), ServerError> {
    srv_tx
        .send(ServerCommand::Admin(command))
        .map_err(|_| ServerError::ServerUnavailable)
}

pub async fn list_sessions(srv_tx: web::Data<ServerTx>) -> Result<HttpResponse, ServerError> {
    let (tx, rx) = oneshot::channel();
    send_admin_command(&srv_tx, AdminCommand::ListSessions { tx })?;
    let sessions = rx.await.map_err(|_| ServerError::ServerUnavailable)?;
    Ok(HttpResponse::Ok().json(sessions))
}

pub async fn show_session(
    path: web::Path<String>,
    srv_tx: web::Data<ServerTx>,
) -> Result<HttpResponse, ServerError> {
    let (tx, rx) = oneshot::channel();
    send_admin_command(
        &srv_tx,
        AdminCommand::GetSessionState {
            session_id: path.into_inner(),
            tx,
        },
    )?;
    let description = rx.await.map_err(|_| ServerError::ServerUnavailable)??;
    Ok(HttpResponse::Ok().json(description))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};

    use crate::connection::DefaultSession;
    use crate::handlers::root;
    use crate::server::{spawn_server, ServerOptions};

    #[actix_web::test]
    async fn it_lists_no_sessions_on_fresh_server() {
        let srv_tx = spawn_server(ServerOptions::default());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(srv_tx))
                .app_data(web::Data::new(DefaultSession("default".into())))
                .configure(root),
        )
        .await;

        let req = test::TestRequest::get().uri("/admin/sessions").to_request();
        let body: system::serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, system::serde_json::json!([]));
    }

    #[actix_web::test]
    async fn it_answers_not_found_for_unknown_session() {
        let srv_tx = spawn_server(ServerOptions::default());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(srv_tx))
                .configure(root),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/admin/sessions/nowhere")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
