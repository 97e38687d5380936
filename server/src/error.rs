use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::connection::ConnectionId;
use crate::session::SessionId;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("session `{0}` does not exist")]
    SessionNotFound(SessionId),
    #[error("connection {0} is not in any session")]
    UnknownConnection(ConnectionId),
    #[error("connection {0} already joined a session")]
    AlreadyConnected(ConnectionId),
    #[error("server task is not running")]
    ServerUnavailable,
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::UnknownConnection(_) | ServerError::AlreadyConnected(_) => {
                StatusCode::CONFLICT
            }
            ServerError::ServerUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(system::serde_json::json!({
            "error": self.to_string(),
        }))
    }
}
