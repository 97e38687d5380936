use tokio::sync::oneshot::Sender;

use crate::error::ServerError;
use crate::session::{SessionDescription, SessionId, SessionSummary};

#[derive(Debug)]
pub enum AdminCommand {
    ListSessions {
        tx: Sender<Vec<SessionSummary>>,
    },
    GetSessionState {
        session_id: SessionId,
        tx: Sender<Result<SessionDescription, ServerError>>,
    },
}
