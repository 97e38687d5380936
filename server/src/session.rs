use serde::Serialize;
use system::{HubConfig, HubDescription, SessionHub};

use crate::connection_tx::ConnectionTx;

pub type SessionId = String;

pub struct Session {
    pub session_id: SessionId,
    pub hub: SessionHub<ConnectionTx>,
}

impl Session {
    pub fn new(session_id: SessionId, config: HubConfig) -> Self {
        Self {
            session_id,
            hub: SessionHub::new(config),
        }
    }

    pub fn describe(&self) -> SessionDescription {
        SessionDescription {
            session_id: self.session_id.clone(),
            state: self.hub.describe(),
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.session_id.clone(),
            users: self.hub.users().len(),
            history_len: self.hub.history().len(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDescription {
    pub session_id: SessionId,
    #[serde(flatten)]
    pub state: HubDescription,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub users: usize,
    pub history_len: usize,
}
