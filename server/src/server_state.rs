use std::collections::HashMap;

use system::{ClientEvent, HubConfig, Outcome, User, UserId};

use crate::connection::ConnectionId;
use crate::connection_tx::ConnectionTx;
use crate::error::ServerError;
use crate::session::{Session, SessionId, SessionSummary};

#[derive(Debug, Clone)]
pub struct ConnectionLocation {
    pub session_id: SessionId,
    pub user_id: UserId,
}

pub struct ServerState {
    pub hub_config: HubConfig,
    pub retain_empty_sessions: bool,
    pub connection_locations: HashMap<ConnectionId, ConnectionLocation>,
    pub sessions: HashMap<SessionId, Session>,
}

impl ServerState {
    pub fn new(hub_config: HubConfig, retain_empty_sessions: bool) -> Self {
        Self {
            hub_config,
            retain_empty_sessions,
            connection_locations: HashMap::new(),
            sessions: HashMap::new(),
        }
    }

    #[cfg(test)]
    pub fn has_session(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    /// Admits the connection into the session, opening the session on first join.
    pub fn join_session(
        &mut self,
        connection_id: ConnectionId,
        session_id: &str,
        name: Option<&str>,
        tx: ConnectionTx,
    ) -> Result<User, ServerError> {
        if self.connection_locations.contains_key(&connection_id) {
            return Err(ServerError::AlreadyConnected(connection_id));
        }
        let hub_config = &self.hub_config;
        let session = self
            .sessions
            .entry(session_id.to_owned())
            .or_insert_with(|| {
                log::info!("Session {} opened", session_id);
                Session::new(session_id.to_owned(), hub_config.clone())
            });
        let user = session.hub.join(name, tx);
        self.connection_locations.insert(
            connection_id,
            ConnectionLocation {
                session_id: session_id.to_owned(),
                user_id: user.id,
            },
        );
        log::info!(
            "Connection {} joined session {} as {}",
            connection_id,
            session_id,
            user.id
        );
        Ok(user)
    }

    pub fn leave_session(&mut self, connection_id: &ConnectionId) -> Option<SessionId> {
        let location = self.connection_locations.remove(connection_id)?;
        let session_id = location.session_id;
        let now_empty = match self.sessions.get_mut(&session_id) {
            Some(session) => {
                session.hub.leave(&location.user_id);
                session.hub.is_empty()
            }
            None => false,
        };
        log::info!("Connection {} left session {}", connection_id, session_id);
        if now_empty && !self.retain_empty_sessions {
            self.sessions.remove(&session_id);
            log::info!("Session {} closed", session_id);
        }
        Some(session_id)
    }

    pub fn dispatch(
        &mut self,
        from: &ConnectionId,
        event: ClientEvent,
    ) -> Result<Outcome, ServerError> {
        let location = self
            .connection_locations
            .get(from)
            .ok_or(ServerError::UnknownConnection(*from))?;
        let session = self
            .sessions
            .get_mut(&location.session_id)
            .ok_or_else(|| ServerError::SessionNotFound(location.session_id.clone()))?;
        Ok(session.hub.handle(&location.user_id, event))
    }

    pub fn flush_cursors(&mut self) {
        for session in self.sessions.values_mut() {
            session.hub.flush_cursors();
        }
    }

    pub fn summaries(&self) -> Vec<SessionSummary> {
        let mut summaries = self
            .sessions
            .values()
            .map(Session::summary)
            .collect::<Vec<_>>();
        summaries.sort_by(|a, b| a.session_id.cmp(&b.session_id));
        summaries
    }
}
