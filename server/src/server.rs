use std::time::Duration;

use system::{HubConfig, Outcome};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::time::MissedTickBehavior;

use crate::admin::AdminCommand;
use crate::connection::ConnectionCommand;
use crate::error::ServerError;
use crate::server_state::ServerState;

pub type ServerTx = UnboundedSender<ServerCommand>;

#[derive(Debug)]
pub enum ServerCommand {
    Connection(ConnectionCommand),
    Admin(AdminCommand),
}

#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub hub: HubConfig,
    pub retain_empty_sessions: bool,
    pub cursor_flush_interval: Duration,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            hub: HubConfig::default(),
            retain_empty_sessions: false,
            cursor_flush_interval: Duration::from_millis(50),
        }
    }
}

struct Server {
    server_state: ServerState,
}

impl Server {
    fn new(options: &ServerOptions) -> Self {
        Self {
            server_state: ServerState::new(options.hub.clone(), options.retain_empty_sessions),
        }
    }

    fn handle_command(&mut self, command: ServerCommand) {
        match command {
            ServerCommand::Connection(command) => self.handle_connection_command(command),
            ServerCommand::Admin(command) => self.handle_admin_command(command),
        }
    }

    fn handle_connection_command(&mut self, command: ConnectionCommand) {
        match command {
            ConnectionCommand::Connect {
                connection_id,
                session_id,
                name,
                tx,
            } => {
                let closer = tx.clone();
                if let Err(e) =
                    self.server_state
                        .join_session(connection_id, &session_id, name.as_deref(), tx)
                {
                    log::warn!("Refusing connection {}: {}", connection_id, e);
                    closer.close();
                }
            }
            ConnectionCommand::Disconnect { from } => {
                if self.server_state.leave_session(&from).is_none() {
                    log::debug!("Connection {} already left", from);
                }
            }
            ConnectionCommand::ClientEvent { from, event } => {
                match self.server_state.dispatch(&from, event) {
                    Ok(Outcome::Applied) => {}
                    Ok(Outcome::Ignored(reason)) => {
                        log::debug!("Ignored event from {}: {:?}", from, reason)
                    }
                    Err(e) => log::warn!("Dropping event from {}: {}", from, e),
                }
            }
        }
    }

    fn handle_admin_command(&mut self, command: AdminCommand) {
        match command {
            AdminCommand::ListSessions { tx } => {
                let _ = tx.send(self.server_state.summaries());
            }
            AdminCommand::GetSessionState { session_id, tx } => {
                let result = self
                    .server_state
                    .sessions
                    .get(&session_id)
                    .map(|session| session.describe())
                    .ok_or(ServerError::SessionNotFound(session_id));
                let _ = tx.send(result);
            }
        }
    }

    fn flush_cursors(&mut self) {
        self.server_state.flush_cursors();
    }
}

/// Spawns the task that owns every session. Commands are applied strictly one at a time,
/// in arrival order.
pub fn spawn_server(options: ServerOptions) -> ServerTx {
    let (srv_tx, mut srv_rx) = unbounded_channel::<ServerCommand>();

    tokio::spawn(async move {
        let mut server = Box::new(Server::new(&options));
        let mut cursor_ticker = tokio::time::interval(options.cursor_flush_interval);
        cursor_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        log::info!("server task - started");
        loop {
            tokio::select! {
                command = srv_rx.recv() => match command {
                    Some(command) => server.handle_command(command),
                    None => break,
                },
                _ = cursor_ticker.tick() => server.flush_cursors(),
            }
        }
        log::info!("server task - terminated");
    });

    srv_tx
}
