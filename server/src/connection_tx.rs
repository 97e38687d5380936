use std::sync::Arc;

use system::{ServerEvent, Subscriber};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::{channel, Receiver, Sender};
use tokio::sync::Notify;

use crate::connection::{ConnectionEvent, ConnectionId};

/// Outbound half of a connection, registered with a session hub as its subscriber.
///
/// Sends never block the server task. A client whose queue fills up is disconnected
/// instead of losing events.
#[derive(Debug, Clone)]
pub struct ConnectionTx {
    connection_id: ConnectionId,
    tx: Sender<ConnectionEvent>,
    closed: Arc<Notify>,
}

/// Receiving half paired with a [`ConnectionTx`].
#[derive(Debug)]
pub struct ConnectionRx {
    rx: Receiver<ConnectionEvent>,
    closed: Arc<Notify>,
    done: bool,
}

impl ConnectionTx {
    pub fn channel(connection_id: ConnectionId, capacity: usize) -> (ConnectionTx, ConnectionRx) {
        let (tx, rx) = channel(capacity);
        let closed = Arc::new(Notify::new());
        (
            ConnectionTx {
                connection_id,
                tx,
                closed: closed.clone(),
            },
            ConnectionRx {
                rx,
                closed,
                done: false,
            },
        )
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Asks the connection to shut down ahead of anything still queued.
    pub fn close(&self) {
        self.closed.notify_one();
    }
}

impl Subscriber for ConnectionTx {
    fn notify(&mut self, event: Arc<ServerEvent>) {
        let kind = event.kind();
        match self.tx.try_send(ConnectionEvent::ServerEvent(event)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                log::warn!(
                    "Connection {} is not keeping up, disconnecting at {} event",
                    self.connection_id,
                    kind
                );
                self.close();
            }
            Err(TrySendError::Closed(_)) => {
                log::warn!(
                    "Connection {} is gone, dropping {} event",
                    self.connection_id,
                    kind
                );
            }
        }
    }
}

impl ConnectionRx {
    /// Next event for the socket. Yields `Disconnected` once after a close request, then
    /// `None`.
    pub async fn recv(&mut self) -> Option<ConnectionEvent> {
        if self.done {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.closed.notified() => {
                self.done = true;
                Some(ConnectionEvent::Disconnected)
            }
            event = self.rx.recv() => event,
        }
    }
}
