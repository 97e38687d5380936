use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use actix::{Actor, ActorContext, AsyncContext, Handler, Message, Running, StreamHandler};
use actix_web::{error, web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use serde::Deserialize;

use system::{decode_binary, decode_text, ClientEvent, Frame, ProtocolError, ServerEvent, WireFormat};

use crate::connection_tx::ConnectionTx;
use crate::server::{ServerCommand, ServerTx};
use crate::session::SessionId;

pub type ConnectionId = u64;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Server events that may wait for one socket before it is dropped as too slow.
const EGRESS_CAPACITY: usize = 256;

#[derive(Debug)]
pub enum ConnectionCommand {
    Connect {
        connection_id: ConnectionId,
        session_id: SessionId,
        name: Option<String>,
        tx: ConnectionTx,
    },
    Disconnect {
        from: ConnectionId,
    },
    ClientEvent {
        from: ConnectionId,
        event: ClientEvent,
    },
}

#[derive(Debug)]
pub enum ConnectionEvent {
    ServerEvent(Arc<ServerEvent>),
    Disconnected,
}

#[derive(Message)]
#[rtype(result = "()")]
struct ConnectionActorMessage(ConnectionEvent);

struct ConnectionActor {
    connection_id: ConnectionId,
    session_id: SessionId,
    name: Option<String>,
    format: WireFormat,
    srv_tx: ServerTx,
}

impl ConnectionActor {
    fn send_to_server(&self, command: ConnectionCommand, ctx: &mut ws::WebsocketContext<Self>) {
        if self.srv_tx.send(ServerCommand::Connection(command)).is_err() {
            log::error!(
                "Server task is gone, closing connection {}",
                self.connection_id
            );
            ctx.stop();
        }
    }

    fn write(&self, event: &ServerEvent, ctx: &mut ws::WebsocketContext<Self>) {
        match self.format.encode(event) {
            Ok(Frame::Text(text)) => ctx.text(text),
            Ok(Frame::Binary(bytes)) => ctx.binary(bytes),
            Err(e) => log::error!("Failed to encode {}: {}", event.kind(), e),
        }
    }

    fn reject(&self, error: ProtocolError, ctx: &mut ws::WebsocketContext<Self>) {
        log::warn!("Rejected frame from connection {}: {}", self.connection_id, error);
        self.write(
            &ServerEvent::Error {
                message: error.to_string(),
            },
            ctx,
        );
    }
}

impl Actor for ConnectionActor {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let (tx, mut rx) = ConnectionTx::channel(self.connection_id, EGRESS_CAPACITY);

        self.send_to_server(
            ConnectionCommand::Connect {
                connection_id: self.connection_id,
                session_id: self.session_id.clone(),
                name: self.name.clone(),
                tx,
            },
            ctx,
        );

        let addr = ctx.address().recipient();
        let connection_id = self.connection_id;

        tokio::spawn(async move {
            log::debug!("connection {} green thread - started", connection_id);
            while let Some(event) = rx.recv().await {
                if addr.send(ConnectionActorMessage(event)).await.is_err() {
                    break;
                }
            }
            log::debug!("connection {} green thread - terminated", connection_id);
        });
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        let _ = self.srv_tx.send(ServerCommand::Connection(ConnectionCommand::Disconnect {
            from: self.connection_id,
        }));
        Running::Stop
    }
}

/// Ingress
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ConnectionActor {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        let decoded = match msg {
            Ok(ws::Message::Ping(msg)) => {
                ctx.pong(&msg);
                return;
            }
            Ok(ws::Message::Text(text)) => decode_text(&text),
            Ok(ws::Message::Binary(bin)) => decode_binary(&bin),
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
                return;
            }
            Ok(_) => return,
            Err(e) => {
                log::warn!("Websocket error on connection {}: {}", self.connection_id, e);
                ctx.stop();
                return;
            }
        };

        match decoded {
            Ok(event) => {
                log::debug!("Ingress {:?} from {}", event, self.connection_id);
                self.send_to_server(
                    ConnectionCommand::ClientEvent {
                        from: self.connection_id,
                        event,
                    },
                    ctx,
                );
            }
            Err(e) => self.reject(e, ctx),
        }
    }
}

/// Egress
impl Handler<ConnectionActorMessage> for ConnectionActor {
    type Result = ();

    fn handle(
        &mut self,
        msg: ConnectionActorMessage,
        ctx: &mut ws::WebsocketContext<Self>,
    ) -> Self::Result {
        match msg.0 {
            ConnectionEvent::ServerEvent(event) => {
                log::debug!("Egress {} to {}", event.kind(), self.connection_id);
                self.write(&event, ctx);
            }
            ConnectionEvent::Disconnected => {
                ctx.close(None);
                ctx.stop();
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    name: Option<String>,
    format: Option<String>,
}

/// Session the bare `/ws` route joins.
#[derive(Debug, Clone)]
pub struct DefaultSession(pub SessionId);

pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    query: web::Query<ConnectQuery>,
    srv_tx: web::Data<ServerTx>,
    default_session: web::Data<DefaultSession>,
) -> Result<HttpResponse, Error> {
    let session_id = match req.match_info().get("session_id") {
        Some(session_id) => session_id.to_owned(),
        None => default_session.0.clone(),
    };
    let query = query.into_inner();
    let format = match query.format.as_deref() {
        Some(format) => format.parse::<WireFormat>().map_err(error::ErrorBadRequest)?,
        None => WireFormat::default(),
    };
    let connection_id = NEXT_CONNECTION_ID.fetch_add(1, Ordering::SeqCst);
    log::info!(
        "Connection {} opening on session {} ({:?})",
        connection_id,
        session_id,
        format
    );

    ws::start(
        ConnectionActor {
            connection_id,
            session_id,
            name: query.name,
            format,
            srv_tx: srv_tx.get_ref().clone(),
        },
        &req,
        stream,
    )
}
