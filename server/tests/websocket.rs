use std::time::Duration;

use awc::error::WsProtocolError;
use awc::ws::{Frame, Message};
use futures_util::{SinkExt, Stream, StreamExt};
use actix_web::web::{self, Bytes};
use actix_web::App;
use server::connection::DefaultSession;
use server::handlers::root;
use server::server::{spawn_server, ServerOptions};
use system::{bincode, serde_json, ClientEvent, Point, ServerEvent, Tool, ToolOptions};

fn start_server() -> actix_test::TestServer {
    let srv_tx = spawn_server(ServerOptions::default());
    actix_test::start(move || {
        App::new()
            .app_data(web::Data::new(srv_tx.clone()))
            .app_data(web::Data::new(DefaultSession("default".into())))
            .configure(root)
    })
}

async fn next_frame<S>(framed: &mut S) -> Frame
where
    S: Stream<Item = Result<Frame, WsProtocolError>> + Unpin,
{
    match tokio::time::timeout(Duration::from_secs(5), framed.next()).await {
        Ok(Some(Ok(frame))) => frame,
        other => panic!("expected a frame, got {:?}", other),
    }
}

async fn next_json<S>(framed: &mut S) -> ServerEvent
where
    S: Stream<Item = Result<Frame, WsProtocolError>> + Unpin,
{
    match next_frame(framed).await {
        Frame::Text(text) => serde_json::from_slice(&text).unwrap(),
        other => panic!("expected a text frame, got {:?}", other),
    }
}

async fn next_bincode<S>(framed: &mut S) -> ServerEvent
where
    S: Stream<Item = Result<Frame, WsProtocolError>> + Unpin,
{
    match next_frame(framed).await {
        Frame::Binary(bytes) => bincode::deserialize(&bytes).unwrap(),
        other => panic!("expected a binary frame, got {:?}", other),
    }
}

fn brush() -> ToolOptions {
    ToolOptions {
        tool: Tool::Brush,
        color: "#123456".into(),
        line_width: 4.0,
    }
}

fn json(event: &ClientEvent) -> Message {
    Message::Text(serde_json::to_string(event).unwrap().into())
}

#[actix_web::test]
async fn it_joins_over_websocket_and_survives_a_bad_frame() {
    let mut srv = start_server();
    let mut framed = srv.ws_at("/ws/room?name=zed").await.unwrap();

    match next_json(&mut framed).await {
        ServerEvent::Welcome(user) => assert_eq!(user.name, "zed"),
        other => panic!("unexpected {:?}", other),
    }
    assert!(matches!(next_json(&mut framed).await, ServerEvent::Users(users) if users.len() == 1));
    assert!(matches!(next_json(&mut framed).await, ServerEvent::History(h) if h.history.is_empty()));
    assert!(matches!(next_json(&mut framed).await, ServerEvent::DrawingOps(ops) if ops.is_empty()));

    framed.send(Message::Text("garbage".into())).await.unwrap();
    match next_json(&mut framed).await {
        ServerEvent::Error { message } => assert!(message.starts_with("malformed json frame")),
        other => panic!("unexpected {:?}", other),
    }

    framed
        .send(json(&ClientEvent::BeginStroke(brush())))
        .await
        .unwrap();
    assert!(matches!(next_json(&mut framed).await, ServerEvent::DrawingOps(ops) if ops.len() == 1));

    framed
        .send(json(&ClientEvent::DrawPoint(Point::new(1.0, 2.0))))
        .await
        .unwrap();
    assert!(matches!(next_json(&mut framed).await, ServerEvent::DrawingOps(_)));

    framed.send(json(&ClientEvent::EndStroke)).await.unwrap();
    match next_json(&mut framed).await {
        ServerEvent::History(snapshot) => {
            assert_eq!(snapshot.history.len(), 1);
            assert_eq!(snapshot.history[0].points, vec![Point::new(1.0, 2.0)]);
            assert_eq!(snapshot.history[0].options.color, "#123456");
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(matches!(next_json(&mut framed).await, ServerEvent::DrawingOps(ops) if ops.is_empty()));
}

#[actix_web::test]
async fn it_rejects_invalid_payload_without_touching_state() {
    let mut srv = start_server();
    let mut framed = srv.ws_at("/ws").await.unwrap();
    for _ in 0..4 {
        next_json(&mut framed).await;
    }

    let mut options = brush();
    options.line_width = -1.0;
    framed
        .send(json(&ClientEvent::BeginStroke(options)))
        .await
        .unwrap();
    assert!(matches!(next_json(&mut framed).await, ServerEvent::Error { .. }));

    framed.send(json(&ClientEvent::Undo)).await.unwrap();
    framed
        .send(json(&ClientEvent::BeginStroke(brush())))
        .await
        .unwrap();
    assert!(matches!(next_json(&mut framed).await, ServerEvent::DrawingOps(ops) if ops.len() == 1));
}

#[actix_web::test]
async fn it_speaks_bincode_when_asked() {
    let mut srv = start_server();
    let mut framed = srv.ws_at("/ws/canvas?format=bincode&name=bin").await.unwrap();

    match next_bincode(&mut framed).await {
        ServerEvent::Welcome(user) => assert_eq!(user.name, "bin"),
        other => panic!("unexpected {:?}", other),
    }
    assert!(matches!(next_bincode(&mut framed).await, ServerEvent::Users(_)));
    assert!(matches!(next_bincode(&mut framed).await, ServerEvent::History(_)));
    assert!(matches!(next_bincode(&mut framed).await, ServerEvent::DrawingOps(_)));

    let begin = bincode::serialize(&ClientEvent::BeginStroke(brush())).unwrap();
    framed.send(Message::Binary(Bytes::from(begin))).await.unwrap();
    assert!(matches!(next_bincode(&mut framed).await, ServerEvent::DrawingOps(ops) if ops.len() == 1));

    framed
        .send(Message::Binary(Bytes::from_static(&[0xff, 0xff, 0xff])))
        .await
        .unwrap();
    match next_bincode(&mut framed).await {
        ServerEvent::Error { message } => assert!(message.starts_with("malformed binary frame")),
        other => panic!("unexpected {:?}", other),
    }
}

#[actix_web::test]
async fn it_refuses_unknown_wire_format() {
    let mut srv = start_server();
    assert!(srv.ws_at("/ws?format=xml").await.is_err());
}
