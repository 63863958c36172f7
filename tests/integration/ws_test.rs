//! End-to-end WebSocket tests over a real TCP listener

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use gridcast::backend::routes::create_router;
use gridcast::backend::server::{create_state, AppState, Backend};
use gridcast::backend::store::MemoryBackend;
use gridcast::shared::{ServerConfig, UpdateMessage};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn serve(state: AppState) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_router(state, "does-not-exist");
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn start(backend: &MemoryBackend, config: &ServerConfig) -> (AppState, SocketAddr) {
    let backend = Backend {
        store: std::sync::Arc::new(backend.clone()),
        channel: std::sync::Arc::new(backend.clone()),
    };
    let state = create_state(config, backend).await.unwrap();
    let addr = serve(state.clone()).await;
    (state, addr)
}

/// Next data message, skipping control frames
async fn next_data(client: &mut Client) -> Message {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for a message")
            .expect("connection closed")
            .expect("read failed");
        if message.is_text() || message.is_binary() {
            return message;
        }
    }
}

async fn connect(addr: SocketAddr) -> Client {
    let (mut client, _) = connect_async(format!("ws://{}/ws", addr)).await.unwrap();
    let snapshot = next_data(&mut client).await;
    assert!(snapshot.is_binary());
    assert_eq!(snapshot.into_data().len(), 2_000_000);
    client
}

#[tokio::test]
async fn test_ws_snapshot_update_and_error() {
    let backend = MemoryBackend::new();
    let (_state, addr) = start(&backend, &ServerConfig::default()).await;

    let mut client = connect(addr).await;

    client
        .send(Message::text(r#"{"row":5,"col":5,"value":42}"#))
        .await
        .unwrap();
    let echo = next_data(&mut client).await;
    let update: UpdateMessage = serde_json::from_str(echo.to_text().unwrap()).unwrap();
    assert_eq!(update, UpdateMessage::new(5, 5, 42));

    client
        .send(Message::text(r#"{"row":5,"col":5,"value":7}"#))
        .await
        .unwrap();
    let error = next_data(&mut client).await;
    assert_eq!(error.to_text().unwrap(), "Error: value already set");
}

#[tokio::test]
async fn test_ws_fanout_between_servers() {
    let backend = MemoryBackend::new();
    let (_one, addr_one) = start(&backend, &ServerConfig::default()).await;
    let (_two, addr_two) = start(&backend, &ServerConfig::default()).await;

    let mut a = connect(addr_one).await;
    let mut c = connect(addr_two).await;

    a.send(Message::text(r#"{"row":1,"col":2,"value":3}"#))
        .await
        .unwrap();

    let on_a = next_data(&mut a).await;
    let on_c = next_data(&mut c).await;
    assert_eq!(on_a.to_text().unwrap(), r#"{"row":1,"col":2,"value":3}"#);
    assert_eq!(on_a, on_c);
}

#[tokio::test]
async fn test_ws_close_unregisters() {
    let backend = MemoryBackend::new();
    let (state, addr) = start(&backend, &ServerConfig::default()).await;

    let mut client = connect(addr).await;
    assert_eq!(state.registry.len(), 1);

    client.close(None).await.unwrap();
    for _ in 0..50 {
        if state.registry.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(state.registry.is_empty());
}

#[tokio::test]
async fn test_ws_upgrade_refused_when_full() {
    let backend = MemoryBackend::new();
    let config = ServerConfig::builder().max_sessions(1).build().unwrap();
    let (_state, addr) = start(&backend, &config).await;

    let _first = connect(addr).await;
    let second = connect_async(format!("ws://{}/ws", addr)).await;
    match second {
        Err(tokio_tungstenite::tungstenite::Error::Http(response)) => {
            assert_eq!(response.status().as_u16(), 503);
        }
        other => panic!("expected HTTP 503, got {:?}", other.map(|(_, r)| r.status())),
    }
}
