//! In-process nodes and clients
//!
//! A "node" is an `AppState` with its own registry and fanout bridge. Nodes
//! built on the same `MemoryBackend` share a grid and an update channel, the
//! way two server processes share one Redis.
//!
//! A `TestClient` runs the session protocol over in-memory channels, so tests
//! see exactly the frames a WebSocket client would.

use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::channel::mpsc;
use futures::{future, SinkExt, StreamExt};
use tokio::task::JoinHandle;
use uuid::Uuid;

use gridcast::backend::server::{create_state, AppState, Backend};
use gridcast::backend::session::{run_session, Frame, SessionStats};
use gridcast::backend::store::{GridStore, MemoryBackend, UpdateChannel};
use gridcast::shared::{ServerConfig, UpdateMessage};

/// How long a client waits for a frame before giving up
pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Build a node on `backend` with default configuration
pub async fn node(backend: &MemoryBackend) -> AppState {
    node_with_config(backend, &ServerConfig::default()).await
}

pub async fn node_with_config(backend: &MemoryBackend, config: &ServerConfig) -> AppState {
    let backend = Backend {
        store: Arc::new(backend.clone()),
        channel: Arc::new(backend.clone()),
    };
    create_state(config, backend).await.expect("node failed to start")
}

/// Build a node whose grid store is `store` and whose channel is `channel`
pub async fn node_with_store(
    store: Arc<dyn GridStore>,
    channel: Arc<dyn UpdateChannel>,
) -> AppState {
    create_state(&ServerConfig::default(), Backend { store, channel })
        .await
        .expect("node failed to start")
}

/// Client side of one session
pub struct TestClient {
    pub id: Uuid,
    pub snapshot: Bytes,
    inbound: mpsc::UnboundedSender<Result<Frame, Infallible>>,
    outbound: mpsc::UnboundedReceiver<Frame>,
    broken: Arc<AtomicBool>,
    session: JoinHandle<SessionStats>,
}

impl TestClient {
    /// Open a session and wait for its snapshot
    ///
    /// Once this returns the session is registered and will see every
    /// update published afterwards.
    pub async fn connect(state: &AppState) -> Self {
        let mut client = Self::open(state);
        let snapshot = match client.recv().await {
            Some(Frame::Binary(bytes)) => bytes,
            other => panic!("Expected snapshot frame, got {:?}", other),
        };
        client.snapshot = snapshot;
        client
    }

    /// Open a session without waiting for anything
    pub fn open(state: &AppState) -> Self {
        let id = Uuid::new_v4();
        let (inbound_tx, inbound_rx) = mpsc::unbounded();
        let (outbound_tx, outbound_rx) = mpsc::unbounded();

        let broken = Arc::new(AtomicBool::new(false));
        let flag = broken.clone();
        let sink = outbound_tx
            .sink_map_err(|e| e.to_string())
            .with(move |frame: Frame| {
                future::ready(if flag.load(Ordering::SeqCst) {
                    Err("transport broken".to_string())
                } else {
                    Ok(frame)
                })
            });
        let session = tokio::spawn(run_session(id, inbound_rx, sink, state.clone()));

        Self {
            id,
            snapshot: Bytes::new(),
            inbound: inbound_tx,
            outbound: outbound_rx,
            broken,
            session,
        }
    }

    /// Make every later write to this client fail
    pub fn break_transport(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    pub fn send_text(&self, text: impl Into<String>) {
        self.inbound
            .unbounded_send(Ok(Frame::text(text)))
            .expect("session stopped reading");
    }

    pub fn send_binary(&self, bytes: impl Into<Bytes>) {
        self.inbound
            .unbounded_send(Ok(Frame::binary(bytes)))
            .expect("session stopped reading");
    }

    pub fn send_update(&self, row: i64, col: i64, value: i64) {
        let json = UpdateMessage::new(row, col, value).to_json().unwrap();
        self.send_text(json);
    }

    /// Next frame from the server, `None` on timeout or session end
    pub async fn recv(&mut self) -> Option<Frame> {
        tokio::time::timeout(RECV_TIMEOUT, self.outbound.next())
            .await
            .ok()
            .flatten()
    }

    /// Collect frames until none arrives for `window`
    pub async fn drain(&mut self, window: Duration) -> Vec<Frame> {
        let mut frames = Vec::new();
        while let Ok(Some(frame)) = tokio::time::timeout(window, self.outbound.next()).await {
            frames.push(frame);
        }
        frames
    }

    /// Whether nothing arrives within `window`
    pub async fn is_silent_for(&mut self, window: Duration) -> bool {
        tokio::time::timeout(window, self.outbound.next()).await.is_err()
    }

    /// Close the connection and wait for the session to finish
    pub async fn close(self) -> SessionStats {
        let TestClient {
            inbound, session, ..
        } = self;
        inbound.close_channel();
        session.await.expect("session task panicked")
    }

    /// Send a close frame and wait for the session to finish
    pub async fn close_with_frame(self) -> SessionStats {
        let _ = self.inbound.unbounded_send(Ok(Frame::Close));
        self.session.await.expect("session task panicked")
    }
}
