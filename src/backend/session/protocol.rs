/**
 * Session Protocol
 *
 * One WebSocket connection runs one session. The protocol is the same for
 * every transport; `run_session` takes an inbound frame stream and an
 * outbound frame sink and drives them until the peer goes away.
 *
 * # Lifecycle
 *
 * ```text
 * Connecting ──register + snapshot──▶ Streaming ──peer closes / I/O error──▶ Closed
 *      │                                                                   ▲
 *      └────────────── registry full / snapshot failed ────────────────────┘
 * ```
 *
 * 1. **Connecting**: the session joins the registry, then the full packed
 *    grid goes out as one binary frame. Broadcasts that arrive in between
 *    wait in the session's outbound queue, so they always follow the
 *    snapshot.
 * 2. **Streaming**: every inbound frame is admitted by the rate limiter,
 *    parsed, validated and applied under the write-once policy. Applied
 *    updates are published on the update channel; the sender sees its own
 *    update when the fanout bridge delivers it back.
 * 3. **Closed**: the session leaves the registry and its writer drains.
 *
 * # Per-frame Outcomes
 *
 * | Outcome                      | Client sees                | Session      |
 * |------------------------------|----------------------------|--------------|
 * | applied                      | echo via fanout            | continues    |
 * | malformed JSON               | nothing (logged)           | continues    |
 * | out of range / already set   | `Error: ...` text frame    | continues    |
 * | store failure                | `Error: ...` text frame    | continues    |
 * | outbound queue closed / full | -                          | ends         |
 *
 * # Writer Task
 *
 * Frames to the client go through a bounded queue drained by a dedicated
 * writer task. The registry holds a sender for broadcasts and the session
 * holds one for error replies, so the socket has exactly one writer.
 *
 * Nothing waits on a full queue. A client that stops reading fills it, the
 * next broadcast drops the session from the registry and signals it, and the
 * session ends without waiting for the stalled writer longer than
 * `WRITER_DRAIN_TIMEOUT`.
 */

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::{mpsc, Notify};

use crate::backend::error::BackendError;
use crate::backend::realtime::broadcast::publish_update;
use crate::backend::server::state::AppState;
use crate::backend::session::frame::Frame;
use crate::backend::session::rate_limiter::RateLimiter;
use crate::backend::session::registry::{try_queue, SessionHandle, SessionId, OUTBOUND_QUEUE_CAPACITY};
use crate::shared::UpdateMessage;

/// How long a closing session waits for queued frames to reach the client
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Connecting,
    Streaming,
    Closed,
}

/// Counters reported when a session ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub id: SessionId,
    /// Updates written and published
    pub applied: u64,
    /// Updates refused with an error frame
    pub rejected: u64,
    /// Frames that did not parse as an update
    pub malformed: u64,
}

impl SessionStats {
    fn new(id: SessionId) -> Self {
        Self {
            id,
            applied: 0,
            rejected: 0,
            malformed: 0,
        }
    }
}

struct Session {
    id: SessionId,
    state: AppState,
    limiter: Arc<RateLimiter>,
    outbound: mpsc::Sender<Frame>,
    phase: SessionPhase,
    stats: SessionStats,
}

impl Session {
    fn enter(&mut self, phase: SessionPhase) {
        tracing::debug!(session = %self.id, from = ?self.phase, to = ?phase, "Session phase change");
        self.phase = phase;
    }

    fn reply(&self, frame: Frame) -> Result<(), BackendError> {
        try_queue(&self.outbound, frame)
    }

    /// Process one inbound data frame
    ///
    /// Only a closed or full outbound queue is an error; everything else
    /// the client can cause is absorbed here.
    async fn handle_frame(&mut self, frame: Frame) -> Result<(), BackendError> {
        let waited = self.limiter.admit().await;
        if !waited.is_zero() {
            tracing::trace!(session = %self.id, waited_ms = waited.as_millis() as u64, "Frame delayed by rate limit");
        }

        let Some(payload) = frame.payload() else {
            return Ok(());
        };

        let update = match UpdateMessage::from_slice(payload) {
            Ok(update) => update,
            Err(e) => {
                self.stats.malformed += 1;
                tracing::warn!(session = %self.id, error = %e, "Skipping malformed frame");
                return Ok(());
            }
        };

        if let Err(e) = self.state.canvas.update(&update).await {
            self.stats.rejected += 1;
            if e.is_protocol_error() {
                tracing::debug!(session = %self.id, row = update.row, col = update.col, error = %e, "Update rejected");
            } else {
                tracing::error!(session = %self.id, row = update.row, col = update.col, error = %e, "Update failed");
            }
            return self.reply(Frame::text(e.client_frame()));
        }

        self.stats.applied += 1;
        if let Err(e) =
            publish_update(self.state.channel.as_ref(), &self.state.topic, &update).await
        {
            tracing::error!(session = %self.id, error = %e, "Failed to publish update");
        }
        Ok(())
    }
}

/// Run one session to completion
///
/// `inbound` yields the client's frames; `sink` writes to the client. The
/// function returns once the peer is gone and the session has left the
/// registry.
pub async fn run_session<R, E, W>(id: SessionId, inbound: R, mut sink: W, state: AppState) -> SessionStats
where
    R: Stream<Item = Result<Frame, E>> + Send,
    E: Display + Send,
    W: Sink<Frame> + Unpin + Send + 'static,
    W::Error: Display + Send,
{
    let limiter = Arc::new(RateLimiter::new(state.rate_limit));
    let (outbound, mut queue) = mpsc::channel::<Frame>(OUTBOUND_QUEUE_CAPACITY);
    let evicted = Arc::new(Notify::new());
    let registry = state.registry.clone();

    let mut session = Session {
        id,
        state,
        limiter,
        outbound: outbound.clone(),
        phase: SessionPhase::Connecting,
        stats: SessionStats::new(id),
    };

    if let Err(e) = registry.register(id, SessionHandle::new(outbound, evicted.clone())) {
        tracing::warn!(session = %id, error = %e, "Refusing session");
        let _ = sink.send(Frame::text(e.client_frame())).await;
        let _ = sink.close().await;
        session.enter(SessionPhase::Closed);
        return session.stats;
    }

    let snapshot = match session.state.canvas.snapshot().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::error!(session = %id, error = %e, "Failed to read grid snapshot");
            registry.unregister(&id);
            let _ = sink.send(Frame::text(e.client_frame())).await;
            let _ = sink.close().await;
            session.enter(SessionPhase::Closed);
            return session.stats;
        }
    };

    let snapshot_len = snapshot.len();
    if let Err(e) = sink.send(Frame::binary(snapshot)).await {
        tracing::warn!(session = %id, error = %e, "Failed to send grid snapshot");
        registry.unregister(&id);
        session.enter(SessionPhase::Closed);
        return session.stats;
    }
    tracing::debug!(session = %id, bytes = snapshot_len, "Snapshot sent");

    let mut writer = tokio::spawn(async move {
        while let Some(frame) = queue.recv().await {
            let closing = frame.is_close();
            if let Err(e) = sink.send(frame).await {
                tracing::debug!(error = %e, "Session writer stopped");
                break;
            }
            if closing {
                break;
            }
        }
        let _ = sink.close().await;
    });
    let mut writer_done = false;

    session.enter(SessionPhase::Streaming);
    let mut inbound = std::pin::pin!(inbound);

    loop {
        let next = tokio::select! {
            next = inbound.next() => next,
            _ = evicted.notified() => {
                tracing::warn!(session = %id, "Session dropped from registry, closing");
                break;
            }
            result = &mut writer, if !writer_done => {
                writer_done = true;
                if let Err(e) = result {
                    tracing::error!(session = %id, error = %e, "Session writer panicked");
                }
                break;
            }
        };

        let frame = match next {
            Some(Ok(Frame::Close)) | None => break,
            Some(Ok(frame)) => frame,
            Some(Err(e)) => {
                tracing::debug!(session = %id, error = %e, "Read failed");
                break;
            }
        };

        if let Err(e) = session.handle_frame(frame).await {
            tracing::debug!(session = %id, error = %e, "Ending session");
            break;
        }
    }

    session.enter(SessionPhase::Closed);
    registry.unregister(&id);

    // With every sender gone the writer flushes what is queued and exits
    let Session { stats, outbound, .. } = session;
    drop(outbound);
    if !writer_done && tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut writer).await.is_err() {
        writer.abort();
    }

    tracing::info!(
        session = %id,
        applied = stats.applied,
        rejected = stats.rejected,
        malformed = stats.malformed,
        "Session closed"
    );
    stats
}
