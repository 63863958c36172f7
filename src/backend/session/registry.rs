/**
 * Connection Registry
 *
 * The registry is the set of live sessions that receive broadcast updates.
 * Each entry holds the session's bounded outbound queue and a signal used
 * to tell the session it has been dropped.
 *
 * # Concurrency
 *
 * Membership sits behind a single mutex. `register`, `unregister` and a
 * whole `for_each` pass are each atomic with respect to one another, so a
 * broadcast never sees a half-registered session and a session removed
 * mid-broadcast is not visited afterwards.
 *
 * Visits must not block: they `try_send` onto the queue drained by the
 * session's writer task, so holding the lock for the whole pass is cheap.
 *
 * # Failure Handling
 *
 * A visit that fails removes that session from the registry and signals it
 * to close. A send fails when the writer is gone or when the queue is full,
 * which means the client stopped reading. The remaining sessions are still
 * visited.
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Notify};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::session::frame::Frame;

/// Identifier of one session, assigned at accept time
pub type SessionId = Uuid;

/// Frames a session may have queued before it counts as stalled
pub const OUTBOUND_QUEUE_CAPACITY: usize = 1024;

/// Queue a frame without waiting
///
/// A full queue is a failed send: the peer is not draining its socket.
pub(crate) fn try_queue(outbound: &mpsc::Sender<Frame>, frame: Frame) -> Result<(), BackendError> {
    outbound.try_send(frame).map_err(|e| match e {
        TrySendError::Full(_) => BackendError::transport("session outbound queue full"),
        TrySendError::Closed(_) => BackendError::transport("session writer closed"),
    })
}

/// Registry entry for one live session
#[derive(Clone)]
pub struct SessionHandle {
    outbound: mpsc::Sender<Frame>,
    evicted: Arc<Notify>,
}

impl SessionHandle {
    pub fn new(outbound: mpsc::Sender<Frame>, evicted: Arc<Notify>) -> Self {
        Self { outbound, evicted }
    }

    /// Queue a frame for the session's writer
    pub fn send(&self, frame: Frame) -> Result<(), BackendError> {
        try_queue(&self.outbound, frame)
    }

    /// Wake the session so it closes itself
    fn evict(&self) {
        self.evicted.notify_one();
    }
}

/// Thread-safe set of live sessions
pub struct ConnectionRegistry {
    sessions: Mutex<HashMap<SessionId, SessionHandle>>,
    capacity: Option<usize>,
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ConnectionRegistry {
    /// Create a registry, optionally bounded to `capacity` sessions
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SessionId, SessionHandle>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a session
    ///
    /// Fails with `Capacity` when the registry is full. Registering an id
    /// twice replaces the earlier handle.
    pub fn register(&self, id: SessionId, handle: SessionHandle) -> Result<(), BackendError> {
        let mut sessions = self.lock();
        if let Some(limit) = self.capacity {
            if sessions.len() >= limit && !sessions.contains_key(&id) {
                return Err(BackendError::capacity(limit));
            }
        }
        sessions.insert(id, handle);
        tracing::debug!(session = %id, sessions = sessions.len(), "Session registered");
        Ok(())
    }

    /// Remove a session; returns whether it was present
    pub fn unregister(&self, id: &SessionId) -> bool {
        let mut sessions = self.lock();
        let removed = sessions.remove(id).is_some();
        if removed {
            tracing::debug!(session = %id, sessions = sessions.len(), "Session unregistered");
        }
        removed
    }

    /// Visit every registered session
    ///
    /// Sessions whose visit fails are removed and told to close. Returns the
    /// number of successful visits.
    pub fn for_each<F>(&self, mut visit: F) -> usize
    where
        F: FnMut(&SessionId, &SessionHandle) -> Result<(), BackendError>,
    {
        let mut sessions = self.lock();
        let mut delivered = 0;
        sessions.retain(|id, handle| match visit(id, handle) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(e) => {
                tracing::warn!(session = %id, error = %e, "Dropping session after failed send");
                handle.evict();
                false
            }
        });
        delivered
    }

    /// Queue `frame` for every registered session
    pub fn broadcast(&self, frame: &Frame) -> usize {
        self.for_each(|_, handle| handle.send(frame.clone()))
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Whether a new session would be refused right now
    pub fn is_full(&self) -> bool {
        match self.capacity {
            Some(limit) => self.len() >= limit,
            None => false,
        }
    }
}
