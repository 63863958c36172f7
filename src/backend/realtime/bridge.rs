/**
 * Fanout Bridge
 *
 * The bridge is the only path from the update channel to local clients.
 * One long-lived task per node holds a subscription on the update topic and
 * hands every payload to the connection registry.
 *
 * # Delivery
 *
 * Each payload is parsed as an update and re-encoded before broadcast, so
 * clients only ever receive well-formed update JSON. Payloads that do not
 * parse are logged and dropped; the subscription carries on.
 *
 * # Subscription Lifetime
 *
 * The first subscription is made before `start` returns, so a node that
 * cannot subscribe does not come up. If the stream later ends (the backend
 * connection dropped), the bridge resubscribes after `RESUBSCRIBE_DELAY`.
 * Updates published while resubscribing are not replayed; clients catch up
 * on their next snapshot.
 */

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::task::JoinHandle;

use crate::backend::session::{ConnectionRegistry, Frame};
use crate::backend::store::{PayloadStream, StoreError, UpdateChannel};
use crate::shared::UpdateMessage;

/// Pause between resubscribe attempts after the stream ends
pub const RESUBSCRIBE_DELAY: Duration = Duration::from_secs(1);

/// Standing subscriber that forwards channel updates to local sessions
pub struct FanoutBridge {
    channel: Arc<dyn UpdateChannel>,
    topic: String,
    registry: Arc<ConnectionRegistry>,
}

impl FanoutBridge {
    pub fn new(
        channel: Arc<dyn UpdateChannel>,
        topic: impl Into<String>,
        registry: Arc<ConnectionRegistry>,
    ) -> Self {
        Self {
            channel,
            topic: topic.into(),
            registry,
        }
    }

    /// Subscribe and spawn the forwarding task
    ///
    /// # Errors
    ///
    /// Returns the store error if the initial subscription fails.
    pub async fn start(self) -> Result<JoinHandle<()>, StoreError> {
        let stream = self.channel.subscribe(&self.topic).await?;
        tracing::info!(topic = %self.topic, "Fanout bridge subscribed");
        Ok(tokio::spawn(self.run(stream)))
    }

    async fn run(self, mut stream: PayloadStream) {
        loop {
            while let Some(payload) = stream.next().await {
                deliver(&self.registry, &payload);
            }

            tracing::warn!(topic = %self.topic, "Update subscription ended, resubscribing");
            stream = self.resubscribe().await;
        }
    }

    async fn resubscribe(&self) -> PayloadStream {
        loop {
            tokio::time::sleep(RESUBSCRIBE_DELAY).await;
            match self.channel.subscribe(&self.topic).await {
                Ok(stream) => {
                    tracing::info!(topic = %self.topic, "Fanout bridge resubscribed");
                    return stream;
                }
                Err(e) => {
                    tracing::error!(topic = %self.topic, error = %e, "Resubscribe failed");
                }
            }
        }
    }
}

/// Broadcast one channel payload to every registered session
///
/// Returns the number of sessions reached, or `None` if the payload was
/// dropped as malformed.
pub fn deliver(registry: &ConnectionRegistry, payload: &[u8]) -> Option<usize> {
    let update = match UpdateMessage::from_slice(payload) {
        Ok(update) => update,
        Err(e) => {
            tracing::warn!(error = %e, bytes = payload.len(), "Dropping malformed update from channel");
            return None;
        }
    };

    let json = match update.to_json() {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode update");
            return None;
        }
    };

    let delivered = registry.broadcast(&Frame::Text(json));
    tracing::debug!(row = update.row, col = update.col, sessions = delivered, "Update delivered");
    Some(delivered)
}
