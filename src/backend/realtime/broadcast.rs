/**
 * Update Publishing
 *
 * Applied updates leave a node through the update channel, never directly
 * to local sessions. Every node, including the one that applied the update,
 * hears it back through its fanout bridge and broadcasts it from there, so
 * all clients on all nodes see updates in channel order.
 *
 * # Payload
 *
 * The payload is the update's JSON encoding:
 *
 * ```json
 * {"row":5,"col":5,"value":42}
 * ```
 */

use crate::backend::error::BackendError;
use crate::backend::store::UpdateChannel;
use crate::shared::UpdateMessage;

/// Publish an applied update on `topic`
///
/// # Errors
///
/// Returns an error if the update cannot be encoded or the channel refuses
/// the publish. Callers log it; the write has already happened.
pub async fn publish_update(
    channel: &dyn UpdateChannel,
    topic: &str,
    update: &UpdateMessage,
) -> Result<(), BackendError> {
    let payload = update.to_json()?;
    channel.publish(topic, payload.into_bytes()).await?;
    tracing::debug!(topic, row = update.row, col = update.col, value = update.value, "Update published");
    Ok(())
}
