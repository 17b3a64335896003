//! NDJSON feed reader.
//!
//! Each line is one [`FeedRecord`]. Snapshots keep the in-memory catalog in
//! step with the commerce database; events are handed to the webhook consumer
//! and awaited before the next line is read, so every event hydrates the
//! catalog exactly as the feed left it at that point. Snapshots must precede
//! the events that need them.
//!
//! ```text
//! {"kind":"snapshot","dto":{"entity_type":"Product","id":1,"name":"Lamp","store_ids":[3]}}
//! {"kind":"event","change":"updated","entity":{"entity_type":"Product","id":1}}
//! {"kind":"remove","entity_type":"Product","id":1}
//! ```

use serde::Deserialize;
use storehooks_core::dto::EntityDto;
use storehooks_core::entity::{EntityType, LifecycleEvent};
use storehooks_core::types::DbId;
use storehooks_events::{DtoSource, InMemoryCatalog, Notifier, WebhookEventConsumer};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedRecord {
    Snapshot { dto: EntityDto },
    Remove { entity_type: EntityType, id: DbId },
    Event(LifecycleEvent),
}

/// Parse one feed line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<FeedRecord>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FeedStats {
    pub snapshots: usize,
    pub removals: usize,
    pub events: usize,
    /// Events whose handling failed (logged, feed continues).
    pub failed: usize,
    pub rejected: usize,
}

/// Read the feed until EOF or cancellation.
///
/// Each event is handled to completion before the next record is applied.
/// Malformed lines are logged and skipped.
pub async fn pump<R, S, N>(
    reader: R,
    catalog: &InMemoryCatalog,
    consumer: &WebhookEventConsumer<S, N>,
    cancel: CancellationToken,
) -> std::io::Result<FeedStats>
where
    R: AsyncRead + Unpin,
    S: DtoSource,
    N: Notifier,
{
    let mut lines = BufReader::new(reader).lines();
    let mut stats = FeedStats::default();
    let mut line_no: usize = 0;

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Feed cancelled");
                break;
            }
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            tracing::info!(lines = line_no, "Feed reached end of input");
            break;
        };
        line_no += 1;

        let record = match parse_line(&line) {
            Ok(Some(record)) => record,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(line = line_no, error = %e, "Skipping malformed feed record");
                stats.rejected += 1;
                continue;
            }
        };

        match record {
            FeedRecord::Snapshot { dto } => match catalog.upsert(dto) {
                Ok(()) => stats.snapshots += 1,
                Err(e) => {
                    tracing::error!(line = line_no, error = %e, "Failed to store snapshot");
                    stats.rejected += 1;
                }
            },
            FeedRecord::Remove { entity_type, id } => match catalog.remove(entity_type, id) {
                Ok(_) => stats.removals += 1,
                Err(e) => {
                    tracing::error!(line = line_no, error = %e, "Failed to remove snapshot");
                    stats.rejected += 1;
                }
            },
            FeedRecord::Event(event) => {
                stats.events += 1;
                if let Err(e) = consumer.handle(&event).await {
                    tracing::error!(
                        line = line_no,
                        error = %e,
                        entity_type = %event.entity.entity_type(),
                        entity_id = event.entity.id(),
                        change = %event.change,
                        "Failed to handle lifecycle event"
                    );
                    stats.failed += 1;
                }
            }
        }
    }

    Ok(stats)
}
