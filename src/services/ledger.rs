use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::store::{EventStore, StoreError};

const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_STEP: Duration = Duration::from_millis(25);

/// Capacity accounting for one event row.
///
/// Reserve and release are each a single conditional update, so two callers
/// racing for the last seat cannot both win. Lock contention from the
/// driver is retried a few times with a growing pause before giving up.
#[derive(Clone)]
pub struct CapacityLedger {
    events: Arc<dyn EventStore>,
}

impl CapacityLedger {
    pub fn new(events: Arc<dyn EventStore>) -> Self {
        Self { events }
    }

    /// Takes one seat if the event is open for sale and has seats left.
    /// Returns false when nothing was reserved.
    pub async fn reserve(&self, event_id: Uuid) -> Result<bool, StoreError> {
        self.with_retry("reserve", event_id, || {
            self.events.reserve_capacity(event_id, Utc::now())
        })
        .await
    }

    /// Returns one seat, capped at the event's total. Returns false when
    /// the ledger was already full and the release was a no-op.
    pub async fn release(&self, event_id: Uuid) -> Result<bool, StoreError> {
        self.with_retry("release", event_id, || {
            self.events.release_capacity(event_id, Utc::now())
        })
        .await
    }

    async fn with_retry<F, Fut>(
        &self,
        op: &'static str,
        event_id: Uuid,
        run: F,
    ) -> Result<bool, StoreError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<bool, StoreError>>,
    {
        let mut attempt = 1;
        loop {
            match run().await {
                Err(err) if err.is_busy() && attempt < MAX_ATTEMPTS => {
                    tracing::debug!(%event_id, op, attempt, "capacity update hit a locked database, retrying");
                    tokio::time::sleep(BACKOFF_STEP * attempt).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}
