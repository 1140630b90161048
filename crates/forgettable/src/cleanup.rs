//! Forgetting payloads whose owning event was never published.
//!
//! A payload is stored before its event goes durable. If the commit then
//! fails, nothing ever claims it; this job forgets such payloads once they
//! have stayed `Created` longer than the configured timeout.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use streamkeep_core::{DomainError, ForgettingReason, ForgettingRequestedBy, PayloadCreationTime};

use crate::error::{ForgettablePayloadError, PayloadStoreError};
use crate::services::ForgettablePayloadForgettingService;
use crate::store::UnclaimedPayloadQuery;

pub const UNCLAIMED_CLEANUP_REQUESTED_BY: &str = "unclaimed-cleanup-job";

/// Outcome of one cleanup pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    pub forgotten: usize,
    /// Candidates that were claimed or forgotten concurrently.
    pub skipped: usize,
    pub failed: usize,
}

pub struct UnclaimedPayloadCleanupJob {
    query: Arc<dyn UnclaimedPayloadQuery>,
    forgetting: Arc<dyn ForgettablePayloadForgettingService>,
    timeout: Duration,
    interval: Duration,
}

impl UnclaimedPayloadCleanupJob {
    pub fn new(
        query: Arc<dyn UnclaimedPayloadQuery>,
        forgetting: Arc<dyn ForgettablePayloadForgettingService>,
        timeout: Duration,
    ) -> Self {
        Self {
            query,
            forgetting,
            timeout,
            interval: Duration::from_secs(300),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn reason(&self) -> Result<ForgettingReason, DomainError> {
        ForgettingReason::new(format!("unclaimed for longer than {:?}", self.timeout))
    }

    fn cutoff(&self) -> Result<PayloadCreationTime, DomainError> {
        let now = PayloadCreationTime::now().as_datetime();
        let timeout = chrono_duration(self.timeout)?;
        let cutoff = now.checked_sub_signed(timeout).ok_or_else(|| {
            DomainError::invalid_value(format!("cleanup timeout {:?} out of range", self.timeout))
        })?;
        PayloadCreationTime::new(cutoff)
    }

    /// Forget every payload unclaimed for longer than the timeout.
    pub async fn run_once(&self) -> Result<CleanupReport, ForgettablePayloadError> {
        let reason = self.reason()?;
        let requested_by = ForgettingRequestedBy::new(UNCLAIMED_CLEANUP_REQUESTED_BY)?;
        let candidates = self
            .query
            .find_unclaimed_created_before(self.cutoff()?)
            .await?;

        let mut report = CleanupReport::default();
        for metadata in candidates {
            let payload_id = metadata.payload_id();
            match self
                .forgetting
                .forget_unclaimed(payload_id, reason.clone(), requested_by.clone())
                .await
            {
                Ok(Some(_)) => report.forgotten += 1,
                Ok(None) => {
                    debug!(payload_id = %payload_id, "payload claimed before cleanup");
                    report.skipped += 1;
                }
                Err(ForgettablePayloadError::Store(e)) if is_race(&e) => {
                    debug!(payload_id = %payload_id, error = %e, "payload changed during cleanup");
                    report.skipped += 1;
                }
                Err(e) => {
                    warn!(payload_id = %payload_id, error = %e, "failed to forget unclaimed payload");
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }

    /// Run [`run_once`](Self::run_once) on every interval tick until aborted.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                interval.tick().await;

                match self.run_once().await {
                    Ok(report) if report.forgotten > 0 || report.failed > 0 => {
                        info!(
                            forgotten = report.forgotten,
                            skipped = report.skipped,
                            failed = report.failed,
                            timeout_secs = self.timeout.as_secs(),
                            "unclaimed payload cleanup finished"
                        );
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "unclaimed payload cleanup failed");
                    }
                }
            }
        })
    }
}

fn is_race(err: &PayloadStoreError) -> bool {
    matches!(err, PayloadStoreError::Conflict { .. })
}

fn chrono_duration(duration: Duration) -> Result<chrono::Duration, DomainError> {
    chrono::Duration::from_std(duration)
        .map_err(|e| DomainError::invalid_value(format!("cleanup timeout {duration:?}: {e}")))
}
