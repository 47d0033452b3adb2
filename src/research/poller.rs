//! Completion polling for research records
//!
//! A record is observed read-only at a fixed interval until it reaches a
//! terminal state or the attempt budget runs out. Timeout is deliberately a
//! different condition from a failed investigation: a timed-out record may
//! still be legitimately Pending.

use std::time::Duration;

use crate::models::{ResearchRecord, ResearchStatus};
use crate::store::{ResearchStore, StoreError};

/// Polling cadence and budget. Defaults give the 5-minute ceiling
/// (60 attempts, 5 seconds apart).
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 60,
        }
    }
}

/// Terminal outcomes of a poll that did not end in Complete
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    /// The investigation itself failed (`status=Error`)
    #[error("research failed: {}", error_log.as_deref().unwrap_or("no error log recorded"))]
    ResearchFailed { error_log: Option<String> },
    /// The record never left Pending within the attempt budget
    #[error("research still pending after {attempts} polls")]
    TimedOut { attempts: u32 },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Poll `id` until it reaches a terminal state.
///
/// Returns the record on Complete. Never reports success for any other
/// status. The store is only ever read; abandoning the future mid-poll
/// releases nothing because nothing is held.
pub async fn poll_until_terminal(
    store: &dyn ResearchStore,
    id: &str,
    config: &PollConfig,
) -> Result<ResearchRecord, PollError> {
    for attempt in 1..=config.max_attempts {
        let record = store.get_one(id).await?;

        match record.status {
            ResearchStatus::Complete => {
                log::info!("Research {} complete after {} polls", id, attempt);
                return Ok(record);
            }
            ResearchStatus::Error => {
                log::warn!("Research {} failed after {} polls", id, attempt);
                return Err(PollError::ResearchFailed {
                    error_log: record.error_log,
                });
            }
            ResearchStatus::Pending => {
                if attempt < config.max_attempts {
                    tokio::time::sleep(config.interval).await;
                }
            }
        }
    }

    log::warn!(
        "Research {} still pending after {} polls, giving up",
        id,
        config.max_attempts
    );
    Err(PollError::TimedOut {
        attempts: config.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityType, ResearchSubmission, RiskReport};
    use crate::store::{MemoryStore, NewResearch, ResearchUpdate};
    use std::sync::atomic::Ordering;
    use std::time::Instant;

    fn fast_config(max_attempts: u32) -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(5),
            max_attempts,
        }
    }

    async fn pending_record(store: &MemoryStore) -> String {
        store
            .create(NewResearch {
                account_id: "acct_1".to_string(),
                submission: ResearchSubmission::new("Jane Doe", EntityType::Individual),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_complete_record_returns_immediately() {
        let store = MemoryStore::new();
        let id = pending_record(&store).await;
        store
            .update(
                &id,
                ResearchUpdate {
                    status: Some(ResearchStatus::Complete),
                    report: Some(RiskReport {
                        overall_risk_score: Some(17),
                        verdict: Some("Low risk".to_string()),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let record = poll_until_terminal(&store, &id, &fast_config(60))
            .await
            .unwrap();
        assert_eq!(record.status, ResearchStatus::Complete);
        assert_eq!(record.report.unwrap().overall_risk_score, Some(17));
        assert_eq!(store.fetch_calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_error_record_reports_error_log() {
        let store = MemoryStore::new();
        let id = pending_record(&store).await;
        store
            .update(&id, ResearchUpdate::dispatch_failure("screening source down"))
            .await
            .unwrap();

        let err = poll_until_terminal(&store, &id, &fast_config(60))
            .await
            .unwrap_err();
        match err {
            PollError::ResearchFailed { error_log } => {
                assert_eq!(error_log.as_deref(), Some("screening source down"));
            }
            other => panic!("expected research failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_pending_forever_times_out_within_budget() {
        let store = MemoryStore::new();
        let id = pending_record(&store).await;

        let config = fast_config(4);
        let started = Instant::now();
        let err = poll_until_terminal(&store, &id, &config).await.unwrap_err();

        assert!(matches!(err, PollError::TimedOut { attempts: 4 }));
        assert_eq!(store.fetch_calls.load(Ordering::Relaxed), 4);
        // 4 attempts sleep 3 times between them; the slack covers timer
        // granularity so the bound holds on a busy scheduler too
        assert!(started.elapsed() < config.interval * (config.max_attempts + 4));
    }

    #[tokio::test]
    async fn test_completion_after_three_cycles_seen_on_fourth() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let id = pending_record(&store).await;

        let flipper = {
            let store = store.clone();
            let id = id.clone();
            tokio::spawn(async move {
                // Let three polls observe Pending before flipping
                tokio::time::sleep(Duration::from_millis(17)).await;
                store
                    .update(
                        &id,
                        ResearchUpdate {
                            status: Some(ResearchStatus::Complete),
                            ..Default::default()
                        },
                    )
                    .await
                    .unwrap();
            })
        };

        let record = poll_until_terminal(store.as_ref(), &id, &fast_config(60))
            .await
            .unwrap();
        flipper.await.unwrap();

        assert_eq!(record.status, ResearchStatus::Complete);
        assert!(store.fetch_calls.load(Ordering::Relaxed) >= 2);
    }

    #[tokio::test]
    async fn test_missing_record_propagates_store_error() {
        let store = MemoryStore::new();
        let err = poll_until_terminal(&store, "ghost", &fast_config(3))
            .await
            .unwrap_err();
        assert!(matches!(err, PollError::Store(StoreError::NotFound(_))));
    }
}
