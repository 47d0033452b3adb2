//! Research submission orchestration
//!
//! The orchestrator is the only writer on the happy path: it creates the
//! Pending record, accounts for usage, and hands off to the external research
//! webhook. From then on the record belongs to the webhook's callback path;
//! callers watch it through the poller.

pub mod poller;

pub use poller::{poll_until_terminal, PollConfig, PollError};

use crate::models::{ResearchRecord, ResearchSubmission};
use crate::store::{AccountStore, NewResearch, ResearchStore, ResearchUpdate, StoreError};
use crate::webhook::{DispatchError, WebhookDispatcher, WebhookPayload};

/// Diagnostic written to `error_log` when the webhook cannot be reached or
/// rejects the hand-off
pub const DISPATCH_FAILURE_LOG: &str =
    "Failed to dispatch investigation to the research webhook. Please retry the submission.";

/// Errors returned synchronously from a submission
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("invalid submission: {0}")]
    Validation(String),
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
    /// The record exists (already downgraded to Error) but the research
    /// process never received it
    #[error("dispatch failure for research {research_id}: {source}")]
    Dispatch {
        research_id: String,
        #[source]
        source: DispatchError,
    },
}

/// A validated submission request for a target account
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub account_id: String,
    pub submission: ResearchSubmission,
}

impl SubmitRequest {
    pub fn new(account_id: impl Into<String>, submission: ResearchSubmission) -> Self {
        Self {
            account_id: account_id.into(),
            submission,
        }
    }

    /// Check required fields before anything is persisted
    fn validate(&self) -> Result<(), SubmitError> {
        if self.submission.primary_name.trim().is_empty() {
            return Err(SubmitError::Validation(
                "primary_name is required".to_string(),
            ));
        }
        if self.account_id.trim().is_empty() {
            return Err(SubmitError::Validation("accountId is required".to_string()));
        }
        // entity_type presence is enforced by the type; nothing to re-check
        Ok(())
    }
}

/// Submit an entity for research.
///
/// Sequencing matters: the record is created (Pending) before the webhook is
/// notified, so the webhook always has a record id to write back to. The
/// usage increment between the two is a read-modify-write with no transaction
/// around it; a crash in the window under-charges one submission and nothing
/// else.
///
/// On dispatch failure the record is downgraded to Error rather than left
/// permanently Pending, and the same record is reused: a failed submission
/// never leaves duplicates behind.
pub async fn submit_research(
    research_store: &dyn ResearchStore,
    account_store: &dyn AccountStore,
    webhook: &dyn WebhookDispatcher,
    request: SubmitRequest,
) -> Result<ResearchRecord, SubmitError> {
    request.validate()?;

    let record = research_store
        .create(NewResearch {
            account_id: request.account_id.clone(),
            submission: request.submission,
        })
        .await?;
    log::info!(
        "Created research {} ({} '{}') for account {}",
        record.id,
        record.submission.entity_type,
        record.submission.primary_name,
        record.account_id
    );

    let account = account_store.get_one(&request.account_id).await?;
    account_store
        .set_monthly_usage(&account.id, account.monthly_usage + 1)
        .await?;

    let payload = WebhookPayload::for_record(&record);
    if let Err(dispatch_err) = webhook.dispatch(&payload).await {
        log::error!(
            "Webhook dispatch failed for research {}: {}",
            record.id,
            dispatch_err
        );
        // Downgrade rather than leave the record permanently Pending. If the
        // downgrade itself fails the dispatch error still wins; the record is
        // findable and a later admin sweep can reconcile it.
        if let Err(update_err) = research_store
            .update(&record.id, ResearchUpdate::dispatch_failure(DISPATCH_FAILURE_LOG))
            .await
        {
            log::error!(
                "Failed to mark research {} as Error after dispatch failure: {}",
                record.id,
                update_err
            );
        }
        return Err(SubmitError::Dispatch {
            research_id: record.id,
            source: dispatch_err,
        });
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityType, ResearchStatus};
    use crate::store::MemoryStore;
    use crate::webhook::DispatchError;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::sync::Mutex;

    /// Dispatcher fake: records payloads, fails on demand
    struct FakeWebhook {
        fail_with_status: Option<u16>,
        dispatched: Mutex<Vec<WebhookPayload>>,
        calls: AtomicU64,
    }

    impl FakeWebhook {
        fn ok() -> Self {
            Self {
                fail_with_status: None,
                dispatched: Mutex::new(Vec::new()),
                calls: AtomicU64::new(0),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                fail_with_status: Some(status),
                ..Self::ok()
            }
        }
    }

    #[async_trait]
    impl WebhookDispatcher for FakeWebhook {
        async fn dispatch(&self, payload: &WebhookPayload) -> Result<(), DispatchError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            if let Some(status) = self.fail_with_status {
                return Err(DispatchError::Rejected {
                    status,
                    body: "unavailable".to_string(),
                });
            }
            self.dispatched.lock().await.push(payload.clone());
            Ok(())
        }
    }

    async fn store_with_account() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert_account(crate::models::Account {
                id: "acct_1".to_string(),
                email: Some("owner@example.com".to_string()),
                plan: Some("pro".to_string()),
                monthly_usage: 2,
                created_at: Utc::now(),
            })
            .await;
        store
    }

    fn request(name: &str) -> SubmitRequest {
        SubmitRequest::new(
            "acct_1",
            ResearchSubmission::new(name, EntityType::Individual),
        )
    }

    #[tokio::test]
    async fn test_valid_submission_creates_pending_then_dispatches() {
        let store = store_with_account().await;
        let webhook = FakeWebhook::ok();

        let record = submit_research(&store, &store, &webhook, request("Jane Doe"))
            .await
            .unwrap();

        assert_eq!(record.status, ResearchStatus::Pending);
        assert_eq!(store.record_count().await, 1);

        let dispatched = webhook.dispatched.lock().await;
        assert_eq!(dispatched.len(), 1);
        assert_eq!(dispatched[0].research_id, record.id);
        assert_eq!(dispatched[0].primary_name, "Jane Doe");

        // Usage went up by exactly one
        let account = AccountStore::get_one(&store, "acct_1").await.unwrap();
        assert_eq!(account.monthly_usage, 3);
    }

    #[tokio::test]
    async fn test_blank_primary_name_creates_nothing() {
        let store = store_with_account().await;
        let webhook = FakeWebhook::ok();

        let result = submit_research(&store, &store, &webhook, request("   ")).await;

        assert!(matches!(result, Err(SubmitError::Validation(_))));
        assert_eq!(store.record_count().await, 0);
        assert_eq!(webhook.calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_dispatch_failure_downgrades_record() {
        let store = store_with_account().await;
        let webhook = FakeWebhook::failing(503);

        let result = submit_research(&store, &store, &webhook, request("Acme Corp")).await;

        let research_id = match result {
            Err(SubmitError::Dispatch { research_id, .. }) => research_id,
            other => panic!("expected dispatch failure, got {:?}", other),
        };

        // Exactly one record, downgraded to Error with the fixed diagnostic
        assert_eq!(store.record_count().await, 1);
        let record = ResearchStore::get_one(&store, &research_id).await.unwrap();
        assert_eq!(record.status, ResearchStatus::Error);
        assert_eq!(record.error_log.as_deref(), Some(DISPATCH_FAILURE_LOG));
    }

    #[tokio::test]
    async fn test_repeated_failed_submissions_own_one_record_each() {
        let store = store_with_account().await;
        let webhook = FakeWebhook::failing(503);

        for _ in 0..3 {
            let _ = submit_research(&store, &store, &webhook, request("Acme Corp")).await;
        }

        // One record per submission attempt, no duplicates within an attempt
        assert_eq!(store.record_count().await, 3);
        assert_eq!(webhook.calls.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn test_unknown_account_is_store_error() {
        let store = MemoryStore::new();
        let webhook = FakeWebhook::ok();

        let result = submit_research(
            &store,
            &store,
            &webhook,
            SubmitRequest::new("ghost", ResearchSubmission::new("X", EntityType::Company)),
        )
        .await;

        assert!(matches!(result, Err(SubmitError::Store(_))));
        // Record creation happened before the account lookup; dispatch did not
        assert_eq!(store.record_count().await, 1);
        assert_eq!(webhook.calls.load(Ordering::Relaxed), 0);
    }
}
