// In-process store used by tests and by local development mode

use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

use super::{AccountStore, NewResearch, ResearchStore, ResearchUpdate, StoreError};
use crate::models::{Account, ResearchRecord, ResearchStatus};
use async_trait::async_trait;

/// Memory-backed implementation of both store traits.
///
/// Enforces the status invariant a well-behaved backend provides: a terminal
/// record never transitions again, and nothing re-enters Pending. The fetch
/// counter exists so tests can assert how many poll cycles ran.
pub struct MemoryStore {
    records: Mutex<HashMap<String, ResearchRecord>>,
    accounts: Mutex<HashMap<String, Account>>,
    pub fetch_calls: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            accounts: Mutex::new(HashMap::new()),
            fetch_calls: AtomicU64::new(0),
        }
    }

    /// Seed an account (local dev and tests)
    pub async fn insert_account(&self, account: Account) {
        self.accounts.lock().await.insert(account.id.clone(), account);
    }

    pub async fn record_count(&self) -> usize {
        self.records.lock().await.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResearchStore for MemoryStore {
    async fn create(&self, new: NewResearch) -> Result<ResearchRecord, StoreError> {
        let record = ResearchRecord {
            id: uuid::Uuid::new_v4().to_string(),
            account_id: new.account_id,
            status: ResearchStatus::Pending,
            submission: new.submission,
            error_log: None,
            report: None,
            created_at: Utc::now(),
        };
        self.records
            .lock()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn get_one(&self, id: &str) -> Result<ResearchRecord, StoreError> {
        self.fetch_calls.fetch_add(1, Ordering::Relaxed);
        self.records
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn update(&self, id: &str, update: ResearchUpdate) -> Result<ResearchRecord, StoreError> {
        let mut records = self.records.lock().await;
        let record = records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if let Some(status) = update.status {
            if record.status.is_terminal() && status != record.status {
                return Err(StoreError::InvalidData(format!(
                    "record {} is already {}",
                    id, record.status
                )));
            }
            record.status = status;
        }
        if let Some(error_log) = update.error_log {
            record.error_log = Some(error_log);
        }
        if let Some(report) = update.report {
            record.report = Some(report);
        }

        Ok(record.clone())
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn get_one(&self, account_id: &str) -> Result<Account, StoreError> {
        self.accounts
            .lock()
            .await
            .get(account_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(account_id.to_string()))
    }

    async fn set_monthly_usage(
        &self,
        account_id: &str,
        monthly_usage: u64,
    ) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.lock().await;
        let account = accounts
            .get_mut(account_id)
            .ok_or_else(|| StoreError::NotFound(account_id.to_string()))?;
        account.monthly_usage = monthly_usage;
        Ok(account.clone())
    }
}
