//! Clients for the external record and account stores
//!
//! The stores are external collaborators: the orchestrator has create/update
//! rights on research records, the poller has read-only rights, and the
//! research webhook updates records through its own out-of-band path. The
//! traits here are the seam between the workflow and whichever backend holds
//! the data (the hosted BaaS over HTTP, or the in-process store for tests
//! and local development).

pub mod http;
pub mod memory;

pub use http::{HttpAccountStore, HttpRecordStore};
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::models::{Account, ResearchRecord, ResearchStatus, ResearchSubmission, RiskReport};

/// Errors surfaced by a store backend
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("store request failed: {0}")]
    Request(String),
    #[error("store returned invalid data: {0}")]
    InvalidData(String),
}

/// Fields accepted by `ResearchStore::create`. The store assigns the id,
/// the initial status, and the creation timestamp.
#[derive(Debug, Clone)]
pub struct NewResearch {
    pub account_id: String,
    pub submission: ResearchSubmission,
}

/// Partial update applied to an existing research record. `None` fields are
/// left untouched.
#[derive(Debug, Clone, Default)]
pub struct ResearchUpdate {
    pub status: Option<ResearchStatus>,
    pub error_log: Option<String>,
    pub report: Option<RiskReport>,
}

impl ResearchUpdate {
    /// The update written by the orchestrator when webhook dispatch fails
    pub fn dispatch_failure(message: impl Into<String>) -> Self {
        Self {
            status: Some(ResearchStatus::Error),
            error_log: Some(message.into()),
            report: None,
        }
    }
}

/// Store of research records
#[async_trait]
pub trait ResearchStore: Send + Sync {
    /// Create a Pending record and return it with its assigned id
    async fn create(&self, new: NewResearch) -> Result<ResearchRecord, StoreError>;

    async fn get_one(&self, id: &str) -> Result<ResearchRecord, StoreError>;

    async fn update(&self, id: &str, update: ResearchUpdate) -> Result<ResearchRecord, StoreError>;
}

/// Store of customer accounts
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn get_one(&self, account_id: &str) -> Result<Account, StoreError>;

    async fn set_monthly_usage(
        &self,
        account_id: &str,
        monthly_usage: u64,
    ) -> Result<Account, StoreError>;
}
