//! Dispatch of submissions to the external research webhook
//!
//! The webhook performs the actual investigation asynchronously and writes
//! results back into the record store through its own callback path. All we
//! do here is hand off the submission; any non-2xx response is a dispatch
//! failure.

use serde::{Deserialize, Serialize};

use crate::models::{EntityType, ResearchRecord};
use async_trait::async_trait;

/// Dispatch failure, detected synchronously at submission time
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("webhook unreachable: {0}")]
    Unreachable(String),
    #[error("webhook rejected dispatch ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Payload POSTed to the research webhook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub research_id: String,
    pub account_id: String,
    pub primary_name: String,
    pub entity_type: EntityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_reg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_aliases: Option<String>,
}

impl WebhookPayload {
    /// Build the payload for a freshly created record
    pub fn for_record(record: &ResearchRecord) -> Self {
        let submission = &record.submission;
        Self {
            research_id: record.id.clone(),
            account_id: record.account_id.clone(),
            primary_name: submission.primary_name.clone(),
            entity_type: submission.entity_type,
            location: submission.location.clone(),
            url: submission.url.clone(),
            industry: submission.industry.clone(),
            tax_reg: submission.tax_reg.clone(),
            known_aliases: submission.known_aliases.clone(),
        }
    }
}

/// Hand-off seam to the external research process
#[async_trait]
pub trait WebhookDispatcher: Send + Sync {
    async fn dispatch(&self, payload: &WebhookPayload) -> Result<(), DispatchError>;
}

/// Production dispatcher: one HTTP POST to the configured webhook URL
pub struct HttpWebhook {
    url: String,
    client: reqwest::Client,
}

impl HttpWebhook {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl WebhookDispatcher for HttpWebhook {
    async fn dispatch(&self, payload: &WebhookPayload) -> Result<(), DispatchError> {
        let response = self
            .client
            .post(&self.url)
            .header("User-Agent", "diliguard")
            .json(payload)
            .send()
            .await
            .map_err(|e| DispatchError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        log::debug!("Dispatched research {} to webhook", payload.research_id);
        Ok(())
    }
}

/// Local-development dispatcher: accepts every hand-off and only logs it.
/// Investigations stay Pending until something else updates the record.
pub struct NoopWebhook;

#[async_trait]
impl WebhookDispatcher for NoopWebhook {
    async fn dispatch(&self, payload: &WebhookPayload) -> Result<(), DispatchError> {
        log::info!(
            "No webhook configured; research {} ('{}') accepted without dispatch",
            payload.research_id,
            payload.primary_name
        );
        Ok(())
    }
}
