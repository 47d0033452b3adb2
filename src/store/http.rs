// HTTP clients for the hosted record store's collection API

use chrono::Utc;
use reqwest::Client;
use serde_json::{json, Value};

use super::{AccountStore, NewResearch, ResearchStore, ResearchUpdate, StoreError};
use crate::models::{Account, ResearchRecord, ResearchStatus};
use async_trait::async_trait;

const RESEARCH_COLLECTION: &str = "research";
const ACCOUNTS_COLLECTION: &str = "accounts";

/// Client for the `research` collection of the hosted store.
///
/// The store exposes a uniform collection API:
/// `POST   {base}/collections/{name}/records`       - create
/// `GET    {base}/collections/{name}/records/{id}`  - get one
/// `PATCH  {base}/collections/{name}/records/{id}`  - partial update
pub struct HttpRecordStore {
    base_url: String,
    api_key: String,
    client: Client,
}

impl HttpRecordStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client: Client::new(),
        }
    }

    fn record_url(&self, id: &str) -> String {
        format!(
            "{}/collections/{}/records/{}",
            self.base_url, RESEARCH_COLLECTION, id
        )
    }

    async fn send_json(
        &self,
        request: reqwest::RequestBuilder,
        context: &str,
    ) -> Result<Value, StoreError> {
        let response = request
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("User-Agent", "diliguard")
            .send()
            .await
            .map_err(|e| StoreError::Request(format!("{}: {}", context, e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(context.to_string()));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(StoreError::Request(format!(
                "{}: store error ({}): {}",
                context, status, text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::InvalidData(format!("{}: {}", context, e)))
    }
}

#[async_trait]
impl ResearchStore for HttpRecordStore {
    async fn create(&self, new: NewResearch) -> Result<ResearchRecord, StoreError> {
        let url = format!(
            "{}/collections/{}/records",
            self.base_url, RESEARCH_COLLECTION
        );

        let mut body = serde_json::to_value(&new.submission)
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;
        body["account_id"] = json!(new.account_id);
        body["status"] = json!(ResearchStatus::Pending.as_str());
        body["created_at"] = json!(Utc::now());

        let value = self
            .send_json(self.client.post(&url).json(&body), "create research record")
            .await?;

        serde_json::from_value(value).map_err(|e| StoreError::InvalidData(e.to_string()))
    }

    async fn get_one(&self, id: &str) -> Result<ResearchRecord, StoreError> {
        let value = self
            .send_json(
                self.client.get(self.record_url(id)),
                "fetch research record",
            )
            .await?;

        serde_json::from_value(value).map_err(|e| StoreError::InvalidData(e.to_string()))
    }

    async fn update(&self, id: &str, update: ResearchUpdate) -> Result<ResearchRecord, StoreError> {
        let mut body = serde_json::Map::new();
        if let Some(status) = update.status {
            body.insert("status".to_string(), json!(status.as_str()));
        }
        if let Some(error_log) = update.error_log {
            body.insert("error_log".to_string(), json!(error_log));
        }
        if let Some(report) = update.report {
            body.insert(
                "report".to_string(),
                serde_json::to_value(report).map_err(|e| StoreError::InvalidData(e.to_string()))?,
            );
        }

        let value = self
            .send_json(
                self.client.patch(self.record_url(id)).json(&Value::Object(body)),
                "update research record",
            )
            .await?;

        serde_json::from_value(value).map_err(|e| StoreError::InvalidData(e.to_string()))
    }
}

/// Client for the `accounts` collection of the hosted store
pub struct HttpAccountStore {
    base_url: String,
    api_key: String,
    client: Client,
}

impl HttpAccountStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client: Client::new(),
        }
    }

    fn account_url(&self, id: &str) -> String {
        format!(
            "{}/collections/{}/records/{}",
            self.base_url, ACCOUNTS_COLLECTION, id
        )
    }

    async fn send_json(
        &self,
        request: reqwest::RequestBuilder,
        context: &str,
    ) -> Result<Value, StoreError> {
        let response = request
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("User-Agent", "diliguard")
            .send()
            .await
            .map_err(|e| StoreError::Request(format!("{}: {}", context, e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(context.to_string()));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(StoreError::Request(format!(
                "{}: store error ({}): {}",
                context, status, text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::InvalidData(format!("{}: {}", context, e)))
    }
}

#[async_trait]
impl AccountStore for HttpAccountStore {
    async fn get_one(&self, account_id: &str) -> Result<Account, StoreError> {
        let value = self
            .send_json(self.client.get(self.account_url(account_id)), "fetch account")
            .await?;

        serde_json::from_value(value).map_err(|e| StoreError::InvalidData(e.to_string()))
    }

    async fn set_monthly_usage(
        &self,
        account_id: &str,
        monthly_usage: u64,
    ) -> Result<Account, StoreError> {
        let body = json!({ "monthlyUsage": monthly_usage });
        let value = self
            .send_json(
                self.client.patch(self.account_url(account_id)).json(&body),
                "update account usage",
            )
            .await?;

        serde_json::from_value(value).map_err(|e| StoreError::InvalidData(e.to_string()))
    }
}
