// Account models (referenced by the research workflow, owned by billing)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A customer account as held by the account store.
///
/// The research workflow only ever bumps `monthly_usage`; everything else
/// belongs to billing and is carried through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    /// Successful research submissions this billing month
    #[serde(default)]
    pub monthly_usage: u64,
    pub created_at: DateTime<Utc>,
}

/// Minimal usage view returned by the usage endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUsage {
    pub account_id: String,
    pub monthly_usage: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_defaults_usage() {
        let account: Account = serde_json::from_value(serde_json::json!({
            "id": "acct_1",
            "createdAt": "2026-01-01T00:00:00Z",
        }))
        .unwrap();
        assert_eq!(account.monthly_usage, 0);
        assert!(account.email.is_none());
    }
}
