// Research record models for the due-diligence workflow

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Status & Entity Type
// ============================================================================

/// Lifecycle status of a research record.
///
/// A record starts Pending and is moved to Complete or Error exactly once by
/// the external research webhook (or by the orchestrator's dispatch-failure
/// path). Terminal states never transition again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResearchStatus {
    Pending,
    Complete,
    Error,
}

impl ResearchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResearchStatus::Pending => "Pending",
            ResearchStatus::Complete => "Complete",
            ResearchStatus::Error => "Error",
        }
    }

    /// Whether no further automatic transition can occur.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ResearchStatus::Complete | ResearchStatus::Error)
    }
}

impl std::fmt::Display for ResearchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Default for ResearchStatus {
    fn default() -> Self {
        ResearchStatus::Pending
    }
}

impl std::str::FromStr for ResearchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ResearchStatus::Pending),
            "complete" => Ok(ResearchStatus::Complete),
            "error" => Ok(ResearchStatus::Error),
            _ => Err(format!(
                "Invalid research status: '{}'. Expected 'Pending', 'Complete', or 'Error'",
                s
            )),
        }
    }
}

/// Kind of entity being investigated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityType {
    Individual,
    Company,
    Organization,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Individual => "Individual",
            EntityType::Company => "Company",
            EntityType::Organization => "Organization",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "individual" => Ok(EntityType::Individual),
            "company" => Ok(EntityType::Company),
            "organization" => Ok(EntityType::Organization),
            _ => Err(format!(
                "Invalid entity type: '{}'. Expected 'Individual', 'Company', or 'Organization'",
                s
            )),
        }
    }
}

// ============================================================================
// Submission
// ============================================================================

/// Caller-supplied fields of a research submission.
///
/// Field names follow the submission wire format: the research fields are
/// snake_case, matching the webhook payload they are forwarded into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchSubmission {
    /// Name of the person, company, or organization to investigate
    pub primary_name: String,
    pub entity_type: EntityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    /// Tax or company registration number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_reg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_aliases: Option<String>,
}

impl ResearchSubmission {
    pub fn new(primary_name: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            primary_name: primary_name.into(),
            entity_type,
            location: None,
            url: None,
            industry: None,
            tax_reg: None,
            known_aliases: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

// ============================================================================
// Risk Report
// ============================================================================

/// Structured risk findings written by the research webhook once the
/// investigation completes. Absent while the record is Pending.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskReport {
    /// Overall risk score, 0-100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_risk_score: Option<u8>,
    /// Per-category scores (e.g., "sanctions", "adverse_media"), 0-100
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category_scores: Vec<RiskCategoryScore>,
    /// Analyst-readable verdict summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verdict: Option<String>,
    /// Individual findings that contributed to the score
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
}

/// Score for a single risk category
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskCategoryScore {
    pub category: String,
    pub score: u8,
}

// ============================================================================
// Research Record
// ============================================================================

/// A research investigation as held by the record store.
///
/// The submission fields are immutable after creation; `status`, `error_log`
/// and `report` are written by the external webhook (or by the orchestrator's
/// dispatch-failure path).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchRecord {
    /// Store-assigned opaque identifier
    pub id: String,
    pub account_id: String,
    #[serde(default)]
    pub status: ResearchStatus,
    #[serde(flatten)]
    pub submission: ResearchSubmission,
    /// Populated only when `status` is Error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_log: Option<String>,
    /// Populated by the webhook when `status` becomes Complete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<RiskReport>,
    pub created_at: DateTime<Utc>,
}
