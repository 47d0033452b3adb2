//! Research submission and status routes
//!
//! Handles: POST /api/research, GET /api/research/:id

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::str::FromStr;

use crate::models::{EntityType, ResearchRecord, ResearchSubmission};
use crate::research::{submit_research, SubmitRequest};

use super::super::error::ApiError;
use super::super::state::DiliguardState;

/// Body of `POST /api/research`.
///
/// Field names are the submission wire format: the credential and account id
/// are camelCase, the research fields snake_case (they are forwarded verbatim
/// into the webhook payload). Required fields are optional here so that their
/// absence produces a 400 with a named field instead of a deserialization
/// rejection.
#[derive(Debug, Deserialize)]
pub struct SubmitBody {
    #[serde(rename = "authToken", default)]
    pub auth_token: Option<String>,
    #[serde(rename = "accountId", default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub primary_name: Option<String>,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub tax_reg: Option<String>,
    #[serde(default)]
    pub known_aliases: Option<String>,
}

fn require(field: Option<String>, name: &str) -> Result<String, ApiError> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ApiError::BadRequest(format!("Missing field: {}", name))),
    }
}

/// POST /api/research - validate, persist, account, dispatch
pub async fn submit_research_handler(
    State(state): State<DiliguardState>,
    Json(body): Json<SubmitBody>,
) -> Result<Json<Value>, ApiError> {
    // The credential travels in the body for this route; verify it before
    // touching any field
    match body.auth_token.as_deref() {
        Some(token) if token == state.auth_token => {}
        _ => return Err(ApiError::Unauthorized),
    }

    let account_id = require(body.account_id, "accountId")?;
    let primary_name = require(body.primary_name, "primary_name")?;
    let entity_type = require(body.entity_type, "entity_type")?;
    let entity_type = EntityType::from_str(&entity_type).map_err(ApiError::BadRequest)?;

    let submission = ResearchSubmission {
        primary_name,
        entity_type,
        location: body.location,
        url: body.url,
        industry: body.industry,
        tax_reg: body.tax_reg,
        known_aliases: body.known_aliases,
    };

    let record = submit_research(
        state.research_store.as_ref(),
        state.account_store.as_ref(),
        state.webhook.as_ref(),
        SubmitRequest::new(account_id, submission),
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "research_id": record.id,
    })))
}

/// GET /api/research/:id - full record including status and, when terminal,
/// the report or error log
pub async fn get_research_handler(
    State(state): State<DiliguardState>,
    Path(id): Path<String>,
) -> Result<Json<ResearchRecord>, ApiError> {
    let record = state.research_store.get_one(&id).await?;
    Ok(Json(record))
}
