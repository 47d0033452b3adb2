//! Account usage routes
//!
//! Handles: GET /api/account/:id/usage

use axum::extract::{Path, State};
use axum::Json;

use crate::models::AccountUsage;

use super::super::error::ApiError;
use super::super::state::DiliguardState;

/// GET /api/account/:id/usage - current monthly usage counter
pub async fn get_account_usage_handler(
    State(state): State<DiliguardState>,
    Path(id): Path<String>,
) -> Result<Json<AccountUsage>, ApiError> {
    let account = state.account_store.get_one(&id).await?;
    Ok(Json(AccountUsage {
        account_id: account.id,
        monthly_usage: account.monthly_usage,
    }))
}
