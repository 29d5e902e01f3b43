use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::database::models::{NewSipPlan, SipPlan};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::summary::{self, SchemeSummary};

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// Reference date (`YYYY-MM-DD`); defaults to today in UTC
    pub as_of: Option<NaiveDate>,
}

/// POST /sips/ - Create a SIP plan owned by the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<NewSipPlan>, JsonRejection>,
) -> Result<(StatusCode, Json<SipPlan>), ApiError> {
    let Json(plan) = payload?;
    let plan = plan.validate()?;

    let created = state.store.create_record(&auth_user.user_id, plan).await?;

    tracing::info!(
        "Created SIP {} ({}) for user {}",
        created.id,
        created.scheme_name,
        auth_user.user_id
    );
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /sips/summary - Per-scheme totals for the caller's plans
pub async fn summary(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    query: Result<Query<SummaryQuery>, QueryRejection>,
) -> Result<Json<Vec<SchemeSummary>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());

    let records = state.store.fetch_records_for_user(&auth_user.user_id).await?;
    let summaries = summary::summarize(&records, as_of)?;

    tracing::debug!(
        "Summarized {} SIP records into {} schemes for user {}",
        records.len(),
        summaries.len(),
        auth_user.user_id
    );
    Ok(Json(summaries))
}
