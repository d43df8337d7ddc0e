use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::today;
use crate::retention::{build_report, RetentionReport};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InsightsQuery {
    pub department: Option<String>,
}

/// GET /api/v1/retention/insights
pub async fn handle_retention_insights(
    State(state): State<AppState>,
    Query(params): Query<InsightsQuery>,
) -> Result<Json<RetentionReport>, AppError> {
    let employees = state.repos.employees.list().await?;
    let department = params
        .department
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty() && *d != crate::lfa::filter::ALL);
    let report = build_report(
        state.retention_scorer.as_ref(),
        &employees,
        department,
        today(),
    )
    .await;
    Ok(Json(report))
}
