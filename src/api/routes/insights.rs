use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::{load_matches, ApiError, StatsParams};
use crate::calculate::{Insight, StatsReport};
use crate::models::Month;

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    /// Month compared against the one before it
    pub month: Month,
    pub insights: Vec<Insight>,
    pub lines: Vec<String>,
}

pub async fn list_insights(
    State(state): State<AppState>,
    Query(params): Query<StatsParams>,
) -> Result<Json<InsightsResponse>, ApiError> {
    let filter = params.filter()?;
    let today = params.today()?;
    let (records, engine) = load_matches(&state)?;

    let insights = engine.insights(&records, &filter, today);
    Ok(Json(InsightsResponse {
        month: Month::containing(today),
        lines: insights.iter().map(|i| i.to_string()).collect(),
        insights,
    }))
}

/// The full report, recomputed from storage.
pub async fn get_report(
    State(state): State<AppState>,
    Query(params): Query<StatsParams>,
) -> Result<Json<StatsReport>, ApiError> {
    let filter = params.filter()?;
    let today = params.today()?;
    let (records, engine) = load_matches(&state)?;

    Ok(Json(engine.report(&records, &filter, today)))
}
