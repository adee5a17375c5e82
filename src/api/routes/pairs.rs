use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::{load_matches, ApiError, StatsParams};
use crate::models::PairStat;

#[derive(Debug, Serialize)]
pub struct PairsResponse {
    pub pairs: Vec<PairStat>,
}

/// Stats for every pair that played together, ordered by pair key.
pub async fn list_pairs(
    State(state): State<AppState>,
    Query(params): Query<StatsParams>,
) -> Result<Json<PairsResponse>, ApiError> {
    let filter = params.filter()?;
    let (records, engine) = load_matches(&state)?;

    Ok(Json(PairsResponse {
        pairs: engine.pair_stats(&records, &filter).into_values().collect(),
    }))
}
