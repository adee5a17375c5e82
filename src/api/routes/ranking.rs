use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{load_matches, ApiError, StatsParams};
use crate::calculate::{rank, RankedEntry};
use crate::models::{PairStat, PlayerStat};

#[derive(Debug, Deserialize)]
pub struct RankingParams {
    /// `players` (default) or `pairs`
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", content = "ranking", rename_all = "snake_case")]
pub enum RankingResponse {
    Players(Vec<RankedEntry<PlayerStat>>),
    Pairs(Vec<RankedEntry<PairStat>>),
}

pub async fn get_ranking(
    State(state): State<AppState>,
    Query(kind): Query<RankingParams>,
    Query(params): Query<StatsParams>,
) -> Result<Json<RankingResponse>, ApiError> {
    let filter = params.filter()?;
    let (records, engine) = load_matches(&state)?;

    let response = match kind.kind.as_deref().unwrap_or("players") {
        "players" => RankingResponse::Players(rank(engine.player_stats(&records, &filter).values())),
        "pairs" => RankingResponse::Pairs(rank(engine.pair_stats(&records, &filter).values())),
        other => {
            return Err(ApiError::BadRequest(format!(
                "Unknown ranking kind: {} (expected players or pairs)",
                other
            )))
        }
    };
    Ok(Json(response))
}
