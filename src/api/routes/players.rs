use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::{load_matches, ApiError, StatsParams};
use crate::models::{AchievementStatus, Metric, PlayerStat};

#[derive(Debug, Serialize)]
pub struct PlayersResponse {
    pub match_count: usize,
    pub players: Vec<PlayerStat>,
}

/// Per-player stats for every tracked player, active or not, by name.
pub async fn list_players(
    State(state): State<AppState>,
    Query(params): Query<StatsParams>,
) -> Result<Json<PlayersResponse>, ApiError> {
    let filter = params.filter()?;
    let (records, engine) = load_matches(&state)?;

    Ok(Json(PlayersResponse {
        match_count: engine.select(&records, &filter).len(),
        players: engine.player_stats(&records, &filter).into_values().collect(),
    }))
}

#[derive(Debug, Serialize)]
pub struct PlayerResponse {
    pub player: PlayerStat,
    pub achievements: BTreeMap<Metric, AchievementStatus>,
}

/// One tracked player's stats and badge progress.
pub async fn get_player(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<StatsParams>,
) -> Result<Json<PlayerResponse>, ApiError> {
    let filter = params.filter()?;
    let (records, engine) = load_matches(&state)?;
    let mut players = engine.player_stats(&records, &filter);

    let player = players
        .remove(&name)
        .ok_or_else(|| ApiError::NotFound(format!("Player {}", name)))?;
    let achievements = engine
        .achievements(&BTreeMap::from([(name, player.clone())]))
        .into_values()
        .next()
        .unwrap_or_default();

    Ok(Json(PlayerResponse {
        player,
        achievements,
    }))
}

#[derive(Debug, Serialize)]
pub struct AchievementsResponse {
    pub achievements: BTreeMap<String, BTreeMap<Metric, AchievementStatus>>,
}

pub async fn list_achievements(
    State(state): State<AppState>,
    Query(params): Query<StatsParams>,
) -> Result<Json<AchievementsResponse>, ApiError> {
    let filter = params.filter()?;
    let (records, engine) = load_matches(&state)?;
    let players = engine.player_stats(&records, &filter);

    Ok(Json(AchievementsResponse {
        achievements: engine.achievements(&players),
    }))
}
