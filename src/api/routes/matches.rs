use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{load_matches, ApiError, Pagination, PaginationMeta, StatsParams};
use crate::calculate::{resolve_outcome, tally_sets, SetTally};
use crate::models::{MatchRecord, SetScore, Side};

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct MatchSummary {
    #[serde(flatten)]
    pub record: MatchRecord,
    /// Sets as `6-4, 3-6`; a missing score shows as `?`
    pub score: String,
    pub sets_won: SetTally,
    pub winner: Option<Side>,
}

impl From<MatchRecord> for MatchSummary {
    fn from(record: MatchRecord) -> Self {
        Self {
            score: score_line(&record.sets),
            sets_won: tally_sets(&record.sets),
            winner: resolve_outcome(&record.sets).winner(),
            record,
        }
    }
}

fn score_line(sets: &[SetScore]) -> String {
    let show = |s: Option<u32>| s.map(|v| v.to_string()).unwrap_or_else(|| "?".to_string());
    sets.iter()
        .map(|s| format!("{}-{}", show(s.pair1_score), show(s.pair2_score)))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Serialize)]
pub struct MatchListResponse {
    pub matches: Vec<MatchSummary>,
    pub pagination: PaginationMeta,
}

/// Matches in the filter, newest first. Undated matches sort last.
pub async fn list_matches(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(params): Query<StatsParams>,
) -> Result<Json<MatchListResponse>, ApiError> {
    let filter = params.filter()?;
    let (records, engine) = load_matches(&state)?;

    let mut selected: Vec<MatchRecord> = engine
        .select(&records, &filter)
        .into_iter()
        .cloned()
        .collect();
    selected.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });

    let pagination = Pagination::new(page.page, page.page_size);
    let total_items = selected.len() as u32;
    let matches = selected
        .into_iter()
        .skip(pagination.offset())
        .take(pagination.page_size as usize)
        .map(MatchSummary::from)
        .collect();

    Ok(Json(MatchListResponse {
        matches,
        pagination: PaginationMeta::new(&pagination, total_items),
    }))
}
