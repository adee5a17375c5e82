//! REST API endpoints.
//!
//! Axum-based read-only HTTP API over the stored match records and the
//! statistics derived from them.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::calculate::{StatsEngine, StatsFilter};
use crate::models::{DateRange, MatchRecord};
use crate::storage::read_matches;
use crate::{parse_date, parse_player_list};
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Pagination parameters.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 50,
        }
    }
}

impl Pagination {
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.unwrap_or(50).clamp(1, 100),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.page_size as usize)
    }
}

/// Pagination metadata in responses.
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub total_items: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(pagination: &Pagination, total_items: u32) -> Self {
        let total_pages = total_items.div_ceil(pagination.page_size);
        Self {
            page: pagination.page,
            page_size: pagination.page_size,
            total_items,
            total_pages,
            has_next: pagination.page < total_pages,
            has_prev: pagination.page > 1,
        }
    }
}

/// Filter parameters shared by the stats endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct StatsParams {
    pub from: Option<String>,
    pub to: Option<String>,
    /// Comma-separated player names
    pub players: Option<String>,
    /// Reference day for month-over-month insights, defaults to today
    pub today: Option<String>,
}

fn date_param(name: &str, value: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    match value {
        None => Ok(None),
        Some(v) if v.trim().is_empty() => Ok(None),
        Some(v) => parse_date(v).map(Some).ok_or_else(|| {
            ApiError::BadRequest(format!("Invalid {} date (expected YYYY-MM-DD): {}", name, v))
        }),
    }
}

impl StatsParams {
    pub fn filter(&self) -> Result<StatsFilter, ApiError> {
        let from = date_param("from", self.from.as_deref())?;
        let to = date_param("to", self.to.as_deref())?;
        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                return Err(ApiError::BadRequest(format!(
                    "from ({}) must not be after to ({})",
                    f, t
                )));
            }
        }

        let filter = StatsFilter::new(DateRange::new(from, to));
        Ok(match self.players.as_deref().map(parse_player_list) {
            Some(players) if !players.is_empty() => filter.with_players(players),
            _ => filter,
        })
    }

    pub fn today(&self) -> Result<NaiveDate, ApiError> {
        Ok(date_param("today", self.today.as_deref())?.unwrap_or_else(|| Utc::now().date_naive()))
    }
}

/// Read every stored match and the engine to run over them.
pub(crate) fn load_matches(state: &AppState) -> Result<(Vec<MatchRecord>, StatsEngine), ApiError> {
    let records = read_matches(&state.storage).map_err(|e| ApiError::Internal(e.to_string()))?;
    let engine = state.engine.as_ref().clone().with_discovered_roster(&records);
    Ok((records, engine))
}

/// CORS layer for the configured origin; `*` allows any origin.
pub fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = match origin {
        "*" => AllowOrigin::from(Any),
        other => match other.parse::<HeaderValue>() {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                tracing::warn!("Invalid CORS origin {:?}, allowing any", other);
                AllowOrigin::from(Any)
            }
        },
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET])
        .allow_headers(Any)
}

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(routes::health::health))
        .route("/api/matches", get(routes::matches::list_matches))
        .route("/api/players", get(routes::players::list_players))
        .route("/api/players/:name", get(routes::players::get_player))
        .route("/api/achievements", get(routes::players::list_achievements))
        .route("/api/pairs", get(routes::pairs::list_pairs))
        .route("/api/ranking", get(routes::ranking::get_ranking))
        .route("/api/insights", get(routes::insights::list_insights))
        .route("/api/report", get(routes::insights::get_report))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
