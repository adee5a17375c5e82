//! # Padel Stats
//!
//! Statistics engine for a small padel club's doubles matches.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (matches, pairs, stats, badges, periods)
//! - **calculate**: Outcome resolution, aggregation, ranking, badges, insights
//! - **ingest**: Conversion of loosely typed database exports into match records
//! - **storage**: Filesystem data directory operations (JSONL)
//! - **api**: Read-only REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod ingest;
pub mod models;
pub mod storage;

pub use models::*;

use chrono::NaiveDate;

/// Parse a `YYYY-MM-DD` date, ignoring surrounding whitespace.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Split a comma-separated player list, dropping blanks and repeats.
pub fn parse_player_list(s: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in s.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}
