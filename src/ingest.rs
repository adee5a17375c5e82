//! Boundary validation of database exports.
//!
//! The hosted document database hands back loosely typed JSON: scores as
//! numbers or strings, arrays stored as index-keyed objects, timestamps in
//! several shapes, names missing from half-filled forms. Everything is
//! coerced here into [`MatchRecord`] so the calculation engine only ever
//! sees strongly typed data.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{EntityId, MatchRecord, Pair, SetScore};
use crate::storage::dedup_by_id;

/// Errors that reject a whole export.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected an array or an object of match records, got {0}")]
    UnexpectedShape(&'static str),
}

/// Outcome of normalizing one export.
#[derive(Debug, Default)]
pub struct IngestResult {
    pub records: Vec<MatchRecord>,
    /// Entries that were not JSON objects
    pub skipped: usize,
    /// Fields that had to be coerced
    pub warnings: Vec<String>,
}

/// Parse a full export: either a JSON array of records or an object keyed
/// by document id. Duplicate exported ids collapse to the last occurrence.
/// Entries without an id are never collapsed.
pub fn parse_export(json: &str) -> Result<IngestResult, IngestError> {
    let value: Value = serde_json::from_str(json)?;

    let entries: Vec<(Option<String>, Value)> = match value {
        Value::Array(items) => items.into_iter().map(|v| (None, v)).collect(),
        Value::Object(map) => map.into_iter().map(|(k, v)| (Some(k), v)).collect(),
        other => return Err(IngestError::UnexpectedShape(kind_of(&other))),
    };

    let mut result = IngestResult::default();
    for (index, (key, entry)) in entries.into_iter().enumerate() {
        let exported_id = key.is_some() || entry.get("id").and_then(text).is_some();
        match record_from_value(key.as_deref(), &entry, &mut result.warnings) {
            Some(mut record) => {
                if !exported_id {
                    record.id = EntityId::generate(&[record.id.as_str(), &index.to_string()]);
                }
                result.records.push(record);
            }
            None => {
                warn!("Skipping non-object entry {:?}", key);
                result.skipped += 1;
            }
        }
    }

    let before = result.records.len();
    result.records = dedup_by_id(result.records, |r| r.id.as_str().to_string());
    if result.records.len() < before {
        debug!("Collapsed {} duplicate records", before - result.records.len());
    }

    info!(
        "Ingested {} records ({} skipped, {} warnings)",
        result.records.len(),
        result.skipped,
        result.warnings.len()
    );
    Ok(result)
}

/// Normalize one raw record. Returns `None` when the value is not an object.
pub fn record_from_value(
    key: Option<&str>,
    value: &Value,
    warnings: &mut Vec<String>,
) -> Option<MatchRecord> {
    let obj = value.as_object()?;
    let label = key
        .map(str::to_string)
        .or_else(|| field(obj, &["id"]).and_then(text))
        .unwrap_or_else(|| "<unkeyed>".to_string());

    let date = match field(obj, &["date"]) {
        Some(raw) => {
            let parsed = parse_date_value(raw);
            if parsed.is_none() {
                warn_field(warnings, &label, "date", raw);
            }
            parsed
        }
        None => {
            warnings.push(format!("{}: missing date", label));
            None
        }
    };

    let pair1 = pair_from(field(obj, &["pair1"]), &label, "pair1", warnings);
    let pair2 = pair_from(field(obj, &["pair2"]), &label, "pair2", warnings);
    let sets = sets_from(field(obj, &["sets"]), &label, warnings);

    let created_at = field(obj, &["createdAt", "created_at"]).and_then(|raw| {
        let parsed = parse_timestamp(raw);
        if parsed.is_none() {
            warn_field(warnings, &label, "createdAt", raw);
        }
        parsed
    });

    let id = key
        .map(|k| EntityId::from(k.to_string()))
        .or_else(|| field(obj, &["id"]).and_then(text).map(EntityId::from))
        .unwrap_or_else(|| {
            let content = MatchRecord::content_id(date, &pair1, &pair2, &sets);
            let stamp = created_at.map(|t| t.to_rfc3339()).unwrap_or_default();
            EntityId::generate(&[content.as_str(), &stamp])
        });

    Some(MatchRecord {
        id,
        date,
        location: field(obj, &["location"]).and_then(text),
        pair1,
        pair2,
        sets,
        added_by: field(obj, &["addedBy", "added_by"]).and_then(text),
        created_at,
    })
}

fn field<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .find_map(|name| obj.get(*name))
        .filter(|v| !v.is_null())
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn warn_field(warnings: &mut Vec<String>, label: &str, name: &str, raw: &Value) {
    let message = format!("{}: unusable {} {}", label, name, raw);
    warn!("{}", message);
    warnings.push(message);
}

/// Trimmed non-empty text. Numbers are accepted as text.
fn text(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

/// Score as a non-negative integer, from a number or a numeric string.
pub fn parse_score(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
            .and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `YYYY-MM-DD`, optionally followed by a time part.
pub fn parse_date_value(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?.trim();
    let day = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Epoch milliseconds, an RFC 3339 string, or a `{seconds, nanoseconds}`
/// server timestamp.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => DateTime::from_timestamp_millis(n.as_i64()?),
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Object(obj) => {
            let seconds = field(obj, &["seconds", "_seconds"])?.as_i64()?;
            let nanos = field(obj, &["nanoseconds", "_nanoseconds"])
                .and_then(Value::as_u64)
                .unwrap_or(0);
            DateTime::from_timestamp(seconds, u32::try_from(nanos).ok()?)
        }
        _ => None,
    }
}

fn pair_from(value: Option<&Value>, label: &str, name: &str, warnings: &mut Vec<String>) -> Pair {
    let Some(obj) = value.and_then(Value::as_object) else {
        warnings.push(format!("{}: missing {}", label, name));
        return Pair::default();
    };
    let player = |key: &str| field(obj, &[key]).and_then(text).unwrap_or_default();
    let pair = Pair::new(player("player1"), player("player2"));
    if !pair.is_complete() {
        warnings.push(format!("{}: incomplete {}", label, name));
    }
    pair
}

fn sets_from(value: Option<&Value>, label: &str, warnings: &mut Vec<String>) -> Vec<SetScore> {
    let items: Vec<&Value> = match value {
        Some(Value::Array(items)) => items.iter().collect(),
        // Arrays sometimes come back as {"0": {...}, "1": {...}}
        Some(Value::Object(map)) => {
            let mut indexed: Vec<(usize, &Value)> = map
                .iter()
                .filter_map(|(k, v)| k.parse::<usize>().ok().map(|i| (i, v)))
                .collect();
            indexed.sort_by_key(|(i, _)| *i);
            indexed.into_iter().map(|(_, v)| v).collect()
        }
        Some(other) => {
            warn_field(warnings, label, "sets", other);
            Vec::new()
        }
        None => Vec::new(),
    };

    items
        .into_iter()
        .map(|set| {
            let score = |names: &[&str]| {
                set.as_object()
                    .and_then(|obj| field(obj, names))
                    .and_then(parse_score)
            };
            let parsed = SetScore {
                pair1_score: score(&["pair1Score", "pair1_score"]),
                pair2_score: score(&["pair2Score", "pair2_score"]),
            };
            if parsed.scores().is_none() {
                warn_field(warnings, label, "set", set);
            }
            parsed
        })
        .collect()
}
