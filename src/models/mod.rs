//! Core data models for padel match tracking.

mod achievement;
mod ids;
mod match_record;
mod period;
mod stats;

pub use achievement::*;
pub use ids::*;
pub use match_record::*;
pub use period::*;
pub use stats::*;
