//! Route handlers, one module per resource.

pub mod health;
pub mod insights;
pub mod matches;
pub mod pairs;
pub mod players;
pub mod ranking;
