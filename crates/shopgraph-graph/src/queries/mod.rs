//! Cypher renditions of the analytic query catalog.
//!
//! All templates are read-only and bind at most one caller parameter.

pub mod buyers;
pub mod day;
