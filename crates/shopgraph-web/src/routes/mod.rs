//! Route handlers.

pub mod buyers;
pub mod health;
pub mod products;
pub mod transactions;

use serde::Deserialize;

/// `?date=` query string of the daily aggregates.
#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}
