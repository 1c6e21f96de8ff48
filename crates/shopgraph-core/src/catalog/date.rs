//! Day selection for the `*OfTheDay` templates.
//!
//! Two forms are accepted:
//! - an integer string, matched for exact equality against the stored
//!   epoch-millisecond date;
//! - a calendar day `YYYY-MM-DD`, matched as the UTC range
//!   `[00:00, next 00:00)`.

use chrono::{Duration, NaiveDate};

use crate::error::{ShopError, ShopResult};

/// A parsed `date` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    Exact(i64),
    Day { start: i64, end: i64 },
}

impl DateFilter {
    /// Parse a caller-supplied `date` parameter.
    pub fn parse(raw: &str) -> ShopResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ShopError::invalid("date parameter is required"));
        }

        if let Ok(millis) = raw.parse::<i64>() {
            return Ok(Self::Exact(millis));
        }

        let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            ShopError::invalid(format!(
                "date must be epoch milliseconds or YYYY-MM-DD, got '{}'",
                raw
            ))
        })?;

        let start = day
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis())
            .ok_or_else(|| ShopError::invalid(format!("date out of range: '{}'", raw)))?;
        let end = start + Duration::days(1).num_milliseconds();

        Ok(Self::Day { start, end })
    }

    /// Half-open `[from, to)` millisecond bounds.
    pub fn bounds(&self) -> (i64, i64) {
        match *self {
            DateFilter::Exact(millis) => (millis, millis.saturating_add(1)),
            DateFilter::Day { start, end } => (start, end),
        }
    }

    pub fn matches(&self, date: i64) -> bool {
        let (from, to) = self.bounds();
        date >= from && date < to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_millis() {
        let filter = DateFilter::parse("1624147200000").unwrap();
        assert_eq!(filter, DateFilter::Exact(1_624_147_200_000));
        assert!(filter.matches(1_624_147_200_000));
        assert!(!filter.matches(1_624_147_200_001));
    }

    #[test]
    fn test_calendar_day() {
        let filter = DateFilter::parse("2021-06-20").unwrap();
        assert_eq!(filter.bounds(), (1_624_147_200_000, 1_624_233_600_000));
        assert!(filter.matches(1_624_147_200_000));
        assert!(filter.matches(1_624_233_599_999));
        assert!(!filter.matches(1_624_233_600_000));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(DateFilter::parse("").is_err());
        assert!(DateFilter::parse("yesterday").is_err());
        assert!(DateFilter::parse("2021-13-01").is_err());
    }
}
