//! Calendar dates and the adjacent-day imagery window.
//!
//! Dates are plain proleptic Gregorian calendar dates; no timezone is ever
//! attached to them.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO 8601 calendar date format
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| Error::InvalidDate {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Half-open date interval `[start, end)` around a selected date.
///
/// The window for date `d` is `[d - 1 day, d + 1 day)`: it covers the day
/// before and the day itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// The adjacent-day window around `date`, with month and year rollover.
    pub fn around(date: NaiveDate) -> Result<Self> {
        let out_of_range = |what: &str| Error::InvalidDate {
            value: date.format(DATE_FORMAT).to_string(),
            reason: format!("{what} is outside the supported calendar range"),
        };
        let start = date.pred_opt().ok_or_else(|| out_of_range("previous day"))?;
        let end = date.succ_opt().ok_or_else(|| out_of_range("next day"))?;
        Ok(Self { start, end })
    }

    /// Whether `date` falls in `[start, end)`.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    pub fn start_str(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start_str(), self.end_str())
    }
}

/// Resolve a `YYYY-MM-DD` string to its `(start, end)` window as ISO strings.
pub fn resolve_window(date: &str) -> Result<(String, String)> {
    let window = DateWindow::around(parse_date(date)?)?;
    Ok((window.start_str(), window.end_str()))
}
