//! Decoders for the two positional quote wire dialects.
//!
//! Both decoders are pure functions from one decoded reply to zero or more
//! [`RawQuote`] field tuples. Malformed lines and vendor "not found" records
//! are dropped with a debug diagnostic; decoding never fails.

mod sina;
mod tencent;

use serde::{Deserialize, Serialize};

use crate::InstrumentCode;

pub use sina::parse_sina;
pub use tencent::parse_tencent;

/// Wire dialect of a vendor reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// Comma-separated `var hq_str_<code>="..."` lines.
    Sina,
    /// Tilde-separated `v_<code>="..."` assignments.
    Tencent,
}

/// Vendor names that mean "no such instrument".
pub const NOT_FOUND_NAMES: &[&str] = &["", "不存在", "FAILED"];

/// Minimum positional fields for a record to be usable.
pub(crate) const MIN_FIELDS: usize = 4;

/// Positional fields of one record before unit normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawQuote {
    pub code: InstrumentCode,
    pub dialect: Dialect,
    pub name: String,
    pub price: f64,
    pub open: f64,
    pub prev_close: f64,
    pub high: f64,
    pub low: f64,
    /// Volume in the dialect's wire unit.
    pub volume: Option<f64>,
    /// Turnover as reported, in an unknown scale.
    pub turnover: Option<f64>,
    pub change_percent: Option<f64>,
    /// `YYYY-MM-DD HH:MM:SS` (Sina) or `YYYYMMDDHHMMSS` (Tencent).
    pub timestamp: Option<String>,
}

/// Decode a reply with the parser for `dialect`.
pub fn parse(dialect: Dialect, payload: &str) -> Vec<RawQuote> {
    match dialect {
        Dialect::Sina => parse_sina(payload),
        Dialect::Tencent => parse_tencent(payload),
    }
}

pub(crate) fn is_not_found(name: &str) -> bool {
    NOT_FOUND_NAMES.contains(&name.trim())
}

/// Parsed numeric field, `None` when absent, blank or not a finite number.
pub(crate) fn field_f64(fields: &[&str], index: usize) -> Option<f64> {
    fields
        .get(index)
        .map(|raw| raw.trim())
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| raw.parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

/// First candidate field that parses.
pub(crate) fn first_f64(fields: &[&str], candidates: &[usize]) -> Option<f64> {
    candidates
        .iter()
        .find_map(|index| field_f64(fields, *index))
}

pub(crate) fn field_str<'a>(fields: &[&'a str], index: usize) -> Option<&'a str> {
    fields
        .get(index)
        .map(|raw| raw.trim())
        .filter(|raw| !raw.is_empty())
}

/// High/low fall back to the current price when missing or zero.
pub(crate) fn price_or_current(fields: &[&str], index: usize, current: f64) -> f64 {
    field_f64(fields, index)
        .filter(|value| *value > 0.0)
        .unwrap_or(current)
}
