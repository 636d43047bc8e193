use serde::{Deserialize, Serialize};

use crate::{InstrumentCode, QuoteSource};

/// Canonical quote record produced by one fetch cycle.
///
/// Volume is in lots for mainland boards and in shares for Hong Kong and US
/// listings. Turnover is in base currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub code: InstrumentCode,
    pub name: String,
    pub price: f64,
    pub open: f64,
    pub prev_close: f64,
    pub high: f64,
    pub low: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: f64,
    pub turnover: f64,
    /// Human-readable `YYYY-MM-DD HH:MM:SS` time of the last trade, if known.
    pub update_time: String,
    /// Vendor timestamp as sent on the wire, used for session gating.
    pub vendor_timestamp: Option<String>,
    pub source: QuoteSource,
}

impl QuoteSnapshot {
    /// Bare number or ticker of the instrument (`600000`, `00700`, `aapl`).
    pub fn number(&self) -> &str {
        self.code.body()
    }
}
