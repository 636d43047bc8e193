//! Volume and turnover unit correction.
//!
//! Vendors report turnover in different scales and sometimes omit it, with no
//! unit tag on the wire. Turnover is therefore cross-checked against
//! `volume x shares-per-unit x price` using the decision table below.
//!
//! | Dialect | Market | Condition | Action |
//! |---------|--------|-----------|--------|
//! | Tencent | domestic | `raw < 1000` (before ratio check) | `raw x 10_000`, skip the under-scaled row |
//! | any | any | `ratio < 0.1` and `raw < 1e8` | `raw x 10_000` |
//! | Sina | any | `ratio > 100` | `raw / 100` |
//! | Tencent | domestic | `ratio > 2` | use the estimate |
//! | any | any | no raw turnover, estimate `> 0` | use the estimate |
//!
//! The thresholds were tuned against observed vendor payloads and are not
//! documented by either vendor.

use crate::session::{format_vendor_timestamp, parse_vendor_timestamp};
use crate::wire::{Dialect, RawQuote};
use crate::{Market, QuoteSnapshot, QuoteSource};

pub const TEN_THOUSAND: f64 = 10_000.0;
pub const UNDER_SCALED_RATIO: f64 = 0.1;
pub const UNDER_SCALED_CEILING: f64 = 1e8;
pub const SINA_OVER_SCALED_RATIO: f64 = 100.0;
pub const TENCENT_OVER_SCALED_RATIO: f64 = 2.0;
/// Domestic Tencent turnover below this is in ten-thousands of yuan.
pub const TEN_THOUSANDS_MAGNITUDE: f64 = 1_000.0;

/// Correction applied to a raw turnover after the ratio check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnoverAction {
    Keep,
    /// Reported in ten-thousands of currency units.
    ScaleUp,
    /// Reported a hundredfold too large.
    ScaleDown,
    UseEstimate,
}

/// Volume in the market's canonical unit (lots for mainland boards, shares otherwise).
///
/// Sina reports shares in hundreds-of-shares granularity; Tencent is already canonical.
pub fn normalize_volume(dialect: Dialect, raw: Option<f64>) -> f64 {
    let volume = match dialect {
        Dialect::Sina => raw.unwrap_or(0.0) / 100.0,
        Dialect::Tencent => raw.unwrap_or(0.0),
    };
    volume.max(0.0)
}

pub fn estimated_turnover(market: Market, volume: f64, price: f64) -> f64 {
    volume * market.unit_shares() * price
}

/// Ratio-check row of the decision table for a raw turnover and a positive estimate.
pub fn classify_turnover(
    dialect: Dialect,
    market: Market,
    raw: f64,
    estimated: f64,
    already_rescaled: bool,
) -> TurnoverAction {
    let ratio = raw / estimated;

    if !already_rescaled && ratio < UNDER_SCALED_RATIO && raw < UNDER_SCALED_CEILING {
        return TurnoverAction::ScaleUp;
    }

    match (dialect, market.is_domestic()) {
        (Dialect::Sina, _) if ratio > SINA_OVER_SCALED_RATIO => TurnoverAction::ScaleDown,
        (Dialect::Tencent, true) if ratio > TENCENT_OVER_SCALED_RATIO => {
            TurnoverAction::UseEstimate
        }
        _ => TurnoverAction::Keep,
    }
}

/// Turnover in base currency units.
pub fn correct_turnover(
    dialect: Dialect,
    market: Market,
    raw: Option<f64>,
    volume: f64,
    price: f64,
) -> f64 {
    let estimated = estimated_turnover(market, volume, price);

    let Some(mut raw) = raw.filter(|value| *value > 0.0) else {
        return estimated.max(0.0);
    };

    let mut rescaled = false;
    if dialect == Dialect::Tencent && market.is_domestic() && raw < TEN_THOUSANDS_MAGNITUDE {
        raw *= TEN_THOUSAND;
        rescaled = true;
    }

    if estimated <= 0.0 {
        return raw;
    }

    match classify_turnover(dialect, market, raw, estimated, rescaled) {
        TurnoverAction::Keep => raw,
        TurnoverAction::ScaleUp => raw * TEN_THOUSAND,
        TurnoverAction::ScaleDown => raw / 100.0,
        TurnoverAction::UseEstimate => estimated,
    }
}

/// Build the canonical snapshot for one decoded record.
pub fn normalize(raw: RawQuote) -> QuoteSnapshot {
    let market = raw.code.market();
    let volume = normalize_volume(raw.dialect, raw.volume);
    let turnover = correct_turnover(raw.dialect, market, raw.turnover, volume, raw.price);

    let change = if raw.prev_close > 0.0 {
        raw.price - raw.prev_close
    } else {
        0.0
    };
    let change_percent = raw.change_percent.unwrap_or(if raw.prev_close > 0.0 {
        change / raw.prev_close * 100.0
    } else {
        0.0
    });

    let update_time = raw
        .timestamp
        .as_deref()
        .map(|stamp| {
            parse_vendor_timestamp(stamp)
                .map(format_vendor_timestamp)
                .unwrap_or_else(|| stamp.to_owned())
        })
        .unwrap_or_default();

    QuoteSnapshot {
        source: QuoteSource::for_dialect(raw.dialect),
        code: raw.code,
        name: raw.name,
        price: raw.price,
        open: raw.open,
        prev_close: raw.prev_close,
        high: raw.high,
        low: raw.low,
        change,
        change_percent,
        volume,
        turnover,
        update_time,
        vendor_timestamp: raw.timestamp,
    }
}
