use std::sync::LazyLock;

use regex::Regex;

use super::{
    field_f64, field_str, first_f64, is_not_found, price_or_current, Dialect, RawQuote,
    MIN_FIELDS,
};
use crate::{InstrumentCode, Market};

static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"v_([A-Za-z0-9_.]+)\s*=\s*"([^"]*)""#).expect("tencent assignment pattern is valid")
});

const NAME: usize = 1;
const PRICE: usize = 3;
const PREV_CLOSE: usize = 4;
const OPEN: usize = 5;
const TIMESTAMP: usize = 30;
const CHANGE_PERCENT: usize = 32;
const HIGH: usize = 33;
const LOW: usize = 34;
const VOLUME_CANDIDATES: [usize; 2] = [6, 36];
const TURNOVER: usize = 37;
const DOMESTIC_TURNOVER_FALLBACKS: [usize; 2] = [7, 10];

/// Decode a Tencent reply: any number of `v_<code>="f0~f1~...";` assignments.
pub fn parse_tencent(payload: &str) -> Vec<RawQuote> {
    let mut quotes = Vec::new();
    let mut matched = 0usize;

    for captures in ASSIGNMENT.captures_iter(payload) {
        matched += 1;
        let (Some(key), Some(body)) = (captures.get(1), captures.get(2)) else {
            continue;
        };
        if let Some(quote) = parse_assignment(key.as_str(), body.as_str()) {
            quotes.push(quote);
        }
    }

    if matched == 0 && !payload.trim().is_empty() {
        tracing::debug!(bytes = payload.len(), "tencent reply contained no assignments");
    }

    quotes
}

/// Map a reply key to a canonical code. US keys look like `usAAPL` or `usBRK_B`.
fn code_from_key(key: &str) -> Option<InstrumentCode> {
    let lowered = key.to_ascii_lowercase();
    let parsed = match lowered.strip_prefix("us") {
        Some(ticker) if !ticker.is_empty() && !ticker.starts_with('.') => {
            InstrumentCode::from_body(Market::Us, &ticker.replace('_', "."))
        }
        _ => InstrumentCode::parse(&lowered),
    };

    match parsed {
        Ok(code) => Some(code),
        Err(error) => {
            tracing::debug!(key, %error, "dropping tencent record with unsupported key");
            None
        }
    }
}

fn parse_assignment(key: &str, body: &str) -> Option<RawQuote> {
    let code = code_from_key(key)?;

    let fields: Vec<&str> = body.split('~').collect();
    if fields.len() < MIN_FIELDS {
        tracing::debug!(code = %code, fields = fields.len(), "dropping tencent record with too few fields");
        return None;
    }

    let name = fields[NAME].trim();
    if is_not_found(name) {
        tracing::debug!(code = %code, "tencent reports no quote for code");
        return None;
    }

    let price = field_f64(&fields, PRICE).unwrap_or(0.0);
    let mut turnover = field_f64(&fields, TURNOVER).filter(|value| *value > 0.0);
    if turnover.is_none() && code.market().is_domestic() {
        turnover = DOMESTIC_TURNOVER_FALLBACKS
            .iter()
            .find_map(|index| field_f64(&fields, *index).filter(|value| *value > 0.0));
    }

    Some(RawQuote {
        dialect: Dialect::Tencent,
        name: name.to_owned(),
        price,
        open: field_f64(&fields, OPEN).unwrap_or(0.0),
        prev_close: field_f64(&fields, PREV_CLOSE).unwrap_or(0.0),
        high: price_or_current(&fields, HIGH, price),
        low: price_or_current(&fields, LOW, price),
        volume: first_f64(&fields, &VOLUME_CANDIDATES),
        turnover,
        change_percent: field_f64(&fields, CHANGE_PERCENT),
        timestamp: field_str(&fields, TIMESTAMP).map(str::to_owned),
        code,
    })
}
