use std::sync::LazyLock;

use regex::Regex;

use super::{
    field_f64, field_str, is_not_found, price_or_current, Dialect, RawQuote, MIN_FIELDS,
};
use crate::InstrumentCode;

static LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*var\s+hq_str_([A-Za-z0-9_.]+)\s*=\s*"([^"]*)"\s*;?\s*$"#)
        .expect("sina line pattern is valid")
});

const NAME: usize = 0;
const OPEN: usize = 1;
const PREV_CLOSE: usize = 2;
const PRICE: usize = 3;
const HIGH: usize = 4;
const LOW: usize = 5;
const VOLUME: usize = 8;
const TURNOVER: usize = 9;
const DATE: usize = 30;
const TIME: usize = 31;

/// Decode a Sina reply: one `var hq_str_<code>="f0,f1,...";` line per code.
pub fn parse_sina(payload: &str) -> Vec<RawQuote> {
    payload
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Option<RawQuote> {
    let Some(captures) = LINE.captures(line) else {
        tracing::debug!(line, "dropping sina line with unexpected shape");
        return None;
    };
    let key = captures.get(1)?.as_str();
    let body = captures.get(2)?.as_str();

    let code = match InstrumentCode::parse(key) {
        Ok(code) => code,
        Err(error) => {
            tracing::debug!(key, %error, "dropping sina line with unsupported code");
            return None;
        }
    };

    let fields: Vec<&str> = body.split(',').collect();
    if fields.len() < MIN_FIELDS {
        tracing::debug!(code = %code, fields = fields.len(), "dropping sina record with too few fields");
        return None;
    }

    let name = fields[NAME].trim();
    if is_not_found(name) {
        tracing::debug!(code = %code, "sina reports no quote for code");
        return None;
    }

    let price = field_f64(&fields, PRICE).unwrap_or(0.0);
    let timestamp = match (field_str(&fields, DATE), field_str(&fields, TIME)) {
        (Some(date), Some(time)) => Some(format!("{date} {time}")),
        _ => None,
    };

    Some(RawQuote {
        code,
        dialect: Dialect::Sina,
        name: name.to_owned(),
        price,
        open: field_f64(&fields, OPEN).unwrap_or(0.0),
        prev_close: field_f64(&fields, PREV_CLOSE).unwrap_or(0.0),
        high: price_or_current(&fields, HIGH, price),
        low: price_or_current(&fields, LOW, price),
        volume: field_f64(&fields, VOLUME),
        turnover: field_f64(&fields, TURNOVER),
        change_percent: None,
        timestamp,
    })
}
