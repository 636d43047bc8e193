//! Canonicalization of user-supplied instrument codes and fuzzy name search.
//!
//! Recognized shapes, in priority order:
//!
//! 1. prefixed mainland code (`sh600000`, `SZ000001`, `bj920001`)
//! 2. Hong Kong code (`hk00700`)
//! 3. US code (`us.aapl`, `us.BRK.A`)
//! 4. bare six-digit number, assigned to a board by numeric range
//! 5. text containing Han characters, resolved by name search
//! 6. anything else, passed through unchanged

use std::cmp::Reverse;
use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::universe::{Universe, UniverseEntry};
use crate::{InstrumentCode, Market};

static DOMESTIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)(sh|sz|bj)\d{6}$").expect("domestic pattern is valid"));
static HONG_KONG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)hk\d{5}$").expect("hong kong pattern is valid"));
static US: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)us\.[a-z0-9]+(\.[a-z]+)?$").expect("us pattern is valid")
});
static BARE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{6}$").expect("bare number pattern is valid"));
static HAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{Han}").expect("han pattern is valid"));

/// Whether `text` contains any Han-script character, i.e. needs name resolution.
pub fn contains_han(text: &str) -> bool {
    HAN.is_match(text)
}

/// Outcome of canonicalizing one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Code(InstrumentCode),
    /// Unrecognized shape kept verbatim as a best effort.
    Passthrough(String),
    /// A name that matched nothing in the universe.
    Unresolved(String),
}

/// Canonical codes in first-seen order plus the inputs that could not be resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CanonicalCodes {
    pub codes: Vec<String>,
    pub unresolved: Vec<String>,
}

/// Board for a bare six-digit number.
pub fn market_for_number(number: u32) -> Market {
    match number {
        600_000..=605_999 | 688_000..=689_999 => Market::Shanghai,
        0..=6_999 | 300_000..=302_999 => Market::Shenzhen,
        920_000..=920_999 => Market::Beijing,
        _ => Market::Shenzhen,
    }
}

/// Canonicalize one input. Blank input yields `None`.
pub fn canonicalize(input: &str, universe: &Universe) -> Option<Resolution> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if DOMESTIC.is_match(trimmed) || HONG_KONG.is_match(trimmed) || US.is_match(trimmed) {
        if let Ok(code) = InstrumentCode::parse(trimmed) {
            return Some(Resolution::Code(code));
        }
    }

    if BARE_NUMBER.is_match(trimmed) {
        let code = trimmed
            .parse::<u32>()
            .ok()
            .and_then(|number| InstrumentCode::from_body(market_for_number(number), trimmed).ok());
        if let Some(code) = code {
            return Some(Resolution::Code(code));
        }
    }

    if contains_han(trimmed) {
        if !universe.is_loaded() {
            tracing::warn!(input = trimmed, "cannot resolve name: universe not loaded");
            return Some(Resolution::Unresolved(trimmed.to_owned()));
        }
        return Some(match search_universe(universe, trimmed, 1).first() {
            Some(entry) => Resolution::Code(entry.code.clone()),
            None => {
                tracing::warn!(input = trimmed, "no instrument matches name");
                Resolution::Unresolved(trimmed.to_owned())
            }
        });
    }

    Some(Resolution::Passthrough(trimmed.to_owned()))
}

/// Canonicalize many inputs, deduplicating case-insensitively in first-seen order.
pub fn canonicalize_all<I, S>(inputs: I, universe: &Universe) -> CanonicalCodes
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut result = CanonicalCodes::default();

    for input in inputs {
        match canonicalize(input.as_ref(), universe) {
            None => {}
            Some(Resolution::Code(code)) => {
                if seen.insert(code.as_str().to_owned()) {
                    result.codes.push(code.into());
                }
            }
            Some(Resolution::Passthrough(raw)) => {
                if seen.insert(raw.to_lowercase()) {
                    result.codes.push(raw);
                }
            }
            Some(Resolution::Unresolved(raw)) => result.unresolved.push(raw),
        }
    }

    result
}

/// Match quality, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MatchTier {
    ExactName,
    NamePrefix,
    NameContains,
    NameContainsIgnoreCase,
    ExactNumber,
    NumberPartial,
    ExactCode,
    CodeContains,
}

fn match_tier(entry: &UniverseEntry, query: &str, query_lower: &str) -> Option<MatchTier> {
    let name = entry.name.as_str();
    if !name.is_empty() {
        if name == query {
            return Some(MatchTier::ExactName);
        }
        if name.starts_with(query) {
            return Some(MatchTier::NamePrefix);
        }
        if name.contains(query) {
            return Some(MatchTier::NameContains);
        }
        if name.to_lowercase().contains(query_lower) {
            return Some(MatchTier::NameContainsIgnoreCase);
        }
    }

    let number = entry.number.to_ascii_lowercase();
    if number == query_lower {
        return Some(MatchTier::ExactNumber);
    }
    if number.contains(query_lower) {
        return Some(MatchTier::NumberPartial);
    }

    let code = entry.code.as_str();
    if code == query_lower {
        return Some(MatchTier::ExactCode);
    }
    if code.contains(query_lower) {
        return Some(MatchTier::CodeContains);
    }

    None
}

/// Rank universe entries against `query`, best first, at most `limit` results.
///
/// Ties prefer entries with a name, then shorter names, then code order.
pub fn search_universe<'a>(
    universe: &'a Universe,
    query: &str,
    limit: usize,
) -> Vec<&'a UniverseEntry> {
    let query = query.trim();
    if query.is_empty() || limit == 0 {
        return Vec::new();
    }
    let query_lower = query.to_lowercase();

    let mut ranked: Vec<(MatchTier, &UniverseEntry)> = universe
        .entries()
        .iter()
        .filter_map(|entry| match_tier(entry, query, &query_lower).map(|tier| (tier, entry)))
        .collect();

    ranked.sort_by_key(|(tier, entry)| {
        (
            *tier,
            Reverse(!entry.name.is_empty()),
            entry.name.chars().count(),
            entry.code.as_str(),
        )
    });

    ranked
        .into_iter()
        .take(limit)
        .map(|(_, entry)| entry)
        .collect()
}
