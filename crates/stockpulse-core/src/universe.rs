//! Candidate code generation and the loaded instrument universe.
//!
//! Generation is pure: identical input always yields an identical, identically
//! ordered sequence of canonical codes.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{InstrumentCode, Market};

/// Declarative numeric range of candidate codes, e.g. `sh 600000..=605999`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRange {
    pub label: String,
    pub market: Market,
    pub start: u32,
    pub end: u32,
}

impl CodeRange {
    pub fn new(label: impl Into<String>, market: Market, start: u32, end: u32) -> Self {
        Self {
            label: label.into(),
            market,
            start,
            end,
        }
    }
}

/// One input of the generator: a numeric range or an explicit list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeSource {
    Range(CodeRange),
    List { label: String, codes: Vec<String> },
}

/// Major indices with their display names; their names are never probed.
pub const MAJOR_INDICES: &[(&str, &str)] = &[
    ("sh000001", "上证指数"),
    ("sh000016", "上证50"),
    ("sh000300", "沪深300"),
    ("sh000688", "科创50"),
    ("sh000905", "中证500"),
    ("sz399001", "深证成指"),
    ("sz399006", "创业板指"),
    ("bj899050", "北证50"),
    ("hkhsi", "恒生指数"),
    ("hkhscei", "国企指数"),
    ("hkhstech", "恒生科技指数"),
    ("us.dji", "道琼斯"),
    ("us.ixic", "纳斯达克"),
    ("us.inx", "标普500"),
];

/// Curated US tickers, including cross-listed Chinese issuers.
pub const CURATED_US: &[&str] = &[
    "aapl", "msft", "googl", "amzn", "nvda", "meta", "tsla", "brk.b", "jpm", "v", "baba", "pdd",
    "jd", "bidu", "ntes", "nio", "li", "xpev", "tme", "bili", "tsm", "futu",
];

/// Generator input covering the instrument classes the pipeline supports.
pub fn default_sources() -> Vec<CodeSource> {
    vec![
        CodeSource::List {
            label: String::from("indices"),
            codes: MAJOR_INDICES
                .iter()
                .map(|(code, _)| (*code).to_owned())
                .collect(),
        },
        CodeSource::Range(CodeRange::new("sh-main", Market::Shanghai, 600_000, 605_999)),
        CodeSource::Range(CodeRange::new("sh-star", Market::Shanghai, 688_000, 689_999)),
        CodeSource::Range(CodeRange::new("sh-etf", Market::Shanghai, 510_000, 518_999)),
        CodeSource::Range(CodeRange::new("sh-star-etf", Market::Shanghai, 588_000, 588_999)),
        CodeSource::Range(CodeRange::new("sz-main", Market::Shenzhen, 1, 3_999)),
        CodeSource::Range(CodeRange::new("sz-chinext", Market::Shenzhen, 300_000, 301_999)),
        CodeSource::Range(CodeRange::new("sz-etf", Market::Shenzhen, 159_000, 159_999)),
        CodeSource::Range(CodeRange::new("bj-main", Market::Beijing, 920_000, 920_999)),
        CodeSource::Range(CodeRange::new("hk-main", Market::HongKong, 1, 9_999)),
        CodeSource::List {
            label: String::from("us-curated"),
            codes: CURATED_US.iter().map(|code| format!("us.{code}")).collect(),
        },
    ]
}

/// Every code of `[start, end]` for `market`, zero-padded to the market width.
///
/// An inverted range yields nothing.
pub fn generate_range(market: Market, start: u32, end: u32) -> Vec<InstrumentCode> {
    if start > end {
        return Vec::new();
    }
    (start..=end)
        .filter_map(|number| InstrumentCode::from_number(market, number))
        .collect()
}

/// Ordered, deduplicated canonical codes for all sources.
pub fn generate_codes(sources: &[CodeSource]) -> Vec<InstrumentCode> {
    let mut seen = HashSet::new();
    let mut codes = Vec::new();

    for source in sources {
        let generated = match source {
            CodeSource::Range(range) => {
                if range.start > range.end {
                    tracing::debug!(label = %range.label, start = range.start, end = range.end, "skipping inverted code range");
                }
                generate_range(range.market, range.start, range.end)
            }
            CodeSource::List { label, codes } => codes
                .iter()
                .filter_map(|raw| match InstrumentCode::parse(raw) {
                    Ok(code) => Some(code),
                    Err(error) => {
                        tracing::warn!(%label, code = %raw, %error, "skipping malformed static code");
                        None
                    }
                })
                .collect(),
        };

        for code in generated {
            if seen.insert(code.clone()) {
                codes.push(code);
            }
        }
    }

    codes
}

/// One resolvable instrument: canonical code, display name and bare number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniverseEntry {
    pub code: InstrumentCode,
    pub name: String,
    pub number: String,
}

impl UniverseEntry {
    pub fn new(code: InstrumentCode, name: impl Into<String>) -> Self {
        let number = code.body().to_owned();
        Self {
            code,
            name: name.into(),
            number,
        }
    }
}

/// Caller-owned universe value.
///
/// `loaded` distinguishes "never loaded" from "loaded but empty" so callers
/// can decide when discovery is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Universe {
    entries: Vec<UniverseEntry>,
    loaded: bool,
}

impl Universe {
    /// Universe that has not been loaded yet.
    pub fn unloaded() -> Self {
        Self::default()
    }

    /// Loaded universe; duplicate codes keep their first entry.
    pub fn new(entries: Vec<UniverseEntry>) -> Self {
        let mut seen = HashSet::new();
        let entries = entries
            .into_iter()
            .filter(|entry| seen.insert(entry.code.clone()))
            .collect();
        Self {
            entries,
            loaded: true,
        }
    }

    /// Index entries with their built-in names.
    pub fn index_entries() -> Vec<UniverseEntry> {
        MAJOR_INDICES
            .iter()
            .filter_map(|(code, name)| {
                InstrumentCode::parse(code)
                    .ok()
                    .map(|code| UniverseEntry::new(code, *name))
            })
            .collect()
    }

    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn entries(&self) -> &[UniverseEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, code: &InstrumentCode) -> Option<&UniverseEntry> {
        self.entries.iter().find(|entry| &entry.code == code)
    }

    /// Name lookup table keyed by canonical code.
    pub fn names(&self) -> HashMap<&InstrumentCode, &str> {
        self.entries
            .iter()
            .map(|entry| (&entry.code, entry.name.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_strings(codes: &[InstrumentCode]) -> Vec<&str> {
        codes.iter().map(InstrumentCode::as_str).collect()
    }

    #[test]
    fn generates_zero_padded_shenzhen_range() {
        let codes = generate_range(Market::Shenzhen, 0, 2);
        assert_eq!(as_strings(&codes), ["sz000000", "sz000001", "sz000002"]);
    }

    #[test]
    fn hong_kong_codes_use_five_digits() {
        let codes = generate_range(Market::HongKong, 699, 700);
        assert_eq!(as_strings(&codes), ["hk00699", "hk00700"]);
    }

    #[test]
    fn inverted_range_yields_nothing() {
        assert!(generate_range(Market::Shanghai, 600_010, 600_000).is_empty());

        let sources = vec![
            CodeSource::Range(CodeRange::new("bad", Market::Shanghai, 5, 1)),
            CodeSource::Range(CodeRange::new("good", Market::Shanghai, 600_000, 600_001)),
        ];
        assert_eq!(
            as_strings(&generate_codes(&sources)),
            ["sh600000", "sh600001"]
        );
    }

    #[test]
    fn range_length_matches_bounds() {
        let sources = vec![CodeSource::Range(CodeRange::new(
            "chinext",
            Market::Shenzhen,
            300_000,
            300_499,
        ))];
        let codes = generate_codes(&sources);
        assert_eq!(codes.len(), 500);
        assert!(codes.iter().all(|code| code.as_str().len() == 8));
    }

    #[test]
    fn static_lists_are_lowercased_and_deduplicated() {
        let sources = vec![
            CodeSource::List {
                label: String::from("idx"),
                codes: vec![String::from("SH000001"), String::from("us.AAPL")],
            },
            CodeSource::Range(CodeRange::new("sh", Market::Shanghai, 1, 2)),
            CodeSource::List {
                label: String::from("dupes"),
                codes: vec![String::from("sh000001"), String::from("not a code")],
            },
        ];
        let codes = generate_codes(&sources);
        assert_eq!(
            as_strings(&codes),
            ["sh000001", "us.aapl", "sh000002"]
        );
    }

    #[test]
    fn generation_is_deterministic() {
        let first = generate_codes(&default_sources());
        let second = generate_codes(&default_sources());
        assert_eq!(first, second);
        assert!(first.len() > 10_000);
    }

    #[test]
    fn universe_tracks_loaded_flag_and_dedups() {
        assert!(!Universe::unloaded().is_loaded());

        let code = InstrumentCode::parse("sz000001").expect("valid");
        let universe = Universe::new(vec![
            UniverseEntry::new(code.clone(), "平安银行"),
            UniverseEntry::new(code.clone(), "duplicate"),
        ]);
        assert!(universe.is_loaded());
        assert_eq!(universe.len(), 1);
        assert_eq!(universe.get(&code).map(|e| e.name.as_str()), Some("平安银行"));
        assert_eq!(universe.entries()[0].number, "000001");
    }
}
