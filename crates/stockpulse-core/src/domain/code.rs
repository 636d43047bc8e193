use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Exchange or instrument class an [`InstrumentCode`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Market {
    #[serde(rename = "sh")]
    Shanghai,
    #[serde(rename = "sz")]
    Shenzhen,
    #[serde(rename = "bj")]
    Beijing,
    #[serde(rename = "hk")]
    HongKong,
    #[serde(rename = "us")]
    Us,
}

impl Market {
    pub const ALL: [Self; 5] = [
        Self::Shanghai,
        Self::Shenzhen,
        Self::Beijing,
        Self::HongKong,
        Self::Us,
    ];

    /// Lowercase prefix used in canonical codes.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shanghai => "sh",
            Self::Shenzhen => "sz",
            Self::Beijing => "bj",
            Self::HongKong => "hk",
            Self::Us => "us",
        }
    }

    /// Mainland boards quoted in lots.
    pub const fn is_domestic(self) -> bool {
        matches!(self, Self::Shanghai | Self::Shenzhen | Self::Beijing)
    }

    /// Zero-padded digit width of generated codes, if the market is numeric.
    pub const fn code_width(self) -> Option<usize> {
        match self {
            Self::Shanghai | Self::Shenzhen | Self::Beijing => Some(6),
            Self::HongKong => Some(5),
            Self::Us => None,
        }
    }

    /// Shares per canonical volume unit.
    pub const fn unit_shares(self) -> f64 {
        if self.is_domestic() {
            100.0
        } else {
            1.0
        }
    }
}

impl Display for Market {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical instrument identifier such as `sh600000`, `hk00700` or `us.brk.b`.
///
/// The textual form is always lowercase, so equality and hashing operate on
/// the canonical representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstrumentCode {
    canonical: String,
    market: Market,
}

impl InstrumentCode {
    /// Parse an already-prefixed code, normalizing case and surrounding whitespace.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Err(ValidationError::EmptyCode);
        }

        if let Some(body) = normalized.strip_prefix("us.") {
            return Self::from_body(Market::Us, body);
        }

        let market = match normalized.get(..2) {
            Some("sh") => Market::Shanghai,
            Some("sz") => Market::Shenzhen,
            Some("bj") => Market::Beijing,
            Some("hk") => Market::HongKong,
            _ => {
                return Err(ValidationError::InvalidCode { value: normalized });
            }
        };

        Self::from_body(market, &normalized[2..])
    }

    /// Build a code from a market and its bare body (digits or ticker).
    pub fn from_body(market: Market, body: &str) -> Result<Self, ValidationError> {
        let body = body.trim().to_ascii_lowercase();
        if !body_fits(market, &body) {
            return Err(ValidationError::InvalidCodeBody {
                market: market.as_str(),
                body,
            });
        }

        let canonical = match market {
            Market::Us => format!("us.{body}"),
            other => format!("{}{body}", other.as_str()),
        };

        Ok(Self { canonical, market })
    }

    /// Build a numeric code zero-padded to the market width.
    ///
    /// Returns `None` for markets without a numeric scheme or when the number
    /// does not fit the width.
    pub fn from_number(market: Market, number: u32) -> Option<Self> {
        let width = market.code_width()?;
        let body = format!("{number:0width$}");
        if body.len() != width {
            return None;
        }
        Some(Self {
            canonical: format!("{}{body}", market.as_str()),
            market,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    pub const fn market(&self) -> Market {
        self.market
    }

    /// Code without its market prefix (`600000`, `00700`, `brk.b`).
    pub fn body(&self) -> &str {
        match self.market {
            Market::Us => &self.canonical[3..],
            _ => &self.canonical[2..],
        }
    }
}

fn body_fits(market: Market, body: &str) -> bool {
    match market {
        Market::Shanghai | Market::Shenzhen | Market::Beijing => {
            body.len() == 6 && body.bytes().all(|b| b.is_ascii_digit())
        }
        // Five-digit listings plus alphabetic index tickers such as `hsi`.
        Market::HongKong => {
            !body.is_empty()
                && body.len() <= 8
                && body.bytes().all(|b| b.is_ascii_alphanumeric())
        }
        Market::Us => {
            let mut parts = body.split('.');
            let ticker_ok = parts
                .next()
                .is_some_and(|t| !t.is_empty() && t.bytes().all(|b| b.is_ascii_alphanumeric()));
            let class_ok = match parts.next() {
                None => true,
                Some(class) => !class.is_empty() && class.bytes().all(|b| b.is_ascii_alphabetic()),
            };
            ticker_ok && class_ok && parts.next().is_none()
        }
    }
}

impl Display for InstrumentCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstrumentCode {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for InstrumentCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<InstrumentCode> for String {
    fn from(value: InstrumentCode) -> Self {
        value.canonical
    }
}
