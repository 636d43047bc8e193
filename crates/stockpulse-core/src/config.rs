//! Fetch pipeline configuration.
//!
//! # Environment Variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `STOCKPULSE_CONCURRENCY` | `4` | Batches in flight at once |
//! | `STOCKPULSE_BATCH_SIZE` | `60` | Codes per upstream request |
//! | `STOCKPULSE_TIMEOUT_MS` | `5000` | Per-request timeout |
//! | `STOCKPULSE_JITTER_MS` | `50` | Upper bound of the random pre-request delay |
//! | `STOCKPULSE_RATE_LIMIT` | unset | Requests per second across all batches |
//! | `STOCKPULSE_SOURCE` | `sina` | Vendor for mainland instruments |

use std::env;
use std::str::FromStr;

use crate::{QuoteSource, ValidationError};

pub const MAX_BATCH_SIZE: usize = 800;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub concurrency: usize,
    pub batch_size: usize,
    pub timeout_ms: u64,
    pub max_jitter_ms: u64,
    pub requests_per_second: Option<u32>,
    pub domestic_source: QuoteSource,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            batch_size: 60,
            timeout_ms: 5_000,
            max_jitter_ms: 50,
            requests_per_second: None,
            domestic_source: QuoteSource::Sina,
        }
    }
}

impl FetchConfig {
    /// Defaults overridden by `STOCKPULSE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns. Malformed values are
    /// logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = read(&lookup, "STOCKPULSE_CONCURRENCY", "concurrency") {
            config.concurrency = value;
        }
        if let Some(value) = read(&lookup, "STOCKPULSE_BATCH_SIZE", "batch_size") {
            config.batch_size = value;
        }
        if let Some(value) = read(&lookup, "STOCKPULSE_TIMEOUT_MS", "timeout_ms") {
            config.timeout_ms = value;
        }
        if let Some(value) = read(&lookup, "STOCKPULSE_JITTER_MS", "jitter_ms") {
            config.max_jitter_ms = value;
        }
        if let Some(value) = read::<u32>(&lookup, "STOCKPULSE_RATE_LIMIT", "rate_limit") {
            config.requests_per_second = (value > 0).then_some(value);
        }
        if let Some(value) = read(&lookup, "STOCKPULSE_SOURCE", "source") {
            config.domestic_source = value;
        }

        config.clamped()
    }

    /// Keep values inside their usable bounds.
    pub fn clamped(mut self) -> Self {
        self.concurrency = self.concurrency.max(1);
        self.batch_size = self.batch_size.clamp(1, MAX_BATCH_SIZE);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_max_jitter_ms(mut self, max_jitter_ms: u64) -> Self {
        self.max_jitter_ms = max_jitter_ms;
        self
    }

    pub fn with_domestic_source(mut self, source: QuoteSource) -> Self {
        self.domestic_source = source;
        self
    }
}

fn read<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, field: &'static str) -> Option<T>
where
    T: FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            let error = ValidationError::InvalidConfig {
                field,
                value: raw.clone(),
            };
            tracing::warn!(key, %error, "ignoring malformed configuration value");
            None
        }
    }
}
