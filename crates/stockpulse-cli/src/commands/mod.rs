mod quote;
mod resolve;
mod search;
mod session;
mod universe;

use std::path::PathBuf;
use std::time::Instant;

use serde_json::Value;
use stockpulse_core::universe::default_sources;
use stockpulse_core::{
    contains_han, load_or_discover, FetchConfig, QuoteFetcher, Universe, UniverseCache,
};

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// Command output before rendering.
///
/// `data` is the full JSON payload; `records` are the rows used by the
/// `ndjson` and `table` formats, rendered in `columns` order.
pub struct CommandResult {
    pub data: Value,
    pub records: Vec<Value>,
    pub columns: &'static [&'static str],
    pub warnings: Vec<String>,
    pub latency_ms: u64,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            records: Vec::new(),
            columns: &[],
            warnings: Vec::new(),
            latency_ms: 0,
        }
    }

    pub fn with_records(mut self, columns: &'static [&'static str], records: Vec<Value>) -> Self {
        self.columns = columns;
        self.records = records;
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }
}

/// Shared state built once from global flags and environment.
pub struct Context {
    pub fetcher: QuoteFetcher,
    pub cache: UniverseCache,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Self {
        let mut config = FetchConfig::from_env();
        if let Some(concurrency) = cli.concurrency {
            config = config.with_concurrency(concurrency);
        }
        if let Some(timeout_ms) = cli.timeout_ms {
            config = config.with_timeout_ms(timeout_ms);
        }
        if let Some(source) = cli.source.forced() {
            config = config.with_domestic_source(source);
        }

        let cache_dir = cli.cache_dir.clone().unwrap_or_else(default_cache_dir);
        tracing::debug!(?config, cache_dir = %cache_dir.display(), "resolved fetch configuration");

        Self {
            fetcher: QuoteFetcher::new(config),
            cache: UniverseCache::in_dir(cache_dir),
        }
    }

    /// Cached universe, discovering it when the cache is missing or stale.
    pub async fn universe(&self) -> Universe {
        load_or_discover(&self.cache, &self.fetcher, &default_sources()).await
    }
}

fn default_cache_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".cache").join("stockpulse"))
        .unwrap_or_else(|| std::env::temp_dir().join("stockpulse"))
}

pub async fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    let context = Context::from_cli(cli);
    let started = Instant::now();

    let result = match &cli.command {
        Command::Quote(args) => quote::run(args, &context).await?,
        Command::Search(args) => search::run(args, &context).await?,
        Command::Resolve(args) => resolve::run(args, &context).await?,
        Command::Universe(args) => universe::run(args, &context).await?,
        Command::Session(args) => session::run(args)?,
    };

    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    Ok(result.with_latency(latency_ms))
}

/// Whether any input needs the universe to be resolved.
fn needs_universe(inputs: &[String]) -> bool {
    inputs.iter().any(|input| contains_han(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn universe_is_loaded_only_for_names() {
        assert!(!needs_universe(&[String::from("sh600000"), String::from("000001")]));
        assert!(needs_universe(&[String::from("sh600000"), String::from("平安银行")]));
        assert!(needs_universe(&[String::from("\u{3400}\u{3401}")]));
    }
}
