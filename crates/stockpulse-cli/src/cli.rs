//! CLI argument definitions for stockpulse.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `quote` | Fetch real-time quotes for codes or names |
//! | `search` | Fuzzy-search the instrument universe |
//! | `resolve` | Canonicalize codes without fetching |
//! | `universe` | Show or rebuild the cached instrument universe |
//! | `session` | Report whether the exchange session is open |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, ndjson, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--source` | `auto` | Vendor for mainland instruments |
//! | `--concurrency` | env or `4` | Batches in flight at once |
//! | `--timeout-ms` | env or `5000` | Per-request timeout in ms |
//! | `--cache-dir` | `~/.cache/stockpulse` | Universe cache directory |
//!
//! # Examples
//!
//! ```bash
//! stockpulse quote sh600000 000001 hk00700 us.aapl
//! stockpulse quote 平安银行 --format table
//! stockpulse search 银行 --limit 5
//! stockpulse session --timestamp "2024-01-05 10:30:00"
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use stockpulse_core::QuoteSource;

/// Real-time quotes for mainland China, Hong Kong and US listings.
#[derive(Debug, Parser)]
#[command(
    name = "stockpulse",
    author,
    version,
    about = "Real-time quote fetcher for CN, HK and US listings",
    long_about = "stockpulse fetches real-time quotes from public quote vendors in \
concurrent batches and normalizes them into one snapshot format.\n\
\n\
  • Mainland codes (sh/sz/bj), Hong Kong (hk) and US (us.) listings\n\
  • Chinese name lookup against a cached instrument universe\n\
  • JSON, NDJSON and table output\n\
\n\
Use 'stockpulse <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Vendor for mainland instruments. Hong Kong and US codes always use Tencent.
    #[arg(long, global = true, value_enum, default_value_t = SourceSelector::Auto)]
    pub source: SourceSelector,

    /// Number of batches fetched concurrently.
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    /// Per-request timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Directory holding the universe cache file.
    #[arg(long, global = true, env = "STOCKPULSE_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table.
    Table,
    /// Single JSON object.
    Json,
    /// One JSON object per line.
    Ndjson,
}

/// Vendor selection for mainland instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceSelector {
    /// Use the configured default (`STOCKPULSE_SOURCE`, else Sina).
    Auto,
    /// Sina comma-separated feed.
    Sina,
    /// Tencent tilde-separated feed.
    Tencent,
}

impl SourceSelector {
    pub const fn forced(self) -> Option<QuoteSource> {
        match self {
            Self::Auto => None,
            Self::Sina => Some(QuoteSource::Sina),
            Self::Tencent => Some(QuoteSource::Tencent),
        }
    }
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch real-time quotes.
    ///
    /// Inputs may be prefixed codes, bare six-digit numbers or Chinese names.
    ///
    /// # Examples
    ///
    ///   stockpulse quote sh600000 sz000001
    ///   stockpulse quote 600519 hk00700 us.aapl --pretty
    Quote(QuoteArgs),

    /// Fuzzy-search the instrument universe by name, number or code.
    ///
    /// # Examples
    ///
    ///   stockpulse search 平安
    ///   stockpulse search 600 --limit 5
    Search(SearchArgs),

    /// Canonicalize inputs without fetching quotes.
    Resolve(ResolveArgs),

    /// Show the instrument universe, discovering it when no fresh cache exists.
    Universe(UniverseArgs),

    /// Report whether the exchange trading session is open.
    Session(SessionArgs),
}

/// Arguments for the `quote` command.
#[derive(Debug, Args)]
pub struct QuoteArgs {
    /// One or more codes or names (e.g. sh600000, 000001, 平安银行).
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<String>,
}

/// Arguments for the `search` command.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Name fragment, number or code.
    pub query: String,

    /// Maximum number of results to return.
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

/// Arguments for the `resolve` command.
#[derive(Debug, Args)]
pub struct ResolveArgs {
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<String>,
}

/// Arguments for the `universe` command.
#[derive(Debug, Args)]
pub struct UniverseArgs {
    /// Ignore the cache and probe the full candidate range again.
    #[arg(long, default_value_t = false)]
    pub refresh: bool,

    /// Include every entry in the output instead of only the summary.
    #[arg(long, default_value_t = false)]
    pub entries: bool,
}

/// Arguments for the `session` command.
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Vendor timestamp to judge instead of the wall clock
    /// (e.g. `20240105103000` or `2024-01-05 10:30:00`).
    #[arg(long)]
    pub timestamp: Option<String>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "stockpulse",
            "quote",
            "sh600000",
            "平安银行",
            "--source",
            "tencent",
            "--concurrency",
            "8",
            "--format",
            "table",
        ])
        .expect("arguments should parse");

        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.source.forced(), Some(QuoteSource::Tencent));
        assert_eq!(cli.concurrency, Some(8));
        match cli.command {
            Command::Quote(args) => assert_eq!(args.inputs, ["sh600000", "平安银行"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn quote_requires_inputs() {
        assert!(Cli::try_parse_from(["stockpulse", "quote"]).is_err());
    }
}
