//! # Stockpulse Core
//!
//! Batched real-time quote retrieval for mainland China, Hong Kong and US
//! listings from two public quote vendors.
//!
//! ## Overview
//!
//! - **Canonical instrument codes** (`sh600000`, `hk00700`, `us.aapl`)
//! - **Wire parsers** for the comma dialect (Sina) and the tilde dialect (Tencent)
//! - **Normalization** of vendor volume and turnover units into shares and yuan
//! - **Bounded concurrent execution** of batched HTTP requests with failure isolation
//! - **Universe discovery** with an on-disk JSON cache
//! - **Session detection** against the exchange trading calendar
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | On-disk universe cache with TTL |
//! | [`canonical`] | Code canonicalization and fuzzy name search |
//! | [`config`] | Fetch configuration and environment overrides |
//! | [`domain`] | Instrument codes and quote snapshots |
//! | [`error`] | Core error types |
//! | [`executor`] | Bounded concurrent task runner |
//! | [`fetcher`] | Batch planning and quote fetching |
//! | [`http_client`] | HTTP client abstraction and charset decoding |
//! | [`normalize`] | Unit correction for vendor volume and turnover |
//! | [`session`] | Trading session detection |
//! | [`source`] | Vendor identifiers and request building |
//! | [`throttling`] | Request pacing and jitter |
//! | [`universe`] | Candidate code generation and the loaded universe |
//! | [`wire`] | Vendor payload parsers |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stockpulse_core::{FetchConfig, InstrumentCode, QuoteFetcher, QuoteSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = QuoteFetcher::new(FetchConfig::from_env());
//!     let codes = vec![InstrumentCode::parse("sz000001")?];
//!
//!     for quote in fetcher.fetch(&codes, QuoteSource::Sina).await {
//!         println!("{} {} {:.2}", quote.code, quote.name, quote.price);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / User     │
//! └────────┬────────┘
//!          │ canonicalize
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  QuoteFetcher   │────▶│ Bounded executor │
//! │  (batch plan)   │     │ + RequestPacer   │
//! └────────┬────────┘     └────────┬─────────┘
//!          │                       ▼
//!          │              ┌──────────────────┐
//!          │              │ HTTP Client      │
//!          │              │ (GB18030 decode) │
//!          │              └────────┬─────────┘
//!          ▼                       ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ QuoteSnapshot   │◀────│ wire + normalize │
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Failures inside a batch never fail the call: the batch is logged and
//! omitted. Errors surface only at construction and validation boundaries.
//!
//! ```rust
//! use stockpulse_core::{InstrumentCode, ValidationError};
//!
//! match InstrumentCode::parse("xx123") {
//!     Err(ValidationError::InvalidCode { value }) => assert_eq!(value, "xx123"),
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

pub mod cache;
pub mod canonical;
pub mod config;
pub mod domain;
pub mod error;
pub mod executor;
pub mod fetcher;
pub mod http_client;
pub mod normalize;
pub mod session;
pub mod source;
pub mod throttling;
pub mod universe;
pub mod wire;

// Caching
pub use cache::{load_or_discover, UniverseCache};

// Canonicalization and search
pub use canonical::{
    canonicalize, canonicalize_all, contains_han, search_universe, CanonicalCodes, Resolution,
};

// Configuration
pub use config::FetchConfig;

// Domain models
pub use domain::{InstrumentCode, Market, QuoteSnapshot};

// Error types
pub use error::{CacheError, FetchError, ValidationError};

// Execution
pub use executor::run_bounded;
pub use fetcher::{FetchTask, QuoteFetcher};

// HTTP client types
pub use http_client::{
    Charset, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient,
};

// Session detection
pub use session::{is_market_open, is_session_open};

// Source identifiers
pub use source::QuoteSource;

// Throttling
pub use throttling::RequestPacer;

// Universe
pub use universe::{CodeRange, CodeSource, Universe, UniverseEntry};
