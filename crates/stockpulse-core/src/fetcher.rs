//! Quote fetch pipeline: codes → batches → bounded executor → parse → normalize.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::executor::run_bounded;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::normalize::normalize;
use crate::throttling::RequestPacer;
use crate::universe::{generate_codes, CodeSource, Universe, UniverseEntry};
use crate::{wire, FetchConfig, FetchError, InstrumentCode, QuoteSnapshot, QuoteSource};

/// One upstream request: a batch of codes for one vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTask {
    pub source: QuoteSource,
    pub codes: Vec<InstrumentCode>,
}

impl FetchTask {
    /// Send the batch and decode the reply into snapshots.
    pub async fn run(
        self,
        http_client: &dyn HttpClient,
        pacer: &RequestPacer,
        timeout_ms: u64,
    ) -> Result<Vec<QuoteSnapshot>, FetchError> {
        if self.codes.is_empty() {
            return Ok(Vec::new());
        }

        pacer.ready().await;

        let request = self.source.batch_request(&self.codes, timeout_ms);
        let response = http_client.execute(request).await?;
        if !response.is_success() {
            return Err(FetchError::Status {
                status: response.status,
            });
        }

        let text = response.text(self.source.charset());
        let snapshots: Vec<QuoteSnapshot> = wire::parse(self.source.dialect(), &text)
            .into_iter()
            .map(normalize)
            .collect();

        tracing::debug!(
            source = %self.source,
            requested = self.codes.len(),
            received = snapshots.len(),
            "batch decoded"
        );
        Ok(snapshots)
    }
}

/// Fetches quotes for many codes with bounded concurrency.
pub struct QuoteFetcher {
    http_client: Arc<dyn HttpClient>,
    pacer: RequestPacer,
    config: FetchConfig,
}

impl QuoteFetcher {
    /// Fetcher backed by the production reqwest transport.
    pub fn new(config: FetchConfig) -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::default()), config)
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>, config: FetchConfig) -> Self {
        let config = config.clamped();
        let pacer = RequestPacer::new(
            config.requests_per_second,
            Duration::from_millis(config.max_jitter_ms),
        );
        Self {
            http_client,
            pacer,
            config,
        }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Split `codes` into per-request batches for `source`.
    ///
    /// Codes are deduplicated on their canonical form; codes the vendor cannot
    /// serve are skipped.
    pub fn plan(&self, codes: &[InstrumentCode], source: QuoteSource) -> Vec<FetchTask> {
        let mut seen = HashSet::new();
        let mut supported = Vec::with_capacity(codes.len());
        for code in codes {
            if !seen.insert(code) {
                continue;
            }
            if source.supports(code.market()) {
                supported.push(code.clone());
            } else {
                tracing::warn!(code = %code, %source, "source cannot serve code; skipping");
            }
        }

        supported
            .chunks(self.config.batch_size)
            .map(|batch| FetchTask {
                source,
                codes: batch.to_vec(),
            })
            .collect()
    }

    /// Quotes for `codes` from one vendor. Failed batches are dropped.
    pub async fn fetch(&self, codes: &[InstrumentCode], source: QuoteSource) -> Vec<QuoteSnapshot> {
        let plan = self.plan(codes, source);
        if plan.is_empty() {
            return Vec::new();
        }

        let http_client = self.http_client.as_ref();
        let pacer = &self.pacer;
        let timeout_ms = self.config.timeout_ms;
        let tasks: Vec<_> = plan
            .into_iter()
            .map(|task| move || task.run(http_client, pacer, timeout_ms))
            .collect();

        run_bounded(tasks, self.config.concurrency).await
    }

    /// Quotes for a mixed list: mainland codes through the configured domestic
    /// vendor, Hong Kong and US codes through Tencent.
    ///
    /// The two dispatches run concurrently; their relative order is not defined.
    pub async fn fetch_all(&self, codes: &[InstrumentCode]) -> Vec<QuoteSnapshot> {
        let (domestic, foreign): (Vec<InstrumentCode>, Vec<InstrumentCode>) = codes
            .iter()
            .cloned()
            .partition(|code| code.market().is_domestic());

        let (mut snapshots, overseas) = futures::join!(
            self.fetch(&domestic, self.config.domestic_source),
            self.fetch(&foreign, QuoteSource::Tencent)
        );
        snapshots.extend(overseas);
        snapshots
    }

    /// Probe every generated code and keep the instruments that answered.
    ///
    /// Index entries come with built-in names and are not probed.
    pub async fn discover_universe(&self, sources: &[CodeSource]) -> Universe {
        let indices = Universe::index_entries();
        let known: HashSet<&InstrumentCode> = indices.iter().map(|entry| &entry.code).collect();

        let candidates: Vec<InstrumentCode> = generate_codes(sources)
            .into_iter()
            .filter(|code| !known.contains(code))
            .collect();

        tracing::info!(candidates = candidates.len(), "probing instrument universe");
        let snapshots = self.fetch_all(&candidates).await;

        let mut entries = indices.clone();
        entries.extend(
            snapshots
                .into_iter()
                .map(|snapshot| UniverseEntry::new(snapshot.code, snapshot.name)),
        );

        let universe = Universe::new(entries);
        tracing::info!(entries = universe.len(), "instrument universe discovered");
        universe
    }
}

impl std::fmt::Debug for QuoteFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuoteFetcher")
            .field("pacer", &self.pacer)
            .field("config", &self.config)
            .finish()
    }
}
