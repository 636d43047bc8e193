//! Shared test doubles for the integration suites.
#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use stockpulse_core::{
    FetchConfig, HttpClient, HttpError, HttpRequest, HttpResponse, InstrumentCode, QuoteFetcher,
};

type Responder = dyn Fn(&HttpRequest) -> Result<HttpResponse, HttpError> + Send + Sync;

/// In-memory transport answering from a closure and recording every request.
pub struct ScriptedHttpClient {
    responder: Box<Responder>,
    requests: Mutex<Vec<HttpRequest>>,
    delay: Duration,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedHttpClient {
    pub fn new(
        responder: impl Fn(&HttpRequest) -> Result<HttpResponse, HttpError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Self::with_delay(Duration::ZERO, responder)
    }

    pub fn with_delay(
        delay: Duration,
        responder: impl Fn(&HttpRequest) -> Result<HttpResponse, HttpError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
            delay,
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("request log lock").clone()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

            self.requests
                .lock()
                .expect("request log lock")
                .push(request.clone());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let response = (self.responder)(&request);

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            response
        })
    }
}

/// Vendor codes listed in a batch URL (`...list=a,b,c` or `...q=a,b,c`).
pub fn requested_codes(request: &HttpRequest) -> Vec<String> {
    request
        .url
        .rsplit('=')
        .next()
        .unwrap_or_default()
        .split(',')
        .filter(|code| !code.is_empty())
        .map(str::to_owned)
        .collect()
}

/// One Sina reply line with the given positional fields set.
pub fn sina_line(code: &str, fields: &[(usize, &str)]) -> String {
    let mut values = vec![""; 33];
    for (index, value) in fields {
        values[*index] = value;
    }
    format!("var hq_str_{code}=\"{}\";\n", values.join(","))
}

/// One Tencent reply assignment with the given positional fields set.
pub fn tencent_record(key: &str, fields: &[(usize, &str)]) -> String {
    let mut values = vec![""; 50];
    for (index, value) in fields {
        values[*index] = value;
    }
    format!("v_{key}=\"{}\";\n", values.join("~"))
}

/// Sina reply line for a generic instrument named after its code.
pub fn sina_stub(code: &str) -> String {
    let name = format!("股票{code}");
    sina_line(
        code,
        &[
            (0, &name),
            (1, "10.00"),
            (2, "10.00"),
            (3, "10.10"),
            (4, "10.20"),
            (5, "9.90"),
            (8, "100000"),
            (9, "1010000"),
        ],
    )
}

/// Tencent reply assignment for a generic instrument named after its key.
pub fn tencent_stub(key: &str) -> String {
    let name = format!("证券{key}");
    tencent_record(key, &[(1, &name), (3, "20.00"), (4, "19.50"), (6, "1000")])
}

pub fn codes(raw: &[&str]) -> Vec<InstrumentCode> {
    raw.iter()
        .map(|code| InstrumentCode::parse(code).expect("valid code"))
        .collect()
}

pub fn quiet_config() -> FetchConfig {
    FetchConfig::default().with_max_jitter_ms(0)
}

pub fn fetcher(client: Arc<ScriptedHttpClient>, config: FetchConfig) -> QuoteFetcher {
    QuoteFetcher::with_http_client(client, config)
}
