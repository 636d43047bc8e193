//! Behavior-driven tests for universe discovery and its on-disk cache

mod support;

use std::time::Duration;

use stockpulse_core::{
    load_or_discover, CodeRange, CodeSource, HttpError, HttpResponse, Market, Universe,
    UniverseCache,
};
use support::{fetcher, quiet_config, requested_codes, sina_line, sina_stub, ScriptedHttpClient};
use time::OffsetDateTime;

fn sources() -> Vec<CodeSource> {
    vec![
        CodeSource::Range(CodeRange::new("sz-test", Market::Shenzhen, 1, 3)),
        CodeSource::List {
            label: String::from("extra"),
            codes: vec![String::from("sh600000"), String::from("not a code")],
        },
    ]
}

/// Answers every code except `sz000003`, which the vendor does not know.
fn vendor() -> std::sync::Arc<ScriptedHttpClient> {
    ScriptedHttpClient::new(|request| {
        let body: String = requested_codes(request)
            .iter()
            .map(|code| {
                if code == "sz000003" {
                    sina_line(code, &[(0, "FAILED")])
                } else {
                    sina_stub(code)
                }
            })
            .collect();
        Ok(HttpResponse::new(200, body))
    })
}

fn offline() -> std::sync::Arc<ScriptedHttpClient> {
    ScriptedHttpClient::new(|_| Err(HttpError::new("network disabled in test")))
}

#[tokio::test]
async fn when_no_cache_exists_universe_is_discovered_and_saved() {
    // Given: An empty cache directory
    let dir = tempfile::tempdir().expect("temp dir");
    let cache = UniverseCache::in_dir(dir.path()).with_min_entries(2);
    let client = vendor();
    let fetcher = fetcher(client.clone(), quiet_config());

    // When: The universe is requested
    let universe = load_or_discover(&cache, &fetcher, &sources()).await;

    // Then: Answering instruments and built-in indices are present
    let index_count = Universe::index_entries().len();
    assert!(universe.is_loaded());
    assert_eq!(universe.len(), index_count + 3);
    let names = universe.names();
    let pingan = stockpulse_core::InstrumentCode::parse("sz000001").expect("valid");
    assert_eq!(names.get(&pingan).copied(), Some("股票sz000001"));
    assert!(universe
        .entries()
        .iter()
        .all(|entry| entry.code.as_str() != "sz000003"));

    // And: The cache file was written
    assert!(cache.path().exists());
    assert!(!client.requests().is_empty());
}

#[tokio::test]
async fn when_cache_is_fresh_no_request_is_made() {
    // Given: A universe discovered once
    let dir = tempfile::tempdir().expect("temp dir");
    let cache = UniverseCache::in_dir(dir.path()).with_min_entries(2);
    let first = load_or_discover(&cache, &fetcher(vendor(), quiet_config()), &sources()).await;

    // When: It is requested again with the network down
    let client = offline();
    let second = load_or_discover(&cache, &fetcher(client.clone(), quiet_config()), &sources()).await;

    // Then: The cached copy is served without contacting the vendor
    assert_eq!(second.entries(), first.entries());
    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn when_cache_is_stale_it_is_discarded() {
    // Given: A cache saved two days ago
    let dir = tempfile::tempdir().expect("temp dir");
    let cache = UniverseCache::in_dir(dir.path())
        .with_min_entries(1)
        .with_ttl(Duration::from_secs(24 * 60 * 60));
    let saved = Universe::new(Universe::index_entries());
    let two_days_ago = OffsetDateTime::now_utc() - time::Duration::days(2);
    cache.save_at(&saved, two_days_ago).expect("save succeeds");

    // When: Loading
    let loaded = cache.load().expect("load succeeds");

    // Then: Nothing usable is reported
    assert!(loaded.is_none());
}

#[tokio::test]
async fn when_cache_file_is_corrupt_discovery_takes_over() {
    // Given: A cache file that is not JSON
    let dir = tempfile::tempdir().expect("temp dir");
    let cache = UniverseCache::in_dir(dir.path()).with_min_entries(2);
    std::fs::write(cache.path(), b"{ not json").expect("write corrupt cache");

    // When: The universe is requested
    let universe = load_or_discover(&cache, &fetcher(vendor(), quiet_config()), &sources()).await;

    // Then: A fresh discovery replaced it
    assert!(universe.len() > Universe::index_entries().len());
    assert!(cache.load().expect("load succeeds").is_some());
}

#[tokio::test]
async fn when_discovery_is_undersized_it_is_not_cached() {
    // Given: A vendor that is down and a cache demanding many entries
    let dir = tempfile::tempdir().expect("temp dir");
    let cache = UniverseCache::in_dir(dir.path()).with_min_entries(1_000);

    // When: The universe is requested
    let universe = load_or_discover(&cache, &fetcher(offline(), quiet_config()), &sources()).await;

    // Then: Only built-in indices are known and nothing was written
    assert_eq!(universe.len(), Universe::index_entries().len());
    assert!(!cache.path().exists());
}

#[tokio::test]
async fn when_refresh_runs_offline_the_good_cache_is_kept() {
    // Given: A complete universe already cached
    let dir = tempfile::tempdir().expect("temp dir");
    let cache =
        UniverseCache::in_dir(dir.path()).with_min_entries(Universe::index_entries().len() + 1);
    let good = load_or_discover(&cache, &fetcher(vendor(), quiet_config()), &sources()).await;
    assert!(cache.load().expect("load succeeds").is_some());

    // When: A forced rediscovery only gets the built-in indices back
    let stub = fetcher(offline(), quiet_config())
        .discover_universe(&sources())
        .await;
    let written = cache.save_if_complete(&stub).expect("save succeeds");

    // Then: The stub is not written and the good cache still loads
    assert_eq!(stub.len(), Universe::index_entries().len());
    assert!(!written);
    let reloaded = cache.load().expect("load succeeds").expect("cache still usable");
    assert_eq!(reloaded.entries(), good.entries());
}

#[test]
fn when_cache_is_cleared_the_file_is_gone() {
    let dir = tempfile::tempdir().expect("temp dir");
    let cache = UniverseCache::in_dir(dir.path()).with_min_entries(1);
    cache
        .save(&Universe::new(Universe::index_entries()))
        .expect("save succeeds");
    assert!(cache.load().expect("load succeeds").is_some());

    cache.clear().expect("clear succeeds");
    cache.clear().expect("clearing twice is fine");
    assert!(cache.load().expect("load succeeds").is_none());
}
