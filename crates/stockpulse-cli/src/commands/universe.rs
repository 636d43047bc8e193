use serde_json::{json, Value};

use stockpulse_core::universe::default_sources;
use stockpulse_core::Market;

use crate::cli::UniverseArgs;
use crate::error::CliError;

use super::{CommandResult, Context};

const SUMMARY_COLUMNS: &[&str] = &["market", "entries"];
const ENTRY_COLUMNS: &[&str] = &["code", "name", "number"];

pub async fn run(args: &UniverseArgs, context: &Context) -> Result<CommandResult, CliError> {
    let mut warnings = Vec::new();

    let universe = if args.refresh {
        let universe = context.fetcher.discover_universe(&default_sources()).await;
        if !context.cache.save_if_complete(&universe)? {
            warnings.push(format!(
                "discovery found {} instruments, below the cache minimum of {}; cache left untouched",
                universe.len(),
                context.cache.min_entries()
            ));
        }
        universe
    } else {
        context.universe().await
    };

    let by_market: Vec<Value> = Market::ALL
        .iter()
        .map(|market| {
            let entries = universe
                .entries()
                .iter()
                .filter(|entry| entry.code.market() == *market)
                .count();
            json!({ "market": market, "entries": entries })
        })
        .collect();

    let mut data = json!({
        "cache_path": context.cache.path().display().to_string(),
        "entries": universe.len(),
        "markets": by_market,
    });

    let result = if args.entries {
        let records = universe
            .entries()
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<Value>, _>>()?;
        data["instruments"] = Value::Array(records.clone());
        CommandResult::ok(data).with_records(ENTRY_COLUMNS, records)
    } else {
        CommandResult::ok(data).with_records(SUMMARY_COLUMNS, by_market)
    };

    Ok(result.with_warnings(warnings))
}
