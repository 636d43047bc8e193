use serde::Serialize;
use serde_json::Value;

use stockpulse_core::{canonicalize_all, InstrumentCode, QuoteSnapshot, Universe};

use crate::cli::QuoteArgs;
use crate::error::CliError;

use super::{needs_universe, CommandResult, Context};

pub const COLUMNS: &[&str] = &[
    "code",
    "name",
    "price",
    "change",
    "change_percent",
    "open",
    "high",
    "low",
    "volume",
    "turnover",
    "update_time",
];

#[derive(Debug, Serialize)]
struct QuoteResponseData {
    requested: Vec<String>,
    quotes: Vec<QuoteSnapshot>,
    unresolved: Vec<String>,
}

pub async fn run(args: &QuoteArgs, context: &Context) -> Result<CommandResult, CliError> {
    let universe = if needs_universe(&args.inputs) {
        context.universe().await
    } else {
        Universe::unloaded()
    };

    let resolved = canonicalize_all(&args.inputs, &universe);
    let mut warnings: Vec<String> = resolved
        .unresolved
        .iter()
        .map(|input| format!("could not resolve '{input}'"))
        .collect();

    let mut codes = Vec::with_capacity(resolved.codes.len());
    for raw in &resolved.codes {
        match InstrumentCode::parse(raw) {
            Ok(code) => codes.push(code),
            Err(error) => warnings.push(format!("skipping '{raw}': {error}")),
        }
    }

    if codes.is_empty() {
        return Err(CliError::Command(String::from(
            "no valid instrument codes in input",
        )));
    }

    // Mainland codes go to the configured vendor, overseas codes to Tencent.
    let quotes = context.fetcher.fetch_all(&codes).await;

    if quotes.is_empty() {
        return Err(CliError::NoQuotes {
            requested: codes.len(),
        });
    }

    let missing: Vec<&str> = codes
        .iter()
        .filter(|code| !quotes.iter().any(|quote| &quote.code == *code))
        .map(InstrumentCode::as_str)
        .collect();
    if !missing.is_empty() {
        warnings.push(format!("no quote returned for {}", missing.join(", ")));
    }

    let records = quotes
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<Value>, _>>()?;
    let data = serde_json::to_value(QuoteResponseData {
        requested: resolved.codes,
        quotes,
        unresolved: resolved.unresolved,
    })?;

    Ok(CommandResult::ok(data)
        .with_records(COLUMNS, records)
        .with_warnings(warnings))
}
