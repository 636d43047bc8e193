use serde::Serialize;
use serde_json::Value;

use stockpulse_core::{search_universe, UniverseEntry};

use crate::cli::SearchArgs;
use crate::error::CliError;

use super::{CommandResult, Context};

const COLUMNS: &[&str] = &["code", "name", "number"];

#[derive(Debug, Serialize)]
struct SearchResponseData<'a> {
    query: &'a str,
    results: Vec<&'a UniverseEntry>,
}

pub async fn run(args: &SearchArgs, context: &Context) -> Result<CommandResult, CliError> {
    if args.limit == 0 {
        return Err(CliError::Command(String::from(
            "--limit must be greater than zero",
        )));
    }

    let query = args.query.trim();
    if query.is_empty() {
        return Err(CliError::Command(String::from("query must not be empty")));
    }

    let universe = context.universe().await;
    let results = search_universe(&universe, query, args.limit);

    let mut warnings = Vec::new();
    if universe.is_empty() {
        warnings.push(String::from("instrument universe is empty"));
    }

    let records = results
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<Value>, _>>()?;
    let data = serde_json::to_value(SearchResponseData { query, results })?;

    Ok(CommandResult::ok(data)
        .with_records(COLUMNS, records)
        .with_warnings(warnings))
}
