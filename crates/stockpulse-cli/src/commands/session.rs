use serde_json::json;
use time::format_description::well_known::Rfc3339;

use stockpulse_core::session::{exchange_now, is_session_open_at, parse_vendor_timestamp};

use crate::cli::SessionArgs;
use crate::error::CliError;

use super::CommandResult;

const COLUMNS: &[&str] = &["exchange_time", "timestamp", "mode", "open"];

pub fn run(args: &SessionArgs) -> Result<CommandResult, CliError> {
    let now = exchange_now();
    let timestamp = args.timestamp.as_deref().map(str::trim).filter(|raw| !raw.is_empty());

    let mut warnings = Vec::new();
    let mode = match timestamp {
        Some(raw) if parse_vendor_timestamp(raw).is_some() => "vendor_timestamp",
        Some(raw) => {
            warnings.push(format!("unparsable timestamp '{raw}'; using wall clock"));
            "wall_clock"
        }
        None => "wall_clock",
    };

    let open = is_session_open_at(timestamp, now);
    let exchange_time = now
        .format(&Rfc3339)
        .map_err(|error| CliError::Command(error.to_string()))?;

    let record = json!({
        "exchange_time": exchange_time,
        "timestamp": timestamp,
        "mode": mode,
        "open": open,
    });

    Ok(CommandResult::ok(record.clone())
        .with_records(COLUMNS, vec![record])
        .with_warnings(warnings))
}
