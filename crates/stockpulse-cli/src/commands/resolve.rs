use serde_json::{json, Value};

use stockpulse_core::{canonicalize, canonicalize_all, Resolution, Universe};

use crate::cli::ResolveArgs;
use crate::error::CliError;

use super::{needs_universe, CommandResult, Context};

const COLUMNS: &[&str] = &["input", "code", "status"];

pub async fn run(args: &ResolveArgs, context: &Context) -> Result<CommandResult, CliError> {
    let universe = if needs_universe(&args.inputs) {
        context.universe().await
    } else {
        Universe::unloaded()
    };

    let mut warnings = Vec::new();
    let records: Vec<Value> = args
        .inputs
        .iter()
        .filter_map(|input| {
            let resolution = canonicalize(input, &universe)?;
            Some(match resolution {
                Resolution::Code(code) => json!({ "input": input, "code": code, "status": "resolved" }),
                Resolution::Passthrough(raw) => {
                    warnings.push(format!("'{raw}' is not a recognized code shape"));
                    json!({ "input": input, "code": raw, "status": "passthrough" })
                }
                Resolution::Unresolved(raw) => {
                    warnings.push(format!("could not resolve '{raw}'"));
                    json!({ "input": input, "code": Value::Null, "status": "unresolved" })
                }
            })
        })
        .collect();

    let summary = canonicalize_all(&args.inputs, &universe);
    let data = json!({
        "codes": summary.codes,
        "unresolved": summary.unresolved,
        "inputs": records,
    });

    Ok(CommandResult::ok(data)
        .with_records(COLUMNS, records)
        .with_warnings(warnings))
}
