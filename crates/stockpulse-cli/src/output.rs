//! Rendering of command results to stdout.

use std::io::{self, Write};

use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::commands::CommandResult;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct Meta<'a> {
    latency_ms: u64,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    warnings: &'a [String],
}

#[derive(Debug, Serialize)]
struct Envelope<'a> {
    meta: Meta<'a>,
    data: &'a Value,
}

pub fn render(result: &CommandResult, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_result(&mut out, result, format, pretty)?;
    out.flush()?;

    if format != OutputFormat::Json {
        for warning in &result.warnings {
            eprintln!("warning: {warning}");
        }
    }
    Ok(())
}

pub fn write_result(
    out: &mut impl Write,
    result: &CommandResult,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let envelope = Envelope {
                meta: Meta {
                    latency_ms: result.latency_ms,
                    warnings: &result.warnings,
                },
                data: &result.data,
            };
            if pretty {
                serde_json::to_writer_pretty(&mut *out, &envelope)?;
            } else {
                serde_json::to_writer(&mut *out, &envelope)?;
            }
            writeln!(out)?;
        }
        OutputFormat::Ndjson => {
            for record in &result.records {
                serde_json::to_writer(&mut *out, record)?;
                writeln!(out)?;
            }
        }
        OutputFormat::Table => write_table(out, result.columns, &result.records)?,
    }
    Ok(())
}

fn write_table(out: &mut impl Write, columns: &[&str], records: &[Value]) -> io::Result<()> {
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| columns.iter().map(|column| cell(&record[*column])).collect())
        .collect();

    let mut widths: Vec<usize> = columns.iter().map(|column| display_width(column)).collect();
    for row in &rows {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(value));
        }
    }

    let header: Vec<String> = columns.iter().map(|column| column.to_string()).collect();
    write_row(out, &header, &widths)?;
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    write_row(out, &rule, &widths)?;
    for row in &rows {
        write_row(out, row, &widths)?;
    }
    Ok(())
}

fn write_row(out: &mut impl Write, cells: &[String], widths: &[usize]) -> io::Result<()> {
    let mut line = String::new();
    for (index, (value, width)) in cells.iter().zip(widths).enumerate() {
        if index > 0 {
            line.push_str("  ");
        }
        line.push_str(value);
        if index + 1 < cells.len() {
            line.push_str(&" ".repeat(width - display_width(value)));
        }
    }
    writeln!(out, "{line}")
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::String(text) => text.clone(),
        Value::Number(number) => match number.as_f64() {
            Some(float) if number.is_f64() => format!("{float:.2}"),
            _ => number.to_string(),
        },
        other => other.to_string(),
    }
}

/// Terminal column width; CJK characters take two cells.
fn display_width(text: &str) -> usize {
    text.chars()
        .map(|ch| if is_wide(ch) { 2 } else { 1 })
        .sum()
}

fn is_wide(ch: char) -> bool {
    matches!(
        ch,
        '\u{1100}'..='\u{115f}'
            | '\u{2e80}'..='\u{a4cf}'
            | '\u{ac00}'..='\u{d7a3}'
            | '\u{f900}'..='\u{faff}'
            | '\u{fe30}'..='\u{fe4f}'
            | '\u{ff00}'..='\u{ff60}'
            | '\u{ffe0}'..='\u{ffe6}'
    )
}
