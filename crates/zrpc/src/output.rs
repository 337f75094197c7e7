use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Print a value returned by a call.
pub fn print_value(value: &Value, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Pretty => {
            println!(
                "{}",
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            );
        }
        OutputFormat::Table => println!("{}", value_table(value)),
        OutputFormat::Raw => match value {
            Value::String(text) => print_raw(text.as_bytes()),
            other => print_raw(other.to_string().as_bytes()),
        },
    }
}

/// Print any serializable report as one line of JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

pub fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

/// Objects become one row per field; anything else is a single row.
fn value_table(value: &Value) -> Table {
    match value {
        Value::Object(map) => {
            let mut out = table(&["FIELD", "VALUE"]);
            for (key, field) in map {
                out.add_row(vec![key.clone(), cell(field)]);
            }
            out
        }
        other => {
            let mut out = table(&["RESULT"]);
            out.add_row(vec![cell(other)]);
            out
        }
    }
}

/// Strings print without quotes; everything else as compact JSON.
pub fn cell(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
