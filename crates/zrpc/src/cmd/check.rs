use serde::Serialize;
use serde_json::Value;
use zrpc_schema::{Schema, SchemaConfig, SchemaError};

use crate::cmd::{read_json_input, CheckArgs};
use crate::exit::{schema_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_json, table, OutputFormat};

#[derive(Debug, Serialize)]
struct CheckReport {
    schema: String,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn run(args: CheckArgs, format: OutputFormat) -> CliResult<i32> {
    let config = SchemaConfig {
        strict_mode: args.strict,
        ..SchemaConfig::default()
    };
    let schema = Schema::<Value>::from_file_with_config(&args.schema, &config)
        .map_err(|err| schema_error("schema load failed", err))?;
    let value = read_json_input(args.json.as_deref(), args.file.as_deref())?
        .ok_or_else(|| CliError::new(USAGE, "one of --json or --file is required"))?;

    let report = check(&schema, &value, args.schema.display().to_string());
    print_report(&report, format);

    Ok(if report.valid { SUCCESS } else { DATA_INVALID })
}

fn check(schema: &Schema<Value>, value: &Value, schema_name: String) -> CheckReport {
    match schema.validate(value) {
        Ok(()) => CheckReport {
            schema: schema_name,
            valid: true,
            error: None,
        },
        Err(SchemaError::ValidationFailed { message }) => CheckReport {
            schema: schema_name,
            valid: false,
            error: Some(message),
        },
        Err(other) => CheckReport {
            schema: schema_name,
            valid: false,
            error: Some(other.to_string()),
        },
    }
}

fn print_report(report: &CheckReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table => {
            let mut out = table(&["SCHEMA", "VALID", "ERROR"]);
            out.add_row(vec![
                report.schema.clone(),
                report.valid.to_string(),
                report.error.clone().unwrap_or_default(),
            ]);
            println!("{out}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => match &report.error {
            None => println!("valid"),
            Some(error) => println!("invalid: {error}"),
        },
    }
}
