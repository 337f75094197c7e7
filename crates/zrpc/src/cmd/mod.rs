use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Subcommand};
use serde_json::Value;
use zrpc_http::DEFAULT_MAX_BODY_SIZE;

use crate::exit::{io_error, CliError, CliResult, INTERNAL, USAGE};
use crate::output::OutputFormat;

pub mod call;
pub mod check;
pub mod methods;
pub mod serve;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the demo API over HTTP until interrupted.
    Serve(ServeArgs),
    /// Call one method on a remote API and print the result.
    Call(CallArgs),
    /// List the demo API methods and their schemas.
    Methods(MethodsArgs),
    /// Validate a JSON value against a schema file.
    Check(CheckArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Serve(args) => serve::run(args, format),
        Command::Call(args) => call::run(args, format),
        Command::Methods(args) => methods::run(args, format),
        Command::Check(args) => check::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Interface to bind.
    #[arg(long, env = "ZRPC_HOST", default_value = "127.0.0.1")]
    pub host: String,
    /// Port to bind; 0 picks a free port.
    #[arg(long, env = "ZRPC_PORT", default_value_t = 8080)]
    pub port: u16,
    /// Endpoint path.
    #[arg(long, default_value = "/")]
    pub path: String,
    /// Allow cross-origin requests from any origin.
    #[arg(long)]
    pub cors: bool,
    /// Maximum request body size in bytes.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_BODY_SIZE)]
    pub max_body_size: usize,
}

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Method name.
    pub method: String,
    /// Endpoint URL.
    #[arg(long, env = "ZRPC_URL", default_value = "http://127.0.0.1:8080/")]
    pub url: String,
    /// JSON input. Defaults to null when neither --json nor --file is given.
    #[arg(long, conflicts_with = "file")]
    pub json: Option<String>,
    /// Read JSON input from a file.
    #[arg(long, conflicts_with = "json")]
    pub file: Option<PathBuf>,
    /// Request timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "30s")]
    pub timeout: String,
}

#[derive(Args, Debug, Default)]
pub struct MethodsArgs {}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// JSON Schema file.
    #[arg(long, value_name = "FILE")]
    pub schema: PathBuf,
    /// JSON value to validate.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub json: Option<String>,
    /// Read the JSON value from a file.
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Reject object properties the schema does not declare.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Current-thread runtime for commands that do network I/O.
pub fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| CliError::new(INTERNAL, format!("failed to start runtime: {err}")))
}

/// Resolve a `--json` / `--file` pair into a JSON value.
pub fn read_json_input(json: Option<&str>, file: Option<&Path>) -> CliResult<Option<Value>> {
    if let Some(text) = json {
        return serde_json::from_str(text)
            .map(Some)
            .map_err(|err| CliError::new(USAGE, format!("--json is not valid JSON: {err}")));
    }
    if let Some(path) = file {
        let bytes = std::fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
        return serde_json::from_slice(&bytes).map(Some).map_err(|err| {
            CliError::new(
                USAGE,
                format!("{} is not valid JSON: {err}", path.display()),
            )
        });
    }
    Ok(None)
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = match input.strip_suffix("ms") {
        Some(number) => (number, true),
        None => (input.strip_suffix('s').unwrap_or(input), false),
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
