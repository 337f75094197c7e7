mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::LogArgs;
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "zrpc", version, about = "Schema-validated RPC over HTTP")]
struct Cli {
    /// Output format. Defaults to table on a terminal and json otherwise.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    #[command(flatten)]
    log: LogArgs,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    cli.log.init();

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    match cmd::run(cli.command, format) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogFormat, LogLevel};

    #[test]
    fn parses_call_subcommand() {
        let cli = Cli::try_parse_from([
            "zrpc",
            "call",
            "double",
            "--url",
            "http://127.0.0.1:9000/",
            "--json",
            "3",
            "--timeout",
            "2s",
        ])
        .expect("call args should parse");

        match cli.command {
            Command::Call(args) => {
                assert_eq!(args.method, "double");
                assert_eq!(args.url, "http://127.0.0.1:9000/");
                assert_eq!(args.json.as_deref(), Some("3"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_conflicting_input_args() {
        let err = Cli::try_parse_from([
            "zrpc",
            "call",
            "double",
            "--json",
            "3",
            "--file",
            "input.json",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn check_requires_a_value() {
        let err = Cli::try_parse_from(["zrpc", "check", "--schema", "s.json"])
            .expect_err("missing value should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn parses_serve_with_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "zrpc",
            "serve",
            "--port",
            "0",
            "--cors",
            "--format",
            "json",
            "--log-level",
            "debug",
        ])
        .expect("serve args should parse");

        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert_eq!(cli.log.log_level, LogLevel::Debug);
        assert_eq!(cli.log.log_format, LogFormat::Text);
        match cli.command {
            Command::Serve(args) => {
                assert_eq!(args.port, 0);
                assert!(args.cors);
                assert_eq!(args.path, "/");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
