use serde_json::Value;
use zrpc_http::{ClientConfig, HttpClient};

use crate::cmd::{parse_duration, read_json_input, runtime, CallArgs};
use crate::exit::{http_error, rpc_error, CliResult, SUCCESS};
use crate::output::{print_value, OutputFormat};

pub fn run(args: CallArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let input = read_json_input(args.json.as_deref(), args.file.as_deref())?.unwrap_or(Value::Null);

    let config = ClientConfig {
        timeout: Some(timeout),
        ..ClientConfig::default()
    };
    let client = HttpClient::connect_with_config(&args.url, &config)
        .map_err(|err| http_error("invalid endpoint", err))?;

    tracing::debug!(url = %client.url(), method = %args.method, "calling");
    let value = runtime()?
        .block_on(client.call_value(&args.method, input))
        .map_err(|err| rpc_error(&format!("call to {} failed", args.method), err))?;

    print_value(&value, format);
    Ok(SUCCESS)
}
