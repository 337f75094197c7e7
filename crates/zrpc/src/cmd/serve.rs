use serde::Serialize;
use zrpc::demo::demo_api;
use zrpc_http::{HttpServer, ServerConfig};

use crate::cmd::{runtime, ServeArgs};
use crate::exit::{http_error, CliError, CliResult, SUCCESS};
use crate::output::{print_json, table, OutputFormat};

#[derive(Serialize)]
struct Listening<'a> {
    url: &'a str,
    methods: Vec<&'a str>,
}

pub fn run(args: ServeArgs, format: OutputFormat) -> CliResult<i32> {
    let api = demo_api();
    let config = ServerConfig {
        path: args.path,
        max_body_size: args.max_body_size,
        cors: args.cors,
    };
    let addr = format!("{}:{}", args.host, args.port);

    runtime()?.block_on(async move {
        let server = HttpServer::bind(&addr, api.clone(), &config)
            .await
            .map_err(|err| http_error("bind failed", err))?;

        print_listening(
            &Listening {
                url: &server.url(),
                methods: api.names().collect(),
            },
            format,
        );

        server
            .serve_with_shutdown(shutdown_signal())
            .await
            .map_err(|err| http_error("server failed", err))?;
        Ok::<_, CliError>(SUCCESS)
    })
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown requested"),
        Err(err) => {
            tracing::warn!(error = %err, "ctrl-c handler unavailable; serving until killed");
            std::future::pending::<()>().await;
        }
    }
}

fn print_listening(listening: &Listening<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(listening),
        OutputFormat::Table => {
            let mut out = table(&["URL", "METHODS"]);
            out.add_row(vec![listening.url.to_string(), listening.methods.join(", ")]);
            println!("{out}");
        }
        OutputFormat::Pretty => {
            println!("listening on {}", listening.url);
            println!("methods: {}", listening.methods.join(", "));
        }
        OutputFormat::Raw => println!("{}", listening.url),
    }
}
