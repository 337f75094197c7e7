use zrpc::demo::demo_api;
use zrpc::MethodDescription;

use crate::cmd::MethodsArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{cell, print_json, table, OutputFormat};

pub fn run(_args: MethodsArgs, format: OutputFormat) -> CliResult<i32> {
    let methods = demo_api().descriptions();
    print_methods(&methods, format);
    Ok(SUCCESS)
}

fn print_methods(methods: &[MethodDescription], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({ "methods": methods })),
        OutputFormat::Table => {
            let mut out = table(&["METHOD", "INPUT", "OUTPUT"]);
            for method in methods {
                out.add_row(vec![
                    method.name.clone(),
                    cell(&method.input),
                    cell(&method.output),
                ]);
            }
            println!("{out}");
        }
        OutputFormat::Pretty => {
            for method in methods {
                println!("{}", method.name);
                println!("  input:  {}", method.input);
                println!("  output: {}", method.output);
            }
        }
        OutputFormat::Raw => {
            for method in methods {
                println!("{}", method.name);
            }
        }
    }
}
