//! The demo API served by `zrpc serve`.
//!
//! | method   | input                               | output  |
//! |----------|-------------------------------------|---------|
//! | `double` | number                              | number  |
//! | `echo`   | any JSON value                      | same    |
//! | `greet`  | `{ "name": string, "greeting"?: string }` | string |
//! | `fail`   | string                              | never returns; the string becomes the handler error |

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use zrpc_core::{define_method, Api, HandlerError, Method, MethodHandle};
use zrpc_schema::{any, number, string, Schema};

/// Input of the `greet` method.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Greeting {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
}

fn greeting_schema() -> Schema<Greeting> {
    Schema::new(json!({
        "type": "object",
        "properties": {
            "name": {"type": "string", "minLength": 1},
            "greeting": {"type": "string"}
        },
        "required": ["name"],
        "additionalProperties": false
    }))
    .expect("greeting schema should compile")
}

/// The demo API together with typed handles for its methods.
#[derive(Debug, Clone)]
pub struct Demo {
    pub api: Api,
    pub double: MethodHandle<f64, f64>,
    pub echo: MethodHandle<Value, Value>,
    pub greet: MethodHandle<Greeting, String>,
    pub fail: MethodHandle<String, Value>,
}

/// Build the demo API and its handles.
pub fn demo() -> Demo {
    let mut builder = Api::builder();
    let double = builder.register("double", Method::sync(number(), number(), |x| Ok(x * 2.0)));
    let echo = builder.register("echo", Method::sync(any(), any(), Ok));
    let greet = builder.register(
        "greet",
        define_method(greeting_schema(), string(), |input: Greeting| async move {
            let greeting = input.greeting.as_deref().unwrap_or("Hello");
            Ok(format!("{greeting}, {}!", input.name))
        }),
    );
    let fail = builder.register(
        "fail",
        Method::sync(string(), any(), |message: String| {
            Err::<Value, _>(HandlerError::msg(message))
        }),
    );

    Demo {
        api: builder.build().expect("demo method names should be unique"),
        double,
        echo,
        greet,
        fail,
    }
}

/// Build the demo API without its handles.
pub fn demo_api() -> Api {
    demo().api
}
