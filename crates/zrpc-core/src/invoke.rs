//! The invocation engine: validate input, run the handler once, validate output.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{HandlerError, Result, RpcError, ValidationPhase};
use crate::method::Method;

/// Invoke a method on raw JSON input and return its validated output.
///
/// Fails with a validation error when the input does not satisfy the input
/// schema (the handler is not called), with a handler error when the handler
/// fails or panics, and with a validation error when the handler's result
/// does not satisfy the output schema.
pub async fn invoke<I, O>(method: &Method<I, O>, raw_input: Value) -> Result<O>
where
    I: DeserializeOwned + Send + 'static,
    O: Serialize + Send + 'static,
{
    invoke_encoded(method, raw_input)
        .await
        .map(|(output, _)| output)
}

/// Like [`invoke`], also returning the validated JSON encoding of the output.
pub(crate) async fn invoke_encoded<I, O>(method: &Method<I, O>, raw_input: Value) -> Result<(O, Value)>
where
    I: DeserializeOwned + Send + 'static,
    O: Serialize + Send + 'static,
{
    let input = method
        .input()
        .parse(raw_input)
        .map_err(|source| RpcError::Validation {
            phase: ValidationPhase::Input,
            source,
        })?;

    let output = run_handler(method, input).await?;

    let encoded = method
        .output()
        .encode(&output)
        .map_err(|source| RpcError::Validation {
            phase: ValidationPhase::Output,
            source,
        })?;

    Ok((output, encoded))
}

async fn run_handler<I, O>(method: &Method<I, O>, input: I) -> Result<O> {
    let pending = std::panic::catch_unwind(AssertUnwindSafe(|| method.start(input)))
        .map_err(|panic| RpcError::Handler(panic_error(panic)))?;

    match AssertUnwindSafe(pending).catch_unwind().await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(err)) => Err(RpcError::Handler(err)),
        Err(panic) => Err(RpcError::Handler(panic_error(panic))),
    }
}

fn panic_error(panic: Box<dyn Any + Send>) -> HandlerError {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|detail| detail.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    tracing::error!(%detail, "method handler panicked");
    HandlerError::msg(format!("handler panicked: {detail}"))
}
