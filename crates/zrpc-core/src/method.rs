use std::future::Future;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use zrpc_schema::Schema;

use crate::error::{HandlerError, Result};
use crate::invoke::invoke_encoded;

/// Eventual result of a handler.
pub type HandlerFuture<O> = BoxFuture<'static, std::result::Result<O, HandlerError>>;

type HandlerFn<I, O> = dyn Fn(I) -> HandlerFuture<O> + Send + Sync;

/// A callable operation: input schema, output schema, handler.
///
/// Immutable once constructed; clones share the schemas and handler.
pub struct Method<I, O> {
    input: Schema<I>,
    output: Schema<O>,
    handler: Arc<HandlerFn<I, O>>,
}

impl<I, O> Method<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    /// Define a method with an asynchronous handler.
    pub fn new<F, Fut>(input: Schema<I>, output: Schema<O>, handler: F) -> Self
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<O, HandlerError>> + Send + 'static,
    {
        Self {
            input,
            output,
            handler: Arc::new(move |input| handler(input).boxed()),
        }
    }

    /// Define a method with a synchronous handler.
    ///
    /// The handler's result is wrapped in an already-resolved future, so the
    /// invocation engine treats both kinds the same way.
    pub fn sync<F>(input: Schema<I>, output: Schema<O>, handler: F) -> Self
    where
        F: Fn(I) -> std::result::Result<O, HandlerError> + Send + Sync + 'static,
    {
        Self {
            input,
            output,
            handler: Arc::new(move |input| future::ready(handler(input)).boxed()),
        }
    }
}

impl<I, O> Method<I, O> {
    pub fn input(&self) -> &Schema<I> {
        &self.input
    }

    pub fn output(&self) -> &Schema<O> {
        &self.output
    }

    pub(crate) fn start(&self, input: I) -> HandlerFuture<O> {
        (self.handler)(input)
    }
}

impl<I, O> Method<I, O>
where
    I: DeserializeOwned + Send + 'static,
    O: Serialize + Send + 'static,
{
    /// Type-erase the method for storage in an [`Api`](crate::Api).
    pub fn erase(self) -> Arc<dyn DynMethod> {
        Arc::new(self)
    }
}

impl<I, O> Clone for Method<I, O> {
    fn clone(&self) -> Self {
        Self {
            input: self.input.clone(),
            output: self.output.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<I, O> std::fmt::Debug for Method<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Method")
            .field("input", &self.input)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

/// Define a method with an asynchronous handler.
pub fn define_method<I, O, F, Fut>(input: Schema<I>, output: Schema<O>, handler: F) -> Method<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<O, HandlerError>> + Send + 'static,
{
    Method::new(input, output, handler)
}

/// A method with its Rust types erased: JSON in, validated JSON out.
pub trait DynMethod: Send + Sync {
    /// Validate input, run the handler, validate output.
    fn invoke_value(&self, input: Value) -> BoxFuture<'static, Result<Value>>;

    /// JSON Schema document for the input.
    fn input_schema(&self) -> &Value;

    /// JSON Schema document for the output.
    fn output_schema(&self) -> &Value;
}

impl<I, O> DynMethod for Method<I, O>
where
    I: DeserializeOwned + Send + 'static,
    O: Serialize + Send + 'static,
{
    fn invoke_value(&self, input: Value) -> BoxFuture<'static, Result<Value>> {
        let method = self.clone();
        async move { invoke_encoded(&method, input).await.map(|(_, value)| value) }.boxed()
    }

    fn input_schema(&self) -> &Value {
        self.input.document()
    }

    fn output_schema(&self) -> &Value {
        self.output.document()
    }
}
