use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, RpcError};

/// A client that blocks until the reply arrives.
pub trait SyncClient {
    /// Call `method` with raw JSON input and return the raw JSON value.
    fn call_value(&self, method: &str, input: Value) -> Result<Value>;
}

/// A client whose calls complete asynchronously.
#[async_trait]
pub trait AsyncClient: Send + Sync {
    /// Call `method` with raw JSON input and return the raw JSON value.
    async fn call_value(&self, method: &str, input: Value) -> Result<Value>;
}

/// Typed reference to a method on a remote API.
///
/// Carries only the method name; the input and output types come from the
/// method it was registered for, so a call site is checked at compile time.
pub struct MethodHandle<I, O> {
    name: Arc<str>,
    _types: PhantomData<fn(I) -> O>,
}

impl<I, O> MethodHandle<I, O> {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            _types: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<I, O> MethodHandle<I, O>
where
    I: Serialize,
    O: DeserializeOwned,
{
    /// Call the method through a blocking client.
    pub fn call<C: SyncClient + ?Sized>(&self, client: &C, input: &I) -> Result<O> {
        let input = serde_json::to_value(input).map_err(RpcError::Encode)?;
        let value = client.call_value(&self.name, input)?;
        serde_json::from_value(value).map_err(RpcError::Decode)
    }

    /// Call the method through an asynchronous client.
    pub async fn call_async<C: AsyncClient + ?Sized>(&self, client: &C, input: &I) -> Result<O> {
        let input = serde_json::to_value(input).map_err(RpcError::Encode)?;
        let value = client.call_value(&self.name, input).await?;
        serde_json::from_value(value).map_err(RpcError::Decode)
    }
}

impl<I, O> Clone for MethodHandle<I, O> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            _types: PhantomData,
        }
    }
}

impl<I, O> std::fmt::Debug for MethodHandle<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MethodHandle").field(&self.name).finish()
    }
}
