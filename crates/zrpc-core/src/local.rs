use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use serde_json::Value;
use tokio::runtime::{Builder, Handle, Runtime};

use crate::api::Api;
use crate::client::{AsyncClient, SyncClient};
use crate::dispatch::dispatch;
use crate::error::{Result, RpcError};
use crate::message::CallMessage;

/// In-process client: each call goes through the same dispatch path a
/// server would use, without a network in between.
///
/// The reply is a full return/error message, so failures surface as
/// [`RpcError::Remote`] exactly as they would over HTTP.
///
/// Blocking calls ([`SyncClient`]) run on a current-thread tokio runtime
/// built on first use and shared by clones. They fail with
/// [`RpcError::Transport`] when made from inside an async runtime; use
/// [`AsyncClient`] there. The last clone must be dropped outside async
/// context once that runtime exists.
#[derive(Debug, Clone)]
pub struct LocalClient {
    api: Api,
    runtime: Arc<OnceLock<Runtime>>,
}

impl LocalClient {
    pub fn new(api: Api) -> Self {
        Self {
            api,
            runtime: Arc::default(),
        }
    }

    pub fn api(&self) -> &Api {
        &self.api
    }

    async fn round_trip(&self, method: &str, input: Value) -> Result<Value> {
        dispatch(&self.api, CallMessage::new(method, input))
            .await
            .into_result()
    }

    fn runtime(&self) -> Result<&Runtime> {
        if let Some(runtime) = self.runtime.get() {
            return Ok(runtime);
        }
        let built = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(RpcError::transport)?;
        Ok(self.runtime.get_or_init(|| built))
    }
}

impl SyncClient for LocalClient {
    /// Drives the call to completion on the client's own runtime.
    fn call_value(&self, method: &str, input: Value) -> Result<Value> {
        if Handle::try_current().is_ok() {
            return Err(RpcError::transport(
                "blocking call made from inside an async runtime; use AsyncClient",
            ));
        }
        self.runtime()?.block_on(self.round_trip(method, input))
    }
}

#[async_trait]
impl AsyncClient for LocalClient {
    async fn call_value(&self, method: &str, input: Value) -> Result<Value> {
        self.round_trip(method, input).await
    }
}
