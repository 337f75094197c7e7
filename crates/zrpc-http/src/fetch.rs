//! A client that talks to an API through any "post these bytes, get bytes
//! back" function.

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method as HttpMethod, Request, Response};
use bytes::Bytes;
use serde_json::Value;
use tower::{Service, ServiceExt};
use zrpc_core::{decode_response, encode, AsyncClient, BoxError, CallMessage, ProtocolError, RpcError};

/// Raw reply from a [`Fetch`] implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Bytes,
}

/// Posts a JSON body to a fixed endpoint.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn post(&self, body: Vec<u8>) -> Result<FetchResponse, BoxError>;
}

/// Calls methods by posting call messages through a [`Fetch`].
///
/// The reply body is decoded as a response message whatever the HTTP status,
/// so an error message sent with a 400 still surfaces as
/// [`RpcError::Remote`]. A body that is not a response message is a protocol
/// error naming the status.
#[derive(Debug, Clone)]
pub struct FetchClient<F> {
    fetch: F,
}

impl<F: Fetch> FetchClient<F> {
    pub fn new(fetch: F) -> Self {
        Self { fetch }
    }

    pub fn fetch(&self) -> &F {
        &self.fetch
    }

    /// Call `method` with raw JSON input.
    pub async fn call_value(&self, method: &str, input: Value) -> zrpc_core::Result<Value> {
        let body = encode(&CallMessage::new(method, input));
        let reply = self.fetch.post(body).await.map_err(RpcError::Transport)?;

        let message = decode_response(&reply.body).map_err(|err| {
            ProtocolError::new(err.expected, format!("HTTP {}: {}", reply.status, err.reason))
        })?;
        tracing::debug!(method, status = reply.status, ok = message.is_return(), "call replied");
        message.into_result()
    }
}

#[async_trait]
impl<F: Fetch> AsyncClient for FetchClient<F> {
    async fn call_value(&self, method: &str, input: Value) -> zrpc_core::Result<Value> {
        FetchClient::call_value(self, method, input).await
    }
}

/// Fetches by driving a tower service in memory, such as the router returned
/// by [`router`](crate::server::router).
#[derive(Debug, Clone)]
pub struct ServiceFetch<S> {
    service: S,
    path: String,
}

impl<S> ServiceFetch<S> {
    pub fn new(service: S, path: impl Into<String>) -> Self {
        Self {
            service,
            path: path.into(),
        }
    }
}

#[async_trait]
impl<S> Fetch for ServiceFetch<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + Sync + 'static,
    S::Future: Send,
    S::Error: Into<BoxError>,
{
    async fn post(&self, body: Vec<u8>) -> Result<FetchResponse, BoxError> {
        let request = Request::builder()
            .method(HttpMethod::POST)
            .uri(self.path.as_str())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))?;

        let response = self
            .service
            .clone()
            .oneshot(request)
            .await
            .map_err(Into::<BoxError>::into)?;
        let status = response.status().as_u16();
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        Ok(FetchResponse { status, body })
    }
}
