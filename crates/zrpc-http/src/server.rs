//! Serve an [`Api`] over HTTP with axum.
//!
//! One `POST` endpoint accepts a call message and replies with a return or
//! error message. The status is 200 whenever the body parsed as a call, even
//! when the reply is an error message, and 400 when it did not. A body that
//! could not be read (for example one over the size limit) gets the
//! rejection's status, still with a protocol error message.

use std::future::Future;
use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use zrpc_core::{
    encode, handle_request, Api, Disposition, ProtocolError, ResponseMessage, RpcError,
};

use crate::config::ServerConfig;
use crate::error::{HttpError, Result};

/// Build the router that serves `api` at `config.path`.
pub fn router(api: Api, config: &ServerConfig) -> Router {
    let mut router = Router::new()
        .route(&config.route_path(), post(handle_call))
        .with_state(api)
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .layer(TraceLayer::new_for_http());

    if config.cors {
        router = router.layer(CorsLayer::permissive());
    }
    router
}

async fn handle_call(
    State(api): State<Api>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    let (status, message) = match body {
        Ok(body) => {
            let reply = handle_request(&api, &body).await;
            let status = match reply.disposition {
                Disposition::Completed => StatusCode::OK,
                Disposition::Rejected => StatusCode::BAD_REQUEST,
            };
            (status, reply.message)
        }
        Err(rejection) => {
            let status = rejection.status();
            let err = RpcError::Protocol(ProtocolError::new("call", rejection.body_text()));
            tracing::warn!(%status, error = %err, "request body rejected");
            (status, ResponseMessage::error(err.to_payload()))
        }
    };
    (
        status,
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )],
        encode(&message),
    )
        .into_response()
}

/// A bound, not yet running HTTP server.
pub struct HttpServer {
    listener: TcpListener,
    router: Router,
    local_addr: SocketAddr,
    path: String,
}

impl HttpServer {
    /// Bind `addr` (for example `127.0.0.1:8080`; port 0 picks a free port).
    pub async fn bind(addr: &str, api: Api, config: &ServerConfig) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| HttpError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        let local_addr = listener.local_addr().map_err(|source| HttpError::Bind {
            addr: addr.to_string(),
            source,
        })?;

        tracing::info!(%local_addr, path = %config.route_path(), methods = api.len(), "zrpc server bound");
        Ok(Self {
            listener,
            router: router(api, config),
            local_addr,
            path: config.route_path(),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Full endpoint URL, e.g. `http://127.0.0.1:8080/`.
    pub fn url(&self) -> String {
        endpoint_url(self.local_addr, &self.path)
    }

    /// Serve until `signal` resolves, then stop accepting and drain in-flight calls.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = self.local_addr;
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(signal)
            .await
            .map_err(HttpError::Serve)?;
        tracing::info!(%local_addr, "zrpc server stopped");
        Ok(())
    }

    /// Run the server on a background task.
    pub fn spawn(self) -> RunningServer {
        let (tx, rx) = oneshot::channel::<()>();
        let local_addr = self.local_addr;
        let url = self.url();
        let task = tokio::spawn(self.serve_with_shutdown(async move {
            let _ = rx.await;
        }));
        RunningServer {
            local_addr,
            url,
            shutdown: tx,
            task,
        }
    }
}

impl std::fmt::Debug for HttpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpServer")
            .field("local_addr", &self.local_addr)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Handle to a server started with [`HttpServer::spawn`].
#[derive(Debug)]
pub struct RunningServer {
    local_addr: SocketAddr,
    url: String,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<Result<()>>,
}

impl RunningServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Signal shutdown and wait for the server task to finish.
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.shutdown.send(());
        self.task.await?
    }
}

fn endpoint_url(addr: SocketAddr, path: &str) -> String {
    format!("http://{addr}{path}")
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Method as HttpMethod, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use zrpc_core::{decode_response, define_api, HandlerError, Method, KIND_PROTOCOL};
    use zrpc_schema::number;

    use super::*;

    fn api() -> Api {
        define_api([
            ("double", Method::sync(number(), number(), |x| Ok(x * 2.0)).erase()),
            (
                "fail",
                Method::sync(number(), number(), |_: f64| Err(HandlerError::msg("nope"))).erase(),
            ),
        ])
    }

    async fn post(router: Router, uri: &str, body: &'static str) -> (StatusCode, Option<HeaderValue>, Value) {
        let request = Request::builder()
            .method(HttpMethod::POST)
            .uri(uri)
            .body(Body::from(body))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, content_type, value)
    }

    #[tokio::test]
    async fn call_returns_200_with_return_message() {
        let app = router(api(), &ServerConfig::default());
        let (status, content_type, body) =
            post(app, "/", r#"{"type":"call","method":"double","input":3}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.unwrap(), "application/json");
        assert_eq!(body, json!({"type": "return", "value": 6.0}));
    }

    #[tokio::test]
    async fn failing_calls_still_return_200() {
        let app = router(api(), &ServerConfig::default());

        let (status, _, body) =
            post(app.clone(), "/", r#"{"type":"call","method":"triple","input":3}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "error");
        assert_eq!(body["error"]["kind"], "method_not_found");

        let (status, _, body) =
            post(app.clone(), "/", r#"{"type":"call","method":"double","input":true}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"]["kind"], "validation");
        assert_eq!(body["error"]["phase"], "input");

        let (status, _, body) = post(app, "/", r#"{"type":"call","method":"fail","input":1}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"], json!({"kind": "handler", "message": "nope"}));
    }

    #[tokio::test]
    async fn malformed_body_is_400_with_error_message() {
        let app = router(api(), &ServerConfig::default());
        let (status, content_type, body) = post(app, "/", r#"{"method":"double"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(content_type.unwrap(), "application/json");
        assert_eq!(body["type"], "error");
        assert_eq!(body["error"]["kind"], "protocol");
    }

    #[tokio::test]
    async fn only_post_on_the_configured_path() {
        let config = ServerConfig {
            path: "rpc".to_string(),
            ..ServerConfig::default()
        };
        let app = router(api(), &config);

        let (status, _, _) =
            post(app.clone(), "/", r#"{"type":"call","method":"double","input":1}"#).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _, body) =
            post(app.clone(), "/rpc", r#"{"type":"call","method":"double","input":1}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["value"], json!(2.0));

        let request = Request::builder()
            .method(HttpMethod::GET)
            .uri("/rpc")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let config = ServerConfig {
            max_body_size: 16,
            ..ServerConfig::default()
        };
        let app = router(api(), &config);
        let (status, content_type, body) =
            post(app, "/", r#"{"type":"call","method":"double","input":3}"#).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(content_type.unwrap(), "application/json");

        let reply = decode_response(&serde_json::to_vec(&body).unwrap())
            .expect("oversized body should still get a response message");
        match reply.into_result() {
            Err(RpcError::Remote(remote)) => assert_eq!(remote.kind(), Some(KIND_PROTOCOL)),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn cors_layer_answers_preflight() {
        let config = ServerConfig {
            cors: true,
            ..ServerConfig::default()
        };
        let app = router(api(), &config);
        let request = Request::builder()
            .method(HttpMethod::OPTIONS)
            .uri("/")
            .header(header::ORIGIN, "http://example.com")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert!(response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }

    #[tokio::test]
    async fn spawned_server_shuts_down() {
        let server = HttpServer::bind("127.0.0.1:0", api(), &ServerConfig::default())
            .await
            .unwrap();
        let addr = server.local_addr();
        assert_ne!(addr.port(), 0);
        assert_eq!(server.url(), format!("http://{addr}/"));

        let running = server.spawn();
        assert_eq!(running.local_addr(), addr);
        running.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn bind_failure_names_the_address() {
        let err = HttpServer::bind("not-an-address", api(), &ServerConfig::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not-an-address"));
    }
}
