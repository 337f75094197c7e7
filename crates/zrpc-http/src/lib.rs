//! HTTP binding for zrpc APIs.
//!
//! The server is an axum router with a single `POST` endpoint. Clients post
//! call messages through a [`Fetch`] implementation: [`ReqwestFetch`] over
//! the network, or [`ServiceFetch`] against a tower service in memory.

pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod server;

pub use client::{is_timeout, HttpClient, ReqwestFetch};
pub use config::{ClientConfig, ServerConfig, DEFAULT_MAX_BODY_SIZE, DEFAULT_TIMEOUT};
pub use error::{HttpError, Result};
pub use fetch::{Fetch, FetchClient, FetchResponse, ServiceFetch};
pub use server::{router, HttpServer, RunningServer};
