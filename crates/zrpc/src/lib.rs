//! Schema-validated remote procedure calls.
//!
//! Define methods whose inputs and outputs are checked against JSON Schema,
//! collect them into an [`Api`], and serve or call that API over any
//! transport that carries the call/return/error messages.
//!
//! # Crate Structure
//!
//! - [`schema`]: typed JSON Schema documents and primitive schemas
//! - the crate root: methods, registries, the invocation engine, messages,
//!   and client shapes (re-exported from `zrpc-core`)
//! - [`http`]: axum server and fetch-style clients (behind the `http` feature)
//! - [`demo`]: a small example API used by the `zrpc` binary

pub use zrpc_core::*;

pub mod demo;

/// Re-export schema types.
pub mod schema {
    pub use zrpc_schema::*;
}

/// Re-export the HTTP binding (requires `http` feature).
#[cfg(feature = "http")]
pub mod http {
    pub use zrpc_http::*;
}
