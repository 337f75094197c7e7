//! Typed JSON Schema validation for zrpc method inputs and outputs.
//!
//! A [`Schema<T>`] pairs a compiled JSON Schema 2020-12 document with the
//! Rust type `T` that validated values decode into. Parsing either returns
//! the typed value or a [`SchemaError`] carrying the validator's diagnostic.

pub mod config;
pub mod error;
pub mod primitives;
pub mod schema;
mod strict;
mod validator;

pub use config::SchemaConfig;
pub use error::{Result, SchemaError};
pub use primitives::{any, boolean, integer, null, number, string};
pub use schema::Schema;
