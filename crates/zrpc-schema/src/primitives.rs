//! Ready-made schemas for scalar values.

use serde_json::{json, Value};

use crate::schema::Schema;

fn builtin<T>(document: Value) -> Schema<T> {
    Schema::new(document).expect("built-in schema should compile")
}

/// Any JSON number, decoded as `f64`.
///
/// Values encode as floats, so an integral result such as `6` goes on the
/// wire as `6.0`. Use [`integer`] when integer text matters.
pub fn number() -> Schema<f64> {
    builtin(json!({ "type": "number" }))
}

/// Any JSON integer, decoded as `i64`.
pub fn integer() -> Schema<i64> {
    builtin(json!({ "type": "integer" }))
}

/// Any JSON string.
pub fn string() -> Schema<String> {
    builtin(json!({ "type": "string" }))
}

/// `true` or `false`.
pub fn boolean() -> Schema<bool> {
    builtin(json!({ "type": "boolean" }))
}

/// Only `null`, decoded as `()`.
pub fn null() -> Schema<()> {
    builtin(json!({ "type": "null" }))
}

/// Accepts every JSON value unchanged.
pub fn any() -> Schema<Value> {
    builtin(json!(true))
}
