//! The call / return / error messages exchanged by every transport.
//!
//! ```text
//! call    { "type": "call",   "method": string, "input": any }
//! return  { "type": "return", "value": any }
//! error   { "type": "error",  "error": any }
//! ```
//!
//! Parsing is strict: field names are exact and required, and a response is
//! discriminated by its `type` field before any other field is read.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{ProtocolError, RemoteError, Result, RpcError};

/// `type` tag of a call message.
pub const TYPE_CALL: &str = "call";
/// `type` tag of a return message.
pub const TYPE_RETURN: &str = "return";
/// `type` tag of an error message.
pub const TYPE_ERROR: &str = "error";

const EXPECT_CALL: &str = "call";
const EXPECT_RESPONSE: &str = "response";

/// A request to invoke one method.
#[derive(Debug, Clone, PartialEq)]
pub struct CallMessage {
    pub method: String,
    pub input: Value,
}

/// Successful completion; `value` satisfied the method's output schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnMessage {
    pub value: Value,
}

/// Failed completion; `error` carries whatever the failure produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorMessage {
    pub error: Value,
}

/// Reply to a call message.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseMessage {
    Return(ReturnMessage),
    Error(ErrorMessage),
}

impl CallMessage {
    pub fn new(method: impl Into<String>, input: Value) -> Self {
        Self {
            method: method.into(),
            input,
        }
    }
}

impl ResponseMessage {
    /// A return message.
    pub fn ok(value: Value) -> Self {
        ResponseMessage::Return(ReturnMessage { value })
    }

    /// An error message.
    pub fn error(error: Value) -> Self {
        ResponseMessage::Error(ErrorMessage { error })
    }

    /// Encode the outcome of an invocation.
    pub fn from_result(result: Result<Value>) -> Self {
        match result {
            Ok(value) => Self::ok(value),
            Err(err) => Self::error(err.to_payload()),
        }
    }

    pub fn is_return(&self) -> bool {
        matches!(self, ResponseMessage::Return(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ResponseMessage::Error(_))
    }

    /// Turn the reply back into the caller-visible outcome.
    pub fn into_result(self) -> Result<Value> {
        match self {
            ResponseMessage::Return(reply) => Ok(reply.value),
            ResponseMessage::Error(reply) => Err(RpcError::Remote(RemoteError::new(reply.error))),
        }
    }
}

/// Parse a raw JSON value as a call message.
pub fn parse_request(raw: Value) -> std::result::Result<CallMessage, ProtocolError> {
    let mut map = into_object(raw, EXPECT_CALL)?;
    expect_type(&map, EXPECT_CALL, &[TYPE_CALL])?;

    let method = match map.remove("method") {
        Some(Value::String(method)) => method,
        Some(other) => {
            return Err(ProtocolError::new(
                EXPECT_CALL,
                format!("`method` must be a string, got {}", type_name(&other)),
            ))
        }
        None => return Err(missing_field(EXPECT_CALL, "method")),
    };
    let input = map
        .remove("input")
        .ok_or_else(|| missing_field(EXPECT_CALL, "input"))?;

    Ok(CallMessage { method, input })
}

/// Parse a raw JSON value as a return or error message.
pub fn parse_response(raw: Value) -> std::result::Result<ResponseMessage, ProtocolError> {
    let mut map = into_object(raw, EXPECT_RESPONSE)?;

    match expect_type(&map, EXPECT_RESPONSE, &[TYPE_RETURN, TYPE_ERROR])? {
        TYPE_RETURN => {
            let value = map
                .remove("value")
                .ok_or_else(|| missing_field(EXPECT_RESPONSE, "value"))?;
            Ok(ResponseMessage::ok(value))
        }
        _ => {
            let error = map
                .remove("error")
                .ok_or_else(|| missing_field(EXPECT_RESPONSE, "error"))?;
            Ok(ResponseMessage::error(error))
        }
    }
}

/// Decode a call message from JSON bytes.
pub fn decode_request(bytes: &[u8]) -> std::result::Result<CallMessage, ProtocolError> {
    let raw: Value = serde_json::from_slice(bytes)
        .map_err(|err| ProtocolError::new(EXPECT_CALL, format!("invalid JSON: {err}")))?;
    parse_request(raw)
}

/// Decode a return or error message from JSON bytes.
pub fn decode_response(bytes: &[u8]) -> std::result::Result<ResponseMessage, ProtocolError> {
    let raw: Value = serde_json::from_slice(bytes)
        .map_err(|err| ProtocolError::new(EXPECT_RESPONSE, format!("invalid JSON: {err}")))?;
    parse_response(raw)
}

/// Encode a message as JSON bytes.
pub fn encode<M: Serialize>(message: &M) -> Vec<u8> {
    // Messages only hold `serde_json::Value`s with string keys, which always serialize.
    serde_json::to_vec(message).unwrap_or_else(|_| b"null".to_vec())
}

fn into_object(
    raw: Value,
    expected: &'static str,
) -> std::result::Result<Map<String, Value>, ProtocolError> {
    match raw {
        Value::Object(map) => Ok(map),
        other => Err(ProtocolError::new(
            expected,
            format!("expected an object, got {}", type_name(&other)),
        )),
    }
}

fn expect_type(
    map: &Map<String, Value>,
    expected: &'static str,
    allowed: &[&'static str],
) -> std::result::Result<&'static str, ProtocolError> {
    let tag = match map.get("type") {
        Some(Value::String(tag)) => tag,
        Some(other) => {
            return Err(ProtocolError::new(
                expected,
                format!("`type` must be a string, got {}", type_name(other)),
            ))
        }
        None => return Err(missing_field(expected, "type")),
    };

    allowed
        .iter()
        .copied()
        .find(|candidate| *candidate == tag.as_str())
        .ok_or_else(|| ProtocolError::new(expected, format!("unexpected type {tag:?}")))
}

fn missing_field(expected: &'static str, field: &str) -> ProtocolError {
    ProtocolError::new(expected, format!("missing field `{field}`"))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Wire<'a> {
    Call { method: &'a str, input: &'a Value },
    Return { value: &'a Value },
    Error { error: &'a Value },
}

impl Serialize for CallMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        Wire::Call {
            method: &self.method,
            input: &self.input,
        }
        .serialize(serializer)
    }
}

impl Serialize for ReturnMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        Wire::Return { value: &self.value }.serialize(serializer)
    }
}

impl Serialize for ErrorMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        Wire::Error { error: &self.error }.serialize(serializer)
    }
}

impl Serialize for ResponseMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ResponseMessage::Return(reply) => reply.serialize(serializer),
            ResponseMessage::Error(reply) => reply.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for CallMessage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        parse_request(Value::deserialize(deserializer)?).map_err(D::Error::custom)
    }
}

impl<'de> Deserialize<'de> for ResponseMessage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        parse_response(Value::deserialize(deserializer)?).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn call_message_wire_shape() {
        let call = CallMessage::new("double", json!(3));
        assert_eq!(
            serde_json::to_value(&call).unwrap(),
            json!({"type": "call", "method": "double", "input": 3})
        );
    }

    #[test]
    fn response_wire_shapes() {
        assert_eq!(
            serde_json::to_value(ResponseMessage::ok(json!(6))).unwrap(),
            json!({"type": "return", "value": 6})
        );
        assert_eq!(
            serde_json::to_value(ResponseMessage::error(json!("boom"))).unwrap(),
            json!({"type": "error", "error": "boom"})
        );
    }

    #[test]
    fn call_round_trips_through_bytes() {
        let call = CallMessage::new("greet", json!({"name": "ada", "tags": [1, null]}));
        assert_eq!(decode_request(&encode(&call)).unwrap(), call);
    }

    #[test]
    fn responses_round_trip_through_bytes() {
        for reply in [
            ResponseMessage::ok(json!({"nested": [true, 1.5]})),
            ResponseMessage::ok(Value::Null),
            ResponseMessage::error(json!({"kind": "handler", "message": "no"})),
        ] {
            assert_eq!(decode_response(&encode(&reply)).unwrap(), reply);
        }
    }

    #[test]
    fn null_input_is_present() {
        let call = parse_request(json!({"type": "call", "method": "ping", "input": null})).unwrap();
        assert_eq!(call.input, Value::Null);
    }

    #[test]
    fn request_requires_every_field() {
        assert!(parse_request(json!({"type": "call", "method": "x"})).is_err());
        assert!(parse_request(json!({"type": "call", "input": 1})).is_err());
        assert!(parse_request(json!({"method": "x", "input": 1})).is_err());
    }

    #[test]
    fn request_rejects_wrong_types_and_tags() {
        let err = parse_request(json!({"type": "call", "method": 7, "input": 1})).unwrap_err();
        assert!(err.reason.contains("`method` must be a string"));

        let err = parse_request(json!({"type": "return", "value": 1})).unwrap_err();
        assert_eq!(err.expected, "call");
        assert!(err.reason.contains("unexpected type"));

        assert!(parse_request(json!([1, 2])).is_err());
        assert!(parse_request(json!({"type": 1, "method": "x", "input": 1})).is_err());
    }

    #[test]
    fn response_type_selects_exactly_one_arm() {
        // A return tag with only an `error` field must not fall back to the error arm.
        let err = parse_response(json!({"type": "return", "error": "x"})).unwrap_err();
        assert!(err.reason.contains("`value`"));

        let err = parse_response(json!({"type": "error", "value": 1})).unwrap_err();
        assert!(err.reason.contains("`error`"));

        assert!(parse_response(json!({"value": 1})).is_err());
        assert!(parse_response(json!({"type": "call", "method": "x", "input": 1})).is_err());
    }

    #[test]
    fn decode_rejects_invalid_json() {
        let err = decode_request(b"{not json").unwrap_err();
        assert!(err.reason.starts_with("invalid JSON"));
        assert!(decode_response(b"").is_err());
    }

    #[test]
    fn serde_deserialize_uses_strict_parsers() {
        let call: CallMessage =
            serde_json::from_str(r#"{"type":"call","method":"a","input":[]}"#).unwrap();
        assert_eq!(call.method, "a");
        assert!(serde_json::from_str::<CallMessage>(r#"{"type":"call","method":"a"}"#).is_err());
        assert!(serde_json::from_str::<ResponseMessage>(r#"{"type":"nope"}"#).is_err());
    }

    #[test]
    fn into_result_converts_error_to_remote() {
        assert_eq!(ResponseMessage::ok(json!(1)).into_result().unwrap(), json!(1));

        match ResponseMessage::error(json!({"kind": "handler", "message": "bad"})).into_result() {
            Err(RpcError::Remote(remote)) => assert_eq!(remote.message(), Some("bad")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn from_result_encodes_failures_as_error_messages() {
        let reply = ResponseMessage::from_result(Err(RpcError::MethodNotFound("m".into())));
        assert!(reply.is_error());
        let reply = ResponseMessage::from_result(Ok(json!(2)));
        assert!(reply.is_return());
    }
}
