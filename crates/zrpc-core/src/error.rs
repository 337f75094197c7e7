use std::fmt;

use serde_json::{json, Value};
use zrpc_schema::SchemaError;

/// Error payload kind: the inbound message was malformed.
pub const KIND_PROTOCOL: &str = "protocol";
/// Error payload kind: the call named an unknown method.
pub const KIND_METHOD_NOT_FOUND: &str = "method_not_found";
/// Error payload kind: input or output failed its schema.
pub const KIND_VALIDATION: &str = "validation";
/// Error payload kind: the handler failed.
pub const KIND_HANDLER: &str = "handler";
/// Error payload kind: anything else that went wrong while serving.
pub const KIND_INTERNAL: &str = "internal";

/// Boxed error used for transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors produced while defining, invoking, serving, or calling methods.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// An inbound payload was not a well-formed message.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The call named a method absent from the registry.
    #[error("method not found: {0}")]
    MethodNotFound(String),

    /// Input or output failed its schema.
    #[error("{phase} validation failed: {source}")]
    Validation {
        phase: ValidationPhase,
        #[source]
        source: SchemaError,
    },

    /// The handler returned an error or panicked.
    #[error("handler failed: {0}")]
    Handler(HandlerError),

    /// The remote side replied with an error message.
    #[error("remote error: {0}")]
    Remote(RemoteError),

    /// The caller's input could not be encoded as JSON.
    #[error("failed to encode input: {0}")]
    Encode(#[source] serde_json::Error),

    /// A returned value could not be decoded into the expected type.
    #[error("failed to decode output: {0}")]
    Decode(#[source] serde_json::Error),

    /// The channel failed before a reply arrived.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),
}

impl RpcError {
    /// Wrap any transport failure.
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Self::Transport(err.into())
    }

    /// Short machine-readable classification, matching the wire `kind`.
    pub fn kind(&self) -> &str {
        match self {
            RpcError::Protocol(_) => KIND_PROTOCOL,
            RpcError::MethodNotFound(_) => KIND_METHOD_NOT_FOUND,
            RpcError::Validation { .. } => KIND_VALIDATION,
            RpcError::Handler(_) => KIND_HANDLER,
            RpcError::Remote(remote) => remote.kind().unwrap_or(KIND_INTERNAL),
            RpcError::Encode(_) | RpcError::Decode(_) | RpcError::Transport(_) => KIND_INTERNAL,
        }
    }

    /// Build the `error` field of an error message.
    ///
    /// Handler and remote payloads are forwarded verbatim.
    pub fn to_payload(&self) -> Value {
        match self {
            RpcError::Handler(err) => err.payload().clone(),
            RpcError::Remote(err) => err.payload().clone(),
            RpcError::MethodNotFound(method) => json!({
                "kind": KIND_METHOD_NOT_FOUND,
                "method": method,
                "message": self.to_string(),
            }),
            RpcError::Validation { phase, source } => json!({
                "kind": KIND_VALIDATION,
                "phase": phase.as_str(),
                "message": source.to_string(),
            }),
            other => json!({
                "kind": other.kind(),
                "message": other.to_string(),
            }),
        }
    }
}

/// Which side of a handler a validation failure happened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationPhase {
    Input,
    Output,
}

impl ValidationPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationPhase::Input => "input",
            ValidationPhase::Output => "output",
        }
    }
}

impl fmt::Display for ValidationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payload did not have the shape of the expected message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed {expected} message: {reason}")]
pub struct ProtocolError {
    /// The message shape that was expected (`call`, `response`).
    pub expected: &'static str,
    /// What was wrong with it.
    pub reason: String,
}

impl ProtocolError {
    pub fn new(expected: &'static str, reason: impl Into<String>) -> Self {
        Self {
            expected,
            reason: reason.into(),
        }
    }
}

/// Failure raised by a method handler.
///
/// The payload travels opaquely in the `error` field of the reply.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerError {
    payload: Value,
}

impl HandlerError {
    /// A handler failure described by a message.
    pub fn msg(message: impl fmt::Display) -> Self {
        Self {
            payload: json!({
                "kind": KIND_HANDLER,
                "message": message.to_string(),
            }),
        }
    }

    /// A handler failure carrying an arbitrary payload.
    pub fn from_value(payload: Value) -> Self {
        Self { payload }
    }

    /// A handler failure describing a standard error.
    pub fn from_error<E: std::error::Error + ?Sized>(err: &E) -> Self {
        Self::msg(err)
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn into_payload(self) -> Value {
        self.payload
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        describe_payload(&self.payload, f)
    }
}

impl std::error::Error for HandlerError {}

/// The `error` payload of an error message received from a peer.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteError {
    payload: Value,
}

impl RemoteError {
    pub fn new(payload: Value) -> Self {
        Self { payload }
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn into_payload(self) -> Value {
        self.payload
    }

    /// The `kind` field, when the payload is an object carrying one.
    pub fn kind(&self) -> Option<&str> {
        self.payload.get("kind").and_then(Value::as_str)
    }

    /// The `message` field, when the payload is an object carrying one.
    pub fn message(&self) -> Option<&str> {
        self.payload.get("message").and_then(Value::as_str)
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        describe_payload(&self.payload, f)
    }
}

impl std::error::Error for RemoteError {}

/// A method name was registered twice on the same builder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("method {0:?} registered more than once")]
pub struct DuplicateMethodError(pub String);

fn describe_payload(payload: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match payload {
        Value::String(text) => f.write_str(text),
        Value::Object(map) => match map.get("message").and_then(Value::as_str) {
            Some(message) => f.write_str(message),
            None => write!(f, "{payload}"),
        },
        other => write!(f, "{other}"),
    }
}

pub type Result<T> = std::result::Result<T, RpcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_not_found_payload_names_method() {
        let payload = RpcError::MethodNotFound("triple".to_string()).to_payload();
        assert_eq!(payload["kind"], KIND_METHOD_NOT_FOUND);
        assert_eq!(payload["method"], "triple");
        assert_eq!(payload["message"], "method not found: triple");
    }

    #[test]
    fn validation_payload_carries_phase_and_diagnostic() {
        let err = RpcError::Validation {
            phase: ValidationPhase::Output,
            source: SchemaError::ValidationFailed {
                message: "\"x\" is not of type \"number\"".to_string(),
            },
        };
        let payload = err.to_payload();
        assert_eq!(payload["kind"], KIND_VALIDATION);
        assert_eq!(payload["phase"], "output");
        assert!(payload["message"]
            .as_str()
            .unwrap()
            .contains("is not of type"));
    }

    #[test]
    fn handler_payload_is_forwarded_verbatim() {
        let custom = json!({"code": 42, "detail": ["a", "b"]});
        let err = RpcError::Handler(HandlerError::from_value(custom.clone()));
        assert_eq!(err.to_payload(), custom);
    }

    #[test]
    fn handler_error_from_std_error_uses_its_message() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing config");
        let err = HandlerError::from_error(&io);
        assert_eq!(
            err.payload(),
            &json!({"kind": KIND_HANDLER, "message": "missing config"})
        );
    }

    #[test]
    fn handler_msg_builds_kind_and_message() {
        let err = HandlerError::msg("disk full");
        assert_eq!(err.payload()["kind"], KIND_HANDLER);
        assert_eq!(err.to_string(), "disk full");
    }

    #[test]
    fn remote_error_exposes_kind_and_message() {
        let remote = RemoteError::new(json!({"kind": "validation", "message": "bad"}));
        assert_eq!(remote.kind(), Some("validation"));
        assert_eq!(remote.message(), Some("bad"));
        assert_eq!(RpcError::Remote(remote).kind(), "validation");
    }

    #[test]
    fn remote_error_display_falls_back_to_json() {
        assert_eq!(RemoteError::new(json!("plain")).to_string(), "plain");
        assert_eq!(RemoteError::new(json!([1, 2])).to_string(), "[1,2]");
        assert_eq!(RemoteError::new(json!({"code": 1})).to_string(), r#"{"code":1}"#);
    }

    #[test]
    fn transport_errors_are_internal_on_the_wire() {
        let err = RpcError::transport("connection reset");
        let payload = err.to_payload();
        assert_eq!(payload["kind"], KIND_INTERNAL);
        assert_eq!(payload["message"], "transport error: connection reset");
    }
}
