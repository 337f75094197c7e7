use std::fmt;
use std::io;

use zrpc_core::RpcError;
use zrpc_http::{is_timeout, HttpError};
use zrpc_schema::SchemaError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const REMOTE_ERROR: i32 = 70;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut => TIMEOUT,
        io::ErrorKind::NotFound | io::ErrorKind::InvalidInput => USAGE,
        io::ErrorKind::AddrInUse
        | io::ErrorKind::AddrNotAvailable
        | io::ErrorKind::ConnectionRefused => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn http_error(context: &str, err: HttpError) -> CliError {
    match err {
        HttpError::Bind { addr, source } => io_error(&format!("{context} ({addr})"), source),
        HttpError::Serve(source) => io_error(context, source),
        HttpError::InvalidUrl { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

pub fn rpc_error(context: &str, err: RpcError) -> CliError {
    let code = match &err {
        RpcError::Remote(_) => REMOTE_ERROR,
        err @ RpcError::Transport(_) if is_timeout(err) => TIMEOUT,
        RpcError::Transport(_) => TRANSPORT_ERROR,
        RpcError::Protocol(_) => FAILURE,
        RpcError::Validation { .. } | RpcError::Encode(_) | RpcError::Decode(_) => DATA_INVALID,
        RpcError::MethodNotFound(_) => USAGE,
        RpcError::Handler(_) => FAILURE,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn schema_error(context: &str, err: SchemaError) -> CliError {
    let code = match err {
        SchemaError::LoadFailed(_) => USAGE,
        _ => DATA_INVALID,
    };
    CliError::new(code, format!("{context}: {err}"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use zrpc_core::RemoteError;

    use super::*;

    #[test]
    fn remote_errors_have_their_own_code() {
        let err = rpc_error(
            "call failed",
            RpcError::Remote(RemoteError::new(json!({"kind": "handler", "message": "no"}))),
        );
        assert_eq!(err.code, REMOTE_ERROR);
        assert_eq!(err.to_string(), "call failed: remote error: no");
    }

    #[test]
    fn transport_failures_map_to_transport_code() {
        let err = rpc_error("call failed", RpcError::transport("connection refused"));
        assert_eq!(err.code, TRANSPORT_ERROR);
    }

    #[test]
    fn invalid_url_is_usage() {
        let err = http_error(
            "invalid endpoint",
            HttpError::InvalidUrl {
                url: "nope".to_string(),
                reason: "relative URL without a base".to_string(),
            },
        );
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn bind_conflicts_are_transport_errors() {
        let err = http_error(
            "bind failed",
            HttpError::Bind {
                addr: "127.0.0.1:80".to_string(),
                source: io::Error::from(io::ErrorKind::AddrInUse),
            },
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
        assert!(err.message.contains("127.0.0.1:80"));
    }

    #[test]
    fn schema_load_failure_is_usage() {
        let err = schema_error("schema load failed", SchemaError::LoadFailed("missing".into()));
        assert_eq!(err.code, USAGE);
        let err = schema_error("schema load failed", SchemaError::CompileFailed("bad".into()));
        assert_eq!(err.code, DATA_INVALID);
    }
}
