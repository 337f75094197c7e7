//! Schema-validated methods, method registries, and the call/return/error
//! message protocol.
//!
//! A [`Method`] pairs an input and output [`Schema`](zrpc_schema::Schema)
//! with a handler. Invoking it validates the input, runs the handler once,
//! and validates the output before anything is returned. An [`Api`] maps
//! names to methods; [`dispatch`] and [`handle_request`] turn call messages
//! into reply messages for any transport.

pub mod api;
pub mod client;
pub mod dispatch;
pub mod error;
pub mod invoke;
pub mod local;
pub mod message;
pub mod method;

pub use api::{define_api, Api, ApiBuilder, MethodDescription};
pub use client::{AsyncClient, MethodHandle, SyncClient};
pub use dispatch::{dispatch, handle_request, Disposition, Reply};
pub use error::{
    BoxError, DuplicateMethodError, HandlerError, ProtocolError, RemoteError, Result, RpcError,
    ValidationPhase, KIND_HANDLER, KIND_INTERNAL, KIND_METHOD_NOT_FOUND, KIND_PROTOCOL,
    KIND_VALIDATION,
};
pub use invoke::invoke;
pub use local::LocalClient;
pub use message::{
    decode_request, decode_response, encode, parse_request, parse_response, CallMessage,
    ErrorMessage, ResponseMessage, ReturnMessage, TYPE_CALL, TYPE_ERROR, TYPE_RETURN,
};
pub use method::{define_method, DynMethod, HandlerFuture, Method};
