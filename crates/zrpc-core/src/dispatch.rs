//! Server-side handling of one call message.

use crate::api::Api;
use crate::message::{decode_request, CallMessage, ResponseMessage};

/// How a transport should classify a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The payload was a call message; the reply is its outcome, success or not.
    Completed,
    /// The payload was not a well-formed call message.
    Rejected,
}

/// Reply to one inbound payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub disposition: Disposition,
    pub message: ResponseMessage,
}

/// Invoke the method named by `call` and encode the outcome.
///
/// Never fails: unknown methods, validation failures, and handler failures
/// all become error messages.
pub async fn dispatch(api: &Api, call: CallMessage) -> ResponseMessage {
    let CallMessage { method, input } = call;
    let result = api.invoke(&method, input).await;
    match &result {
        Ok(_) => tracing::debug!(%method, "call completed"),
        Err(err) => tracing::warn!(%method, kind = err.kind(), error = %err, "call failed"),
    }
    ResponseMessage::from_result(result)
}

/// Decode a raw request body, dispatch it, and classify the reply.
pub async fn handle_request(api: &Api, body: &[u8]) -> Reply {
    match decode_request(body) {
        Ok(call) => Reply {
            disposition: Disposition::Completed,
            message: dispatch(api, call).await,
        },
        Err(err) => {
            tracing::warn!(error = %err, "rejected malformed request");
            Reply {
                disposition: Disposition::Rejected,
                message: ResponseMessage::from_result(Err(err.into())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use zrpc_schema::number;

    use super::*;
    use crate::api::define_api;
    use crate::error::{HandlerError, KIND_PROTOCOL};
    use crate::message::encode;
    use crate::method::Method;

    fn api() -> Api {
        define_api([
            ("double", Method::sync(number(), number(), |x| Ok(x * 2.0)).erase()),
            (
                "fail",
                Method::sync(number(), number(), |_: f64| Err(HandlerError::msg("nope"))).erase(),
            ),
        ])
    }

    #[tokio::test]
    async fn double_returns_six() {
        let reply = handle_request(&api(), br#"{"type":"call","method":"double","input":3}"#).await;
        assert_eq!(reply.disposition, Disposition::Completed);
        assert_eq!(
            serde_json::to_value(&reply.message).unwrap(),
            json!({"type": "return", "value": 6.0})
        );
    }

    #[tokio::test]
    async fn unknown_method_is_completed_with_error() {
        let reply = dispatch(&api(), CallMessage::new("triple", json!(3))).await;
        match reply {
            ResponseMessage::Error(err) => {
                assert_eq!(err.error["kind"], "method_not_found");
                assert_eq!(err.error["method"], "triple");
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[tokio::test]
    async fn handler_failure_is_completed_with_error() {
        let body = encode(&CallMessage::new("fail", json!(1)));
        let reply = handle_request(&api(), &body).await;
        assert_eq!(reply.disposition, Disposition::Completed);
        assert_eq!(
            reply.message,
            ResponseMessage::error(json!({"kind": "handler", "message": "nope"}))
        );
    }

    #[tokio::test]
    async fn malformed_payloads_are_rejected() {
        let bodies: [&[u8]; 4] = [
            b"not json",
            br#"{"type":"call","method":"double"}"#,
            br#"{"type":"return","value":1}"#,
            br#"[1,2,3]"#,
        ];
        for body in bodies {
            let reply = handle_request(&api(), body).await;
            assert_eq!(reply.disposition, Disposition::Rejected);
            match reply.message {
                ResponseMessage::Error(err) => assert_eq!(err.error["kind"], KIND_PROTOCOL),
                other => panic!("unexpected reply: {other:?}"),
            }
        }
    }
}
