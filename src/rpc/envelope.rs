//! JSON-RPC 2.0 envelope encoding and response classification.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// One outgoing call. Borrowing keeps retries across endpoints allocation-free
/// apart from the id.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: &'a [Value],
}

impl<'a> RpcRequest<'a> {
    pub fn new(id: u64, method: &'a str, params: &'a [Value]) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            method,
            params,
        }
    }

    pub fn to_body(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorObject {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcReply {
    Result(Value),
    Error(ErrorObject),
}

/// Classifies a raw response body.
///
/// A non-null `error` member wins over `result`. A `result` member that is
/// present but `null` is still a successful reply.
pub fn decode_reply(body: &[u8]) -> Result<RpcReply, String> {
    let value: Value =
        serde_json::from_slice(body).map_err(|err| format!("invalid JSON body: {err}"))?;
    let Value::Object(mut object) = value else {
        return Err("response is not a JSON object".to_owned());
    };

    match object.remove("error") {
        Some(Value::Null) | None => {}
        Some(error @ Value::Object(_)) => {
            let parsed = ErrorObject::deserialize(&error).unwrap_or_else(|_| loose_error(&error));
            return Ok(RpcReply::Error(parsed));
        }
        Some(other) => {
            return Ok(RpcReply::Error(ErrorObject {
                code: 0,
                message: match other {
                    Value::String(text) => text,
                    other => other.to_string(),
                },
                data: None,
            }));
        }
    }

    object
        .remove("result")
        .map(RpcReply::Result)
        .ok_or_else(|| "response carries neither result nor error".to_owned())
}

/// Error object whose fields do not have the standard types, such as a
/// string or fractional `code`. It is still a protocol error.
fn loose_error(error: &Value) -> ErrorObject {
    ErrorObject {
        code: error.get("code").and_then(Value::as_i64).unwrap_or(0),
        message: error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| error.to_string()),
        data: error.get("data").cloned(),
    }
}
