//! JSON-RPC envelopes and transport errors.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while reaching a node.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The connection could not be established; the node never saw the request.
    #[error("connection to node failed: {0}")]
    Connect(String),

    /// The request was sent but no response arrived in time.
    #[error("node request timed out after {0} seconds")]
    Timeout(u64),

    /// HTTP-level failure (bad status without a JSON body, auth rejected).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The body could not be decoded as a JSON-RPC response.
    #[error("invalid node response: {0}")]
    Decode(String),

    /// The endpoint URL is malformed.
    #[error("invalid node URL '{0}'")]
    InvalidUrl(String),
}

impl TransportError {
    /// Whether repeating the request cannot duplicate its effect.
    ///
    /// Only connection failures qualify: any other failure may have reached
    /// the node, and repeating a funds-moving call could spend twice.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportError::Connect(_))
    }
}

/// Result type for node transport.
pub type TransportResult<T> = Result<T, TransportError>;

/// Outgoing JSON-RPC request envelope.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest<'a> {
    pub id: String,
    pub jsonrpc: &'a str,
    pub method: &'a str,
    pub params: &'a Value,
}

/// Raw JSON-RPC response envelope.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub error: Value,
}

impl RpcResponse {
    /// Response carrying a result.
    pub fn ok(result: Value) -> Self {
        Self {
            result,
            error: Value::Null,
        }
    }

    /// Response carrying only an error object.
    pub fn err(code: i64, message: &str) -> Self {
        Self {
            result: Value::Null,
            error: serde_json::json!({ "code": code, "message": message }),
        }
    }

    /// Returns the result if the node produced a meaningful one.
    ///
    /// `null`, `false`, empty strings and empty collections count as no result.
    pub fn result(&self) -> Option<&Value> {
        let present = match &self.result {
            Value::Null | Value::Bool(false) => false,
            Value::String(s) => !s.is_empty(),
            Value::Array(a) => !a.is_empty(),
            Value::Object(o) => !o.is_empty(),
            _ => true,
        };
        present.then_some(&self.result)
    }

    /// Human-readable reason the node gave, if any.
    pub fn error_message(&self) -> String {
        match &self.error {
            Value::Null => "node returned no result".to_string(),
            Value::Object(o) => match o.get("message").and_then(Value::as_str) {
                Some(message) => message.to_string(),
                None => self.error.to_string(),
            },
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}
