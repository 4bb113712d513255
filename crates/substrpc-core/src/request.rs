//! JSON-RPC 2.0 wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC request ID: string, number, or null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(u64),
    String(String),
    Null,
}

impl RpcId {
    pub fn number(n: u64) -> Self {
        Self::Number(n)
    }

    /// The numeric id, if this is one. Sessions only ever issue numeric ids.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl std::fmt::Display for RpcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Null => write!(f, "null"),
        }
    }
}

/// A subscription id assigned by the node.
///
/// Substrate nodes hand out strings, some implementations hand out numbers.
/// Both are kept as received so the unsubscribe call echoes them verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubscriptionId {
    Number(u64),
    String(String),
}

impl SubscriptionId {
    /// Parse a subscription id from a response `result`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Number(n) => n.as_u64().map(Self::Number),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Number(n) => Value::from(*n),
            Self::String(s) => Value::String(s.clone()),
        }
    }
}

impl From<String> for SubscriptionId {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

/// A single JSON-RPC parameter value.
pub type RpcParam = Value;

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Vec<RpcParam>,
    pub id: RpcId,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC 2.0 request.
    pub fn new(id: u64, method: impl Into<String>, params: Vec<RpcParam>) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            method: method.into(),
            params,
            id: RpcId::Number(id),
        }
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JSON-RPC error {}: {}", self.code, self.message)
    }
}

/// A JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default = "jsonrpc_version")]
    pub jsonrpc: String,
    pub id: RpcId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

fn jsonrpc_version() -> String {
    "2.0".into()
}

impl JsonRpcResponse {
    /// Returns `true` if this is a successful response (has result, no error).
    pub fn is_ok(&self) -> bool {
        self.error.is_none() && self.result.is_some()
    }

    /// Unwrap the result value or return an error.
    pub fn into_result(self) -> Result<Value, JsonRpcError> {
        if let Some(err) = self.error {
            Err(err)
        } else {
            Ok(self.result.unwrap_or(Value::Null))
        }
    }
}

/// Payload of a subscription push.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationParams {
    pub subscription: SubscriptionId,
    #[serde(default)]
    pub result: Value,
}

/// A server-pushed subscription notification (no `id`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default = "jsonrpc_version")]
    pub jsonrpc: String,
    pub method: String,
    pub params: NotificationParams,
}

/// An incoming text frame, classified.
#[derive(Debug, Clone)]
pub enum IncomingFrame {
    Response(JsonRpcResponse),
    Notification(Notification),
}

impl IncomingFrame {
    /// Classify a raw text frame. Frames with an `id` are responses; frames
    /// with a `method` and `params.subscription` are notifications.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let val: Value = serde_json::from_str(text)?;
        if val.get("id").is_some_and(|id| !id.is_null()) {
            return serde_json::from_value(val).map(Self::Response);
        }
        serde_json::from_value(val).map(Self::Notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serialization() {
        let req = JsonRpcRequest::new(1, "chain_getHeader", vec![]);
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"jsonrpc\":\"2.0\""));
        assert!(json.contains("\"method\":\"chain_getHeader\""));
        assert!(json.contains("\"id\":1"));
    }

    #[test]
    fn response_into_result_ok() {
        let resp = JsonRpcResponse {
            jsonrpc: "2.0".into(),
            id: RpcId::Number(1),
            result: Some(Value::String("0x12345".into())),
            error: None,
        };
        assert!(resp.is_ok());
        let val = resp.into_result().unwrap();
        assert_eq!(val, Value::String("0x12345".into()));
    }

    #[test]
    fn response_into_result_error() {
        let resp = JsonRpcResponse {
            jsonrpc: "2.0".into(),
            id: RpcId::Number(1),
            result: None,
            error: Some(JsonRpcError {
                code: 1010,
                message: "Invalid Transaction".into(),
                data: Some(Value::String("Transaction is outdated".into())),
            }),
        };
        assert!(!resp.is_ok());
        let err = resp.into_result().unwrap_err();
        assert_eq!(err.code, 1010);
    }

    #[test]
    fn null_result_is_ok_value() {
        let frame = IncomingFrame::parse(r#"{"jsonrpc":"2.0","id":4,"result":null}"#).unwrap();
        let IncomingFrame::Response(resp) = frame else {
            panic!("expected response");
        };
        assert_eq!(resp.into_result().unwrap(), Value::Null);
    }

    #[test]
    fn classify_notification_with_string_id() {
        let text = r#"{"jsonrpc":"2.0","method":"chain_newHead","params":{"subscription":"abc","result":{"number":"0x1"}}}"#;
        match IncomingFrame::parse(text).unwrap() {
            IncomingFrame::Notification(n) => {
                assert_eq!(n.method, "chain_newHead");
                assert_eq!(n.params.subscription, SubscriptionId::String("abc".into()));
                assert_eq!(n.params.result["number"], "0x1");
            }
            other => panic!("unexpected frame {other:?}"),
        }
    }

    #[test]
    fn classify_notification_with_numeric_id() {
        let text = r#"{"jsonrpc":"2.0","method":"state_storage","params":{"subscription":1,"result":[]}}"#;
        match IncomingFrame::parse(text).unwrap() {
            IncomingFrame::Notification(n) => {
                assert_eq!(n.params.subscription, SubscriptionId::Number(1));
            }
            other => panic!("unexpected frame {other:?}"),
        }
    }

    #[test]
    fn malformed_frame_is_error() {
        assert!(IncomingFrame::parse("not json").is_err());
        assert!(IncomingFrame::parse(r#"{"jsonrpc":"2.0"}"#).is_err());
    }

    #[test]
    fn subscription_id_round_trips_through_value() {
        let id = SubscriptionId::from_value(&Value::from(7u64)).unwrap();
        assert_eq!(id.to_value(), Value::from(7u64));
        assert!(SubscriptionId::from_value(&Value::Bool(true)).is_none());
    }
}
