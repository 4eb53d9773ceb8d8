use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /save-db` and `POST /connect-source-db`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DatabaseUrlRequest {
    pub database_url: String,
}

/// Body of `POST /create-table`. The DDL is sent as typed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CreateTableRequest {
    pub create_sql: String,
}

/// Body of `POST /execute-query`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExecuteQueryRequest {
    pub query: String,
    pub limit: usize,
}

fn default_chunk_size() -> u32 {
    1000
}

fn default_true() -> bool {
    true
}

/// Body of `POST /transfer/start`: a server-side copy from the source
/// database into the destination table, without going through the browser.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TransferStartRequest {
    pub query: String,
    pub target_table: String,
    pub target_columns: Vec<String>,
    /// Target column to source column.
    #[serde(default)]
    pub source_to_target_mapping: BTreeMap<String, String>,
    #[serde(default)]
    pub primary_key: Vec<String>,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,
    #[serde(default = "default_true")]
    pub on_conflict_do_nothing: bool,
}

/// Generic `{status, message}` acknowledgement.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct StatusMessage {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Answer of `GET /source-db-status` and `POST /connect-source-db`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SourceDbStatus {
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub status: Option<String>,
    /// Already masked by the server.
    #[serde(default)]
    pub database_url: Option<String>,
}

impl SourceDbStatus {
    pub fn is_connected(&self) -> bool {
        self.connected || self.status.as_deref() == Some("connected")
    }
}

/// Liveness of the selected endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connection {
    Connected,
    Disconnected,
}

impl Connection {
    pub fn label(&self) -> &'static str {
        match self {
            Connection::Connected => "Connected",
            Connection::Disconnected => "Disconnected",
        }
    }
}

/// Error body of every failing endpoint.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Value,
}

impl ErrorBody {
    pub fn message(&self) -> String {
        detail_to_string(&self.detail)
    }
}

/// Flattens an error `detail` of any shape into one displayable line:
/// strings as is, objects through their `error` field, anything else as
/// JSON text.
pub fn detail_to_string(detail: &Value) -> String {
    match detail {
        Value::String(text) => text.clone(),
        Value::Object(map) => match map.get("error") {
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => detail.to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_error_details() {
        assert_eq!(detail_to_string(&json!("Table not found")), "Table not found");
        assert_eq!(detail_to_string(&json!({"error": "bad pk"})), "bad pk");
        assert_eq!(detail_to_string(&json!({"code": 3})), r#"{"code":3}"#);
        assert_eq!(detail_to_string(&json!([1, 2])), "[1,2]");
        let body: ErrorBody = serde_json::from_str("{}").unwrap();
        assert_eq!(body.message(), "null");
        assert_eq!(detail_to_string(&Value::Null), "null");
    }

    #[test]
    fn transfer_defaults() {
        let request: TransferStartRequest = serde_json::from_value(json!({
            "query": "SELECT 1",
            "target_table": "t",
            "target_columns": ["a"]
        }))
        .unwrap();
        assert_eq!(request.chunk_size, 1000);
        assert!(request.on_conflict_do_nothing);
        assert!(request.primary_key.is_empty());
    }

    #[test]
    fn source_status_accepts_both_shapes() {
        let connect: SourceDbStatus =
            serde_json::from_str(r#"{"status":"connected","database_url":"x"}"#).unwrap();
        assert!(connect.is_connected());
        let status: SourceDbStatus = serde_json::from_str(r#"{"connected":false}"#).unwrap();
        assert!(!status.is_connected());
    }
}
