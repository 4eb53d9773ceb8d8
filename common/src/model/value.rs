//! Cell values, classified once at the parsing boundary.
//!
//! Source rows never hold raw `serde_json::Value`s. Every leaf is decoded into
//! a `CellValue` when the file or query result is loaded, so the preview and
//! payload paths match on a closed set of variants instead of re-inspecting
//! object shapes.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::{Map, Number, Value};

/// Maximum number of characters shown for one preview cell.
pub const PREVIEW_MAX_CHARS: usize = 500;

const ELLIPSIS: char = '\u{2026}';
const UNPRINTABLE: &str = "[unprintable]";

/// One decoded cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Text(String),
    Number(Number),
    Bool(bool),
    /// A serialized byte buffer: `{"type": "Buffer", "data": [u8, ...]}`.
    Bytes(Vec<u8>),
    /// Any other object or array, kept verbatim.
    Other(Value),
}

impl CellValue {
    /// Classifies a JSON value.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => CellValue::Null,
            Value::String(s) => CellValue::Text(s),
            Value::Number(n) => CellValue::Number(n),
            Value::Bool(b) => CellValue::Bool(b),
            Value::Object(map) => match buffer_bytes(&map) {
                Some(bytes) => CellValue::Bytes(bytes),
                None => CellValue::Other(Value::Object(map)),
            },
            other @ Value::Array(_) => CellValue::Other(other),
        }
    }

    /// Lossy rendering for the preview table. Never used for payloads.
    pub fn preview(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Text(s) => truncate(s),
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Bytes(bytes) => format!("base64:{}", truncate(&BASE64.encode(bytes))),
            CellValue::Other(v) => serde_json::to_string(v)
                .map(|s| truncate(&s))
                .unwrap_or_else(|_| UNPRINTABLE.to_string()),
        }
    }

    /// Value written into a JSON upload payload.
    ///
    /// Nulls become `""`, byte buffers their full base64 text, other objects
    /// their JSON text. Primitives pass through unchanged.
    pub fn to_payload(&self) -> Value {
        match self {
            CellValue::Null => Value::String(String::new()),
            CellValue::Text(s) => Value::String(s.clone()),
            CellValue::Number(n) => Value::Number(n.clone()),
            CellValue::Bool(b) => Value::Bool(*b),
            CellValue::Bytes(bytes) => Value::String(BASE64.encode(bytes)),
            CellValue::Other(v) => Value::String(v.to_string()),
        }
    }

    /// Text written into a CSV upload payload, before escaping.
    pub fn to_csv_text(&self) -> String {
        match self.to_payload() {
            Value::String(s) => s,
            other => other.to_string(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

/// Extracts the byte array of a buffer-shaped object.
///
/// Returns `None` when the object is not buffer-shaped or when any element of
/// `data` is not an integer in `0..=255`; such objects stay `Other`.
fn buffer_bytes(map: &Map<String, Value>) -> Option<Vec<u8>> {
    if map.get("type").and_then(Value::as_str) != Some("Buffer") {
        return None;
    }
    map.get("data")?
        .as_array()?
        .iter()
        .map(|b| b.as_u64().and_then(|n| u8::try_from(n).ok()))
        .collect()
}

fn truncate(s: &str) -> String {
    match s.char_indices().nth(PREVIEW_MAX_CHARS) {
        Some((idx, _)) => {
            let mut out = s[..idx].to_string();
            out.push(ELLIPSIS);
            out
        }
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_leaves() {
        assert_eq!(CellValue::from_json(json!(null)), CellValue::Null);
        assert_eq!(CellValue::from_json(json!("x")), CellValue::from("x"));
        assert_eq!(CellValue::from_json(json!(true)), CellValue::Bool(true));
        assert_eq!(
            CellValue::from_json(json!({"type": "Buffer", "data": [1, 2, 255]})),
            CellValue::Bytes(vec![1, 2, 255])
        );
        assert!(matches!(
            CellValue::from_json(json!({"type": "Buffer", "data": [256]})),
            CellValue::Other(_)
        ));
        assert!(matches!(CellValue::from_json(json!([1, 2])), CellValue::Other(_)));
    }

    #[test]
    fn preview_truncates_long_text() {
        let long = "a".repeat(PREVIEW_MAX_CHARS + 20);
        let shown = CellValue::from(long).preview();
        assert_eq!(shown.chars().count(), PREVIEW_MAX_CHARS + 1);
        assert!(shown.ends_with(ELLIPSIS));

        let exact = "b".repeat(PREVIEW_MAX_CHARS);
        assert_eq!(CellValue::from(exact.clone()).preview(), exact);
    }

    #[test]
    fn preview_renders_buffers_and_objects() {
        let buf = CellValue::Bytes(b"hello".to_vec());
        assert_eq!(buf.preview(), "base64:aGVsbG8=");

        let obj = CellValue::from_json(json!({"k": [1, 2]}));
        assert_eq!(obj.preview(), r#"{"k":[1,2]}"#);
        assert_eq!(CellValue::Null.preview(), "");
        assert_eq!(CellValue::from_json(json!(1.5)).preview(), "1.5");
    }

    #[test]
    fn payload_normalization() {
        assert_eq!(CellValue::Null.to_payload(), json!(""));
        assert_eq!(CellValue::from_json(json!(42)).to_payload(), json!(42));
        assert_eq!(CellValue::Bool(false).to_payload(), json!(false));
        assert_eq!(
            CellValue::from_json(json!({"a": 1})).to_payload(),
            json!(r#"{"a":1}"#)
        );
        assert_eq!(
            CellValue::from_json(json!({"type": "Buffer", "data": [104, 105]})).to_payload(),
            json!("aGk=")
        );
        assert_eq!(CellValue::from_json(json!(7)).to_csv_text(), "7");
    }

    #[test]
    fn payload_bytes_are_never_truncated() {
        let bytes: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let encoded = CellValue::Bytes(bytes.clone()).to_payload();
        let text = encoded.as_str().unwrap_or_default();
        assert_eq!(BASE64.decode(text).unwrap(), bytes);
    }
}
