//! Property tests for the CSV codec, source loading and buffer payloads.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use common::csv::{escape, parse_line};
use common::mapping::MappingTarget;
use common::payload::PayloadBuilder;
use common::source::{SourceKind, TabularSource};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

proptest! {
    #[test]
    fn escaped_fields_parse_back(fields in prop::collection::vec("[a-z \",\n\r]{0,8}", 1..8)) {
        let line = fields.iter().map(|f| escape(f)).collect::<Vec<_>>().join(",");
        prop_assert_eq!(parse_line(&line), fields);
    }

    #[test]
    fn csv_row_and_header_counts(
        first in "[a-z]{1,6}",
        rest in prop::collection::vec("[ a-z]{0,6}", 0..6),
        lines in prop::collection::vec("[a-z0-9,]{1,20}", 0..30),
        blanks in prop::collection::vec(0usize..30, 0..5),
    ) {
        let header_tokens: Vec<String> = std::iter::once(first).chain(rest).collect();
        let expected_width = header_tokens.iter().filter(|t| !t.trim().is_empty()).count();

        let mut body: Vec<String> = lines.clone();
        for at in blanks {
            body.insert(at.min(body.len()), String::new());
        }
        let text = format!("{}\n{}\n", header_tokens.join(","), body.join("\n"));

        let source = TabularSource::load(SourceKind::Csv, "p.csv", &text).unwrap();
        prop_assert_eq!(source.row_count(), lines.len());
        prop_assert_eq!(source.header().len(), expected_width);
    }

    #[test]
    fn json_header_is_first_seen_key_union(
        objects in prop::collection::vec(
            prop::collection::vec(("[a-e]{1,2}", any::<i32>()), 1..5),
            1..6,
        ),
    ) {
        let values: Vec<Value> = objects
            .into_iter()
            .map(|pairs| {
                let map: Map<String, Value> =
                    pairs.into_iter().map(|(k, v)| (k, json!(v))).collect();
                Value::Object(map)
            })
            .collect();
        let mut expected: Vec<String> = Vec::new();
        for value in &values {
            if let Value::Object(map) = value {
                for key in map.keys() {
                    if !expected.contains(key) {
                        expected.push(key.clone());
                    }
                }
            }
        }

        let text = Value::Array(values).to_string();
        let source = TabularSource::load(SourceKind::Json, "p.json", &text).unwrap();
        prop_assert_eq!(source.header(), expected.as_slice());
    }

    #[test]
    fn buffers_survive_json_payloads(bytes in prop::collection::vec(any::<u8>(), 0..2048)) {
        let text = json!([{ "blob": { "type": "Buffer", "data": bytes } }]).to_string();
        let mut source = TabularSource::load(SourceKind::Json, "b.json", &text).unwrap();
        source.mapping.set("blob", MappingTarget::Field("blob".to_string()));

        let payload = PayloadBuilder::new(&source, &["blob".to_string()]).unwrap().build_json();
        let decoded: Value = serde_json::from_slice(&payload.bytes).unwrap();
        let encoded = decoded[0]["blob"].as_str().unwrap_or_default().to_string();
        prop_assert_eq!(BASE64.decode(encoded).unwrap(), bytes);
    }
}
