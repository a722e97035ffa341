//! JSON rendering for resolved values
//!
//! Values are rendered the way DAG-JSON writes them: links become
//!  `{"/": "<cid>"}` and bytes become `{"/": {"bytes": "<base64>"}}`.

use base64::Engine;
use serde_json::{json, Map, Number, Value};

use common::prelude::{LinkedData, Resolution};

pub fn linked_data_to_json(value: &LinkedData) -> Value {
    match value {
        LinkedData::Null => Value::Null,
        LinkedData::Bool(b) => Value::Bool(*b),
        LinkedData::Integer(i) => integer_to_json(*i),
        LinkedData::Float(f) => Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        LinkedData::String(s) => Value::String(s.clone()),
        LinkedData::Bytes(bytes) => json!({
            "/": { "bytes": base64::engine::general_purpose::STANDARD_NO_PAD.encode(bytes) }
        }),
        LinkedData::List(items) => Value::Array(items.iter().map(linked_data_to_json).collect()),
        LinkedData::Map(entries) => Value::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), linked_data_to_json(v)))
                .collect::<Map<_, _>>(),
        ),
        LinkedData::Link(cid) => json!({ "/": cid.to_string() }),
    }
}

// integers past the i64 / u64 range have no json number form
fn integer_to_json(i: i128) -> Value {
    if let Ok(i) = i64::try_from(i) {
        Value::from(i)
    } else if let Ok(u) = u64::try_from(i) {
        Value::from(u)
    } else {
        Value::String(i.to_string())
    }
}

pub fn resolution_to_json(resolution: &Resolution) -> Value {
    json!({
        "remainderPath": resolution.remainder_path,
        "value": resolution.value.as_ref().map(linked_data_to_json),
    })
}
