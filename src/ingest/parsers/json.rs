use super::Parser;
use crate::error::{AltgraphError, Result};
use crate::ingest::{RawRecord, RawTags};
use serde_json::{Map, Value as JsonValue};

/// JSON product files: a top-level array of objects keyed by the CSV column names.
///
/// `price` may be a number or a string, `stock` a bool or a string, and `tags`
/// either a delimited string or an array of strings. Validation of the values is
/// left to [`RawRecord::parse`] so that bad rows surface as malformed records.
pub struct JsonParser;

impl Parser for JsonParser {
    fn can_parse(&self, extension: &str) -> bool {
        extension == "json"
    }

    fn parse(&self, content: &str, path: &str) -> Result<Vec<RawRecord>> {
        let json_value: JsonValue = serde_json::from_str(content)
            .map_err(|e| AltgraphError::Parse(format!("JSON parse error in {}: {}", path, e)))?;

        let items = match json_value {
            JsonValue::Array(items) => items,
            _ => {
                return Err(AltgraphError::Parse(format!(
                    "JSON product file {} must contain a top-level array",
                    path
                )))
            }
        };

        items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| match item {
                JsonValue::Object(map) => Ok(record_from_object(idx + 1, &map)),
                other => Err(AltgraphError::Parse(format!(
                    "JSON product file {}: element {} is not an object ({})",
                    path,
                    idx + 1,
                    json_type_name(&other)
                ))),
            })
            .collect()
    }
}

fn record_from_object(row: usize, map: &Map<String, JsonValue>) -> RawRecord {
    let tags = match map.get("tags") {
        Some(JsonValue::Array(items)) => RawTags::List(items.iter().map(scalar_text).collect()),
        Some(value) => RawTags::Delimited(scalar_text(value)),
        None => RawTags::default(),
    };

    RawRecord {
        row,
        id: field_text(map, "id"),
        category: field_text(map, "category"),
        brand: field_text(map, "brand"),
        price: field_text(map, "price"),
        stock: field_text(map, "stock"),
        tags,
    }
}

fn field_text(map: &Map<String, JsonValue>, key: &str) -> String {
    map.get(key).map(scalar_text).unwrap_or_default()
}

/// Render a JSON value as the text a CSV cell would have held.
fn scalar_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
