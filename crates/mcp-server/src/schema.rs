//! Derives prompt-argument declarations and completion eligibility from a
//! handler's JSON Schema, so a handler only has to author the schema once
//! (§4.C).

use serde_json::Value;
use std::collections::HashSet;

use mcp_protocol::types::PromptArgument;

/// Marker key a property's sub-schema carries when its value supports
/// `completion/complete` (§4.C, §4.F). Not part of the JSON Schema
/// vocabulary proper — an MCP-specific extension keyword.
pub const COMPLETABLE_MARKER: &str = "x-completable";

/// Derive the `Prompt::arguments` list from a JSON Schema object shaped like
/// a tool input schema: a `properties` map and a `required` array.
///
/// Schemas that aren't object-shaped (missing `properties` entirely) yield
/// an empty argument list rather than an error — a prompt with no arguments
/// is a perfectly ordinary prompt.
#[must_use]
pub fn prompt_arguments_from_schema(schema: &Value) -> Vec<PromptArgument> {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };

    let required: HashSet<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|values| values.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    properties
        .iter()
        .map(|(name, property)| PromptArgument {
            name: name.clone(),
            title: property
                .get("title")
                .and_then(Value::as_str)
                .map(str::to_string),
            description: property
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            required: Some(required.contains(name.as_str())),
        })
        .collect()
}

/// Whether `field_name`'s sub-schema under `schema.properties` carries the
/// [`COMPLETABLE_MARKER`] set to `true`.
#[must_use]
pub fn is_completable(schema: &Value, field_name: &str) -> bool {
    schema
        .get("properties")
        .and_then(|properties| properties.get(field_name))
        .and_then(|field| field.get(COMPLETABLE_MARKER))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Every property name in `schema` marked completable, in schema order is
/// not guaranteed since `properties` is a JSON object — callers that need a
/// stable order should sort the result themselves.
#[must_use]
pub fn completable_fields(schema: &Value) -> Vec<String> {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };

    properties
        .iter()
        .filter(|(name, _)| is_completable(schema, name))
        .map(|(name, _)| name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn derives_arguments_with_required_flags() {
        let schema = json!({
            "type": "object",
            "properties": {
                "city": {"type": "string", "description": "City name"},
                "unit": {"type": "string"},
            },
            "required": ["city"],
        });

        let mut arguments = prompt_arguments_from_schema(&schema);
        arguments.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(arguments.len(), 2);
        assert_eq!(arguments[0].name, "city");
        assert_eq!(arguments[0].required, Some(true));
        assert_eq!(arguments[0].description.as_deref(), Some("City name"));
        assert_eq!(arguments[1].name, "unit");
        assert_eq!(arguments[1].required, Some(false));
    }

    #[test]
    fn schema_without_properties_yields_no_arguments() {
        let schema = json!({"type": "object"});
        assert!(prompt_arguments_from_schema(&schema).is_empty());
    }

    #[test]
    fn detects_the_completable_marker() {
        let schema = json!({
            "properties": {
                "city": {"type": "string", "x-completable": true},
                "unit": {"type": "string"},
            },
        });

        assert!(is_completable(&schema, "city"));
        assert!(!is_completable(&schema, "unit"));
        assert!(!is_completable(&schema, "missing"));
        assert_eq!(completable_fields(&schema), vec!["city".to_string()]);
    }
}
