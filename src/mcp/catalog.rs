use crate::errors::{ErrorCode, McpError, ToolError};
use crate::utils::suggest::suggest;
use jsonschema::error::{TypeKind, ValidationErrorKind};
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

struct Catalog {
    tools: Vec<ToolDef>,
    validators: HashMap<String, JSONSchema>,
}

static CATALOG: Lazy<Result<Catalog, String>> = Lazy::new(|| {
    let raw = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tool_catalog.json"));
    let tools: Vec<ToolDef> = serde_json::from_str(raw)
        .map_err(|err| format!("tool_catalog.json is not valid: {}", err))?;
    let mut validators = HashMap::new();
    for tool in &tools {
        let compiled = JSONSchema::compile(&tool.input_schema)
            .map_err(|err| format!("schema for {} does not compile: {}", tool.name, err))?;
        validators.insert(tool.name.clone(), compiled);
    }
    Ok(Catalog { tools, validators })
});

/// Loads the embedded catalog, surfacing a broken catalog at start-up.
pub fn load_catalog() -> Result<&'static [ToolDef], ToolError> {
    CATALOG
        .as_ref()
        .map(|catalog| catalog.tools.as_slice())
        .map_err(|err| ToolError::internal(err.clone()))
}

pub fn tool_catalog() -> &'static [ToolDef] {
    load_catalog().unwrap_or(&[])
}

pub fn tool_by_name(name: &str) -> Option<&'static ToolDef> {
    tool_catalog().iter().find(|tool| tool.name == name)
}

pub fn unknown_tool(name: &str) -> McpError {
    let suggestions = suggest(name, tool_catalog().iter().map(|t| t.name.as_str()), 5);
    let mut message = format!("Unknown tool: {}", name);
    if !suggestions.is_empty() {
        message.push_str(&format!("\nDid you mean: {}", suggestions.join(", ")));
    }
    McpError::new(ErrorCode::InvalidParams, message)
}

/// Checks `args` against the tool's declared input schema.
pub fn validate_tool_args(tool_name: &str, args: &Value) -> Result<(), McpError> {
    let catalog = CATALOG
        .as_ref()
        .map_err(|err| McpError::new(ErrorCode::InternalError, err.clone()))?;
    let tool = tool_by_name(tool_name).ok_or_else(|| unknown_tool(tool_name))?;
    let Some(schema) = catalog.validators.get(tool_name) else {
        return Ok(());
    };
    if let Err(errors) = schema.validate(args) {
        let message = format_schema_errors(tool_name, args, errors, &tool.input_schema);
        return Err(McpError::new(ErrorCode::InvalidParams, message));
    }
    Ok(())
}

fn format_schema_errors(
    tool_name: &str,
    args: &Value,
    errors: jsonschema::ErrorIterator,
    schema: &Value,
) -> String {
    let mut rendered = Vec::new();
    let mut did_you_means = Vec::new();

    for err in errors.take(10) {
        let pointer = err.instance_path.to_string();
        let location = if pointer.is_empty() {
            "(root)".to_string()
        } else {
            pointer.clone()
        };
        match &err.kind {
            ValidationErrorKind::AdditionalProperties { unexpected } => {
                let known: Vec<String> = node_at(schema, &err.schema_path.to_string())
                    .and_then(|parent| parent.get("properties"))
                    .and_then(Value::as_object)
                    .map(|props| props.keys().cloned().collect())
                    .unwrap_or_default();
                for unknown in unexpected {
                    rendered.push(format!("{}: unknown field '{}'", location, unknown));
                    let hits = suggest(unknown, known.iter().map(String::as_str), 3);
                    if !hits.is_empty() {
                        did_you_means.push(format!("field '{}': {}", unknown, hits.join(", ")));
                    }
                }
            }
            ValidationErrorKind::Enum { options } => {
                let allowed: Vec<String> = options
                    .as_array()
                    .map(|values| {
                        values
                            .iter()
                            .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                            .collect()
                    })
                    .unwrap_or_default();
                rendered.push(format!("{}: expected one of {}", location, allowed.join(", ")));
                let received = node_at(args, &pointer)
                    .and_then(Value::as_str)
                    .unwrap_or("");
                let hits = suggest(received, allowed.iter().map(String::as_str), 3);
                if !hits.is_empty() {
                    did_you_means.push(format!("{}: {}", location, hits.join(", ")));
                }
            }
            ValidationErrorKind::Required { property } => {
                let name = property
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| property.to_string());
                rendered.push(format!("{}: missing required field '{}'", location, name));
            }
            ValidationErrorKind::Type { kind } => {
                rendered.push(format!("{}: expected {}", location, format_type_kind(kind)));
            }
            _ => rendered.push(format!("{}: {}", location, err)),
        }
    }

    let mut lines = vec![format!("Invalid arguments for {}", tool_name)];
    lines.extend(rendered.iter().map(|line| format!("- {}", line)));
    if !did_you_means.is_empty() {
        lines.push(format!("Did you mean: {}", did_you_means.join(" | ")));
    }
    lines.join("\n")
}

fn format_type_kind(kind: &TypeKind) -> String {
    match kind {
        TypeKind::Single(primitive) => primitive.to_string(),
        TypeKind::Multiple(types) => {
            let list: Vec<String> = (*types).into_iter().map(|t| t.to_string()).collect();
            list.join(" | ")
        }
    }
}

/// Follows a JSON pointer (`/a/0/b`) through objects and arrays. Schema
/// paths of `additionalProperties` errors point at the keyword, so the
/// last segment is dropped for those.
fn node_at<'a>(root: &'a Value, pointer: &str) -> Option<&'a Value> {
    let trimmed = pointer.strip_suffix("/additionalProperties").unwrap_or(pointer);
    let mut current = root;
    for segment in trimmed.split('/').filter(|s| !s.is_empty()) {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::{load_catalog, tool_by_name, validate_tool_args};
    use crate::errors::ErrorCode;
    use serde_json::json;

    #[test]
    fn catalog_loads_and_every_schema_is_an_object() {
        let tools = load_catalog().expect("catalog loads");
        assert!(tools.len() >= 40);
        for tool in tools {
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
            assert!(!tool.description.is_empty(), "{}", tool.name);
        }
    }

    #[test]
    fn missing_required_field_is_reported() {
        let err = validate_tool_args("get-client", &json!({})).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParams);
        assert!(err.message.contains("missing required field 'code'"));
    }

    #[test]
    fn unknown_fields_get_suggestions() {
        let err = validate_tool_args("list-clients", &json!({"serach": "acme"})).unwrap_err();
        assert!(err.message.contains("unknown field 'serach'"));
        assert!(err.message.contains("Did you mean: field 'serach': search"));
    }

    #[test]
    fn enum_violations_list_allowed_values() {
        let err = validate_tool_args(
            "create-engagement",
            &json!({"clientCode": "C1", "date": "2024-01-01", "type": "Letter"}),
        )
        .unwrap_err();
        assert!(err
            .message
            .contains("expected one of ProposalAndEngagementLetter, EngagementLetter"));
    }

    #[test]
    fn unknown_tool_is_invalid_params() {
        let err = validate_tool_args("list-client", &json!({})).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParams);
        assert!(err.message.contains("list-clients"));
        assert!(tool_by_name("list-client").is_none());
    }

    #[test]
    fn valid_arguments_pass() {
        validate_tool_args(
            "list-service-packages",
            &json!({"service": ["S1", "S2"], "limit": 10}),
        )
        .expect("valid");
    }
}
