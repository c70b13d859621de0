use crate::errors::ToolError;
use base64::Engine;
use serde_json::{Map, Value};

/// Argument coercion for tool handlers. Arguments have already passed the
/// catalog schema, so these mostly guard against blank strings and give
/// handlers typed access.
#[derive(Clone)]
pub struct Validation;

impl Validation {
    pub fn new() -> Self {
        Self
    }

    pub fn ensure_string(
        &self,
        value: &Value,
        label: &str,
        trim: bool,
    ) -> Result<String, ToolError> {
        let text = value.as_str().ok_or_else(|| {
            ToolError::invalid_params(format!("{} must be a non-empty string", label))
        })?;
        let normalized = text.trim();
        if normalized.is_empty() {
            return Err(ToolError::invalid_params(format!(
                "{} must be a non-empty string",
                label
            )));
        }
        Ok(if trim {
            normalized.to_string()
        } else {
            text.to_string()
        })
    }

    /// Resource codes end up as path segments, so they are trimmed and must
    /// not be blank.
    pub fn ensure_code(&self, args: &Value, key: &str) -> Result<String, ToolError> {
        let value = args
            .get(key)
            .ok_or_else(|| ToolError::invalid_params(format!("{} is required", key)))?;
        self.ensure_string(value, key, true)
    }

    pub fn ensure_optional_bool(
        &self,
        args: &Value,
        key: &str,
    ) -> Result<Option<bool>, ToolError> {
        match args.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(flag)) => Ok(Some(*flag)),
            Some(_) => Err(ToolError::invalid_params(format!("{} must be a boolean", key))),
        }
    }

    pub fn ensure_string_list(
        &self,
        args: &Value,
        key: &str,
    ) -> Result<Option<Vec<String>>, ToolError> {
        match args.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| self.ensure_string(item, key, true))
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(_) => Err(ToolError::invalid_params(format!(
                "{} must be an array of strings",
                key
            ))),
        }
    }

    /// Copies the listed keys from `args` into a request body, skipping keys
    /// that are absent or null.
    pub fn select_fields(&self, args: &Value, keys: &[&str]) -> Value {
        let mut body = Map::new();
        for key in keys {
            if let Some(value) = args.get(*key).filter(|v| !v.is_null()) {
                body.insert((*key).to_string(), value.clone());
            }
        }
        Value::Object(body)
    }

    pub fn ensure_base64(&self, args: &Value, key: &str) -> Result<String, ToolError> {
        let content = self.ensure_string(
            args.get(key).unwrap_or(&Value::Null),
            key,
            true,
        )?;
        base64::engine::general_purpose::STANDARD
            .decode(content.as_bytes())
            .map_err(|err| {
                ToolError::invalid_params(format!("{} must be base64-encoded: {}", key, err))
            })?;
        Ok(content)
    }
}

impl Default for Validation {
    fn default() -> Self {
        Self::new()
    }
}
