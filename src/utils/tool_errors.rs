use crate::errors::ToolError;
use crate::services::tool_executor::ToolSpec;
use crate::utils::suggest::suggest;

/// Raised when a manager is asked for a tool it does not serve.
pub fn unknown_tool_error(manager: &str, tool: &str, served: &[ToolSpec]) -> ToolError {
    let names: Vec<&str> = served.iter().map(|spec| spec.name).collect();
    let suggestions = suggest(tool, names.iter().copied(), 3);
    let mut hint = format!("{} serves: {}.", manager, names.join(", "));
    if !suggestions.is_empty() {
        hint = format!("Did you mean: {}? {}", suggestions.join(", "), hint);
    }
    ToolError::invalid_params(format!("Unknown {} tool: {}", manager, tool))
        .with_hint(hint)
        .with_details(serde_json::json!({
            "known_tools": names,
            "did_you_mean": suggestions,
        }))
}

#[cfg(test)]
mod tests {
    use super::unknown_tool_error;
    use crate::services::tool_executor::ToolSpec;

    #[test]
    fn names_the_manager_and_suggests_neighbours() {
        let served = [
            ToolSpec::new("list-tasks", "listing tasks"),
            ToolSpec::new("get-task", "getting task"),
        ];
        let err = unknown_tool_error("tasks", "get-tasks", &served);
        assert_eq!(err.message, "Unknown tasks tool: get-tasks");
        let hint = err.hint.unwrap_or_default();
        assert!(hint.starts_with("Did you mean: get-task"));
        assert!(hint.contains("list-tasks, get-task"));
    }
}
