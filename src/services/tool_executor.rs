use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::errors::{HandlerError, ToolError};
use crate::services::logger::Logger;
use crate::utils::suggest::suggest;

/// A tool name and the activity phrase used in its failure report
/// (`Error <activity>: <message>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: &'static str,
    pub activity: &'static str,
}

impl ToolSpec {
    pub const fn new(name: &'static str, activity: &'static str) -> Self {
        Self { name, activity }
    }
}

#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn tools(&self) -> &'static [ToolSpec];

    async fn handle(&self, tool: &str, args: Value) -> Result<String, HandlerError>;
}

/// What a tool call produced. Both variants reach the caller as ordinary
/// text; nothing a handler does is surfaced as a protocol error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    Success(String),
    Failure(String),
}

impl ToolOutcome {
    pub fn from_result(activity: &str, result: Result<String, HandlerError>) -> Self {
        match result {
            Ok(text) => ToolOutcome::Success(text),
            Err(err) => ToolOutcome::Failure(format!("Error {}: {}", activity, err)),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            ToolOutcome::Success(text) | ToolOutcome::Failure(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            ToolOutcome::Success(text) | ToolOutcome::Failure(text) => text,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ToolOutcome::Failure(_))
    }
}

struct Route {
    handler: Arc<dyn ToolHandler>,
    activity: &'static str,
}

#[derive(Clone)]
pub struct ToolExecutor {
    logger: Logger,
    routes: Arc<HashMap<&'static str, Route>>,
}

impl ToolExecutor {
    pub fn new(logger: Logger, handlers: Vec<Arc<dyn ToolHandler>>) -> Self {
        let mut routes = HashMap::new();
        for handler in handlers {
            for spec in handler.tools() {
                routes.insert(
                    spec.name,
                    Route {
                        handler: handler.clone(),
                        activity: spec.activity,
                    },
                );
            }
        }
        Self {
            logger: logger.child("executor"),
            routes: Arc::new(routes),
        }
    }

    pub fn has_tool(&self, tool: &str) -> bool {
        self.routes.contains_key(tool)
    }

    pub fn tool_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.routes.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Runs `tool`. Only an unknown tool name is an error; every handler
    /// failure is folded into `ToolOutcome::Failure`.
    pub async fn execute(&self, tool: &str, args: Value) -> Result<ToolOutcome, ToolError> {
        let route = self.routes.get(tool).ok_or_else(|| {
            let suggestions = suggest(tool, self.routes.keys().copied(), 5);
            let err = ToolError::not_found(format!("Unknown tool: {}", tool));
            if suggestions.is_empty() {
                err.with_hint("Call tools/list to see available tools")
            } else {
                err.with_hint(format!("Did you mean: {}", suggestions.join(", ")))
            }
        })?;

        let call_id = uuid::Uuid::new_v4().to_string();
        let started = Instant::now();
        self.logger.info(
            "tool call",
            Some(&serde_json::json!({ "tool": tool, "call_id": call_id })),
        );

        let outcome = ToolOutcome::from_result(route.activity, route.handler.handle(tool, args).await);

        let meta = serde_json::json!({
            "tool": tool,
            "call_id": call_id,
            "duration_ms": started.elapsed().as_millis() as u64,
        });
        match &outcome {
            ToolOutcome::Failure(text) => self.logger.warn(text, Some(&meta)),
            ToolOutcome::Success(_) => self.logger.debug("tool call finished", Some(&meta)),
        }
        Ok(outcome)
    }
}
