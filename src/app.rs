use crate::errors::ToolError;
use crate::managers::client_services::ClientServiceManager;
use crate::managers::clients::ClientManager;
use crate::managers::contacts::ContactManager;
use crate::managers::engagements::EngagementManager;
use crate::managers::notes::NoteManager;
use crate::managers::packages::PackageManager;
use crate::managers::services::ServiceCatalogManager;
use crate::managers::tasks::TaskManager;
use crate::managers::templates::TemplateManager;
use crate::managers::ManagerDeps;
use crate::mcp::catalog::load_catalog;
use crate::services::logger::Logger;
use crate::services::sodium::{ClientSlot, SodiumConfig};
use crate::services::tool_executor::{ToolExecutor, ToolHandler};
use crate::services::validation::Validation;
use std::sync::Arc;

pub struct App {
    pub logger: Logger,
    pub slot: ClientSlot,
    pub tool_executor: Arc<ToolExecutor>,
}

impl App {
    fn validate_tool_wiring(executor: &ToolExecutor) -> Result<(), ToolError> {
        let mut missing: Vec<String> = load_catalog()?
            .iter()
            .filter(|tool| !executor.has_tool(&tool.name))
            .map(|tool| tool.name.clone())
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        missing.sort();
        Err(ToolError::internal("Tool wiring is incomplete")
            .with_hint("Every tool in tool_catalog.json must have a handler.")
            .with_details(serde_json::json!({ "missing_tools": missing })))
    }

    /// Builds the application from the process environment.
    pub fn initialize() -> Result<Self, ToolError> {
        let logger = Logger::new("sodium");
        let slot = ClientSlot::from_env(&logger);
        Self::with_slot(logger, slot)
    }

    pub fn with_config(config: Result<SodiumConfig, ToolError>) -> Result<Self, ToolError> {
        let logger = Logger::new("sodium");
        let slot = ClientSlot::resolve(config, &logger);
        Self::with_slot(logger, slot)
    }

    pub fn with_slot(logger: Logger, slot: ClientSlot) -> Result<Self, ToolError> {
        let deps = ManagerDeps::new(logger.clone(), Validation::new(), slot.clone());

        let handlers: Vec<Arc<dyn ToolHandler>> = vec![
            Arc::new(ClientManager::new(&deps)),
            Arc::new(ContactManager::new(&deps)),
            Arc::new(NoteManager::new(&deps)),
            Arc::new(TaskManager::new(&deps)),
            Arc::new(ClientServiceManager::new(&deps)),
            Arc::new(EngagementManager::new(&deps)),
            Arc::new(ServiceCatalogManager::new(&deps)),
            Arc::new(TemplateManager::new(&deps)),
            Arc::new(PackageManager::new(&deps)),
        ];
        let tool_executor = ToolExecutor::new(logger.clone(), handlers);
        Self::validate_tool_wiring(&tool_executor)?;

        logger.debug(
            "application ready",
            Some(&serde_json::json!({
                "tools": tool_executor.tool_names().len(),
                "client_ready": slot.is_ready(),
            })),
        );

        Ok(Self {
            logger,
            slot,
            tool_executor: Arc::new(tool_executor),
        })
    }
}
