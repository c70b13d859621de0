mod client;
mod config;
mod query;
mod resources;

pub use client::{unwrap_page, SodiumClient};
pub use config::SodiumConfig;
pub use query::QueryParams;
pub use resources::Collection;

use crate::errors::ToolError;
use crate::services::logger::Logger;
use std::sync::Arc;

/// The process-wide client, or the reason it could not be built.
///
/// Resolved once at start-up and shared by every manager. A failed slot stays
/// failed: each tool call reports the configuration error and no request is
/// ever sent.
#[derive(Clone)]
pub struct ClientSlot {
    inner: Arc<Result<SodiumClient, ToolError>>,
}

impl ClientSlot {
    pub fn ready(client: SodiumClient) -> Self {
        Self {
            inner: Arc::new(Ok(client)),
        }
    }

    pub fn failed(err: ToolError) -> Self {
        Self {
            inner: Arc::new(Err(err)),
        }
    }

    pub fn resolve(config: Result<SodiumConfig, ToolError>, logger: &Logger) -> Self {
        match config.and_then(|config| SodiumClient::new(config, logger)) {
            Ok(client) => Self::ready(client),
            Err(err) => {
                logger.warn(
                    "Sodium client unavailable",
                    Some(&serde_json::json!({ "error": err.message })),
                );
                Self::failed(err)
            }
        }
    }

    pub fn from_env(logger: &Logger) -> Self {
        Self::resolve(SodiumConfig::from_env(), logger)
    }

    pub fn client(&self) -> Result<&SodiumClient, ToolError> {
        (*self.inner).as_ref().map_err(|err| err.clone())
    }

    pub fn is_ready(&self) -> bool {
        self.inner.is_ok()
    }
}
