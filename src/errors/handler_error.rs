use crate::errors::{ApiError, ToolError};
use thiserror::Error;

/// Anything a tool handler can fail with. Its `Display` is the uniform
/// message that ends up after `Error <activity>: `.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Tool(#[from] ToolError),
}
