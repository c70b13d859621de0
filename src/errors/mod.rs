mod api_error;
mod handler_error;
mod mcp_error;
mod tool_error;

pub use api_error::ApiError;
pub use handler_error::HandlerError;
pub use mcp_error::{ErrorCode, McpError};
pub use tool_error::{ToolError, ToolErrorKind};
