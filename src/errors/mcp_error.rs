use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(i32)]
pub enum ErrorCode {
    ParseError = -32700,
    InvalidRequest = -32600,
    MethodNotFound = -32601,
    InvalidParams = -32602,
    InternalError = -32603,
}

impl ErrorCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// Protocol-level failure returned as a JSON-RPC error object. Tool failures
/// against the remote API never take this path.
#[derive(Debug, Clone, Serialize)]
pub struct McpError {
    pub code: ErrorCode,
    pub message: String,
}

impl McpError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParams, message)
    }
}

impl fmt::Display for McpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for McpError {}

impl From<crate::errors::ToolError> for McpError {
    fn from(err: crate::errors::ToolError) -> Self {
        let code = match err.kind {
            crate::errors::ToolErrorKind::InvalidParams | crate::errors::ToolErrorKind::NotFound => {
                ErrorCode::InvalidParams
            }
            _ => ErrorCode::InternalError,
        };
        let message = match &err.hint {
            Some(hint) => format!("{}\nhint: {}", err.message, hint),
            None => err.message.clone(),
        };
        McpError::new(code, message)
    }
}
