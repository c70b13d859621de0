pub mod logger;
pub mod sodium;
pub mod tool_executor;
pub mod validation;
