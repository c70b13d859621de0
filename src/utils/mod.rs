pub mod report;
pub mod suggest;
pub mod tool_errors;
