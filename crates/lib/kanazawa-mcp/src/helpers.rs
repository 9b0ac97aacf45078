use std::borrow::Cow;

use kanazawa_core::tools::{GENERIC_FAILURE_MESSAGE, ToolError};
use rmcp::ErrorData;
use rmcp::model::ErrorCode;

pub fn mcp_err(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> ErrorData {
    ErrorData {
        code,
        message: message.into(),
        data: None,
    }
}

/// Client mistakes keep their message; execution failures are reported
/// generically.
pub fn map_tool_err(err: &ToolError) -> ErrorData {
    match err {
        ToolError::UnknownTool(_) => mcp_err(ErrorCode::METHOD_NOT_FOUND, err.to_string()),
        ToolError::InvalidParameter { .. } => mcp_err(ErrorCode::INVALID_PARAMS, err.to_string()),
        ToolError::Execution { .. } => mcp_err(ErrorCode::INTERNAL_ERROR, GENERIC_FAILURE_MESSAGE),
    }
}
