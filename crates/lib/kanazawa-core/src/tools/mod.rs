//! Tool catalogue, parameter decoding, cache keys, and dispatch.

pub mod dispatcher;
pub mod key;
pub mod params;
pub mod registry;

use std::error::Error;
use std::fmt;

use crate::sources::SourceError;

pub use dispatcher::{DEFAULT_CACHE_TTL, ToolDispatcher};
pub use key::cache_key;
pub use params::ToolParams;
pub use registry::{ToolDescriptor, ToolName, ToolRegistry};

/// User-facing text for failures that must not expose internal detail.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "申し訳ございません。現在システムに問題が発生しています。しばらく時間をおいてから再度お試しください。";

/// Failure of a single tool invocation.
#[derive(Debug)]
pub enum ToolError {
    UnknownTool(String),
    InvalidParameter {
        tool: &'static str,
        message: String,
    },
    Execution {
        tool: &'static str,
        source: SourceError,
    },
}

impl ToolError {
    /// Unknown tools and bad parameters are the caller's fault.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::UnknownTool(_) | Self::InvalidParameter { .. })
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTool(name) => write!(f, "unknown tool: {name}"),
            Self::InvalidParameter { tool, message } => {
                write!(f, "invalid parameters for {tool}: {message}")
            }
            Self::Execution { tool, source } => write!(f, "tool {tool} failed: {source}"),
        }
    }
}

impl Error for ToolError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Execution { source, .. } => Some(source),
            _ => None,
        }
    }
}
