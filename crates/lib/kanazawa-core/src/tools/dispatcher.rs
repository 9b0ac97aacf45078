use std::sync::Arc;
use std::time::Duration;

use kanazawa_store::models::ToolResult;
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use super::{ToolDescriptor, ToolError, ToolParams, ToolRegistry, cache_key};
use crate::cache::CacheStore;
use crate::sources::ToolBackend;

/// Lifetime of a cached tool result.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Validates, caches, and executes tool calls.
///
/// Each call runs: name lookup, parameter decoding, cache read, backend, cache
/// write. Failures before the backend never touch the cache. Cache backend
/// errors are logged and treated as a miss (read) or skipped (write).
#[derive(Clone)]
pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
    cache: Arc<dyn CacheStore>,
    backend: Arc<dyn ToolBackend>,
    ttl: Duration,
}

impl ToolDispatcher {
    #[must_use]
    pub fn new(
        registry: Arc<ToolRegistry>,
        cache: Arc<dyn CacheStore>,
        backend: Arc<dyn ToolBackend>,
    ) -> Self {
        Self {
            registry,
            cache,
            backend,
            ttl: DEFAULT_CACHE_TTL,
        }
    }

    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    #[must_use]
    pub fn list_tools(&self) -> &[ToolDescriptor] {
        self.registry.list_tools()
    }

    /// Executes `tool_name` with `params`.
    ///
    /// # Errors
    /// Returns `ToolError::UnknownTool` or `ToolError::InvalidParameter` before
    /// any cache or backend access, and `ToolError::Execution` when the backend
    /// fails.
    pub async fn execute(
        &self,
        tool_name: &str,
        params: &Map<String, Value>,
    ) -> Result<ToolResult, ToolError> {
        let Some(tool) = self.registry.lookup(tool_name) else {
            warn!(tool = tool_name, "unknown tool requested");
            return Err(ToolError::UnknownTool(tool_name.to_string()));
        };
        let decoded = ToolParams::decode(tool, params)?;
        let key = cache_key(tool.as_str(), params);

        if let Some(result) = self.cached(&key).await {
            debug!(%tool, data_source = result.data_source.as_str(), "cache hit");
            return Ok(result);
        }
        debug!(%tool, "cache miss");

        let result = self.backend.run(&decoded).await.map_err(|source| {
            error!(
                %tool,
                params = %serde_json::Value::Object(params.clone()),
                error = %source,
                "tool execution failed"
            );
            ToolError::Execution {
                tool: tool.as_str(),
                source,
            }
        })?;

        self.store(&key, &result).await;
        Ok(result)
    }

    async fn cached(&self, key: &str) -> Option<ToolResult> {
        let value = match self.cache.get(key).await {
            Ok(value) => value?,
            Err(err) => {
                warn!(key, error = %err, "cache read failed");
                return None;
            }
        };
        match ToolResult::from_json(&value) {
            Ok(result) => Some(result),
            Err(err) => {
                warn!(key, error = %err, "discarding undecodable cache entry");
                None
            }
        }
    }

    async fn store(&self, key: &str, result: &ToolResult) {
        let value = match result.to_json() {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "tool result not cacheable");
                return;
            }
        };
        if let Err(err) = self.cache.set(key, value, self.ttl).await {
            warn!(key, error = %err, "cache write failed");
        }
    }
}
