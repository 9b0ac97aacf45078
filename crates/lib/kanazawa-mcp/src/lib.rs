//! MCP server implementation for kanazawa-mcp.
//!
//! This crate wires the tool dispatcher into rmcp tool handlers so the
//! municipal lookups are callable from any MCP client.

mod helpers;
mod tools;
pub mod server;

use std::sync::Arc;

use kanazawa_core::tools::ToolDispatcher;
use rmcp::{
    ErrorData,
    ServerHandler,
    handler::server::tool::ToolRouter,
    tool,
    tool_handler,
    tool_router,
};
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};

const SERVER_INSTRUCTIONS: &str = r"kanazawa-mcp answers questions about Kanazawa city services from municipal open data.

Tools:
- `get_garbage_schedule`: garbage types collected for an `area_code` on a `date` (YYYY-MM-DD).
- `search_tourist_spots`: spots whose name or description contains `keyword` (default `limit` 5).
- `get_transportation_info`: stations and stops of a `type` such as `bus_stop` or `train_station`.
- `get_bus_schedule`: departures filtered by hour (`time_range`, HH:MM), `route_name`, and `stop_name` (default `limit` 10).

Notes:
- Every result carries `data_source`: `open_data`, `local_db`, or `static` (built-in sample data).
- Identical calls within five minutes are answered from cache.
- Use `help` for examples. `health` returns `ok`.";

/// MCP server wrapper around the tool dispatcher and tool routers.
#[derive(Clone)]
pub struct KanazawaMcp {
    tool_router: ToolRouter<Self>,
    dispatcher: Arc<ToolDispatcher>,
}

impl KanazawaMcp {
    #[must_use]
    pub fn new(dispatcher: ToolDispatcher) -> Self {
        Self::with_dispatcher(Arc::new(dispatcher))
    }

    /// Creates a new server using a shared dispatcher handle.
    #[must_use]
    pub fn with_dispatcher(dispatcher: Arc<ToolDispatcher>) -> Self {
        let tool_router =
            Self::tool_router_core() + Self::tool_router_lookup() + Self::tool_router_context();
        Self {
            tool_router,
            dispatcher,
        }
    }

    #[must_use]
    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }
}

#[tool_router(router = tool_router_core, vis = "pub")]
impl KanazawaMcp {
    #[tool(description = "Health check. Returns 'ok'.")]
    async fn health(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::text("ok")]))
    }
}

#[tool_handler]
impl ServerHandler for KanazawaMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
