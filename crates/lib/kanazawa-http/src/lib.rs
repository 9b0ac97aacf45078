//! REST tool API for kanazawa-mcp.
//!
//! Exposes the tool catalogue and tool execution to non-MCP clients such as
//! the chat front end:
//!
//! - `GET /health` returns `{"status": "ok"}`.
//! - `GET /mcp/tools` returns the tool descriptors.
//! - `POST /mcp/execute` takes `{"tool_name", "params"}` and returns
//!   `{"result": {"data", "data_source"}}`.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use kanazawa_core::tools::{GENERIC_FAILURE_MESSAGE, ToolDescriptor, ToolDispatcher, ToolError};
use kanazawa_store::models::ToolResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

pub const DEFAULT_API_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 8000));

/// Configuration for the REST API server.
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    pub addr: SocketAddr,
    pub max_body_bytes: usize,
    pub request_timeout: Duration,
}

impl ApiServerConfig {
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            max_body_bytes: 64 * 1024,
            request_timeout: Duration::from_secs(45),
        }
    }

    #[must_use]
    pub const fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    #[must_use]
    pub const fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_ADDR)
    }
}

/// HTTP API server wrapper.
pub struct ApiServer {
    config: ApiServerConfig,
    state: AppState,
}

impl ApiServer {
    #[must_use]
    pub const fn new(dispatcher: Arc<ToolDispatcher>, config: ApiServerConfig) -> Self {
        let state = AppState {
            dispatcher,
            request_timeout: config.request_timeout,
        };
        Self { config, state }
    }

    /// Router with every endpoint mounted, for embedding or testing.
    #[must_use]
    pub fn router(&self) -> Router {
        build_router(self.state.clone(), self.config.max_body_bytes)
    }

    /// Runs the HTTP server until shutdown.
    ///
    /// # Errors
    /// Returns any listener or server error.
    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = self.config.addr;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let app = self.router();

        info!("kanazawa-http listening on {addr}");
        axum::serve(listener, app).await?;
        Ok(())
    }
}

#[derive(Clone)]
struct AppState {
    dispatcher: Arc<ToolDispatcher>,
    request_timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn timeout() -> Self {
        Self {
            status: StatusCode::REQUEST_TIMEOUT,
            message: GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }

    fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl From<ToolError> for ApiError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::UnknownTool(_) => Self::not_found(err.to_string()),
            ToolError::InvalidParameter { .. } => Self::bad_request(err.to_string()),
            ToolError::Execution { .. } => Self::internal(),
        }
    }
}

/// Malformed bodies keep axum's status (400, 413, 415, 422) but get the JSON
/// error body.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = Json(ErrorResponse { error: self.message });
        (self.status, payload).into_response()
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Deserialize)]
struct ExecuteRequest {
    tool_name: String,
    #[serde(default)]
    params: Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct ExecuteResponse {
    result: ToolResult,
}

fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/mcp/tools", get(list_tools))
        .route("/mcp/execute", post(execute_tool))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn list_tools(State(state): State<AppState>) -> Json<Vec<ToolDescriptor>> {
    Json(state.dispatcher.list_tools().to_vec())
}

async fn execute_tool(
    State(state): State<AppState>,
    request: Result<Json<ExecuteRequest>, JsonRejection>,
) -> Result<Json<ExecuteResponse>, ApiError> {
    let Json(request) = request?;
    let result = tokio::time::timeout(
        state.request_timeout,
        state.dispatcher.execute(&request.tool_name, &request.params),
    )
    .await
    .map_err(|_| {
        warn!(tool = %request.tool_name, "tool request timed out");
        ApiError::timeout()
    })??;

    Ok(Json(ExecuteResponse { result }))
}
