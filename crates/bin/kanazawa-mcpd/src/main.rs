//! Daemon entry point for the Kanazawa MCP server.
//!
//! Loads configuration from the environment, wires the dispatcher, and serves
//! MCP (stdio or streamable HTTP) and the REST tool API.

mod config;
mod wiring;

use std::sync::Arc;

use kanazawa_http::{ApiServer, ApiServerConfig};
use kanazawa_mcp::server::{serve_stdio, serve_streamable_http};
use tokio::task::JoinSet;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::KanazawaConfig;
use crate::wiring::build_dispatcher;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    init_tracing();

    let config = KanazawaConfig::from_args()?;
    let dispatcher = Arc::new(build_dispatcher(&config).await?);

    let mut servers: JoinSet<Result<(), BoxError>> = JoinSet::new();
    if config.mcp_serve {
        servers.spawn(serve_streamable_http(dispatcher.clone(), config.mcp_http_addr));
    }
    if config.api_serve {
        let api_config =
            ApiServerConfig::new(config.api_addr).with_request_timeout(config.api_timeout);
        servers.spawn(ApiServer::new(dispatcher.clone(), api_config).serve());
    }

    if config.enable_stdio {
        info!("serving MCP over stdio");
        serve_stdio(dispatcher).await?;
        return Ok(());
    }

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("shutting down");
        }
        Some(result) = servers.join_next() => {
            result??;
        }
    }
    Ok(())
}

/// Logs go to stderr so stdout stays free for the stdio transport.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
