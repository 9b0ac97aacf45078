//! Domain records and schema helpers for kanazawa-mcp.
//!
//! This crate defines the read-only records every data tier materializes, the
//! `ToolResult` envelope cached and returned by the dispatcher, and the table
//! and dataset names shared by the stores and the open-data fetcher.

pub mod models;
pub mod schema;

pub use models::*;
