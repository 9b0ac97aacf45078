//! Core services for kanazawa-mcp.
//!
//! This crate owns the tool registry and dispatcher, the result cache, and the
//! three-tier data-source chain (open-data portal, `SurrealDB` local store,
//! embedded fallback data) each tool consults.

pub mod cache;
pub mod fallback;
pub mod filter;
pub mod opendata;
pub mod sources;
pub mod store;
pub mod tools;
