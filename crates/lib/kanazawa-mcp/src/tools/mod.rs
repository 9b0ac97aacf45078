//! MCP tool modules.
//!
//! `lookup` exposes the municipal data tools; `context` carries usage help.

mod context;
pub mod lookup;
