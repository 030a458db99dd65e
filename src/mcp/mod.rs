//! Model Context Protocol (MCP) server implementation
//!
//! Exposes family tasks, schedules, shared checklists and calendar sync as
//! MCP tools over the Streamable HTTP transport. The HTTP layer mounts it at
//! `/mcp` behind the API key guard.
//!
//! - **server**: `McpServer`, the tool router
//! - **scope**: `FamilyScope`, the family the calling API key belongs to
//! - **tools**: one tool struct per entity, generic over `D: Database`

mod scope;
pub mod server;
mod service;
pub mod tools;

#[cfg(test)]
mod server_test;

pub use scope::FamilyScope;
pub use server::McpServer;
pub use service::create_mcp_service;
