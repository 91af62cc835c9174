//! MCP (Model Context Protocol) server for Klipp.
//!
//! Exposes the media tools to AI assistants over JSON-RPC 2.0 on stdio.

mod protocol;
mod server;

pub use server::McpServer;
