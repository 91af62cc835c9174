//! MCP command implementation.

use crate::mcp::McpServer;
use crate::tools::ToolRegistry;
use anyhow::Result;

/// Run the MCP server.
pub async fn run_mcp(registry: ToolRegistry) -> Result<()> {
    let server = McpServer::new(registry);
    server.run().await
}
