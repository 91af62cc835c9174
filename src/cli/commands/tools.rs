//! Tools command implementation.

use crate::cli::Output;
use crate::tools::definitions;
use anyhow::Result;

/// List the available tools.
pub fn run_tools(json: bool) -> Result<()> {
    let defs = definitions();

    if json {
        println!("{}", serde_json::to_string_pretty(&defs)?);
        return Ok(());
    }

    Output::header(&format!("Tools ({})", defs.len()));
    for def in defs {
        Output::tool(def);
    }
    Ok(())
}
