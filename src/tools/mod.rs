//! Agent tools and the registry that dispatches calls to them.

pub mod get_video_model_info;
pub mod image_background_removal;

mod context;
mod definition;

pub use context::ToolContext;
pub use definition::{ToolAnnotations, ToolDefinition};

use crate::error::{KlippError, Result};
use get_video_model_info::{get_video_model_info_tool_definition, GetVideoModelInfoInput};
use image_background_removal::{image_background_removal_tool_definition, ImageBackgroundRemovalInput};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

/// All tool definitions, in a stable order.
pub fn definitions() -> Vec<&'static ToolDefinition> {
    vec![
        get_video_model_info_tool_definition(),
        image_background_removal_tool_definition(),
    ]
}

/// Find a tool definition by name.
pub fn find_definition(name: &str) -> Option<&'static ToolDefinition> {
    definitions().into_iter().find(|def| def.name == name)
}

/// Result of a tool call: the structured value plus a text rendering of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolOutput {
    pub structured: Value,
    pub summary: String,
}

/// Dispatches tool calls by name.
#[derive(Clone)]
pub struct ToolRegistry {
    ctx: ToolContext,
}

impl ToolRegistry {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }

    /// Call a tool with JSON arguments. Missing arguments are treated as `{}`.
    #[instrument(skip(self, arguments))]
    pub async fn call(&self, name: &str, arguments: Option<Value>) -> Result<ToolOutput> {
        let arguments = arguments.unwrap_or_else(|| Value::Object(Default::default()));
        debug!("Tool arguments: {}", arguments);

        match name {
            "get_video_model_info" => {
                let input: GetVideoModelInfoInput = parse_arguments(name, arguments)?;
                let output = get_video_model_info::get_video_model_info(&self.ctx, input).await?;
                let summary = output.summary.clone();
                to_tool_output(&output, summary)
            }
            "image_background_removal" => {
                let input: ImageBackgroundRemovalInput = parse_arguments(name, arguments)?;
                let output =
                    image_background_removal::image_background_removal(&self.ctx, input).await?;
                let summary = output.summary();
                to_tool_output(&output, summary)
            }
            _ => Err(KlippError::UnknownTool(name.to_string())),
        }
    }
}

fn parse_arguments<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T> {
    serde_json::from_value(arguments)
        .map_err(|e| KlippError::InvalidInput(format!("invalid arguments for {}: {}", tool, e)))
}

fn to_tool_output<T: Serialize>(output: &T, summary: String) -> Result<ToolOutput> {
    Ok(ToolOutput {
        structured: serde_json::to_value(output)?,
        summary,
    })
}
