//! Video model lookup handler.

use super::schema::{
    get_video_model_info_input_schema, get_video_model_info_output_schema, GetVideoModelInfoInput,
    GetVideoModelInfoOutput,
};
use crate::error::Result;
use crate::media::VideoCapability;
use crate::provider::VideoModelRecord;
use crate::tools::{ToolAnnotations, ToolContext, ToolDefinition};
use std::collections::BTreeSet;
use std::sync::LazyLock;
use tracing::{debug, info, instrument};

static TOOL_DEFINITION: LazyLock<ToolDefinition> = LazyLock::new(|| ToolDefinition {
    name: "get_video_model_info",
    title: "Get video model info",
    description: "Look up a video generation model and return what it can do: supported \
        modes (text-to-video, image-to-video, ...), maximum clip length, resolutions, \
        aspect ratios, frame rate and pricing. Use this before choosing a model for a \
        video generation request.",
    input_schema: get_video_model_info_input_schema().clone(),
    output_schema: get_video_model_info_output_schema().clone(),
    annotations: ToolAnnotations {
        read_only: true,
        destructive: false,
        idempotent: true,
        open_world: true,
    },
});

/// Tool definition for `get_video_model_info`.
pub fn get_video_model_info_tool_definition() -> &'static ToolDefinition {
    LazyLock::force(&TOOL_DEFINITION)
}

/// Look up a video generation model through the configured provider.
#[instrument(skip(ctx, input), fields(model = %input.model))]
pub async fn get_video_model_info(
    ctx: &ToolContext,
    input: GetVideoModelInfoInput,
) -> Result<GetVideoModelInfoOutput> {
    input.validate()?;
    let requested = input.model.as_str();

    let record = ctx.provider.video_model(requested).await?;
    info!(provider = ctx.provider.name(), "Fetched video model record");

    Ok(normalize(requested, record))
}

/// Turn a loosely-filled provider record into the tool output.
fn normalize(requested: &str, record: VideoModelRecord) -> GetVideoModelInfoOutput {
    let model = non_empty(Some(record.id)).unwrap_or_else(|| requested.to_string());
    let name = non_empty(record.name).unwrap_or_else(|| model.clone());
    let provider = non_empty(record.provider)
        .or_else(|| model.split_once('/').map(|(org, _)| org.to_string()))
        .unwrap_or_else(|| "unknown".to_string());

    let capabilities: BTreeSet<VideoCapability> = record
        .capabilities
        .iter()
        .filter_map(|raw| {
            let parsed = VideoCapability::parse(raw);
            if parsed.is_none() {
                debug!("Ignoring unknown capability {:?}", raw);
            }
            parsed
        })
        .collect();

    let mut output = GetVideoModelInfoOutput {
        model,
        name,
        provider,
        description: non_empty(record.description),
        capabilities: capabilities.into_iter().collect(),
        max_duration_seconds: record.max_duration_seconds.filter(|d| d.is_finite() && *d > 0.0),
        resolutions: dedup_trimmed(record.resolutions),
        aspect_ratios: dedup_trimmed(record.aspect_ratios),
        fps: record.fps.filter(|fps| *fps > 0),
        pricing: record.pricing.filter(|p| p.amount_usd >= 0.0),
        released_at: record.released_at,
        summary: String::new(),
    };
    output.summary = summarize(&output);
    output
}

fn summarize(output: &GetVideoModelInfoOutput) -> String {
    let mut summary = if output.name == output.model {
        format!("{} by {}", output.model, output.provider)
    } else {
        format!("{} ({}) by {}", output.name, output.model, output.provider)
    };

    if !output.capabilities.is_empty() {
        let caps: Vec<&str> = output.capabilities.iter().map(|c| c.as_str()).collect();
        summary.push_str(&format!(": {}", caps.join(", ")));
    }
    if let Some(duration) = output.max_duration_seconds {
        summary.push_str(&format!("; up to {}s", duration));
    }
    if !output.resolutions.is_empty() {
        summary.push_str(&format!("; {}", output.resolutions.join(", ")));
    }
    if let Some(pricing) = &output.pricing {
        summary.push_str(&format!("; from {}", pricing));
    }
    summary
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Trim entries and drop blanks and repeats, keeping first-seen order.
fn dedup_trimmed(values: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && seen.insert(v.clone()))
        .collect()
}
