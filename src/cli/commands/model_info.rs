//! Model info command implementation.

use crate::cli::Output;
use crate::error::Result as KlippResult;
use crate::tools::get_video_model_info::{get_video_model_info, GetVideoModelInfoInput, GetVideoModelInfoOutput};
use crate::tools::ToolContext;
use anyhow::Result;
use futures::stream::{self, StreamExt};

const MAX_CONCURRENT_LOOKUPS: usize = 4;

/// Look up one or more video models.
pub async fn run_model_info(models: &[String], json: bool, ctx: &ToolContext) -> Result<()> {
    let spinner = (!json).then(|| Output::spinner(&format!("Looking up {} model(s)...", models.len())));

    let results = lookup_all(ctx, models).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let mut failed = 0;
    let mut found = Vec::new();
    for (model, result) in models.iter().zip(results) {
        match result {
            Ok(output) => found.push(output),
            Err(e) => {
                failed += 1;
                Output::error(&format!("{}: {}", model, e));
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
    } else {
        for output in &found {
            print_model(output);
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} lookups failed", failed, models.len());
    }
    Ok(())
}

/// Run lookups concurrently, returning results in request order.
async fn lookup_all(ctx: &ToolContext, models: &[String]) -> Vec<KlippResult<GetVideoModelInfoOutput>> {
    let mut indexed: Vec<(usize, KlippResult<GetVideoModelInfoOutput>)> =
        stream::iter(models.iter().enumerate())
            .map(|(i, model)| async move {
                (i, get_video_model_info(ctx, GetVideoModelInfoInput::new(model.as_str())).await)
            })
            .buffer_unordered(MAX_CONCURRENT_LOOKUPS)
            .collect()
            .await;

    indexed.sort_by_key(|(i, _)| *i);
    indexed.into_iter().map(|(_, result)| result).collect()
}

fn print_model(output: &GetVideoModelInfoOutput) {
    Output::header(&output.name);
    Output::kv("Model", &output.model);
    Output::kv("Provider", &output.provider);
    if let Some(description) = &output.description {
        Output::kv("Description", description);
    }
    if !output.capabilities.is_empty() {
        let caps: Vec<&str> = output.capabilities.iter().map(|c| c.as_str()).collect();
        Output::kv("Capabilities", &caps.join(", "));
    }
    if let Some(duration) = output.max_duration_seconds {
        Output::kv("Max duration", &format!("{}s", duration));
    }
    if !output.resolutions.is_empty() {
        Output::kv("Resolutions", &output.resolutions.join(", "));
    }
    if !output.aspect_ratios.is_empty() {
        Output::kv("Aspect ratios", &output.aspect_ratios.join(", "));
    }
    if let Some(fps) = output.fps {
        Output::kv("FPS", &fps.to_string());
    }
    if let Some(pricing) = &output.pricing {
        Output::kv("Pricing", &pricing.to_string());
    }
    if let Some(released) = output.released_at {
        Output::kv("Released", &released.format("%Y-%m-%d").to_string());
    }
}
