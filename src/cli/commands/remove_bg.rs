//! Background removal command implementation.

use crate::cli::Output;
use crate::media::ImageFormat;
use crate::tools::image_background_removal::{image_background_removal, ImageBackgroundRemovalInput};
use crate::tools::ToolContext;
use anyhow::Result;

/// Remove the background from an image and report where the result went.
pub async fn run_remove_bg(
    image: &str,
    format: Option<ImageFormat>,
    output: Option<String>,
    json: bool,
    ctx: &ToolContext,
) -> Result<()> {
    let mut input = ImageBackgroundRemovalInput::new(image);
    input.output_format = format;
    input.output_path = output;

    let spinner = (!json).then(|| Output::spinner("Removing background..."));
    let result = image_background_removal(ctx, input).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let result = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    Output::success(&format!("Background removed ({})", result.format));
    if let (Some(w), Some(h)) = (result.width, result.height) {
        Output::kv("Size", &format!("{}x{}", w, h));
    }
    if let Some(bytes) = result.size_bytes {
        Output::kv("Bytes", &bytes.to_string());
    }
    if let Some(path) = &result.saved_to {
        Output::kv("Saved to", path);
    }
    if let Some(url) = &result.image_url {
        Output::kv("URL", url);
    }
    Ok(())
}
