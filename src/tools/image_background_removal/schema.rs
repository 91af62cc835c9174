//! Input and output shapes of the `image_background_removal` tool.

use crate::error::{KlippError, Result};
use crate::media::ImageFormat;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::LazyLock;

static INPUT_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "type": "object",
        "properties": {
            "image": {
                "type": "string",
                "description": "Image to process: an http(s) URL, a base64 data URI, or a local file path (png, jpeg or webp)",
                "minLength": 1,
                "pattern": "\\S"
            },
            "output_format": {
                "type": "string",
                "enum": ["png", "webp"],
                "description": "Format of the transparent result image (default: png)"
            },
            "output_path": {
                "type": "string",
                "description": "Where to save the result. Relative paths resolve against the output directory; a trailing slash saves into that directory under a generated name. Existing files are never overwritten",
                "pattern": "\\S"
            }
        },
        "required": ["image"],
        "additionalProperties": false
    })
});

static OUTPUT_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "type": "object",
        "properties": {
            "image_url": { "type": "string", "format": "uri", "description": "Hosted result image" },
            "saved_to": { "type": "string", "description": "Local path the result was written to" },
            "format": { "type": "string", "enum": ["png", "webp"] },
            "content_type": { "type": "string" },
            "width": { "type": "integer", "minimum": 1 },
            "height": { "type": "integer", "minimum": 1 },
            "size_bytes": { "type": "integer", "minimum": 0 }
        },
        "required": ["format", "content_type"],
        "anyOf": [
            { "required": ["image_url"] },
            { "required": ["saved_to"] }
        ]
    })
});

/// JSON Schema for [`ImageBackgroundRemovalInput`].
pub fn image_background_removal_input_schema() -> &'static Value {
    LazyLock::force(&INPUT_SCHEMA)
}

/// JSON Schema for [`ImageBackgroundRemovalOutput`].
pub fn image_background_removal_output_schema() -> &'static Value {
    LazyLock::force(&OUTPUT_SCHEMA)
}

/// Arguments of a background removal call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageBackgroundRemovalInput {
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<ImageFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
}

impl ImageBackgroundRemovalInput {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            output_format: None,
            output_path: None,
        }
    }

    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn with_output_path(mut self, path: impl Into<String>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Check arguments that can be rejected without touching the image.
    pub fn validate(&self) -> Result<()> {
        if self.image.trim().is_empty() {
            return Err(KlippError::InvalidInput("image must not be empty".to_string()));
        }

        if let Some(path) = &self.output_path {
            if path.trim().is_empty() {
                return Err(KlippError::InvalidInput("output_path must not be empty".to_string()));
            }
            if let Some(ext_format) = path_format(path)? {
                if let Some(format) = self.output_format {
                    if format != ext_format {
                        return Err(KlippError::InvalidInput(format!(
                            "output_path extension says {} but output_format is {}",
                            ext_format, format
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Output format: explicit choice, then output_path extension, then `default`.
    pub fn resolved_format(&self, default: ImageFormat) -> ImageFormat {
        if let Some(format) = self.output_format {
            return format;
        }
        self.output_path
            .as_deref()
            .and_then(|path| path_format(path).ok().flatten())
            .unwrap_or(default)
    }
}

/// Format implied by a path's extension; unsupported extensions are an error.
fn path_format(path: &str) -> Result<Option<ImageFormat>> {
    if path.ends_with('/') {
        return Ok(None);
    }
    match Path::new(path).extension().and_then(|e| e.to_str()) {
        None => Ok(None),
        Some(ext) => ext.parse::<ImageFormat>().map(Some).map_err(KlippError::InvalidInput),
    }
}

/// Result of a background removal call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBackgroundRemovalOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_to: Option<String>,
    pub format: ImageFormat,
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

impl ImageBackgroundRemovalOutput {
    /// One-line description for chat and terminal output.
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("Background removed ({})", self.format)];
        if let (Some(w), Some(h)) = (self.width, self.height) {
            parts.push(format!("{}x{}", w, h));
        }
        if let Some(size) = self.size_bytes {
            parts.push(format!("{} bytes", size));
        }
        let mut summary = parts.join(", ");
        if let Some(path) = &self.saved_to {
            summary.push_str(&format!("; saved to {}", path));
        }
        if let Some(url) = &self.image_url {
            summary.push_str(&format!("; available at {}", url));
        }
        summary
    }
}
