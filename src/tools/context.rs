//! Tool execution context shared by all handlers.

use crate::config::Settings;
use crate::error::Result;
use crate::media::ImageFormat;
use crate::provider::{create_provider, MediaProvider};
use std::path::PathBuf;
use std::sync::Arc;

/// What a tool handler needs to run: a provider plus a few limits.
#[derive(Clone)]
pub struct ToolContext {
    pub provider: Arc<dyn MediaProvider>,
    /// Directory that relative output paths are resolved against.
    pub output_dir: PathBuf,
    pub max_image_bytes: u64,
    pub default_format: ImageFormat,
}

impl ToolContext {
    /// Create a context around a provider with default limits.
    pub fn new(provider: Arc<dyn MediaProvider>, output_dir: PathBuf) -> Self {
        let defaults = Settings::default();
        Self {
            provider,
            output_dir,
            max_image_bytes: defaults.background_removal.max_image_bytes,
            default_format: defaults.background_removal.default_format,
        }
    }

    /// Create a context from configuration.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            provider: create_provider(&settings.provider)?,
            output_dir: settings.output_dir(),
            max_image_bytes: settings.background_removal.max_image_bytes,
            default_format: settings.background_removal.default_format,
        })
    }
}
