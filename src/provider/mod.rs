//! Media provider abstraction for Klipp.
//!
//! The tool handlers never talk to a media service directly. They go through
//! the [`MediaProvider`] trait, which has an HTTP implementation for the real
//! media API and an in-memory one for tests and offline runs.

mod http;
mod memory;

pub use http::HttpMediaProvider;
pub use memory::MemoryMediaProvider;

use crate::config::{ProviderKind, ProviderSettings, Settings};
use crate::error::{KlippError, Result};
use crate::media::{ImageFormat, ImageSource, Pricing};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Video model record as returned by the media API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoModelRecord {
    #[serde(alias = "model_id")]
    pub id: String,
    #[serde(default, alias = "display_name")]
    pub name: Option<String>,
    #[serde(default, alias = "vendor")]
    pub provider: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Raw capability names; unknown ones are dropped by the handler.
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default, alias = "max_duration")]
    pub max_duration_seconds: Option<f64>,
    #[serde(default)]
    pub resolutions: Vec<String>,
    #[serde(default)]
    pub aspect_ratios: Vec<String>,
    #[serde(default)]
    pub fps: Option<u32>,
    #[serde(default)]
    pub pricing: Option<Pricing>,
    #[serde(default)]
    pub released_at: Option<DateTime<Utc>>,
}

/// A background removal job.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundRemovalRequest {
    pub source: ImageSource,
    pub output_format: ImageFormat,
}

/// Result of a background removal job.
///
/// Providers return the cut-out image by URL, inline as base64, or both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackgroundRemovalResponse {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_base64: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
}

/// Trait for media service backends.
#[async_trait]
pub trait MediaProvider: Send + Sync {
    /// Provider name for logs and diagnostics.
    fn name(&self) -> &str;

    /// Look up a video generation model by identifier.
    async fn video_model(&self, model_id: &str) -> Result<VideoModelRecord>;

    /// Remove the background from an image.
    async fn remove_background(
        &self,
        request: &BackgroundRemovalRequest,
    ) -> Result<BackgroundRemovalResponse>;

    /// Download a result image produced by this provider, refusing bodies
    /// larger than `max_bytes`.
    async fn fetch_bytes(&self, url: &str, max_bytes: u64) -> Result<Vec<u8>>;
}

/// Build the provider selected in the settings.
pub fn create_provider(settings: &ProviderSettings) -> Result<Arc<dyn MediaProvider>> {
    match settings.kind {
        ProviderKind::Http => Ok(Arc::new(HttpMediaProvider::from_settings(settings)?)),
        ProviderKind::Memory => {
            let catalog = settings.catalog.as_deref().ok_or_else(|| {
                KlippError::Config("provider.catalog must be set for the memory provider".to_string())
            })?;
            Ok(Arc::new(MemoryMediaProvider::from_catalog_file(
                &Settings::expand_path(catalog),
            )?))
        }
    }
}
