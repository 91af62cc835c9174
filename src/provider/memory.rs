//! In-memory media provider.
//!
//! Useful for testing and offline runs: models and removal results are
//! registered up front instead of fetched from a service.

use super::{BackgroundRemovalRequest, BackgroundRemovalResponse, MediaProvider, VideoModelRecord};
use crate::error::{KlippError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;
use tracing::info;

/// In-memory media provider.
pub struct MemoryMediaProvider {
    models: RwLock<HashMap<String, VideoModelRecord>>,
    removal: RwLock<Option<BackgroundRemovalResponse>>,
    blobs: RwLock<HashMap<String, Vec<u8>>>,
    requests: RwLock<Vec<BackgroundRemovalRequest>>,
}

impl MemoryMediaProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self {
            models: RwLock::new(HashMap::new()),
            removal: RwLock::new(None),
            blobs: RwLock::new(HashMap::new()),
            requests: RwLock::new(Vec::new()),
        }
    }

    /// Load video models from a JSON catalog: an array of model records in
    /// the same shape the media API returns.
    pub fn from_catalog_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            KlippError::Config(format!("cannot read model catalog '{}': {}", path.display(), e))
        })?;
        let records: Vec<VideoModelRecord> = serde_json::from_str(&content)?;
        info!("Loaded {} video models from {}", records.len(), path.display());

        Ok(records
            .into_iter()
            .fold(Self::new(), |provider, record| provider.with_model(record)))
    }

    /// Register a video model.
    pub fn with_model(self, record: VideoModelRecord) -> Self {
        self.models.write().unwrap().insert(record.id.clone(), record);
        self
    }

    /// Set the response returned by every background removal call.
    pub fn with_removal_response(self, response: BackgroundRemovalResponse) -> Self {
        *self.removal.write().unwrap() = Some(response);
        self
    }

    /// Serve `bytes` when `url` is fetched.
    pub fn with_blob(self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.blobs.write().unwrap().insert(url.into(), bytes);
        self
    }

    /// Background removal requests received so far.
    pub fn removal_requests(&self) -> Vec<BackgroundRemovalRequest> {
        self.requests.read().unwrap().clone()
    }
}

impl Default for MemoryMediaProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaProvider for MemoryMediaProvider {
    fn name(&self) -> &str {
        "memory"
    }

    async fn video_model(&self, model_id: &str) -> Result<VideoModelRecord> {
        let models = self.models.read().unwrap();
        models
            .get(model_id)
            .cloned()
            .ok_or_else(|| KlippError::ModelNotFound(model_id.to_string()))
    }

    async fn remove_background(
        &self,
        request: &BackgroundRemovalRequest,
    ) -> Result<BackgroundRemovalResponse> {
        self.requests.write().unwrap().push(request.clone());

        self.removal.read().unwrap().clone().ok_or_else(|| {
            KlippError::Provider("background removal is not available offline".to_string())
        })
    }

    async fn fetch_bytes(&self, url: &str, max_bytes: u64) -> Result<Vec<u8>> {
        let blobs = self.blobs.read().unwrap();
        let bytes = blobs
            .get(url)
            .ok_or_else(|| KlippError::Provider(format!("no such blob: {}", url)))?;
        if bytes.len() as u64 > max_bytes {
            return Err(KlippError::Provider(format!(
                "result image is larger than {} bytes",
                max_bytes
            )));
        }
        Ok(bytes.clone())
    }
}
