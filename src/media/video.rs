//! Video model value types.

use serde::{Deserialize, Serialize};

/// Something a video generation model can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VideoCapability {
    #[serde(alias = "t2v", alias = "text_to_video")]
    TextToVideo,
    #[serde(alias = "i2v", alias = "image_to_video")]
    ImageToVideo,
    #[serde(alias = "v2v", alias = "video_to_video")]
    VideoToVideo,
    /// Generates a soundtrack alongside the frames.
    #[serde(alias = "sound")]
    Audio,
}

impl VideoCapability {
    /// Parse the loose spellings media APIs use ("t2v", "text_to_video", ...).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "text-to-video" | "t2v" => Some(VideoCapability::TextToVideo),
            "image-to-video" | "i2v" => Some(VideoCapability::ImageToVideo),
            "video-to-video" | "v2v" => Some(VideoCapability::VideoToVideo),
            "audio" | "sound" => Some(VideoCapability::Audio),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoCapability::TextToVideo => "text-to-video",
            VideoCapability::ImageToVideo => "image-to-video",
            VideoCapability::VideoToVideo => "video-to-video",
            VideoCapability::Audio => "audio",
        }
    }
}

impl std::fmt::Display for VideoCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Price of running a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    /// What the price is charged per (e.g. "second", "video").
    pub unit: String,
    pub amount_usd: f64,
}

impl std::fmt::Display for Pricing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${:.3}/{}", self.amount_usd, self.unit)
    }
}
