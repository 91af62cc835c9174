//! Image value types and input resolution.

use crate::error::{KlippError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

/// Format of a background-removed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG with alpha channel.
    #[default]
    Png,
    /// WebP with alpha channel.
    Webp,
}

impl ImageFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Webp => "image/webp",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Webp => "webp",
        }
    }

    /// Format for a content type, ignoring parameters such as `; charset`.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        if essence.eq_ignore_ascii_case("image/png") {
            Some(ImageFormat::Png)
        } else if essence.eq_ignore_ascii_case("image/webp") {
            Some(ImageFormat::Webp)
        } else {
            None
        }
    }
}

impl std::str::FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "webp" => Ok(ImageFormat::Webp),
            _ => Err(format!("Unsupported output format: {} (expected png or webp)", s)),
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Content types accepted as background removal input.
const SUPPORTED_INPUT_TYPES: &[&str] = &["image/png", "image/jpeg", "image/webp"];

/// Where the input image comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// Remote image the provider fetches itself.
    Url(Url),
    /// Image bytes sent along with the request.
    Inline { bytes: Vec<u8>, content_type: String },
}

impl ImageSource {
    /// Resolve user input (URL, data URI or local path) into an image source.
    ///
    /// Inline images larger than `max_bytes` are rejected before being read.
    pub async fn resolve(input: &str, max_bytes: u64) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(KlippError::InvalidInput("image must not be empty".to_string()));
        }

        if let Some(rest) = strip_prefix_ignore_case(input, "data:") {
            return Self::from_data_uri(rest, max_bytes);
        }

        if strip_prefix_ignore_case(input, "http://").is_some()
            || strip_prefix_ignore_case(input, "https://").is_some()
        {
            // The parser lowercases the scheme.
            let url = Url::parse(input)?;
            if url.host_str().is_none() {
                return Err(KlippError::InvalidInput(format!("image URL has no host: {}", input)));
            }
            return Ok(ImageSource::Url(url));
        }

        Self::from_file(&PathBuf::from(shellexpand::tilde(input).to_string()), max_bytes).await
    }

    fn from_data_uri(rest: &str, max_bytes: u64) -> Result<Self> {
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| KlippError::InvalidInput("malformed data URI".to_string()))?;

        let content_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| KlippError::InvalidInput("data URI must be base64 encoded".to_string()))?
            .to_lowercase();

        let payload = payload.trim();
        // Every 4 base64 chars carry 3 bytes, minus at most 2 of padding.
        check_size((payload.len() as u64 / 4 * 3).saturating_sub(2), max_bytes)?;
        let bytes = STANDARD.decode(payload)?;
        check_size(bytes.len() as u64, max_bytes)?;
        check_supported(&content_type)?;

        Ok(ImageSource::Inline { bytes, content_type })
    }

    async fn from_file(path: &Path, max_bytes: u64) -> Result<Self> {
        let metadata = tokio::fs::metadata(path).await.map_err(|e| {
            KlippError::InvalidInput(format!("cannot read image '{}': {}", path.display(), e))
        })?;
        if !metadata.is_file() {
            return Err(KlippError::InvalidInput(format!("'{}' is not a file", path.display())));
        }
        check_size(metadata.len(), max_bytes)?;

        let bytes = tokio::fs::read(path).await?;
        let content_type = detect_content_type(Some(path), &bytes).ok_or_else(|| {
            KlippError::InvalidInput(format!("unrecognized image type: {}", path.display()))
        })?;
        check_supported(content_type)?;

        debug!("Loaded {} bytes of {} from {}", bytes.len(), content_type, path.display());
        Ok(ImageSource::Inline {
            bytes,
            content_type: content_type.to_string(),
        })
    }

    /// Short description safe to log (never includes inline bytes).
    pub fn describe(&self) -> String {
        match self {
            ImageSource::Url(url) => url.to_string(),
            ImageSource::Inline { bytes, content_type } => {
                format!("inline {} ({} bytes)", content_type, bytes.len())
            }
        }
    }
}

fn strip_prefix_ignore_case<'a>(input: &'a str, prefix: &str) -> Option<&'a str> {
    let head = input.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &input[prefix.len()..])
}

fn check_size(len: u64, max_bytes: u64) -> Result<()> {
    if len > max_bytes {
        return Err(KlippError::InvalidInput(format!(
            "image is {} bytes, limit is {} bytes",
            len, max_bytes
        )));
    }
    Ok(())
}

fn check_supported(content_type: &str) -> Result<()> {
    if SUPPORTED_INPUT_TYPES.contains(&content_type) {
        Ok(())
    } else {
        Err(KlippError::InvalidInput(format!(
            "unsupported image type {} (expected png, jpeg or webp)",
            content_type
        )))
    }
}

/// Guess an image content type from magic bytes, falling back to the file extension.
pub fn detect_content_type(path: Option<&Path>, bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        return Some("image/png");
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    if bytes.starts_with(b"GIF8") {
        return Some("image/gif");
    }

    let ext = path?.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}
