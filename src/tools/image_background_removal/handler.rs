//! Background removal handler.

use super::schema::{
    image_background_removal_input_schema, image_background_removal_output_schema,
    ImageBackgroundRemovalInput, ImageBackgroundRemovalOutput,
};
use crate::config::Settings;
use crate::error::{KlippError, Result};
use crate::media::{detect_content_type, ImageFormat, ImageSource};
use crate::provider::{BackgroundRemovalRequest, BackgroundRemovalResponse};
use crate::tools::{ToolAnnotations, ToolContext, ToolDefinition};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};
use uuid::Uuid;

static TOOL_DEFINITION: LazyLock<ToolDefinition> = LazyLock::new(|| ToolDefinition {
    name: "image_background_removal",
    title: "Remove image background",
    description: "Remove the background from a photo and return a transparent PNG or WebP. \
        Accepts an image URL, a base64 data URI or a local file path. The result is \
        returned as a hosted URL and, when output_path is given, saved locally. \
        Existing files are never overwritten.",
    input_schema: image_background_removal_input_schema().clone(),
    output_schema: image_background_removal_output_schema().clone(),
    annotations: ToolAnnotations {
        read_only: false,
        destructive: false,
        idempotent: false,
        open_world: true,
    },
});

/// Tool definition for `image_background_removal`.
pub fn image_background_removal_tool_definition() -> &'static ToolDefinition {
    LazyLock::force(&TOOL_DEFINITION)
}

/// Remove the background from an image through the configured provider.
///
/// The result is written to disk when `output_path` is set, or when the
/// provider only returned the image inline. Existing files are never
/// overwritten.
#[instrument(skip(ctx, input))]
pub async fn image_background_removal(
    ctx: &ToolContext,
    input: ImageBackgroundRemovalInput,
) -> Result<ImageBackgroundRemovalOutput> {
    input.validate()?;
    let format = input.resolved_format(ctx.default_format);

    let requested_path = match &input.output_path {
        Some(path) => {
            let path = resolve_output_path(&ctx.output_dir, path, format).await;
            if tokio::fs::try_exists(&path).await? {
                return Err(overwrite_error(&path));
            }
            Some(path)
        }
        None => None,
    };

    let source = ImageSource::resolve(&input.image, ctx.max_image_bytes).await?;
    debug!("Removing background from {}", source.describe());

    let request = BackgroundRemovalRequest {
        source,
        output_format: format,
    };
    let response = ctx.provider.remove_background(&request).await?;
    if let Some(reported) = response.content_type.as_deref() {
        check_result_format(format, reported)?;
    }

    let target = requested_path.or_else(|| {
        response
            .image_url
            .is_none()
            .then(|| ctx.output_dir.join(generated_file_name(format)))
    });

    let mut size_bytes = response.size_bytes;
    let saved_to = match target {
        Some(path) => {
            let bytes = result_bytes(ctx, &response).await?;
            let sniffed = detect_content_type(None, &bytes).ok_or_else(|| {
                KlippError::Provider("result is not a recognizable image".to_string())
            })?;
            check_result_format(format, sniffed)?;

            write_image(&path, &bytes).await?;
            size_bytes = Some(bytes.len() as u64);
            info!("Saved background-removed image to {}", path.display());
            Some(path.display().to_string())
        }
        None => None,
    };

    Ok(ImageBackgroundRemovalOutput {
        image_url: response.image_url,
        saved_to,
        format,
        content_type: format.content_type().to_string(),
        width: response.width,
        height: response.height,
        size_bytes,
    })
}

/// The provider must hand back the format that was asked for.
fn check_result_format(requested: ImageFormat, content_type: &str) -> Result<()> {
    match ImageFormat::from_content_type(content_type) {
        Some(actual) if actual == requested => Ok(()),
        _ => Err(KlippError::Provider(format!(
            "provider returned {} but {} was requested",
            content_type,
            requested.content_type()
        ))),
    }
}

/// Get the result image bytes, preferring the inline copy over a download.
/// Both paths are bounded by `max_image_bytes`.
async fn result_bytes(ctx: &ToolContext, response: &BackgroundRemovalResponse) -> Result<Vec<u8>> {
    match (&response.image_base64, &response.image_url) {
        (Some(encoded), _) => {
            let encoded = encoded.trim();
            check_result_size((encoded.len() as u64 / 4 * 3).saturating_sub(2), ctx.max_image_bytes)?;
            let bytes = STANDARD.decode(encoded)?;
            check_result_size(bytes.len() as u64, ctx.max_image_bytes)?;
            Ok(bytes)
        }
        (None, Some(url)) => ctx.provider.fetch_bytes(url, ctx.max_image_bytes).await,
        (None, None) => Err(KlippError::Provider(
            "background removal response contained no image".to_string(),
        )),
    }
}

fn check_result_size(len: u64, max_bytes: u64) -> Result<()> {
    if len > max_bytes {
        return Err(KlippError::Provider(format!(
            "result image is larger than {} bytes",
            max_bytes
        )));
    }
    Ok(())
}

/// Resolve where to save: relative paths go under `output_dir`, directories
/// get a generated file name, and a missing extension is filled in.
async fn resolve_output_path(output_dir: &Path, requested: &str, format: ImageFormat) -> PathBuf {
    let expanded = Settings::expand_path(requested.trim());
    let path = if expanded.is_absolute() {
        expanded
    } else {
        output_dir.join(expanded)
    };

    let is_dir = requested.ends_with('/')
        || tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);

    if is_dir {
        path.join(generated_file_name(format))
    } else if path.extension().is_none() {
        path.with_extension(format.extension())
    } else {
        path
    }
}

fn generated_file_name(format: ImageFormat) -> String {
    format!("klipp-{}.{}", Uuid::new_v4(), format.extension())
}

fn overwrite_error(path: &Path) -> KlippError {
    KlippError::InvalidInput(format!(
        "refusing to overwrite existing file {}",
        path.display()
    ))
}

async fn write_image(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => overwrite_error(path),
            _ => KlippError::Io(e),
        })?;
    file.write_all(bytes).await?;
    file.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MemoryMediaProvider;
    use std::sync::Arc;
    use tempfile::tempdir;

    const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n-cutout";
    const WEBP_BYTES: &[u8] = b"RIFF\x10\0\0\0WEBPVP8L-cutout";

    fn ctx_with(provider: Arc<MemoryMediaProvider>, dir: &Path) -> ToolContext {
        ToolContext::new(provider, dir.to_path_buf())
    }

    #[tokio::test]
    async fn test_url_result_is_not_saved_by_default() {
        let dir = tempdir().unwrap();
        let provider = Arc::new(MemoryMediaProvider::new().with_removal_response(
            BackgroundRemovalResponse {
                image_url: Some("https://cdn.test/out.png".to_string()),
                width: Some(32),
                height: Some(16),
                ..Default::default()
            },
        ));
        let ctx = ctx_with(provider.clone(), dir.path());

        let output = image_background_removal(&ctx, ImageBackgroundRemovalInput::new("https://x.test/in.jpg"))
            .await
            .unwrap();

        assert_eq!(output.image_url.as_deref(), Some("https://cdn.test/out.png"));
        assert!(output.saved_to.is_none());
        assert_eq!(output.content_type, "image/png");
        assert_eq!((output.width, output.height), (Some(32), Some(16)));

        let requests = provider.removal_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].output_format, ImageFormat::Png);
        assert!(matches!(requests[0].source, ImageSource::Url(_)));
    }

    #[tokio::test]
    async fn test_inline_result_is_saved_under_output_dir() {
        let dir = tempdir().unwrap();
        let provider = Arc::new(MemoryMediaProvider::new().with_removal_response(
            BackgroundRemovalResponse {
                image_base64: Some(STANDARD.encode(PNG_BYTES)),
                ..Default::default()
            },
        ));
        let ctx = ctx_with(provider, dir.path());

        let output = image_background_removal(&ctx, ImageBackgroundRemovalInput::new("https://x.test/in.jpg"))
            .await
            .unwrap();

        let saved = PathBuf::from(output.saved_to.unwrap());
        assert!(saved.starts_with(dir.path()));
        assert_eq!(saved.extension().unwrap(), "png");
        assert_eq!(std::fs::read(&saved).unwrap(), PNG_BYTES);
        assert_eq!(output.size_bytes, Some(PNG_BYTES.len() as u64));
    }

    #[tokio::test]
    async fn test_output_path_downloads_url_result() {
        let dir = tempdir().unwrap();
        let provider = Arc::new(
            MemoryMediaProvider::new()
                .with_removal_response(BackgroundRemovalResponse {
                    image_url: Some("memory://out.webp".to_string()),
                    content_type: Some("image/webp".to_string()),
                    ..Default::default()
                })
                .with_blob("memory://out.webp", WEBP_BYTES.to_vec()),
        );
        let ctx = ctx_with(provider, dir.path());

        let input = ImageBackgroundRemovalInput::new("https://x.test/in.jpg")
            .with_format(ImageFormat::Webp)
            .with_output_path("cutouts/cat");
        let output = image_background_removal(&ctx, input).await.unwrap();

        let expected = dir.path().join("cutouts").join("cat.webp");
        assert_eq!(output.saved_to.as_deref(), Some(expected.to_str().unwrap()));
        assert_eq!(std::fs::read(&expected).unwrap(), WEBP_BYTES);
        assert_eq!(output.format, ImageFormat::Webp);
        assert_eq!(output.content_type, "image/webp");
        assert_eq!(output.size_bytes, Some(WEBP_BYTES.len() as u64));
    }

    #[tokio::test]
    async fn test_result_in_wrong_format_is_rejected() {
        let dir = tempdir().unwrap();
        let provider = Arc::new(MemoryMediaProvider::new().with_removal_response(
            BackgroundRemovalResponse {
                image_base64: Some(STANDARD.encode(WEBP_BYTES)),
                ..Default::default()
            },
        ));
        let ctx = ctx_with(provider, dir.path());

        let input = ImageBackgroundRemovalInput::new("https://x.test/in.jpg").with_output_path("cat");
        let result = image_background_removal(&ctx, input).await;

        assert!(matches!(result, Err(KlippError::Provider(msg)) if msg.contains("image/webp")));
        assert!(!dir.path().join("cat.png").exists());
    }

    #[tokio::test]
    async fn test_reported_content_type_must_match_format() {
        let dir = tempdir().unwrap();
        let provider = Arc::new(MemoryMediaProvider::new().with_removal_response(
            BackgroundRemovalResponse {
                image_url: Some("https://cdn.test/out.webp".to_string()),
                content_type: Some("image/webp".to_string()),
                ..Default::default()
            },
        ));
        let ctx = ctx_with(provider, dir.path());

        let result = image_background_removal(&ctx, ImageBackgroundRemovalInput::new("https://x.test/in.jpg")).await;
        assert!(matches!(result, Err(KlippError::Provider(_))));
    }

    #[tokio::test]
    async fn test_existing_file_is_not_overwritten() {
        let dir = tempdir().unwrap();
        let existing = dir.path().join("notes.png");
        std::fs::write(&existing, "keep me").unwrap();

        let provider = Arc::new(MemoryMediaProvider::new().with_removal_response(
            BackgroundRemovalResponse {
                image_base64: Some(STANDARD.encode(PNG_BYTES)),
                ..Default::default()
            },
        ));
        let ctx = ctx_with(provider.clone(), dir.path());

        let input = ImageBackgroundRemovalInput::new("https://x.test/in.jpg").with_output_path("notes.png");
        let result = image_background_removal(&ctx, input).await;

        assert!(matches!(result, Err(KlippError::InvalidInput(msg)) if msg.contains("overwrite")));
        assert_eq!(std::fs::read_to_string(&existing).unwrap(), "keep me");
        assert!(provider.removal_requests().is_empty());
    }

    #[tokio::test]
    async fn test_write_image_refuses_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.png");
        write_image(&path, PNG_BYTES).await.unwrap();

        let second = write_image(&path, b"other").await;
        assert!(matches!(second, Err(KlippError::InvalidInput(_))));
        assert_eq!(std::fs::read(&path).unwrap(), PNG_BYTES);
    }

    #[tokio::test]
    async fn test_oversized_inline_result_is_rejected() {
        let dir = tempdir().unwrap();
        let provider = Arc::new(MemoryMediaProvider::new().with_removal_response(
            BackgroundRemovalResponse {
                image_base64: Some(STANDARD.encode([PNG_BYTES, &[0u8; 4096][..]].concat())),
                ..Default::default()
            },
        ));
        let mut ctx = ctx_with(provider, dir.path());
        ctx.max_image_bytes = 1024;

        let result = image_background_removal(&ctx, ImageBackgroundRemovalInput::new("https://x.test/in.jpg")).await;
        assert!(matches!(result, Err(KlippError::Provider(msg)) if msg.contains("larger than")));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_local_file_is_sent_inline() {
        let dir = tempdir().unwrap();
        let image_path = dir.path().join("portrait.png");
        std::fs::write(&image_path, PNG_BYTES).unwrap();

        let provider = Arc::new(MemoryMediaProvider::new().with_removal_response(
            BackgroundRemovalResponse {
                image_url: Some("https://cdn.test/out.webp".to_string()),
                ..Default::default()
            },
        ));
        let ctx = ctx_with(provider.clone(), dir.path());

        let input = ImageBackgroundRemovalInput::new(image_path.to_str().unwrap()).with_format(ImageFormat::Webp);
        let output = image_background_removal(&ctx, input).await.unwrap();
        assert_eq!(output.format, ImageFormat::Webp);
        assert_eq!(output.content_type, "image/webp");

        let requests = provider.removal_requests();
        match &requests[0].source {
            ImageSource::Inline { bytes, content_type } => {
                assert_eq!(bytes.as_slice(), PNG_BYTES);
                assert_eq!(content_type, "image/png");
            }
            other => panic!("expected inline source, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_oversized_local_file_never_reaches_provider() {
        let dir = tempdir().unwrap();
        let image_path = dir.path().join("huge.png");
        std::fs::write(&image_path, vec![0u8; 2048]).unwrap();

        let provider = Arc::new(MemoryMediaProvider::new());
        let mut ctx = ctx_with(provider.clone(), dir.path());
        ctx.max_image_bytes = 1024;

        let result = image_background_removal(&ctx, ImageBackgroundRemovalInput::new(image_path.to_str().unwrap())).await;
        assert!(matches!(result, Err(KlippError::InvalidInput(_))));
        assert!(provider.removal_requests().is_empty());
    }

    #[tokio::test]
    async fn test_directory_output_path_gets_generated_name() {
        let dir = tempdir().unwrap();
        let out = resolve_output_path(dir.path(), "batch/", ImageFormat::Webp).await;
        assert!(out.starts_with(dir.path().join("batch")));
        assert_eq!(out.extension().unwrap(), "webp");
        assert!(out.file_name().unwrap().to_str().unwrap().starts_with("klipp-"));
    }

    #[test]
    fn test_tool_definition() {
        let def = image_background_removal_tool_definition();
        assert_eq!(def.name, "image_background_removal");
        assert!(!def.annotations.read_only);
        assert!(!def.annotations.destructive);
        assert!(def.annotations.open_world);
        assert_eq!(def.required_inputs(), vec!["image"]);
    }
}
