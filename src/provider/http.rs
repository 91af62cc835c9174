//! HTTP media provider backed by the remote media API.

use super::{BackgroundRemovalRequest, BackgroundRemovalResponse, MediaProvider, VideoModelRecord};
use crate::config::ProviderSettings;
use crate::error::{KlippError, Result};
use crate::media::{ImageFormat, ImageSource};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

const USER_AGENT: &str = concat!("klipp/", env!("CARGO_PKG_VERSION"));

/// Media provider that calls the media API over HTTP.
pub struct HttpMediaProvider {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct RemoveBackgroundBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<&'a str>,
    output_format: ImageFormat,
}

impl HttpMediaProvider {
    /// Create a provider for the API at `base_url`.
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(KlippError::Config(format!(
                "provider base_url cannot be used as a base: {}",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// Create a provider from configuration.
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self> {
        let api_key = settings.api_key();
        if api_key.is_none() {
            warn!(
                "{} is not set, requests to the media API will be unauthenticated",
                settings.api_key_env
            );
        }
        Self::new(
            &settings.base_url,
            api_key,
            Duration::from_secs(settings.timeout_secs),
        )
    }

    /// Build an endpoint URL; each segment is percent-encoded on its own.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| KlippError::Config(format!("invalid base_url: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// Turn a non-success response into an error, pulling the message out of the body.
    async fn api_error(response: Response) -> KlippError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        KlippError::Api {
            status: status.as_u16(),
            message: error_message(&body).unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("unknown error").to_string()
                } else {
                    body.trim().to_string()
                }
            }),
        }
    }
}

fn check_download_size(len: u64, max_bytes: u64) -> Result<()> {
    if len > max_bytes {
        return Err(KlippError::Provider(format!(
            "result image is larger than {} bytes",
            max_bytes
        )));
    }
    Ok(())
}

/// Extract `error`, `error.message` or `message` from a JSON error body.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let candidate = match value.get("error") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Object(obj)) => obj.get("message").and_then(|m| m.as_str()).map(str::to_string),
        _ => None,
    };
    candidate.or_else(|| value.get("message").and_then(|m| m.as_str()).map(str::to_string))
}

#[async_trait]
impl MediaProvider for HttpMediaProvider {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self))]
    async fn video_model(&self, model_id: &str) -> Result<VideoModelRecord> {
        let url = self.endpoint(&["v1", "video-models", model_id])?;
        debug!("GET {}", url);

        let response = self.authorize(self.client.get(url)).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(KlippError::ModelNotFound(model_id.to_string())),
            status if status.is_success() => {
                let record: VideoModelRecord = response.json().await?;
                Ok(record)
            }
            _ => Err(Self::api_error(response).await),
        }
    }

    #[instrument(skip(self, request), fields(source = %request.source.describe(), format = %request.output_format))]
    async fn remove_background(
        &self,
        request: &BackgroundRemovalRequest,
    ) -> Result<BackgroundRemovalResponse> {
        let url = self.endpoint(&["v1", "images", "remove-background"])?;

        let body = match &request.source {
            ImageSource::Url(image_url) => RemoveBackgroundBody {
                image_url: Some(image_url.as_str()),
                image_base64: None,
                content_type: None,
                output_format: request.output_format,
            },
            ImageSource::Inline {
                bytes,
                content_type,
            } => RemoveBackgroundBody {
                image_url: None,
                image_base64: Some(STANDARD.encode(bytes)),
                content_type: Some(content_type.as_str()),
                output_format: request.output_format,
            },
        };

        debug!("POST {}", url);
        let response = self
            .authorize(self.client.post(url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let result: BackgroundRemovalResponse = response.json().await?;
        if result.image_url.is_none() && result.image_base64.is_none() {
            return Err(KlippError::Provider(
                "background removal response contained no image".to_string(),
            ));
        }
        Ok(result)
    }

    #[instrument(skip(self))]
    async fn fetch_bytes(&self, url: &str, max_bytes: u64) -> Result<Vec<u8>> {
        let target = Url::parse(url)?;

        // Credentials only go to the media API itself, never to third-party hosts.
        let request = if target.origin() == self.base_url.origin() {
            self.authorize(self.client.get(target))
        } else {
            self.client.get(target)
        };

        let mut response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        if let Some(len) = response.content_length() {
            check_download_size(len, max_bytes)?;
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            bytes.extend_from_slice(&chunk);
            check_download_size(bytes.len() as u64, max_bytes)?;
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Path,
        http::{HeaderMap, StatusCode as AxumStatus},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn provider(base: &str, key: Option<&str>) -> HttpMediaProvider {
        HttpMediaProvider::new(base, key.map(str::to_string), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_video_model_success_with_auth() {
        let app = Router::new().route(
            "/v1/video-models/{id}",
            get(|Path(id): Path<String>, headers: HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                Json(json!({
                    "id": id,
                    "name": "Kling 2.1",
                    "provider": auth,
                    "capabilities": ["text-to-video"]
                }))
            }),
        );
        let base = spawn(app).await;

        let record = provider(&base, Some("secret")).video_model("kling/v2.1").await.unwrap();
        assert_eq!(record.id, "kling/v2.1");
        assert_eq!(record.provider.as_deref(), Some("Bearer secret"));
        assert_eq!(record.capabilities, vec!["text-to-video".to_string()]);
    }

    #[tokio::test]
    async fn test_video_model_not_found() {
        let app = Router::new().route(
            "/v1/video-models/{id}",
            get(|| async { (AxumStatus::NOT_FOUND, Json(json!({"error": "no such model"}))) }),
        );
        let base = spawn(app).await;

        let result = provider(&base, None).video_model("ghost").await;
        assert!(matches!(result, Err(KlippError::ModelNotFound(id)) if id == "ghost"));
    }

    #[tokio::test]
    async fn test_video_model_server_error_message() {
        let app = Router::new().route(
            "/v1/video-models/{id}",
            get(|| async {
                (
                    AxumStatus::SERVICE_UNAVAILABLE,
                    Json(json!({"error": {"message": "catalog offline"}})),
                )
            }),
        );
        let base = spawn(app).await;

        match provider(&base, None).video_model("veo-3").await {
            Err(KlippError::Api { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "catalog offline");
            }
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_base_url_with_path_prefix() {
        let app = Router::new().route(
            "/api/v1/video-models/{id}",
            get(|Path(id): Path<String>| async move { Json(json!({ "id": id })) }),
        );
        let base = spawn(app).await;

        let record = provider(&format!("{}/api/", base), None)
            .video_model("wan-2.2")
            .await
            .unwrap();
        assert_eq!(record.id, "wan-2.2");
    }

    #[tokio::test]
    async fn test_remove_background_inline_payload() {
        let app = Router::new().route(
            "/v1/images/remove-background",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "image_url": "https://cdn.example.com/out.webp",
                    "content_type": body["content_type"],
                    "width": body["image_base64"].as_str().map(|s| s.len()).unwrap_or(0),
                    "size_bytes": 42,
                    "format_echo": body["output_format"]
                }))
            }),
        );
        let base = spawn(app).await;

        let request = BackgroundRemovalRequest {
            source: ImageSource::Inline {
                bytes: vec![1, 2, 3],
                content_type: "image/png".to_string(),
            },
            output_format: ImageFormat::Webp,
        };
        let response = provider(&base, None).remove_background(&request).await.unwrap();

        assert_eq!(response.image_url.as_deref(), Some("https://cdn.example.com/out.webp"));
        assert_eq!(response.content_type.as_deref(), Some("image/png"));
        // base64 of three bytes is four characters
        assert_eq!(response.width, Some(4));
        assert_eq!(response.size_bytes, Some(42));
    }

    #[tokio::test]
    async fn test_remove_background_empty_response() {
        let app = Router::new().route(
            "/v1/images/remove-background",
            post(|| async { Json(json!({"width": 10})) }),
        );
        let base = spawn(app).await;

        let request = BackgroundRemovalRequest {
            source: ImageSource::Url("https://example.com/in.jpg".parse().unwrap()),
            output_format: ImageFormat::Png,
        };
        let result = provider(&base, None).remove_background(&request).await;
        assert!(matches!(result, Err(KlippError::Provider(_))));
    }

    #[tokio::test]
    async fn test_fetch_bytes() {
        let app = Router::new().route("/files/out.png", get(|| async { vec![9u8, 8, 7] }));
        let base = spawn(app).await;

        let bytes = provider(&base, Some("k"))
            .fetch_bytes(&format!("{}/files/out.png", base), 1024)
            .await
            .unwrap();
        assert_eq!(bytes, vec![9, 8, 7]);
    }

    #[tokio::test]
    async fn test_fetch_bytes_over_limit() {
        let app = Router::new().route("/files/big.png", get(|| async { vec![0u8; 4096] }));
        let base = spawn(app).await;

        let result = provider(&base, None)
            .fetch_bytes(&format!("{}/files/big.png", base), 1000)
            .await;
        assert!(matches!(result, Err(KlippError::Provider(_))));
    }

    #[test]
    fn test_error_message_variants() {
        assert_eq!(error_message(r#"{"error":"bad"}"#).as_deref(), Some("bad"));
        assert_eq!(error_message(r#"{"error":{"message":"worse"}}"#).as_deref(), Some("worse"));
        assert_eq!(error_message(r#"{"message":"plain"}"#).as_deref(), Some("plain"));
        assert_eq!(error_message("<html>"), None);
    }
}
