//! Input and output shapes of the `get_video_model_info` tool.

use crate::error::{KlippError, Result};
use crate::media::{Pricing, VideoCapability};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::LazyLock;

const MAX_MODEL_ID_LEN: usize = 128;

static MODEL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._/:\-]*$").expect("valid model id regex"));

static INPUT_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "type": "object",
        "properties": {
            "model": {
                "type": "string",
                "description": "Video model identifier, e.g. \"kling/v2.1-master\" or \"veo-3\"",
                "minLength": 1,
                "maxLength": MAX_MODEL_ID_LEN,
                "pattern": MODEL_ID.as_str()
            }
        },
        "required": ["model"],
        "additionalProperties": false
    })
});

static OUTPUT_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "type": "object",
        "properties": {
            "model": { "type": "string", "description": "Canonical model identifier" },
            "name": { "type": "string", "description": "Display name" },
            "provider": { "type": "string", "description": "Organization serving the model" },
            "description": { "type": "string" },
            "capabilities": {
                "type": "array",
                "items": {
                    "type": "string",
                    "enum": ["text-to-video", "image-to-video", "video-to-video", "audio"]
                }
            },
            "max_duration_seconds": { "type": "number", "exclusiveMinimum": 0 },
            "resolutions": { "type": "array", "items": { "type": "string" } },
            "aspect_ratios": { "type": "array", "items": { "type": "string" } },
            "fps": { "type": "integer", "minimum": 1 },
            "pricing": {
                "type": "object",
                "properties": {
                    "unit": { "type": "string" },
                    "amount_usd": { "type": "number", "minimum": 0 }
                },
                "required": ["unit", "amount_usd"]
            },
            "released_at": { "type": "string", "format": "date-time" },
            "summary": { "type": "string", "description": "One-line human readable description" }
        },
        "required": ["model", "name", "provider", "capabilities", "resolutions", "aspect_ratios", "summary"]
    })
});

/// JSON Schema for [`GetVideoModelInfoInput`].
pub fn get_video_model_info_input_schema() -> &'static Value {
    LazyLock::force(&INPUT_SCHEMA)
}

/// JSON Schema for [`GetVideoModelInfoOutput`].
pub fn get_video_model_info_output_schema() -> &'static Value {
    LazyLock::force(&OUTPUT_SCHEMA)
}

/// Arguments of a video model lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GetVideoModelInfoInput {
    pub model: String,
}

impl GetVideoModelInfoInput {
    pub fn new(model: impl Into<String>) -> Self {
        Self { model: model.into() }
    }

    /// Check the model identifier before any request is made. Applies the
    /// same rules the input schema advertises.
    pub fn validate(&self) -> Result<()> {
        let model = self.model.as_str();
        if model.is_empty() {
            return Err(KlippError::InvalidInput("model must not be empty".to_string()));
        }
        if model.chars().count() > MAX_MODEL_ID_LEN {
            return Err(KlippError::InvalidInput(format!(
                "model identifier is longer than {} characters",
                MAX_MODEL_ID_LEN
            )));
        }
        if !is_valid_model_id(model) {
            return Err(KlippError::InvalidInput(format!(
                "invalid model identifier: {:?}",
                model
            )));
        }
        Ok(())
    }
}

fn is_valid_model_id(model: &str) -> bool {
    MODEL_ID.is_match(model) && !model.split('/').any(|part| part.is_empty() || part == "..")
}

/// Normalized description of a video generation model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetVideoModelInfoOutput {
    pub model: String,
    pub name: String,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub capabilities: Vec<VideoCapability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_duration_seconds: Option<f64>,
    pub resolutions: Vec<String>,
    pub aspect_ratios: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released_at: Option<DateTime<Utc>>,
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_model_ids() {
        for id in ["veo-3", "kling/v2.1-master", "fal-ai:wan_2.2", "Runway/Gen4.turbo"] {
            assert!(GetVideoModelInfoInput::new(id).validate().is_ok(), "{}", id);
        }
    }

    #[test]
    fn test_invalid_model_ids() {
        let long = "a".repeat(MAX_MODEL_ID_LEN + 1);
        for id in ["", "   ", "-leading-dash", "kling//v2", "../etc/passwd", "has space", " veo-3", "veo-3\n", long.as_str()] {
            assert!(
                matches!(GetVideoModelInfoInput::new(id).validate(), Err(KlippError::InvalidInput(_))),
                "{:?} should be rejected",
                id
            );
        }
    }

    #[test]
    fn test_input_only_accepts_schema_properties() {
        let input: GetVideoModelInfoInput = serde_json::from_value(json!({"model": "veo-3"})).unwrap();
        assert_eq!(input.model, "veo-3");

        let result = serde_json::from_value::<GetVideoModelInfoInput>(json!({"model_id": "veo-3"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_agrees_with_schema_pattern() {
        let schema = get_video_model_info_input_schema();
        let pattern = Regex::new(schema["properties"]["model"]["pattern"].as_str().unwrap()).unwrap();

        for id in ["veo-3", "kling/v2.1-master", " veo-3", "veo-3 ", "-x", "a b"] {
            let input = GetVideoModelInfoInput::new(id);
            if input.validate().is_ok() {
                assert!(pattern.is_match(id), "{:?} passes validate but not the schema", id);
            }
        }
        assert!(GetVideoModelInfoInput::new(" veo-3 ").validate().is_err());
    }

    #[test]
    fn test_input_rejects_unknown_fields() {
        let result = serde_json::from_value::<GetVideoModelInfoInput>(json!({"model": "veo-3", "x": 1}));
        assert!(result.is_err());
    }

    #[test]
    fn test_input_schema_shape() {
        let schema = get_video_model_info_input_schema();
        assert_eq!(schema["required"][0], "model");
        assert_eq!(schema["additionalProperties"], false);
        assert_eq!(schema["properties"]["model"]["maxLength"], MAX_MODEL_ID_LEN);
    }

    #[test]
    fn test_output_schema_required_fields_serialize() {
        let output = GetVideoModelInfoOutput {
            model: "veo-3".to_string(),
            name: "Veo 3".to_string(),
            provider: "google".to_string(),
            description: None,
            capabilities: vec![VideoCapability::TextToVideo],
            max_duration_seconds: None,
            resolutions: vec![],
            aspect_ratios: vec![],
            fps: None,
            pricing: None,
            released_at: None,
            summary: "Veo 3".to_string(),
        };
        let value = serde_json::to_value(&output).unwrap();

        let required = get_video_model_info_output_schema()["required"].as_array().unwrap();
        for field in required {
            let field = field.as_str().unwrap();
            assert!(value.get(field).is_some(), "missing {}", field);
        }
        assert!(value.get("fps").is_none());
    }
}
