//! Wire types for the chat-completions captioning endpoint.
//!
//! Requests carry the frame as a base64 JPEG data URL alongside a fixed
//! instruction prompt. Responses are decoded loosely (every field optional)
//! and mapped to a caption or a [`CaptionError`] by [`ChatCompletionResponse::into_caption_text`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::CaptionError;

/// Instruction sent with every frame.
pub const CAPTION_PROMPT: &str = "Describe what is happening in this image in detail. \
Focus on any actions, objects, and the overall scene. Please respond in English only.";

/// System directive constraining the reply language.
pub const SYSTEM_DIRECTIVE: &str = "You are a helpful assistant that responds only in English.";

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub response_format: ResponseFormat,
    pub system_prompt: String,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Vec<ContentPart>,
}

/// One part of a multimodal user message.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    ImageUrl { image_url: ImageUrl },
    Text { text: String },
}

#[derive(Debug, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub r#type: String,
}

impl ChatCompletionRequest {
    /// Build the caption request for one JPEG-encoded frame.
    pub fn for_frame(model: &str, jpeg: &[u8]) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: jpeg_data_url(jpeg),
                        },
                    },
                    ContentPart::Text {
                        text: CAPTION_PROMPT.to_string(),
                    },
                ],
            }],
            response_format: ResponseFormat {
                r#type: "text".to_string(),
            },
            system_prompt: SYSTEM_DIRECTIVE.to_string(),
        }
    }
}

/// Encode JPEG bytes as an inline `data:` URL.
pub fn jpeg_data_url(jpeg: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg))
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Option<Vec<Choice>>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Map the decoded body to caption text.
    ///
    /// A non-empty `choices` list wins over an `error` field. The first
    /// choice must carry string content, otherwise the response is malformed.
    pub fn into_caption_text(self) -> Result<String, CaptionError> {
        if let Some(first) = self.choices.and_then(|c| c.into_iter().next()) {
            return first
                .message
                .and_then(|m| m.content)
                .ok_or(CaptionError::MalformedResponse);
        }

        match self.error {
            Some(serde_json::Value::Null) | None => Err(CaptionError::MalformedResponse),
            Some(error) => Err(CaptionError::Service(service_error_message(&error))),
        }
    }
}

/// Human-readable message from an `error` payload of any shape.
fn service_error_message(error: &serde_json::Value) -> String {
    match error {
        serde_json::Value::Object(map) => match map.get("message") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => error.to_string(),
        },
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
