//! HTTP client for the chat-completions captioning endpoint.
//!
//! Sends one `POST` per frame with bearer authentication. The response body is
//! decoded as JSON regardless of status code, because the service reports
//! failures through an `error` field; a body that is not JSON is treated as a
//! transport failure.

use async_trait::async_trait;
use framewatch_core::Frame;

use crate::config::CaptionConfig;
use crate::error::CaptionError;
use crate::messages::{ChatCompletionRequest, ChatCompletionResponse};
use crate::Captioner;

/// Captioning client for a single endpoint and model.
pub struct CaptionClient {
    client: reqwest::Client,
    config: CaptionConfig,
}

impl CaptionClient {
    /// Create a client whose requests are bounded by `config.timeout`.
    pub fn new(config: CaptionConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    async fn send(&self, request: &ChatCompletionRequest) -> Result<ChatCompletionResponse, CaptionError> {
        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body: ChatCompletionResponse = response.json().await?;
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "Caption endpoint returned non-success status");
        }
        Ok(body)
    }
}

#[async_trait]
impl Captioner for CaptionClient {
    async fn describe(&self, frame: &Frame) -> Result<String, CaptionError> {
        let request = ChatCompletionRequest::for_frame(&self.config.model, &frame.jpeg);
        let response = self.send(&request).await?;
        let text = response.into_caption_text()?;

        tracing::debug!(frame_index = frame.index, chars = text.len(), "Frame captioned");
        Ok(text)
    }
}
