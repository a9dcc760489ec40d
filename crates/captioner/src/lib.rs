//! Remote frame captioning.
//!
//! [`CaptionClient`] posts one sampled frame at a time to an OpenAI-style
//! chat-completions endpoint and maps the reply to a description or a typed
//! [`CaptionError`]. The [`Captioner`] trait is the seam the pipeline
//! depends on; [`RetryingCaptioner`] wraps any captioner with backoff.

pub mod client;
pub mod config;
pub mod error;
pub mod messages;
pub mod retry;

use async_trait::async_trait;
use framewatch_core::{Caption, Frame};

pub use client::CaptionClient;
pub use config::CaptionConfig;
pub use error::CaptionError;
pub use retry::RetryingCaptioner;

/// Something that can describe a sampled frame in natural language.
#[async_trait]
pub trait Captioner: Send + Sync {
    /// Describe `frame`, or report why no description was produced.
    async fn describe(&self, frame: &Frame) -> Result<String, CaptionError>;

    /// Describe `frame` and fold any failure into a [`Caption`].
    ///
    /// Never fails: a caption error degrades to a failed caption so the
    /// rest of the pipeline still runs for this frame.
    async fn caption(&self, frame: &Frame) -> Caption {
        match self.describe(frame).await {
            Ok(text) => Caption::described(frame.index, text),
            Err(e) => {
                tracing::warn!(frame_index = frame.index, error = %e, "Caption request failed");
                e.into_caption(frame.index)
            }
        }
    }
}
