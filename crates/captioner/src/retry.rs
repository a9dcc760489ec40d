//! Retry wrapper for captioners.
//!
//! Transport failures are retried with exponential backoff (1 s, 2 s, 4 s, then
//! capped). Service and malformed-response errors are returned immediately:
//! repeating the same request would produce the same answer.

use std::time::Duration;

use async_trait::async_trait;
use framewatch_core::Frame;

use crate::error::CaptionError;
use crate::Captioner;

/// Backoff delays in seconds; attempts past the end reuse the last entry.
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// Wraps a [`Captioner`] and retries transport failures.
pub struct RetryingCaptioner<C> {
    inner: C,
    max_retries: u32,
}

impl<C: Captioner> RetryingCaptioner<C> {
    pub fn new(inner: C, max_retries: u32) -> Self {
        Self { inner, max_retries }
    }

    fn delay_for(attempt: usize) -> Duration {
        let idx = attempt.min(RETRY_DELAYS_SECS.len() - 1);
        Duration::from_secs(RETRY_DELAYS_SECS[idx])
    }
}

#[async_trait]
impl<C: Captioner> Captioner for RetryingCaptioner<C> {
    async fn describe(&self, frame: &Frame) -> Result<String, CaptionError> {
        let mut attempt = 0usize;
        loop {
            match self.inner.describe(frame).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < self.max_retries as usize => {
                    let delay = Self::delay_for(attempt);
                    tracing::warn!(
                        frame_index = frame.index,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Caption attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
