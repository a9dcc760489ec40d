//! Caption outcomes for sampled frames.
//!
//! A caption is a tagged result rather than a string that doubles as an
//! error channel. [`Caption::text`] renders the user-visible text, including
//! the error wording downstream consumers match on.

use serde::Serialize;

use crate::types::FrameIndex;

/// Prefix on the rendered text of a transport failure.
pub const TRANSPORT_ERROR_PREFIX: &str = "API request error:";

/// Prefix on the rendered text of a service-reported failure.
pub const SERVICE_ERROR_PREFIX: &str = "Error:";

/// Rendered text of a response that lacked the expected structure.
pub const MALFORMED_RESPONSE_TEXT: &str = "Failed to get caption from API";

/// Why a caption could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptionFailureKind {
    /// Network, connection, timeout or body-decoding failure.
    Transport,
    /// The service answered with an explicit error payload.
    Service,
    /// The response had neither choices nor an error.
    MalformedResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CaptionOutcome {
    Described { text: String },
    Failed { kind: CaptionFailureKind, message: String },
}

/// The captioning result for exactly one sampled frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Caption {
    pub frame_index: FrameIndex,
    #[serde(flatten)]
    pub outcome: CaptionOutcome,
}

impl Caption {
    pub fn described(frame_index: FrameIndex, text: impl Into<String>) -> Self {
        Self {
            frame_index,
            outcome: CaptionOutcome::Described { text: text.into() },
        }
    }

    pub fn failed(
        frame_index: FrameIndex,
        kind: CaptionFailureKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            frame_index,
            outcome: CaptionOutcome::Failed {
                kind,
                message: message.into(),
            },
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, CaptionOutcome::Failed { .. })
    }

    /// User-visible caption text.
    ///
    /// Failed captions render as an error string whose prefix identifies the
    /// failure kind.
    pub fn text(&self) -> String {
        match &self.outcome {
            CaptionOutcome::Described { text } => text.clone(),
            CaptionOutcome::Failed { kind, message } => match kind {
                CaptionFailureKind::Transport => format!("{TRANSPORT_ERROR_PREFIX} {message}"),
                CaptionFailureKind::Service => format!("{SERVICE_ERROR_PREFIX} {message}"),
                CaptionFailureKind::MalformedResponse => MALFORMED_RESPONSE_TEXT.to_string(),
            },
        }
    }
}
