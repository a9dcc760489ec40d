use framewatch_core::{Caption, CaptionFailureKind};

/// Message recorded for a response with neither choices nor an error.
const MALFORMED_MESSAGE: &str = "response contained no caption choices";

/// Errors from a single caption request.
#[derive(Debug, thiserror::Error)]
pub enum CaptionError {
    /// The HTTP exchange itself failed (network, DNS, TLS, timeout, or an
    /// undecodable body).
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The service returned an explicit error payload.
    #[error("{0}")]
    Service(String),

    #[error("{MALFORMED_MESSAGE}")]
    MalformedResponse,
}

impl CaptionError {
    pub fn kind(&self) -> CaptionFailureKind {
        match self {
            Self::Transport(_) => CaptionFailureKind::Transport,
            Self::Service(_) => CaptionFailureKind::Service,
            Self::MalformedResponse => CaptionFailureKind::MalformedResponse,
        }
    }

    /// Only transport failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Convert into the failed caption recorded for `frame_index`.
    pub fn into_caption(self, frame_index: u64) -> Caption {
        let kind = self.kind();
        let message = match self {
            Self::Service(message) => message,
            other => other.to_string(),
        };
        Caption::failed(frame_index, kind, message)
    }
}
