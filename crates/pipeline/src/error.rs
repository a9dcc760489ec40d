use framewatch_core::ffmpeg::DecodeError;
use framewatch_core::CoreError;

/// Errors that stop a pipeline run.
///
/// Caption failures are not here: they degrade a single frame and never
/// abort the run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Invalid configuration or an empty frame set at aggregation time.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Video decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("Frame encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Frame storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Cancelled before any frame finished captioning.
    #[error("Run cancelled before any frame was processed")]
    Cancelled,
}
