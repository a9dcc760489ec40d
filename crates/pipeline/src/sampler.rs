//! Fixed-stride frame sampling.
//!
//! [`FrameSampler`] decodes a video sequentially and keeps frame `i` iff
//! `i % interval == 0`. Each kept frame is JPEG-encoded and written to
//! `<frames_dir>/<video stem>/frame_<index>.jpg`.
//!
//! Uploaded bytes are spooled to a temporary file inside `frames_dir`; the
//! [`tempfile::NamedTempFile`] guard removes it when sampling returns, on
//! success and failure alike.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use framewatch_core::ffmpeg::DecodeError;
use framewatch_core::{CoreError, Frame, RawFrame};
use image::{ImageFormat, RgbImage};
use tempfile::NamedTempFile;
use tokio_util::sync::CancellationToken;

use crate::decoder::VideoDecoder;
use crate::error::PipelineError;

/// Stem used when the input name has none.
const FALLBACK_STEM: &str = "video";

/// Video to sample.
#[derive(Debug, Clone)]
pub enum VideoInput {
    /// Uploaded content plus the name it was uploaded under.
    Bytes { file_name: String, bytes: Vec<u8> },
    /// A video already on disk.
    File(PathBuf),
}

impl VideoInput {
    /// Directory name for this video's frames.
    pub fn stem(&self) -> String {
        let path = match self {
            Self::Bytes { file_name, .. } => Path::new(file_name),
            Self::File(path) => path.as_path(),
        };
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| FALLBACK_STEM.to_string())
    }
}

/// Decodes videos and persists every `interval`-th frame.
pub struct FrameSampler {
    decoder: Arc<dyn VideoDecoder>,
    frames_dir: PathBuf,
}

impl FrameSampler {
    pub fn new(decoder: Arc<dyn VideoDecoder>, frames_dir: impl Into<PathBuf>) -> Self {
        Self {
            decoder,
            frames_dir: frames_dir.into(),
        }
    }

    /// Sample `input`, keeping frames at indices `0, interval, 2*interval, ...`.
    pub async fn sample(&self, input: VideoInput, interval: u64) -> Result<Vec<Frame>, PipelineError> {
        self.sample_until(input, interval, &CancellationToken::new())
            .await
    }

    /// Like [`sample`](Self::sample), but stops decoding once `cancel` fires
    /// and returns the frames sampled so far.
    pub async fn sample_until(
        &self,
        input: VideoInput,
        interval: u64,
        cancel: &CancellationToken,
    ) -> Result<Vec<Frame>, PipelineError> {
        if interval == 0 {
            return Err(CoreError::InvalidConfig("Frame interval must be at least 1".to_string()).into());
        }

        let output_dir = self.frames_dir.join(input.stem());
        tokio::fs::create_dir_all(&output_dir).await?;

        // Held until return so the spooled upload outlives decoding.
        let (video_path, _spool) = self.materialize(input).await?;

        let mut stream = self.decoder.open(&video_path).await?;
        if let Some(total) = stream.total_frames() {
            tracing::info!(total_frames = total, interval, "Sampling video");
        }

        let mut frames = Vec::new();
        loop {
            if cancel.is_cancelled() {
                tracing::info!(sampled = frames.len(), "Sampling cancelled");
                break;
            }

            let raw = match stream.next_frame().await {
                Ok(Some(raw)) => raw,
                Ok(None) => break,
                Err(e) if frames.is_empty() => return Err(e.into()),
                Err(e) => {
                    tracing::warn!(
                        sampled = frames.len(),
                        error = %e,
                        "Decoder failed mid-stream, keeping frames sampled so far",
                    );
                    break;
                }
            };

            if raw.index % interval != 0 {
                continue;
            }
            frames.push(store_frame(raw, &output_dir).await?);
        }

        tracing::info!(
            sampled = frames.len(),
            dir = %output_dir.display(),
            "Frame sampling complete",
        );
        Ok(frames)
    }

    /// Resolve the input to a path the decoder can open.
    async fn materialize(
        &self,
        input: VideoInput,
    ) -> Result<(PathBuf, Option<NamedTempFile>), PipelineError> {
        match input {
            VideoInput::File(path) => Ok((path, None)),
            VideoInput::Bytes { file_name, bytes } => {
                // Keep the extension so the decoder can sniff the container.
                let suffix = Path::new(&file_name)
                    .extension()
                    .map(|e| format!(".{}", e.to_string_lossy()))
                    .unwrap_or_default();
                let mut builder = tempfile::Builder::new();
                builder.prefix(".upload-").suffix(&suffix);

                let spool = builder.tempfile_in(&self.frames_dir)?;
                tokio::fs::write(spool.path(), &bytes).await?;
                tracing::debug!(
                    file_name = %file_name,
                    bytes = bytes.len(),
                    spool = %spool.path().display(),
                    "Spooled uploaded video",
                );
                Ok((spool.path().to_path_buf(), Some(spool)))
            }
        }
    }
}

/// Encode `raw` as JPEG and write it under `dir`.
async fn store_frame(raw: RawFrame, dir: &Path) -> Result<Frame, PipelineError> {
    let (index, width, height) = (raw.index, raw.width, raw.height);
    let jpeg = encode_jpeg(raw)?;
    let path = dir.join(Frame::file_name(index));
    tokio::fs::write(&path, &jpeg).await?;

    tracing::debug!(frame_index = index, path = %path.display(), "Frame stored");
    Ok(Frame {
        index,
        width,
        height,
        path,
        jpeg,
    })
}

/// JPEG-encode a packed rgb24 frame.
pub fn encode_jpeg(raw: RawFrame) -> Result<Vec<u8>, PipelineError> {
    let truncated = DecodeError::TruncatedFrame {
        index: raw.index,
        expected: RawFrame::byte_len(raw.width, raw.height),
        actual: raw.rgb.len(),
    };
    if !raw.is_complete() {
        return Err(truncated.into());
    }
    let image = RgbImage::from_raw(raw.width, raw.height, raw.rgb).ok_or(truncated)?;

    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Jpeg)?;
    Ok(buf.into_inner())
}
