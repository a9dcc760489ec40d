//! Video decoding seam.
//!
//! [`VideoDecoder`] opens a video and yields raw frames in order through a
//! [`FrameStream`]. [`FfmpegDecoder`] is the production implementation: it
//! probes the video with `ffprobe` for its dimensions, then reads packed
//! `rgb24` frames from an `ffmpeg` child process one frame at a time.

use std::path::Path;

use async_trait::async_trait;
use framewatch_core::ffmpeg::{self, DecodeError, VideoMetadata};
use framewatch_core::RawFrame;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, ChildStdout};
use tokio::task::JoinHandle;

/// Opens videos for sequential decoding.
#[async_trait]
pub trait VideoDecoder: Send + Sync {
    async fn open(&self, path: &Path) -> Result<Box<dyn FrameStream>, DecodeError>;
}

/// An ordered stream of decoded frames.
#[async_trait]
pub trait FrameStream: Send {
    /// The next frame, or `None` once the video is exhausted.
    async fn next_frame(&mut self) -> Result<Option<RawFrame>, DecodeError>;

    /// Total frame count if the container reports one.
    fn total_frames(&self) -> Option<u64> {
        None
    }
}

// ---------------------------------------------------------------------------
// FfmpegDecoder
// ---------------------------------------------------------------------------

/// Decodes through the `ffprobe`/`ffmpeg` binaries on `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegDecoder;

#[async_trait]
impl VideoDecoder for FfmpegDecoder {
    async fn open(&self, path: &Path) -> Result<Box<dyn FrameStream>, DecodeError> {
        let metadata = ffmpeg::probe_metadata(path).await?;
        tracing::info!(
            path = %path.display(),
            width = metadata.width,
            height = metadata.height,
            framerate = metadata.framerate,
            total_frames = metadata.total_frames,
            codec = %metadata.codec,
            "Video probed",
        );

        let child = ffmpeg::raw_frames_command(path)
            .spawn()
            .map_err(DecodeError::NotFound)?;
        Ok(Box::new(FfmpegFrameStream::from_child(child, metadata)?))
    }
}

/// Read a child's stderr to the end on a separate task, so a chatty decoder
/// never blocks on a full pipe while stdout is being read.
fn drain_stderr(stderr: Option<impl AsyncRead + Unpin + Send + 'static>) -> JoinHandle<String> {
    tokio::spawn(async move {
        let mut text = String::new();
        if let Some(mut pipe) = stderr {
            let mut bytes = Vec::new();
            if let Err(e) = pipe.read_to_end(&mut bytes).await {
                tracing::warn!(error = %e, "Failed to read ffmpeg stderr");
            }
            text = String::from_utf8_lossy(&bytes).into_owned();
        }
        text
    })
}

struct FfmpegFrameStream {
    metadata: VideoMetadata,
    frame_len: usize,
    child: Child,
    stdout: ChildStdout,
    stderr: Option<JoinHandle<String>>,
    next_index: u64,
    finished: bool,
}

impl FfmpegFrameStream {
    /// Wrap a spawned decoder whose stdout carries packed `rgb24` frames of
    /// the probed size.
    fn from_child(mut child: Child, metadata: VideoMetadata) -> Result<Self, DecodeError> {
        let stdout = child.stdout.take().ok_or_else(|| {
            DecodeError::ParseError("ffmpeg stdout was not captured".to_string())
        })?;
        let stderr = drain_stderr(child.stderr.take());

        Ok(Self {
            frame_len: RawFrame::byte_len(metadata.width, metadata.height),
            metadata,
            child,
            stdout,
            stderr: Some(stderr),
            next_index: 0,
            finished: false,
        })
    }

    /// Fill `buf` from stdout. Returns the number of bytes read, which is
    /// short only at end of stream.
    async fn read_full(&mut self, buf: &mut [u8]) -> Result<usize, DecodeError> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.stdout.read(&mut buf[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }

    /// Reap the child and turn a non-zero exit into an error.
    async fn finish(&mut self) -> Result<(), DecodeError> {
        self.finished = true;

        let status = self.child.wait().await?;
        let stderr = match self.stderr.take() {
            Some(handle) => handle.await.unwrap_or_default(),
            None => String::new(),
        };
        if !status.success() {
            return Err(DecodeError::ExecutionFailed {
                exit_code: status.code(),
                stderr,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl FrameStream for FfmpegFrameStream {
    async fn next_frame(&mut self) -> Result<Option<RawFrame>, DecodeError> {
        if self.finished {
            return Ok(None);
        }

        let mut rgb = vec![0u8; self.frame_len];
        let read = self.read_full(&mut rgb).await?;

        if read == 0 {
            self.finish().await?;
            return Ok(None);
        }
        if read < self.frame_len {
            let index = self.next_index;
            // Surface a process failure in preference to the short read.
            self.finish().await?;
            return Err(DecodeError::TruncatedFrame {
                index,
                expected: self.frame_len,
                actual: read,
            });
        }

        let frame = RawFrame {
            index: self.next_index,
            width: self.metadata.width,
            height: self.metadata.height,
            rgb,
        };
        self.next_index += 1;
        Ok(Some(frame))
    }

    fn total_frames(&self) -> Option<u64> {
        (self.metadata.total_frames > 0).then_some(self.metadata.total_frames)
    }
}

#[cfg(test)]
mod tests {
    use std::process::Stdio;
    use std::time::Duration;

    use super::*;

    /// A 2x2 frame is 12 bytes of rgb24.
    fn metadata() -> VideoMetadata {
        VideoMetadata {
            width: 2,
            height: 2,
            framerate: 25.0,
            total_frames: 0,
            codec: "rawvideo".into(),
        }
    }

    /// Stream over a shell script standing in for ffmpeg.
    fn scripted(script: &str) -> FfmpegFrameStream {
        let child = tokio::process::Command::new("sh")
            .args(["-c", script])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .unwrap();
        FfmpegFrameStream::from_child(child, metadata()).unwrap()
    }

    async fn next(stream: &mut FfmpegFrameStream) -> Result<Option<RawFrame>, DecodeError> {
        tokio::time::timeout(Duration::from_secs(10), stream.next_frame())
            .await
            .expect("decoder stalled")
    }

    #[tokio::test]
    async fn open_missing_file_is_video_not_found() {
        let result = FfmpegDecoder
            .open(Path::new("/nonexistent/framewatch/clip.mp4"))
            .await;
        assert!(matches!(result, Err(DecodeError::VideoNotFound(_))));
    }

    #[tokio::test]
    async fn reads_whole_frames_in_order() {
        let mut stream = scripted("head -c 36 /dev/zero");

        for expected in 0..3 {
            let frame = next(&mut stream).await.unwrap().unwrap();
            assert_eq!(frame.index, expected);
            assert_eq!((frame.width, frame.height), (2, 2));
            assert!(frame.is_complete());
        }
        assert!(next(&mut stream).await.unwrap().is_none());
        assert!(next(&mut stream).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn short_trailing_frame_is_truncated() {
        let mut stream = scripted("head -c 17 /dev/zero");

        assert!(next(&mut stream).await.unwrap().is_some());
        let err = next(&mut stream).await.unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TruncatedFrame {
                index: 1,
                expected: 12,
                actual: 5,
            }
        ));
    }

    #[tokio::test]
    async fn failing_exit_status_carries_stderr() {
        let mut stream = scripted("head -c 12 /dev/zero; echo 'moov atom not found' >&2; exit 3");

        assert!(next(&mut stream).await.unwrap().is_some());
        let err = next(&mut stream).await.unwrap_err();
        match err {
            DecodeError::ExecutionFailed { exit_code, stderr } => {
                assert_eq!(exit_code, Some(3));
                assert!(stderr.contains("moov atom not found"));
            }
            other => panic!("expected ExecutionFailed, got {other:?}"),
        }
    }

    /// Far more than a pipe buffer of stderr ahead of the first frame must
    /// not stall frame reads.
    #[tokio::test]
    async fn heavy_stderr_output_does_not_block_frames() {
        let mut stream = scripted("yes e | head -c 200000 >&2; head -c 12 /dev/zero");

        let frame = next(&mut stream).await.unwrap().unwrap();
        assert_eq!(frame.index, 0);
        assert!(next(&mut stream).await.unwrap().is_none());
    }
}
