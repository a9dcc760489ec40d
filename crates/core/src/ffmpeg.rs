//! FFmpeg/FFprobe command helpers.
//!
//! `ffprobe` supplies the stream metadata needed to size raw frames;
//! `ffmpeg` decodes the video into a stream of packed `rgb24` frames on
//! stdout, which the pipeline's decoder reads one frame at a time.

use std::path::Path;
use std::process::Stdio;

use serde::Deserialize;

/// Error type for video probing and decoding.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("ffprobe/ffmpeg binary not found: {0}")]
    NotFound(std::io::Error),

    #[error("ffprobe/ffmpeg execution failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("failed to parse ffprobe output: {0}")]
    ParseError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("video file not found: {0}")]
    VideoNotFound(String),

    #[error("no decodable video stream in {0}")]
    NoVideoStream(String),

    #[error("frame {index} truncated: expected {expected} bytes, got {actual}")]
    TruncatedFrame {
        index: u64,
        expected: usize,
        actual: usize,
    },
}

// ---------------------------------------------------------------------------
// ffprobe JSON output structures
// ---------------------------------------------------------------------------

/// Top-level ffprobe JSON output (`-print_format json -show_format -show_streams`).
#[derive(Debug, Deserialize)]
pub struct FfprobeOutput {
    #[serde(default)]
    pub streams: Vec<FfprobeStream>,
    pub format: FfprobeFormat,
}

/// A single stream from ffprobe output.
#[derive(Debug, Deserialize)]
pub struct FfprobeStream {
    pub index: i32,
    pub codec_name: Option<String>,
    pub codec_type: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// e.g. "30/1" or "24000/1001"
    pub r_frame_rate: Option<String>,
    pub duration: Option<String>,
    pub nb_frames: Option<String>,
}

/// Format-level metadata from ffprobe.
#[derive(Debug, Deserialize)]
pub struct FfprobeFormat {
    pub duration: Option<String>,
    pub format_name: Option<String>,
}

/// Video metadata the decoder needs before reading raw frames.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub framerate: f64,
    /// Best-effort frame count; 0 when ffprobe cannot tell.
    pub total_frames: u64,
    pub codec: String,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run `ffprobe` on a video file and return the parsed JSON output.
pub async fn probe_video(path: &Path) -> Result<FfprobeOutput, DecodeError> {
    if !path.exists() {
        return Err(DecodeError::VideoNotFound(
            path.to_string_lossy().to_string(),
        ));
    }

    let output = tokio::process::Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .await
        .map_err(DecodeError::NotFound)?;

    if !output.status.success() {
        return Err(DecodeError::ExecutionFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str::<FfprobeOutput>(&stdout)
        .map_err(|e| DecodeError::ParseError(format!("{e}: {stdout}")))
}

/// Probe `path` and reduce the output to [`VideoMetadata`].
///
/// Fails with [`DecodeError::NoVideoStream`] when there is no video stream
/// with known dimensions.
pub async fn probe_metadata(path: &Path) -> Result<VideoMetadata, DecodeError> {
    let probe = probe_video(path).await?;
    metadata_from_probe(&probe)
        .ok_or_else(|| DecodeError::NoVideoStream(path.to_string_lossy().to_string()))
}

/// Build an `ffmpeg` command that decodes every frame of `path` to packed
/// `rgb24` on stdout, without dropping or duplicating frames.
///
/// Frames keep the coded stream size reported by ffprobe: display-matrix
/// rotation is not applied, otherwise portrait clips would come out with
/// width and height swapped.
pub fn raw_frames_command(path: &Path) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new("ffmpeg");
    cmd.args(["-v", "error", "-nostdin", "-noautorotate", "-i"])
        .arg(path)
        .args([
            "-map", "0:v:0", "-vsync", "passthrough", "-f", "rawvideo", "-pix_fmt", "rgb24", "-",
        ])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// Find the first video stream in the ffprobe output.
fn first_video_stream(probe: &FfprobeOutput) -> Option<&FfprobeStream> {
    probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
}

/// Reduce ffprobe output to decoder metadata. `None` without a sized video stream.
pub fn metadata_from_probe(probe: &FfprobeOutput) -> Option<VideoMetadata> {
    let (width, height) = parse_resolution(probe);
    if width == 0 || height == 0 {
        return None;
    }
    Some(VideoMetadata {
        width,
        height,
        framerate: parse_framerate(probe),
        total_frames: parse_total_frames(probe),
        codec: parse_video_codec(probe),
    })
}

/// Parse the video duration in seconds from ffprobe output.
pub fn parse_duration(probe: &FfprobeOutput) -> f64 {
    // Try format-level duration first.
    if let Some(secs) = probe.format.duration.as_deref().and_then(|d| d.parse::<f64>().ok()) {
        return secs;
    }
    first_video_stream(probe)
        .and_then(|s| s.duration.as_deref())
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Parse the video framerate from ffprobe output.
///
/// The `r_frame_rate` field is a fraction like `"30/1"` or `"24000/1001"`.
pub fn parse_framerate(probe: &FfprobeOutput) -> f64 {
    first_video_stream(probe)
        .and_then(|s| s.r_frame_rate.as_deref())
        .map(parse_fraction)
        .unwrap_or(0.0)
}

/// Parse a fraction string like `"30/1"` into a float.
fn parse_fraction(s: &str) -> f64 {
    match s.split_once('/') {
        Some((num, den)) => {
            let num = num.parse::<f64>().unwrap_or(0.0);
            let den = den.parse::<f64>().unwrap_or(1.0);
            if den > 0.0 {
                num / den
            } else {
                0.0
            }
        }
        None => s.parse::<f64>().unwrap_or(0.0),
    }
}

/// Count total frames from ffprobe output.
pub fn parse_total_frames(probe: &FfprobeOutput) -> u64 {
    if let Some(n) = first_video_stream(probe)
        .and_then(|s| s.nb_frames.as_deref())
        .and_then(|nb| nb.parse::<u64>().ok())
    {
        return n;
    }
    // Estimate from duration * framerate.
    let duration = parse_duration(probe);
    let fps = parse_framerate(probe);
    if duration > 0.0 && fps > 0.0 {
        return (duration * fps).round() as u64;
    }
    0
}

/// Find the first video stream's codec name.
pub fn parse_video_codec(probe: &FfprobeOutput) -> String {
    first_video_stream(probe)
        .and_then(|s| s.codec_name.clone())
        .unwrap_or_default()
}

/// Find the first video stream's resolution.
pub fn parse_resolution(probe: &FfprobeOutput) -> (u32, u32) {
    first_video_stream(probe)
        .map(|s| (s.width.unwrap_or(0), s.height.unwrap_or(0)))
        .unwrap_or((0, 0))
}
