//! Fakes shared by the pipeline integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use framewatch_captioner::{CaptionError, Captioner};
use framewatch_core::ffmpeg::DecodeError;
use framewatch_core::{Frame, RawFrame};
use framewatch_pipeline::{FrameStream, VideoDecoder};

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// What the decoder saw when it was asked to open a video.
#[derive(Debug, Clone)]
pub struct OpenRecord {
    pub path: PathBuf,
    pub existed: bool,
    pub len: u64,
}

/// Produces `total` solid-colour frames without touching ffmpeg.
#[derive(Default)]
pub struct SyntheticDecoder {
    pub total: u64,
    /// Fail with a truncated-frame error when this index is reached.
    pub fail_at: Option<u64>,
    pub fail_on_open: bool,
    pub opened: Mutex<Vec<OpenRecord>>,
}

impl SyntheticDecoder {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub fn failing_at(total: u64, index: u64) -> Self {
        Self {
            total,
            fail_at: Some(index),
            ..Default::default()
        }
    }

    pub fn failing_on_open() -> Self {
        Self {
            fail_on_open: true,
            ..Default::default()
        }
    }

    pub fn last_opened(&self) -> Option<OpenRecord> {
        self.opened.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl VideoDecoder for SyntheticDecoder {
    async fn open(&self, path: &Path) -> Result<Box<dyn FrameStream>, DecodeError> {
        let meta = std::fs::metadata(path).ok();
        self.opened.lock().unwrap().push(OpenRecord {
            path: path.to_path_buf(),
            existed: meta.is_some(),
            len: meta.map(|m| m.len()).unwrap_or(0),
        });

        if self.fail_on_open {
            return Err(DecodeError::NoVideoStream(path.display().to_string()));
        }

        Ok(Box::new(SyntheticStream {
            total: self.total,
            fail_at: self.fail_at,
            next: 0,
        }))
    }
}

struct SyntheticStream {
    total: u64,
    fail_at: Option<u64>,
    next: u64,
}

const WIDTH: u32 = 8;
const HEIGHT: u32 = 6;

#[async_trait]
impl FrameStream for SyntheticStream {
    async fn next_frame(&mut self) -> Result<Option<RawFrame>, DecodeError> {
        if self.fail_at == Some(self.next) {
            return Err(DecodeError::TruncatedFrame {
                index: self.next,
                expected: RawFrame::byte_len(WIDTH, HEIGHT),
                actual: 7,
            });
        }
        if self.next >= self.total {
            return Ok(None);
        }

        let shade = (self.next % 256) as u8;
        let frame = RawFrame {
            index: self.next,
            width: WIDTH,
            height: HEIGHT,
            rgb: vec![shade; RawFrame::byte_len(WIDTH, HEIGHT)],
        };
        self.next += 1;
        Ok(Some(frame))
    }

    fn total_frames(&self) -> Option<u64> {
        Some(self.total)
    }
}

// ---------------------------------------------------------------------------
// Captioner
// ---------------------------------------------------------------------------

type Script = dyn Fn(u64) -> Result<String, CaptionError> + Send + Sync;

/// Answers caption requests from a script keyed by frame index, tracking how
/// many requests overlap.
pub struct ScriptedCaptioner {
    script: Box<Script>,
    delay: Box<dyn Fn(u64) -> Duration + Send + Sync>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub calls: AtomicUsize,
}

impl ScriptedCaptioner {
    pub fn new(script: impl Fn(u64) -> Result<String, CaptionError> + Send + Sync + 'static) -> Self {
        Self {
            script: Box::new(script),
            delay: Box::new(|_| Duration::ZERO),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    /// Same caption for every frame.
    pub fn constant(text: &'static str) -> Self {
        Self::new(move |_| Ok(text.to_string()))
    }

    pub fn with_delay(mut self, delay: impl Fn(u64) -> Duration + Send + Sync + 'static) -> Self {
        self.delay = Box::new(delay);
        self
    }
}

#[async_trait]
impl Captioner for ScriptedCaptioner {
    async fn describe(&self, frame: &Frame) -> Result<String, CaptionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = (self.delay)(frame.index);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let result = (self.script)(frame.index);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// A transport error without any network traffic.
pub fn transport_error() -> CaptionError {
    let err = reqwest::Client::new().get("://bad").build().unwrap_err();
    CaptionError::Transport(err)
}
