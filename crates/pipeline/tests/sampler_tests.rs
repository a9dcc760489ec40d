//! Integration tests for `FrameSampler` with a synthetic decoder.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use common::SyntheticDecoder;
use framewatch_core::CoreError;
use framewatch_pipeline::{FrameSampler, PipelineError, VideoInput};

fn file_input() -> VideoInput {
    VideoInput::File("/videos/clip.mp4".into())
}

// ---------------------------------------------------------------------------
// Stride
// ---------------------------------------------------------------------------

/// 30 frames at interval 10 keep indices 0, 10 and 20.
#[tokio::test]
async fn keeps_every_interval_th_frame() {
    let dir = tempfile::tempdir().unwrap();
    let sampler = FrameSampler::new(Arc::new(SyntheticDecoder::new(30)), dir.path());

    let frames = sampler.sample(file_input(), 10).await.unwrap();
    let indices: Vec<u64> = frames.iter().map(|f| f.index).collect();
    assert_eq!(indices, vec![0, 10, 20]);
}

/// The count is the ceiling of total / interval.
#[tokio::test]
async fn frame_count_is_ceiling_of_total_over_interval() {
    let dir = tempfile::tempdir().unwrap();
    for (total, interval, expected) in [(31, 10, 4), (1, 10, 1), (7, 1, 7), (9, 3, 3)] {
        let sampler = FrameSampler::new(Arc::new(SyntheticDecoder::new(total)), dir.path());
        let frames = sampler.sample(file_input(), interval).await.unwrap();
        assert_eq!(frames.len(), expected, "total={total} interval={interval}");
    }
}

#[tokio::test]
async fn zero_interval_is_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    let sampler = FrameSampler::new(Arc::new(SyntheticDecoder::new(30)), dir.path());

    let result = sampler.sample(file_input(), 0).await;
    assert_matches!(result, Err(PipelineError::Core(CoreError::InvalidConfig(_))));
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Each kept frame is written as `<dir>/<stem>/frame_<index>.jpg` and the
/// file matches the in-memory JPEG.
#[tokio::test]
async fn frames_are_written_under_video_stem() {
    let dir = tempfile::tempdir().unwrap();
    let sampler = FrameSampler::new(Arc::new(SyntheticDecoder::new(12)), dir.path());

    let frames = sampler.sample(file_input(), 5).await.unwrap();
    assert_eq!(frames.len(), 3);

    for frame in &frames {
        let expected = dir.path().join("clip").join(format!("frame_{}.jpg", frame.index));
        assert_eq!(frame.path, expected);
        let on_disk = std::fs::read(&frame.path).unwrap();
        assert_eq!(on_disk, frame.jpeg);
        assert_eq!(&on_disk[..2], &[0xff, 0xd8]);
    }
}

/// Uploaded bytes are spooled inside the frames directory while decoding and
/// removed afterwards.
#[tokio::test]
async fn uploaded_bytes_are_spooled_and_removed() {
    let dir = tempfile::tempdir().unwrap();
    let decoder = Arc::new(SyntheticDecoder::new(3));
    let sampler = FrameSampler::new(decoder.clone(), dir.path());

    let input = VideoInput::Bytes {
        file_name: "upload.mov".into(),
        bytes: vec![7u8; 1024],
    };
    let frames = sampler.sample(input, 1).await.unwrap();
    assert_eq!(frames.len(), 3);

    let opened = decoder.last_opened().unwrap();
    assert!(opened.existed, "spooled file should exist while decoding");
    assert_eq!(opened.len, 1024);
    assert!(opened.path.starts_with(dir.path()));
    assert_eq!(opened.path.extension().unwrap(), "mov");
    assert!(!opened.path.exists(), "spooled file should be removed");
    assert!(dir.path().join("upload").join("frame_0.jpg").exists());
}

/// The spooled upload is removed even when decoding fails.
#[tokio::test]
async fn spooled_upload_is_removed_on_decode_failure() {
    let dir = tempfile::tempdir().unwrap();
    let decoder = Arc::new(SyntheticDecoder::failing_on_open());
    let sampler = FrameSampler::new(decoder.clone(), dir.path());

    let input = VideoInput::Bytes {
        file_name: "broken.mp4".into(),
        bytes: vec![0u8; 16],
    };
    let result = sampler.sample(input, 10).await;
    assert_matches!(result, Err(PipelineError::Decode(_)));

    let opened = decoder.last_opened().unwrap();
    assert!(opened.existed);
    assert!(!opened.path.exists());
}

// ---------------------------------------------------------------------------
// Decode failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failure_before_first_frame_is_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let sampler = FrameSampler::new(Arc::new(SyntheticDecoder::failing_at(30, 0)), dir.path());

    let result = sampler.sample(file_input(), 10).await;
    assert_matches!(result, Err(PipelineError::Decode(_)));
}

/// A mid-stream failure keeps the frames sampled before it.
#[tokio::test]
async fn failure_mid_stream_returns_partial_frames() {
    let dir = tempfile::tempdir().unwrap();
    let sampler = FrameSampler::new(Arc::new(SyntheticDecoder::failing_at(30, 15)), dir.path());

    let frames = sampler.sample(file_input(), 10).await.unwrap();
    let indices: Vec<u64> = frames.iter().map(|f| f.index).collect();
    assert_eq!(indices, vec![0, 10]);
}
