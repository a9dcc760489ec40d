//! Frame types shared by the decoder, sampler and caption client.

use std::path::PathBuf;

use serde::Serialize;

use crate::types::FrameIndex;

/// Bytes per pixel of the packed `rgb24` layout produced by the decoder.
pub const RGB_BYTES_PER_PIXEL: usize = 3;

/// A decoded frame as it comes off the video decoder, before sampling.
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// Position in the original frame sequence (0-based).
    pub index: FrameIndex,
    pub width: u32,
    pub height: u32,
    /// Packed `rgb24` pixels, row-major.
    pub rgb: Vec<u8>,
}

impl RawFrame {
    /// Number of bytes a `width` x `height` rgb24 frame occupies.
    pub fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * RGB_BYTES_PER_PIXEL
    }

    /// Whether the pixel buffer matches the declared dimensions.
    pub fn is_complete(&self) -> bool {
        self.rgb.len() == Self::byte_len(self.width, self.height)
    }
}

/// A sampled frame that has been encoded and written to storage.
///
/// Only frames whose index is a multiple of the sampling interval are ever
/// materialized. A `Frame` is never mutated after the sampler creates it.
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    /// Position in the original frame sequence (0-based).
    pub index: FrameIndex,
    pub width: u32,
    pub height: u32,
    /// Where the JPEG artifact for this frame was written.
    pub path: PathBuf,
    /// Encoded JPEG bytes, identical to the file at `path`.
    #[serde(skip)]
    pub jpeg: Vec<u8>,
}

impl Frame {
    /// File name used for a frame's stored artifact. Unique per index.
    pub fn file_name(index: FrameIndex) -> String {
        format!("frame_{index}.jpg")
    }
}
