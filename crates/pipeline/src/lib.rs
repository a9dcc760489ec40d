//! Video moderation pipeline: sample frames, caption them, score captions.
//!
//! [`Pipeline`] is the composition root. It owns a [`FrameSampler`] over a
//! [`VideoDecoder`], a shared [`Captioner`](framewatch_captioner::Captioner),
//! and the immutable keyword extractor and scorer used for every frame.

pub mod config;
pub mod decoder;
pub mod error;
pub mod orchestrator;
pub mod sampler;

pub use config::PipelineConfig;
pub use decoder::{FfmpegDecoder, FrameStream, VideoDecoder};
pub use error::PipelineError;
pub use orchestrator::{Pipeline, PipelineOutput};
pub use sampler::{FrameSampler, VideoInput};
