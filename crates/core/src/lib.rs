//! Core data model and pure logic for the framewatch moderation pipeline.
//!
//! Everything here is free of network I/O so it can be shared by the
//! caption client, the pipeline orchestrator and the CLI:
//!
//! - [`frame`]: raw and sampled frame types.
//! - [`caption`]: tagged caption outcomes.
//! - [`keywords`] / [`stopwords`]: caption keyword extraction.
//! - [`moderation`]: vocabularies and per-frame classification.
//! - [`report`]: per-frame results and video-level aggregation.
//! - [`ffmpeg`]: `ffprobe`/`ffmpeg` command helpers.
//! - [`env`]: typed environment lookups for configuration.

pub mod caption;
pub mod env;
pub mod error;
pub mod ffmpeg;
pub mod frame;
pub mod keywords;
pub mod moderation;
pub mod report;
pub mod stopwords;
pub mod types;

pub use caption::{Caption, CaptionFailureKind, CaptionOutcome};
pub use error::CoreError;
pub use frame::{Frame, RawFrame};
pub use keywords::{KeywordExtractor, KeywordSet, MAX_KEYWORDS};
pub use moderation::{ModerationCategory, ModerationScorer, ModerationVocabulary};
pub use report::{ErrorTextPolicy, FrameResult, FrameStatus, KeywordCount, VideoReport};
pub use stopwords::StopWords;
