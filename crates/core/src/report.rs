//! Per-frame results and the video-level moderation report.

use std::collections::HashSet;

use serde::Serialize;

use crate::caption::Caption;
use crate::error::CoreError;
use crate::frame::Frame;
use crate::keywords::{frequency_table, KeywordExtractor, KeywordSet};
use crate::moderation::ModerationScorer;

/// Whether the text of a failed caption is fed to keyword extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorTextPolicy {
    /// Tokenize the rendered error string like any other caption. Its own
    /// words become keywords and can flag or clear the frame.
    #[default]
    Tokenize,
    /// Failed captions produce an empty keyword set.
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStatus {
    Captioned,
    CaptionFailed,
}

/// Everything known about one sampled frame after scoring.
#[derive(Debug, Clone, Serialize)]
pub struct FrameResult {
    pub frame: Frame,
    pub caption: Caption,
    /// Rendered caption text (description or error string).
    pub caption_text: String,
    pub keywords: KeywordSet,
    /// Keywords that matched the active vocabulary.
    pub matched_keywords: Vec<String>,
    pub flagged: bool,
    pub status: FrameStatus,
}

impl FrameResult {
    /// Extract keywords from `caption` and classify the frame.
    pub fn evaluate(
        frame: Frame,
        caption: Caption,
        extractor: &KeywordExtractor,
        scorer: &ModerationScorer,
        policy: ErrorTextPolicy,
    ) -> Self {
        let caption_text = caption.text();
        let status = if caption.is_failure() {
            FrameStatus::CaptionFailed
        } else {
            FrameStatus::Captioned
        };

        let keywords = match (status, policy) {
            (FrameStatus::CaptionFailed, ErrorTextPolicy::Skip) => KeywordSet::default(),
            _ => extractor.extract(&caption_text),
        };
        let matched_keywords = scorer.matched_keywords(&keywords);
        let flagged = !matched_keywords.is_empty();

        Self {
            frame,
            caption,
            caption_text,
            keywords,
            matched_keywords,
            flagged,
            status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordCount {
    pub keyword: String,
    /// Number of frames whose keyword set contains the keyword.
    pub frames: usize,
}

/// Aggregate moderation outcome for a whole video.
#[derive(Debug, Clone, Serialize)]
pub struct VideoReport {
    pub category: &'static str,
    pub total_frames: usize,
    pub flagged_frames: usize,
    /// `(total - flagged) / total * 100`, always within `0.0..=100.0`.
    pub safe_percentage: f64,
    /// Descending by frame count, ties in first-seen order.
    pub keyword_frequencies: Vec<KeywordCount>,
    pub flagged: Vec<FrameResult>,
}

impl VideoReport {
    /// Build the report from frame results in original frame order.
    ///
    /// Returns [`CoreError::EmptyInput`] for an empty slice rather than
    /// dividing by zero.
    pub fn aggregate(category: &'static str, results: &[FrameResult]) -> Result<Self, CoreError> {
        if results.is_empty() {
            return Err(CoreError::EmptyInput);
        }

        let total_frames = results.len();
        let flagged: Vec<FrameResult> = results.iter().filter(|r| r.flagged).cloned().collect();
        let flagged_frames = flagged.len();
        let safe_percentage =
            (total_frames - flagged_frames) as f64 / total_frames as f64 * 100.0;

        // A keyword counts once per frame even if the per-frame set were to
        // repeat it.
        let per_frame_terms = results.iter().flat_map(|r| {
            let mut seen = HashSet::new();
            r.keywords
                .iter()
                .filter(move |k| seen.insert(*k))
                .collect::<Vec<_>>()
        });
        let keyword_frequencies = frequency_table(per_frame_terms)
            .into_iter()
            .map(|(keyword, frames)| KeywordCount { keyword, frames })
            .collect();

        Ok(Self {
            category,
            total_frames,
            flagged_frames,
            safe_percentage,
            keyword_frequencies,
            flagged,
        })
    }

    /// Percentage of frames flagged; complements `safe_percentage`.
    pub fn flagged_percentage(&self) -> f64 {
        self.flagged_frames as f64 / self.total_frames as f64 * 100.0
    }

    /// The `n` most frequent keywords across the video.
    pub fn top_keywords(&self, n: usize) -> &[KeywordCount] {
        &self.keyword_frequencies[..n.min(self.keyword_frequencies.len())]
    }

    pub fn has_flagged_content(&self) -> bool {
        self.flagged_frames > 0
    }
}
