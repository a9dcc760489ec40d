//! Pipeline composition root.
//!
//! A run samples the video, captions the sampled frames through a bounded
//! worker pool, then extracts keywords, classifies each frame and aggregates
//! the report in original frame order.
//!
//! Cancellation stops new caption requests from starting. Requests already in
//! flight finish or time out, and the report covers the frames that finished.

use std::collections::HashMap;
use std::sync::Arc;

use framewatch_captioner::Captioner;
use framewatch_core::types::Timestamp;
use framewatch_core::{
    Caption, CaptionFailureKind, ErrorTextPolicy, Frame, FrameResult, KeywordExtractor, ModerationScorer,
    VideoReport,
};
use serde::Serialize;
use tokio::task::{self, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::config::PipelineConfig;
use crate::decoder::VideoDecoder;
use crate::error::PipelineError;
use crate::sampler::{FrameSampler, VideoInput};

/// Everything a caller needs to render a run without recomputation.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub report: VideoReport,
    /// Every processed frame, in original frame order.
    pub frames: Vec<FrameResult>,
    /// Whether the run was cut short; `frames` then covers only the frames
    /// that finished captioning.
    pub cancelled: bool,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
}

/// Captions produced by the worker pool, positionally aligned with the input.
struct CaptionBatch {
    captions: Vec<Option<Caption>>,
    cancelled: bool,
}

/// Frame moderation pipeline.
pub struct Pipeline {
    sampler: FrameSampler,
    captioner: Arc<dyn Captioner>,
    extractor: KeywordExtractor,
    scorer: ModerationScorer,
    frame_interval: u64,
    caption_concurrency: usize,
    error_policy: ErrorTextPolicy,
}

impl Pipeline {
    /// Build a pipeline. Fails with `InvalidConfig` before any work starts.
    pub fn new(
        config: &PipelineConfig,
        decoder: Arc<dyn VideoDecoder>,
        captioner: Arc<dyn Captioner>,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            sampler: FrameSampler::new(decoder, config.frames_dir.clone()),
            captioner,
            extractor: KeywordExtractor::default(),
            scorer: ModerationScorer::new(&config.vocabulary),
            frame_interval: config.frame_interval,
            caption_concurrency: config.caption_concurrency,
            error_policy: config.error_policy,
        })
    }

    /// Run the pipeline to completion, or until `cancel` fires.
    pub async fn run(
        &self,
        input: VideoInput,
        cancel: CancellationToken,
    ) -> Result<PipelineOutput, PipelineError> {
        let started_at = chrono::Utc::now();
        tracing::info!(
            video = %input.stem(),
            interval = self.frame_interval,
            concurrency = self.caption_concurrency,
            category = self.scorer.label(),
            "Starting moderation run",
        );

        let frames = self
            .sampler
            .sample_until(input, self.frame_interval, &cancel)
            .await?;
        let sampled = frames.len();

        let batch = self.caption_frames(&frames, &cancel).await;
        let cancelled = batch.cancelled;

        let results: Vec<FrameResult> = frames
            .into_iter()
            .zip(batch.captions)
            .filter_map(|(frame, caption)| {
                caption.map(|caption| {
                    FrameResult::evaluate(
                        frame,
                        caption,
                        &self.extractor,
                        &self.scorer,
                        self.error_policy,
                    )
                })
            })
            .collect();

        if results.is_empty() && cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let report = VideoReport::aggregate(self.scorer.label(), &results)?;
        tracing::info!(
            sampled,
            processed = results.len(),
            flagged = report.flagged_frames,
            safe_percentage = report.safe_percentage,
            cancelled,
            "Moderation run complete",
        );

        Ok(PipelineOutput {
            report,
            frames: results,
            cancelled,
            started_at,
            finished_at: chrono::Utc::now(),
        })
    }

    /// Caption `frames` with at most `caption_concurrency` requests in
    /// flight, refilling the pool as each request completes.
    ///
    /// A task that panics still yields a failed caption for its frame, so
    /// every frame that was dispatched is reported.
    async fn caption_frames(&self, frames: &[Frame], cancel: &CancellationToken) -> CaptionBatch {
        let mut captions: Vec<Option<Caption>> = vec![None; frames.len()];
        let mut tasks: JoinSet<(usize, Caption)> = JoinSet::new();
        let mut positions: HashMap<task::Id, usize> = HashMap::new();
        let mut next = 0;
        let mut cancelled = false;

        loop {
            while tasks.len() < self.caption_concurrency && next < frames.len() {
                if cancel.is_cancelled() {
                    cancelled = true;
                    break;
                }

                let position = next;
                let frame = frames[position].clone();
                let captioner = Arc::clone(&self.captioner);
                let handle = tasks.spawn(async move {
                    let caption = captioner.caption(&frame).await;
                    (position, caption)
                });
                positions.insert(handle.id(), position);
                next += 1;
            }

            match tasks.join_next_with_id().await {
                Some(Ok((id, (position, caption)))) => {
                    positions.remove(&id);
                    tracing::debug!(
                        frame_index = caption.frame_index,
                        failed = caption.is_failure(),
                        "Caption received",
                    );
                    captions[position] = Some(caption);
                }
                Some(Err(e)) => {
                    let Some(position) = positions.remove(&e.id()) else {
                        tracing::error!(error = %e, "Caption task failed for an unknown frame");
                        continue;
                    };
                    let frame_index = frames[position].index;
                    tracing::error!(frame_index, error = %e, "Caption task failed");
                    captions[position] = Some(Caption::failed(
                        frame_index,
                        CaptionFailureKind::Transport,
                        format!("caption task failed: {e}"),
                    ));
                }
                None => break,
            }
        }

        if cancelled {
            tracing::warn!(
                skipped = frames.len() - next,
                "Run cancelled, remaining frames were not captioned",
            );
        }

        CaptionBatch { captions, cancelled }
    }
}
