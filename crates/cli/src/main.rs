//! The `framewatch` binary moderates a video file from the command line.
//!
//! Samples frames from the video, captions each through the remote vision
//! service, flags frames whose keywords hit the configured vocabulary, and
//! prints the full result as JSON on stdout. Logs go to stderr.
//!
//! ```text
//! framewatch <video>
//! ```
//!
//! Ctrl-C or SIGTERM stops new caption requests; the report then covers the
//! frames already captioned and is marked `"cancelled": true`.
//!
//! # Environment variables
//!
//! | Variable                 | Required | Default            | Description                              |
//! |--------------------------|----------|--------------------|------------------------------------------|
//! | `CAPTION_API_KEY`        | yes      | --                 | Bearer credential for the caption API    |
//! | `CAPTION_API_URL`        | no       | BytePlus ModelArk  | Chat-completions endpoint                |
//! | `CAPTION_MODEL`          | no       | `seed-1-6-250615`  | Vision model name                        |
//! | `CAPTION_TIMEOUT_SECS`   | no       | `60`               | Per-request timeout                      |
//! | `CAPTION_MAX_RETRIES`    | no       | `0`                | Retries after a transport failure        |
//! | `CAPTION_CONCURRENCY`    | no       | `4`                | Caption requests in flight               |
//! | `FRAME_INTERVAL`         | no       | `10`               | Keep every N-th frame                    |
//! | `FRAMES_DIR`             | no       | `frames`           | Where sampled JPEGs are written          |
//! | `MODERATION_CATEGORY`    | no       | `violence`         | Predefined vocabulary                    |
//! | `MODERATION_KEYWORDS`    | no       | --                 | Comma-separated custom vocabulary        |
//! | `CAPTION_ERROR_KEYWORDS` | no       | `true`             | Extract keywords from caption errors     |

use std::path::PathBuf;
use std::sync::Arc;

use framewatch_captioner::{CaptionClient, CaptionConfig, Captioner, RetryingCaptioner};
use framewatch_pipeline::{FfmpegDecoder, Pipeline, PipelineConfig, VideoInput};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Keywords listed in the closing summary.
const SUMMARY_TOP_KEYWORDS: usize = 20;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "framewatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let video = std::env::args().nth(1).map(PathBuf::from).unwrap_or_else(|| {
        tracing::error!("Usage: framewatch <video>");
        std::process::exit(2);
    });

    let caption_config = CaptionConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid captioning configuration");
        std::process::exit(1);
    });
    let pipeline_config = PipelineConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid pipeline configuration");
        std::process::exit(1);
    });

    tracing::info!(
        api_url = %caption_config.api_url,
        model = %caption_config.model,
        max_retries = caption_config.max_retries,
        frames_dir = %pipeline_config.frames_dir.display(),
        "Starting framewatch",
    );

    let max_retries = caption_config.max_retries;
    let client = CaptionClient::new(caption_config).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build HTTP client");
        std::process::exit(1);
    });
    let captioner: Arc<dyn Captioner> = if max_retries > 0 {
        Arc::new(RetryingCaptioner::new(client, max_retries))
    } else {
        Arc::new(client)
    };

    let pipeline = Pipeline::new(&pipeline_config, Arc::new(FfmpegDecoder), captioner)
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Invalid pipeline configuration");
            std::process::exit(1);
        });

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            shutdown_signal().await;
            tracing::warn!("Cancelling run, waiting for in-flight caption requests");
            cancel.cancel();
        }
    });

    let output = match pipeline.run(VideoInput::File(video), cancel).await {
        Ok(output) => output,
        Err(e) => {
            tracing::error!(error = %e, "Moderation run failed");
            std::process::exit(1);
        }
    };

    let report = &output.report;
    tracing::info!(
        category = report.category,
        total_frames = report.total_frames,
        flagged_frames = report.flagged_frames,
        safe_percentage = %format!("{:.1}", report.safe_percentage),
        "Moderation summary",
    );
    for entry in report.top_keywords(SUMMARY_TOP_KEYWORDS) {
        tracing::info!(keyword = %entry.keyword, frames = entry.frames, "Top keyword");
    }
    if report.has_flagged_content() {
        tracing::warn!(
            flagged_frames = report.flagged_frames,
            "Potentially inappropriate content detected",
        );
    }

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize output");
            std::process::exit(1);
        }
    }
}

/// Resolve on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT (Ctrl-C)"),
        () = terminate => tracing::info!("Received SIGTERM"),
    }
}
