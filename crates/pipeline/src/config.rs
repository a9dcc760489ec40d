use std::path::PathBuf;

use framewatch_core::env;
use framewatch_core::{CoreError, ErrorTextPolicy, ModerationCategory, ModerationVocabulary};

/// Default sampling stride (every 10th frame).
pub const DEFAULT_FRAME_INTERVAL: u64 = 10;

/// Default number of caption requests in flight.
pub const DEFAULT_CAPTION_CONCURRENCY: usize = 4;

/// Default directory for sampled frame artifacts.
pub const DEFAULT_FRAMES_DIR: &str = "frames";

/// Settings for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root under which `<video stem>/frame_<index>.jpg` files are written.
    pub frames_dir: PathBuf,
    /// Keep frame `i` iff `i % frame_interval == 0`.
    pub frame_interval: u64,
    /// Upper bound on concurrent caption requests.
    pub caption_concurrency: usize,
    pub vocabulary: ModerationVocabulary,
    pub error_policy: ErrorTextPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frames_dir: PathBuf::from(DEFAULT_FRAMES_DIR),
            frame_interval: DEFAULT_FRAME_INTERVAL,
            caption_concurrency: DEFAULT_CAPTION_CONCURRENCY,
            vocabulary: ModerationVocabulary::Category(ModerationCategory::Violence),
            error_policy: ErrorTextPolicy::Tokenize,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                  | Default     |
    /// |--------------------------|-------------|
    /// | `FRAMES_DIR`             | `frames`    |
    /// | `FRAME_INTERVAL`         | `10`        |
    /// | `CAPTION_CONCURRENCY`    | `4`         |
    /// | `MODERATION_CATEGORY`    | `violence`  |
    /// | `MODERATION_KEYWORDS`    | unset       |
    /// | `CAPTION_ERROR_KEYWORDS` | `true`      |
    ///
    /// `MODERATION_KEYWORDS` is a comma-separated list that replaces the
    /// category's predefined phrases.
    pub fn from_env() -> Result<Self, CoreError> {
        let category = match env::optional("MODERATION_CATEGORY") {
            Some(name) => ModerationCategory::from_name(&name)?,
            None => ModerationCategory::Violence,
        };

        let vocabulary = match env::optional("MODERATION_KEYWORDS") {
            Some(list) => ModerationVocabulary::custom(category, &list)?,
            None => ModerationVocabulary::Category(category),
        };

        let tokenize_errors = match env::optional("CAPTION_ERROR_KEYWORDS") {
            Some(raw) => env::parse_flag("CAPTION_ERROR_KEYWORDS", &raw)?,
            None => true,
        };

        let config = Self {
            frames_dir: env::optional("FRAMES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FRAMES_DIR)),
            frame_interval: env::parse_or("FRAME_INTERVAL", DEFAULT_FRAME_INTERVAL)?,
            caption_concurrency: env::parse_or("CAPTION_CONCURRENCY", DEFAULT_CAPTION_CONCURRENCY)?,
            vocabulary,
            error_policy: if tokenize_errors {
                ErrorTextPolicy::Tokenize
            } else {
                ErrorTextPolicy::Skip
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.frame_interval == 0 {
            return Err(CoreError::InvalidConfig(
                "Frame interval must be at least 1".to_string(),
            ));
        }
        if self.caption_concurrency == 0 {
            return Err(CoreError::InvalidConfig(
                "Caption concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
