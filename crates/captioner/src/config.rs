use std::fmt;
use std::time::Duration;

use framewatch_core::env;
use framewatch_core::CoreError;

/// Default chat-completions endpoint (BytePlus ModelArk).
pub const DEFAULT_API_URL: &str = "https://ark.ap-southeast.bytepluses.com/api/v3/chat/completions";

/// Default vision model.
pub const DEFAULT_MODEL: &str = "seed-1-6-250615";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Captioning service configuration.
#[derive(Clone)]
pub struct CaptionConfig {
    /// Full chat-completions URL.
    pub api_url: String,
    /// Bearer credential. Never logged.
    pub api_key: String,
    pub model: String,
    /// Upper bound on a single request, connect through body.
    pub timeout: Duration,
    /// Extra attempts after a transport failure (0 = single attempt).
    pub max_retries: u32,
}

impl CaptionConfig {
    /// Configuration with defaults for everything but the credential.
    pub fn new(api_key: impl Into<String>) -> Result<Self, CoreError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "Captioning service credential must not be empty".to_string(),
            ));
        }
        Ok(Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: 0,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `CAPTION_API_KEY`      | required                |
    /// | `CAPTION_API_URL`      | [`DEFAULT_API_URL`]     |
    /// | `CAPTION_MODEL`        | [`DEFAULT_MODEL`]       |
    /// | `CAPTION_TIMEOUT_SECS` | `60`                    |
    /// | `CAPTION_MAX_RETRIES`  | `0`                     |
    pub fn from_env() -> Result<Self, CoreError> {
        let mut config = Self::new(env::required("CAPTION_API_KEY")?)?;

        if let Some(url) = env::optional("CAPTION_API_URL") {
            config.api_url = url;
        }
        if let Some(model) = env::optional("CAPTION_MODEL") {
            config.model = model;
        }

        let timeout_secs: u64 = env::parse_or("CAPTION_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(CoreError::InvalidConfig(
                "CAPTION_TIMEOUT_SECS must be at least 1".to_string(),
            ));
        }
        config.timeout = Duration::from_secs(timeout_secs);
        config.max_retries = env::parse_or("CAPTION_MAX_RETRIES", 0)?;

        Ok(config)
    }
}

impl fmt::Debug for CaptionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptionConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}
