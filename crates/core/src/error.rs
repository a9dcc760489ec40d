#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Cannot aggregate a report over zero frames")]
    EmptyInput,
}
