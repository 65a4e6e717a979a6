use thiserror::Error;

/// Crate-wide error taxonomy. Command handlers convert every variant into a
/// localized user message at the dispatch boundary; scheduled jobs log and
/// swallow.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("content not found")]
    NotFound,

    #[error("entry already exists")]
    Duplicate,

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),
}

pub type Result<T> = std::result::Result<T, BotError>;
