use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Registration-time problem; never surfaces once a dialog is running.
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Search unavailable: {0}")]
    SearchUnavailable(String),

    #[error("Cannot map record: {0}")]
    Mapping(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Transport failed: {0}")]
    Transport(String),
}

impl Error {
    /// True when the same query may succeed if the user sends it again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::SearchUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
