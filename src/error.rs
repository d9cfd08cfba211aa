//! Error types for the vote tally

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Scores endpoint returned status {0}")]
    Status(u16),

    #[error("Failed to decode scores: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this failure came from talking to the scores endpoint.
    /// Such failures only flip the connectivity badge.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Status(_) | Error::Decode(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(Error::Status(503).is_transient());
        assert!(!Error::Config("bad".into()).is_transient());
        assert!(!Error::Other("x".into()).is_transient());
    }

    #[test]
    fn test_status_message() {
        assert_eq!(
            Error::Status(500).to_string(),
            "Scores endpoint returned status 500"
        );
    }
}
