use thiserror::Error;

use crate::runner::validator::ValidationErrors;
use crate::variable::template::TemplateError;

#[derive(Error, Debug)]
pub enum ReqchainError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("{0}")]
    Script(#[from] crate::parser::ParseError),

    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("client: could not create request: {0}")]
    Request(String),

    #[error("client: error making http request: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("step {step}: expected {expected} but got {actual}")]
    StatusMismatch {
        step: usize,
        expected: u16,
        actual: u16,
    },

    #[error("step {step}: {source}")]
    Template {
        step: usize,
        #[source]
        source: TemplateError,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for ReqchainError {
    fn from(err: anyhow::Error) -> Self {
        ReqchainError::Other(err.to_string())
    }
}

/// Result type for reqchain crate
pub type Result<T> = std::result::Result<T, ReqchainError>;
