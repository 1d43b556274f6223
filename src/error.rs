use std::path::PathBuf;

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ExtractorError {
    #[error("invalid organization key: {0}")]
    InvalidOrganizationKey(String),

    #[error("missing config file filing-extractor.json in current directory")]
    MissingConfig,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid config value: {0}")]
    ConfigValue(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error("request to {url} failed: {message}")]
    Fetch { url: String, message: String },

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("failed to decode response from {url}: {message}")]
    #[diagnostic(help("the raw response body is kept on the error for inspection"))]
    Decode {
        url: String,
        message: String,
        body: String,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("failed to persist metadata: {0}")]
    Persist(String),

    #[error("failed to upload document: {0}")]
    Upload(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Fetch,
    Decode,
    NotFound,
    Persist,
    Upload,
    Config,
    Other,
}

impl ExtractorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractorError::Fetch { .. } | ExtractorError::Status { .. } => ErrorKind::Fetch,
            ExtractorError::Decode { .. } => ErrorKind::Decode,
            ExtractorError::NotFound(_) => ErrorKind::NotFound,
            ExtractorError::Persist(_) => ErrorKind::Persist,
            ExtractorError::Upload(_) => ErrorKind::Upload,
            ExtractorError::MissingConfig
            | ExtractorError::ConfigRead(_)
            | ExtractorError::ConfigParse(_)
            | ExtractorError::ConfigValue(_)
            | ExtractorError::InvalidOrganizationKey(_) => ErrorKind::Config,
            ExtractorError::HttpClient(_) | ExtractorError::Filesystem(_) => ErrorKind::Other,
        }
    }

    pub fn raw_body(&self) -> Option<&str> {
        match self {
            ExtractorError::Decode { body, .. } => Some(body),
            _ => None,
        }
    }
}
