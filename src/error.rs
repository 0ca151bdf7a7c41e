use thiserror::Error;

#[derive(Error, Debug)]
pub enum SalinityError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Weather fetch failed: {0}")]
    FetchFailure(String),

    #[error("Persistence failed: {0}")]
    Persistence(String),

    #[error("Alert dispatch failed: {0}")]
    AlertDispatch(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, SalinityError>;
