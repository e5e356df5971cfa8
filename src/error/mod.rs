//! Error handling module

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    #[error("Invalid profile URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("XML parse error: {0}")]
    Parse(String),

    #[error("Steam profile error: {0}")]
    Profile(String),

    #[error("Device error: {0}")]
    Device(String),
}

impl From<roxmltree::Error> for AppError {
    fn from(e: roxmltree::Error) -> Self {
        AppError::Parse(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
