// ================================================================
// File: valepad-common/src/error.rs
// ================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from robot: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timeout error: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),

    #[error("No input device available: {0}")]
    NoInputDevice(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("Control session error: {0}")]
    Session(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
