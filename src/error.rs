//! Crate error type
//!
//! Everything here is a precondition violation or a settings problem; a tick
//! itself never fails.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("outline has no points")]
    EmptyOutline,
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("failed to parse settings")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read settings")]
    Io(#[from] std::io::Error),
}

pub type SimResult<T> = Result<T, SimError>;
