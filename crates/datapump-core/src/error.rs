//! Core domain errors.

use thiserror::Error;

/// Core domain errors for Datapump.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Worker boot payload could not be decoded.
    #[error("Invalid task payload: {0}")]
    InvalidPayload(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}
