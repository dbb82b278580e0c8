//! Error types for archive decoding

use thiserror::Error;

/// Coarse classification of an [`ArchError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The supplied bytes or parameters cannot be decoded
    InvalidInput,
    /// An external collaborator could not locate the requested item
    NotFound,
}

/// Errors that can occur when decoding archive files
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArchError {
    /// Buffer is too short to contain required data
    #[error("Buffer too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    /// Decode parameters are out of range
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Archive entry, header or column definition is missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to deserialize a fixed-layout structure
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),
}

impl ArchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ArchError::NotFound(_) => ErrorKind::NotFound,
            ArchError::TooShort { .. }
            | ArchError::InvalidInput(_)
            | ArchError::DeserializationFailed(_) => ErrorKind::InvalidInput,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<bincode::Error> for ArchError {
    fn from(e: bincode::Error) -> Self {
        ArchError::DeserializationFailed(e.to_string())
    }
}
