//! Error types shared by the network, genome and evolver.

use thiserror::Error;

/// Errors raised by the neuroevolution engine.
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// An array length does not match the configured topology or weight count.
    #[error("dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Which buffer was checked.
        what: &'static str,
        /// Length required by the configuration.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },
    /// The fitness vector does not cover the population one-to-one.
    #[error("fitness vector has {actual} entries but the population holds {expected}")]
    ArgumentMismatch {
        /// Population size.
        expected: usize,
        /// Number of fitness values supplied.
        actual: usize,
    },
    /// Rejected at construction time.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// A generation step or import was attempted before `initialize`.
    #[error("evolver has no population yet; call initialize first")]
    Uninitialized,
    /// Persisted genome data could not be decoded.
    #[error("failed to decode persisted data: {0}")]
    Deserialization(#[from] DecodeError),
    /// Reading or writing a record file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a persisted genome or record could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload does not start with the genome magic bytes.
    #[error("invalid magic bytes")]
    BadMagic,
    /// The payload was written by an incompatible encoder version.
    #[error("version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Version this build writes.
        expected: u32,
        /// Version found in the payload.
        found: u32,
    },
    /// Binary body is malformed.
    #[error("binary payload: {0}")]
    Bincode(#[from] bincode::Error),
    /// Text transport is not valid base64.
    #[error("base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    /// Record file is not valid JSON for the expected layout.
    #[error("json payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<serde_json::Error> for EvolutionError {
    fn from(e: serde_json::Error) -> Self {
        Self::Deserialization(DecodeError::Json(e))
    }
}

/// Convenience alias used throughout the engine.
pub type Result<T> = std::result::Result<T, EvolutionError>;
