//! Error types for the extraction pipeline and its collaborators.

use thiserror::Error;

/// Errors surfaced by the core pipeline and the delivery boundary.
#[derive(Debug, Error)]
pub enum FrError {
    /// Neither point source produced a single usable point.
    #[error("no measurement data found in document")]
    NoDataFound,

    /// A stored session record could not be retrieved.
    #[error("session data not found: {0}")]
    DataNotFound(String),

    /// The document could not be read.
    #[error("document error: {0}")]
    Document(String),

    /// Persisting or retrieving a session record failed.
    #[error("storage failure: {0}")]
    Storage(String),

    /// The presentation trigger failed.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The export sink could not save the file.
    #[error("export sink failure: {0}")]
    Sink(String),

    /// A chart could not be encoded.
    #[error("render failure: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, FrError>;
