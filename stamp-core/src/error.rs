//! Error types for stamp operations.

use thiserror::Error;

use crate::StampIndex;

/// Result type for stamp operations.
pub type StampResult<T> = Result<T, StampError>;

/// Errors that can occur in stamp operations.
#[derive(Debug, Error)]
pub enum StampError {
    /// Stamp not found in the session.
    #[error("Stamp not found: {0}")]
    StampNotFound(StampIndex),

    /// A release or move arrived for a stamp that is not being dragged.
    #[error("No active drag on stamp {0}")]
    NoActiveDrag(StampIndex),

    /// A second press arrived while the stamp is already being dragged.
    #[error("Drag already in progress on stamp {0}")]
    DragInProgress(StampIndex),

    /// Requested zoom scale is not a positive finite number.
    #[error("Invalid scale: {0}")]
    InvalidScale(f64),

    /// The document service failed to open or render.
    #[error("Document error: {0}")]
    Document(String),

    /// The bitmap loader could not decode a stamp payload.
    #[error("Failed to load bitmap: {0}")]
    Bitmap(String),

    /// Session serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
