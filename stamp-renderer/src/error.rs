//! Renderer error types.

use stamp_core::StampError;
use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while decoding or rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Resource loading or decoding failed.
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// The document could not be opened.
    #[error("Document error: {0}")]
    Document(String),

    /// Requested page does not exist.
    #[error("Page {page} out of range (document has {page_count} pages)")]
    PageOutOfRange {
        /// Requested page.
        page: u32,
        /// Pages in the document.
        page_count: u32,
    },

    /// Requested raster is larger than the renderer allows.
    #[error("Raster {width}x{height} exceeds the {max}px limit")]
    RasterTooLarge {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
        /// Largest allowed edge.
        max: u32,
    },

    /// Filesystem access failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    /// Convert into the editor's bitmap failure.
    #[must_use]
    pub fn into_bitmap_error(self) -> StampError {
        StampError::Bitmap(self.to_string())
    }

    /// Convert into the editor's document failure.
    #[must_use]
    pub fn into_document_error(self) -> StampError {
        StampError::Document(self.to_string())
    }
}
