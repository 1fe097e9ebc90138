//! # Saorsa Stamp Renderer
//!
//! Concrete collaborators for the stamp editor: a document service that turns
//! images (or blank sheets) into pages, and a bitmap loader for data-URI
//! stamp payloads.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              EditorDriver (core)             │
//! ├──────────────────────┬───────────────────────┤
//! │ DocumentService      │ BitmapLoader          │
//! │ RasterDocumentService│ DataUriLoader         │
//! │ BlankDocumentService │                       │
//! └──────────────────────┴───────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod document;
pub mod error;
pub mod image;

pub use document::{
    BlankDocumentService, RasterDocument, RasterDocumentService, RasterPage, DEFAULT_PAGE_SIZE,
    MAX_RASTER_EDGE,
};
pub use error::{RenderError, RenderResult};
pub use image::{
    decode_bitmap, decode_data_uri, encode_data_uri, DataUriLoader, DecodedBitmap, ImageFormat,
};
