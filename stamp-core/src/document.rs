//! Interfaces of the external collaborators the editor depends on.
//!
//! Document decoding, bitmap decoding and painting all live outside this
//! crate. The editor only needs page counts, viewport sizes and natural
//! bitmap sizes; everything else passes through as opaque handles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{HostEffect, StampIndex, StampResult};

/// Where to load a document from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum DocumentSource {
    /// Raw document bytes.
    Bytes(Vec<u8>),
    /// A URL or path the service knows how to fetch.
    Url(String),
}

/// Pixel size of a page rendered at some scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
    /// Scale the viewport was computed for.
    pub scale: f64,
}

/// Opens documents.
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// The opened document type.
    type Document: Document;

    /// Open a document.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StampError::Document`] if the source cannot be
    /// decoded.
    async fn open(&self, source: DocumentSource) -> StampResult<Self::Document>;
}

/// An opened, paginated document.
#[async_trait]
pub trait Document: Send + Sync {
    /// Page handle type.
    type Page: Page;

    /// Number of pages.
    fn page_count(&self) -> u32;

    /// Fetch a page (1-based).
    ///
    /// # Errors
    ///
    /// Returns an error if the page does not exist or cannot be decoded.
    async fn page(&self, number: u32) -> StampResult<Self::Page>;
}

/// A single document page.
#[async_trait]
pub trait Page: Send + Sync {
    /// Rendered output handed to the host.
    type Raster: Send;

    /// Viewport of this page at `scale`.
    fn viewport(&self, scale: f64) -> Viewport;

    /// Render the page into a raster of the viewport's size.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    async fn render(&self, viewport: Viewport) -> StampResult<Self::Raster>;
}

/// A decoded stamp bitmap.
#[derive(Debug, Clone)]
pub struct LoadedBitmap<H> {
    /// Natural width in pixels.
    pub width: f64,
    /// Natural height in pixels.
    pub height: f64,
    /// Displayable handle.
    pub handle: H,
}

/// Decodes stamp image payloads.
#[async_trait]
pub trait BitmapLoader: Send + Sync {
    /// Displayable handle type.
    type Handle: Send;

    /// Decode `src` and report its natural size.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StampError::Bitmap`] if the payload is not a
    /// decodable image.
    async fn load(&self, src: &str) -> StampResult<LoadedBitmap<Self::Handle>>;
}

/// The host that paints the page and the overlay.
pub trait HostSurface {
    /// Page raster type it accepts.
    type Raster;
    /// Bitmap handle type it accepts.
    type Bitmap;

    /// Show a freshly rendered page.
    fn present_page(&mut self, page: u32, raster: Self::Raster);

    /// Attach a decoded bitmap to a stamp's overlay element.
    fn present_bitmap(&mut self, index: StampIndex, bitmap: Self::Bitmap);

    /// Carry out a painting or indicator effect.
    fn apply(&mut self, effect: &HostEffect);
}
