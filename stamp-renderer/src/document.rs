//! Raster document services.
//!
//! Pages are plain images: either decoded files (one page per image) or blank
//! sheets of a fixed size. Rendering scales the page to the requested
//! viewport and hands back an RGBA raster.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use image::imageops::FilterType;
use image::{Rgba, RgbaImage};
use stamp_core::{Document, DocumentService, DocumentSource, Page, StampResult, Viewport};

use crate::error::{RenderError, RenderResult};
use crate::image::ImageFormat;

/// Largest raster edge the renderer will produce, in pixels.
pub const MAX_RASTER_EDGE: u32 = 8192;

/// A4 at 72 dpi.
pub const DEFAULT_PAGE_SIZE: (f64, f64) = (595.0, 842.0);

/// Content of one page.
#[derive(Debug, Clone)]
enum PageSource {
    Blank { width: f64, height: f64 },
    Image(Arc<RgbaImage>),
}

/// An opened raster document.
#[derive(Debug, Clone)]
pub struct RasterDocument {
    pages: Vec<PageSource>,
}

impl RasterDocument {
    /// A document of `count` blank pages.
    #[must_use]
    pub fn blank(count: u32, width: f64, height: f64) -> Self {
        Self {
            pages: (0..count)
                .map(|_| PageSource::Blank { width, height })
                .collect(),
        }
    }

    /// A document with one page per image.
    #[must_use]
    pub fn from_images(images: Vec<RgbaImage>) -> Self {
        Self {
            pages: images
                .into_iter()
                .map(|img| PageSource::Image(Arc::new(img)))
                .collect(),
        }
    }

    fn page_at(&self, number: u32) -> RenderResult<RasterPage> {
        let page_count = self.page_count();
        if number == 0 || number > page_count {
            return Err(RenderError::PageOutOfRange {
                page: number,
                page_count,
            });
        }
        let source = self.pages[(number - 1) as usize].clone();
        Ok(RasterPage { number, source })
    }
}

#[async_trait]
impl Document for RasterDocument {
    type Page = RasterPage;

    fn page_count(&self) -> u32 {
        u32::try_from(self.pages.len()).unwrap_or(u32::MAX)
    }

    async fn page(&self, number: u32) -> StampResult<RasterPage> {
        self.page_at(number).map_err(RenderError::into_document_error)
    }
}

/// One page of a [`RasterDocument`].
#[derive(Debug, Clone)]
pub struct RasterPage {
    number: u32,
    source: PageSource,
}

impl RasterPage {
    /// Page number (1-based).
    #[must_use]
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Size of the page at scale 1.
    #[must_use]
    pub fn base_size(&self) -> (f64, f64) {
        match &self.source {
            PageSource::Blank { width, height } => (*width, *height),
            PageSource::Image(img) => (f64::from(img.width()), f64::from(img.height())),
        }
    }

    /// Render into an RGBA raster.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::RasterTooLarge`] if either edge exceeds
    /// [`MAX_RASTER_EDGE`].
    pub fn rasterize(&self, viewport: Viewport) -> RenderResult<RgbaImage> {
        let (width, height) = raster_size(viewport)?;
        let raster = match &self.source {
            PageSource::Blank { .. } => {
                RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]))
            }
            PageSource::Image(img) if img.dimensions() == (width, height) => (**img).clone(),
            PageSource::Image(img) => {
                image::imageops::resize(&**img, width, height, FilterType::Triangle)
            }
        };
        tracing::debug!("Rendered page {} at {}x{}", self.number, width, height);
        Ok(raster)
    }
}

#[async_trait]
impl Page for RasterPage {
    type Raster = RgbaImage;

    fn viewport(&self, scale: f64) -> Viewport {
        let (width, height) = self.base_size();
        Viewport {
            width: width * scale,
            height: height * scale,
            scale,
        }
    }

    async fn render(&self, viewport: Viewport) -> StampResult<RgbaImage> {
        self.rasterize(viewport)
            .map_err(RenderError::into_document_error)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn raster_size(viewport: Viewport) -> RenderResult<(u32, u32)> {
    let edge = |v: f64| -> u32 {
        if v.is_finite() {
            v.round().clamp(1.0, f64::from(u32::MAX)) as u32
        } else {
            u32::MAX
        }
    };
    let (width, height) = (edge(viewport.width), edge(viewport.height));
    if width > MAX_RASTER_EDGE || height > MAX_RASTER_EDGE {
        return Err(RenderError::RasterTooLarge {
            width,
            height,
            max: MAX_RASTER_EDGE,
        });
    }
    Ok((width, height))
}

/// Opens images as documents.
///
/// `Bytes` sources become a single page. `Url` sources name a file (one page)
/// or a directory whose image files, sorted by name, become the pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterDocumentService;

impl RasterDocumentService {
    /// Create the service.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn open_source(source: DocumentSource) -> RenderResult<RasterDocument> {
        match source {
            DocumentSource::Bytes(bytes) => Ok(RasterDocument::from_images(vec![decode(&bytes)?])),
            DocumentSource::Url(url) => {
                let path = PathBuf::from(url.strip_prefix("file://").unwrap_or(&url));
                if path.is_dir() {
                    let files = image_files(&path)?;
                    if files.is_empty() {
                        return Err(RenderError::Document(format!(
                            "No images in {}",
                            path.display()
                        )));
                    }
                    let images = files
                        .iter()
                        .map(|file| decode(&std::fs::read(file)?))
                        .collect::<RenderResult<Vec<_>>>()?;
                    Ok(RasterDocument::from_images(images))
                } else {
                    let bytes = std::fs::read(&path)?;
                    Ok(RasterDocument::from_images(vec![decode(&bytes)?]))
                }
            }
        }
    }
}

#[async_trait]
impl DocumentService for RasterDocumentService {
    type Document = RasterDocument;

    async fn open(&self, source: DocumentSource) -> StampResult<RasterDocument> {
        let document = Self::open_source(source).map_err(RenderError::into_document_error)?;
        tracing::info!("Opened raster document with {} pages", document.page_count());
        Ok(document)
    }
}

/// Yields blank documents of a fixed shape regardless of the source.
#[derive(Debug, Clone, Copy)]
pub struct BlankDocumentService {
    /// Pages per document.
    pub page_count: u32,
    /// Page width at scale 1.
    pub width: f64,
    /// Page height at scale 1.
    pub height: f64,
}

impl Default for BlankDocumentService {
    fn default() -> Self {
        Self {
            page_count: 1,
            width: DEFAULT_PAGE_SIZE.0,
            height: DEFAULT_PAGE_SIZE.1,
        }
    }
}

#[async_trait]
impl DocumentService for BlankDocumentService {
    type Document = RasterDocument;

    async fn open(&self, _source: DocumentSource) -> StampResult<RasterDocument> {
        tracing::info!(
            "Opened blank document: {} pages of {}x{}",
            self.page_count,
            self.width,
            self.height
        );
        Ok(RasterDocument::blank(self.page_count, self.width, self.height))
    }
}

fn decode(bytes: &[u8]) -> RenderResult<RgbaImage> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|e| RenderError::Document(format!("Failed to decode page: {e}")))
}

fn image_files(dir: &Path) -> RenderResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let known = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ImageFormat::from_extension(ext) != ImageFormat::Unknown);
        if path.is_file() && known {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
