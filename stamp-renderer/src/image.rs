//! Stamp bitmap decoding.
//!
//! Stamp payloads arrive as data URIs (`data:image/png;base64,...`), the same
//! form a browser file reader produces. Decoding yields the natural size the
//! editor needs plus RGBA pixels for the host to paint.

use async_trait::async_trait;
use base64::Engine;
use stamp_core::{BitmapLoader, LoadedBitmap, StampResult};

use crate::error::{RenderError, RenderResult};

/// A decoded stamp bitmap ready for display.
#[derive(Debug, Clone)]
pub struct DecodedBitmap {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA pixel data (4 bytes per pixel).
    pub data: Vec<u8>,
    /// Original format of the image.
    pub format: ImageFormat,
}

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// WebP (alpha support).
    WebP,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "png" => Self::Png,
            "jpg" | "jpeg" => Self::Jpeg,
            "webp" => Self::WebP,
            _ => Self::Unknown,
        }
    }

    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.len() < 4 {
            return Self::Unknown;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Self::Png;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Self::WebP;
        }

        Self::Unknown
    }

    /// MIME type used when building data URIs.
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Unknown => "application/octet-stream",
        }
    }
}

/// Decode an image from raw bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not a decodable image.
pub fn decode_bitmap(data: &[u8]) -> RenderResult<DecodedBitmap> {
    let format = ImageFormat::from_magic_bytes(data);

    let img = image::load_from_memory(data)
        .map_err(|e| RenderError::Resource(format!("Failed to decode image: {e}")))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(DecodedBitmap {
        width,
        height,
        data: rgba.into_raw(),
        format,
    })
}

/// Extract the payload bytes of a data URI.
///
/// Handles both `;base64` and percent-encoded payloads.
///
/// # Errors
///
/// Returns an error if the URI is malformed.
pub fn data_uri_bytes(uri: &str) -> RenderResult<Vec<u8>> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::Resource("Not a data URI".to_string()))?;

    let (metadata, encoded) = rest
        .split_once(',')
        .ok_or_else(|| RenderError::Resource("Invalid data URI: missing comma".to_string()))?;

    if metadata.ends_with(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| RenderError::Resource(format!("Failed to decode base64: {e}")))
    } else {
        percent_decode(encoded)
    }
}

/// Decode an image from a data URI.
///
/// # Errors
///
/// Returns an error if the data URI is malformed or the image cannot be decoded.
pub fn decode_data_uri(uri: &str) -> RenderResult<DecodedBitmap> {
    decode_bitmap(&data_uri_bytes(uri)?)
}

/// Build a base64 data URI for image bytes.
#[must_use]
pub fn encode_data_uri(data: &[u8]) -> String {
    let mime = ImageFormat::from_magic_bytes(data).mime();
    let encoded = base64::engine::general_purpose::STANDARD.encode(data);
    format!("data:{mime};base64,{encoded}")
}

/// Percent-decoding of a URI payload.
fn percent_decode(input: &str) -> RenderResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let byte = bytes
                .get(i + 1..i + 3)
                .and_then(|hex| std::str::from_utf8(hex).ok())
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| RenderError::Resource("Invalid URL encoding".to_string()))?;
            result.push(byte);
            i += 3;
        } else {
            result.push(bytes[i]);
            i += 1;
        }
    }

    Ok(result)
}

/// Bitmap loader for data-URI stamp payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUriLoader;

impl DataUriLoader {
    /// Create a loader.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BitmapLoader for DataUriLoader {
    type Handle = DecodedBitmap;

    async fn load(&self, src: &str) -> StampResult<LoadedBitmap<DecodedBitmap>> {
        let bitmap = decode_data_uri(src).map_err(RenderError::into_bitmap_error)?;
        tracing::debug!(
            "Decoded {:?} bitmap {}x{}",
            bitmap.format,
            bitmap.width,
            bitmap.height
        );
        Ok(LoadedBitmap {
            width: f64::from(bitmap.width),
            height: f64::from(bitmap.height),
            handle: bitmap,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 red pixel
    const PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

    #[test]
    fn test_format_detection_from_extension() {
        assert_eq!(ImageFormat::from_extension("png"), ImageFormat::Png);
        assert_eq!(ImageFormat::from_extension("PNG"), ImageFormat::Png);
        assert_eq!(ImageFormat::from_extension("jpeg"), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_extension("gif"), ImageFormat::Unknown);
    }

    #[test]
    fn test_format_detection_from_magic_bytes() {
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            ImageFormat::Png
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            ImageFormat::Jpeg
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(b"RIFF\x00\x00\x00\x00WEBP"),
            ImageFormat::WebP
        );
    }

    #[test]
    fn test_data_uri_decodes_natural_size() {
        let uri = format!("data:image/png;base64,{PNG_BASE64}");
        let bitmap = decode_data_uri(&uri).expect("decode");
        assert_eq!((bitmap.width, bitmap.height), (1, 1));
        assert_eq!(bitmap.format, ImageFormat::Png);
        assert_eq!(bitmap.data.len(), 4);
    }

    #[test]
    fn test_invalid_data_uri() {
        assert!(decode_data_uri("not a data uri").is_err());
        assert!(decode_data_uri("data:image/png").is_err());
        assert!(decode_data_uri("data:image/png;base64,!!!").is_err());
    }

    #[test]
    fn test_non_image_payload_is_rejected() {
        let uri = encode_data_uri(b"just some text");
        assert!(uri.starts_with("data:application/octet-stream;base64,"));
        assert!(matches!(decode_data_uri(&uri), Err(RenderError::Resource(_))));
    }

    #[test]
    fn test_percent_encoded_payload() {
        assert_eq!(
            data_uri_bytes("data:text/plain,a%20b%2Cc").expect("decode"),
            b"a b,c".to_vec()
        );
        assert!(data_uri_bytes("data:text/plain,bad%2").is_err());
    }

    #[test]
    fn test_encode_round_trips_through_loader() {
        let png = base64::engine::general_purpose::STANDARD
            .decode(PNG_BASE64)
            .expect("png bytes");
        let uri = encode_data_uri(&png);
        assert!(uri.starts_with("data:image/png;base64,"));
        assert_eq!(decode_data_uri(&uri).expect("decode").width, 1);
    }

    #[tokio::test]
    async fn test_loader_reports_bitmap_error() {
        let loader = DataUriLoader::new();
        let err = loader.load("data:image/png;base64,AAAA").await.unwrap_err();
        assert!(matches!(err, stamp_core::StampError::Bitmap(_)));
    }
}
