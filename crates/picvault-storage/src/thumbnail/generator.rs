//! Thumbnail generator for uploaded images.

use std::io::Cursor;

use bytes::Bytes;
use image::{DynamicImage, ImageFormat};

use picvault_core::config::ThumbnailConfig;
use picvault_core::error::{AppError, ErrorKind};
use picvault_core::result::AppResult;

/// Renders bounded JPEG previews of image uploads.
#[derive(Debug, Clone)]
pub struct ThumbnailGenerator {
    /// Longest edge of the generated preview, in pixels.
    max_dimension: u32,
}

impl ThumbnailGenerator {
    /// Create a generator producing previews no larger than `max_dimension`.
    pub fn new(max_dimension: u32) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
        }
    }

    /// Build a generator from configuration, or `None` when disabled.
    pub fn from_config(config: &ThumbnailConfig) -> Option<Self> {
        config.enabled.then(|| Self::new(config.max_dimension))
    }

    /// Check if a content type is a decodable image format.
    pub fn is_supported(content_type: &str) -> bool {
        matches!(
            content_type.to_ascii_lowercase().as_str(),
            "image/jpeg" | "image/jpg" | "image/png" | "image/gif" | "image/webp" | "image/bmp"
        )
    }

    /// Render a JPEG preview of `data`.
    ///
    /// Decoding and resizing run on the blocking pool.
    pub async fn generate(&self, data: Bytes) -> AppResult<Bytes> {
        let max = self.max_dimension;
        tokio::task::spawn_blocking(move || Self::resize_image(&data, max))
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Thumbnail task panicked", e))?
    }

    /// Resize an image to fit within `max_size` on both edges.
    fn resize_image(data: &[u8], max_size: u32) -> AppResult<Bytes> {
        if data.is_empty() {
            return Err(AppError::invalid_argument("Empty image data"));
        }

        let source = image::load_from_memory(data).map_err(|e| {
            AppError::with_source(ErrorKind::InvalidArgument, "Image could not be decoded", e)
        })?;

        // JPEG has no alpha channel.
        let preview = DynamicImage::ImageRgb8(source.thumbnail(max_size, max_size).to_rgb8());

        let mut out = Cursor::new(Vec::new());
        preview
            .write_to(&mut out, ImageFormat::Jpeg)
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to encode thumbnail", e))?;
        Ok(Bytes::from(out.into_inner()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    /// PNG bytes of a solid `width` x `height` image.
    pub(crate) fn png_bytes(width: u32, height: u32) -> Bytes {
        let img = ImageBuffer::from_pixel(width, height, Rgba([200u8, 40, 40, 255]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        Bytes::from(out.into_inner())
    }

    #[tokio::test]
    async fn test_generate_bounds_dimensions() {
        let generator = ThumbnailGenerator::new(64);
        let thumb = generator.generate(png_bytes(400, 200)).await.unwrap();

        let decoded = image::load_from_memory(&thumb).unwrap();
        assert_eq!(decoded.width(), 64);
        assert_eq!(decoded.height(), 32);
        assert_eq!(
            image::guess_format(&thumb).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[tokio::test]
    async fn test_generate_rejects_garbage() {
        let generator = ThumbnailGenerator::new(64);
        let err = generator
            .generate(Bytes::from_static(b"not an image"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_is_supported() {
        assert!(ThumbnailGenerator::is_supported("image/PNG"));
        assert!(!ThumbnailGenerator::is_supported("image/svg+xml"));
        assert!(!ThumbnailGenerator::is_supported("application/pdf"));
    }
}
