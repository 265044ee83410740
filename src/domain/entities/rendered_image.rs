//! Rendered image handle produced by the decode stage.

use std::sync::Arc;

/// A fully decoded image ready for display.
///
/// The bitmap is shared behind an [`Arc`], so cloning a handle is a pointer
/// copy and handles are safe to pass across tasks. The handle also records
/// the source image's native dimensions as reported by the decoder, which is
/// what makes the "sampled" fact derivable instead of guessed.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    bitmap: Arc<image::DynamicImage>,
    source_width: u32,
    source_height: u32,
}

impl RenderedImage {
    /// Wraps a decoded bitmap that was not downsampled.
    #[must_use]
    pub fn new(bitmap: image::DynamicImage) -> Self {
        let source_width = bitmap.width();
        let source_height = bitmap.height();
        Self {
            bitmap: Arc::new(bitmap),
            source_width,
            source_height,
        }
    }

    /// Wraps a decoded bitmap together with the source image's native
    /// dimensions. Used by the decoder when a downsampled decode occurred.
    #[must_use]
    pub fn with_source_dimensions(
        bitmap: image::DynamicImage,
        source_width: u32,
        source_height: u32,
    ) -> Self {
        Self {
            bitmap: Arc::new(bitmap),
            source_width,
            source_height,
        }
    }

    /// Returns the decoded bitmap.
    #[must_use]
    pub fn bitmap(&self) -> &image::DynamicImage {
        &self.bitmap
    }

    /// Returns a shared handle to the decoded bitmap.
    #[must_use]
    pub fn shared_bitmap(&self) -> Arc<image::DynamicImage> {
        self.bitmap.clone()
    }

    /// Delivered width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    /// Delivered height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }

    /// Native width of the source image before any downsampling.
    #[must_use]
    pub const fn source_width(&self) -> u32 {
        self.source_width
    }

    /// Native height of the source image before any downsampling.
    #[must_use]
    pub const fn source_height(&self) -> u32 {
        self.source_height
    }

    /// Returns true if the delivered pixel dimensions are smaller than the
    /// source image's native dimensions.
    #[must_use]
    pub fn is_sampled(&self) -> bool {
        self.width() < self.source_width || self.height() < self.source_height
    }
}

impl PartialEq for RenderedImage {
    fn eq(&self, other: &Self) -> bool {
        self.source_width == other.source_width
            && self.source_height == other.source_height
            && (Arc::ptr_eq(&self.bitmap, &other.bitmap)
                || (self.bitmap.width() == other.bitmap.width()
                    && self.bitmap.height() == other.bitmap.height()
                    && self.bitmap.as_bytes() == other.bitmap.as_bytes()))
    }
}

impl Eq for RenderedImage {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_size_decode_is_not_sampled() {
        let img = RenderedImage::new(image::DynamicImage::new_rgb8(64, 64));
        assert_eq!(img.width(), 64);
        assert_eq!(img.source_width(), 64);
        assert!(!img.is_sampled());
    }

    #[test]
    fn test_downsampled_decode_is_sampled() {
        let img =
            RenderedImage::with_source_dimensions(image::DynamicImage::new_rgb8(32, 32), 128, 128);
        assert!(img.is_sampled());
        assert_eq!(img.source_width(), 128);
        assert_eq!(img.source_height(), 128);
    }

    #[test]
    fn test_clone_shares_bitmap() {
        let img = RenderedImage::new(image::DynamicImage::new_rgb8(8, 8));
        let clone = img.clone();
        assert!(Arc::ptr_eq(&img.shared_bitmap(), &clone.shared_bitmap()));
        assert_eq!(img, clone);
    }

    #[test]
    fn test_equality_by_content() {
        let a = RenderedImage::new(image::DynamicImage::new_rgb8(8, 8));
        let b = RenderedImage::new(image::DynamicImage::new_rgb8(8, 8));
        let c = RenderedImage::new(image::DynamicImage::new_rgb8(8, 9));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
