//! Decode stage turning encoded bytes into a rendered image.

use bytes::Bytes;
use tracing::trace;

use crate::domain::entities::{RenderedImage, TargetSize};
use crate::domain::errors::{LoadError, LoadResult};

/// Decodes encoded bytes, downsampling toward `target` when the source is
/// larger. Decoding runs on the blocking thread pool.
///
/// The returned handle records the source image's native dimensions, so
/// [`RenderedImage::is_sampled`] reflects whether downsampling occurred.
///
/// # Errors
/// Returns [`LoadError::Decode`] if the bytes are not a decodable image.
pub async fn decode_image(bytes: Bytes, target: Option<TargetSize>) -> LoadResult<RenderedImage> {
    tokio::task::spawn_blocking(move || {
        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| LoadError::decode(format!("failed to decode image: {e}")))?;

        let source_width = decoded.width();
        let source_height = decoded.height();

        let bitmap = match target {
            Some(size) if source_width > size.width || source_height > size.height => {
                trace!(
                    source_width = source_width,
                    source_height = source_height,
                    target_width = size.width,
                    target_height = size.height,
                    "Downsampling decode"
                );
                decoded.resize(size.width, size.height, image::imageops::FilterType::Lanczos3)
            }
            _ => decoded,
        };

        Ok(RenderedImage::with_source_dimensions(
            bitmap,
            source_width,
            source_height,
        ))
    })
    .await
    .map_err(|e| LoadError::decode(format!("decode task panicked: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Bytes {
        let bitmap = image::DynamicImage::new_rgb8(width, height);
        let mut buffer = Cursor::new(Vec::new());
        bitmap
            .write_to(&mut buffer, image::ImageFormat::Png)
            .unwrap();
        Bytes::from(buffer.into_inner())
    }

    #[tokio::test]
    async fn test_decode_without_target_keeps_native_size() {
        let decoded = decode_image(png_bytes(40, 30), None).await.unwrap();
        assert_eq!(decoded.width(), 40);
        assert_eq!(decoded.height(), 30);
        assert!(!decoded.is_sampled());
    }

    #[tokio::test]
    async fn test_decode_downsamples_past_target() {
        let decoded = decode_image(png_bytes(200, 200), Some(TargetSize::new(50, 50)))
            .await
            .unwrap();
        assert!(decoded.is_sampled());
        assert_eq!(decoded.width(), 50);
        assert_eq!(decoded.source_width(), 200);
    }

    #[tokio::test]
    async fn test_small_source_is_not_upsampled() {
        let decoded = decode_image(png_bytes(20, 20), Some(TargetSize::new(100, 100)))
            .await
            .unwrap();
        assert_eq!(decoded.width(), 20);
        assert!(!decoded.is_sampled());
    }

    #[tokio::test]
    async fn test_garbage_bytes_fail_decode() {
        let error = decode_image(Bytes::from_static(b"not an image"), None)
            .await
            .unwrap_err();
        assert_eq!(
            error.kind(),
            crate::domain::errors::LoadErrorKind::Decode
        );
    }
}
