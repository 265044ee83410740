//! Entity definitions for the image loading pipeline.

mod cache_key;
mod request;
mod rendered_image;
mod result;

pub use cache_key::MemoryCacheKey;
pub use rendered_image::RenderedImage;
pub use request::{CachePolicy, ImageRequest, ImageRequestBuilder, RequestSource, TargetSize};
pub use result::{DataSource, ErrorResult, ImageResult, SuccessResult};
