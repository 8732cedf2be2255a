//! Cropping and resizing.

use super::geometry;
use super::{Transform, TransformError, acquire_or_alloc};
use crate::cache::CacheKeyDigest;
use crate::pool::BitmapPool;
use image::RgbaImage;
use image::imageops::FilterType;

/// Center-crops to a square by trimming symmetric margins from the longer
/// dimension. A square source passes through unchanged (bar the copy).
#[derive(Debug, Default, Clone, Copy)]
pub struct CenterCrop;

impl CenterCrop {
    const ID: &'static str = "easel::transform::CenterCrop";
}

impl Transform for CenterCrop {
    fn apply(
        &self,
        pool: &mut dyn BitmapPool,
        source: &RgbaImage,
    ) -> Result<RgbaImage, TransformError> {
        let (width, height) = source.dimensions();
        let size = width.min(height).max(1);
        let (ox, oy) = geometry::center_offsets(width, height, size);

        let mut dest = acquire_or_alloc(pool, size, size)?;
        let view = image::imageops::crop_imm(source, ox, oy, size, size);
        dest.copy_from_slice(view.to_image().as_raw());
        Ok(dest)
    }

    fn update_cache_key(&self, digest: &mut CacheKeyDigest) {
        digest.update_str(Self::ID);
    }
}

/// Resizes to exact target dimensions with Lanczos3 resampling. The
/// aspect ratio is not preserved; pair with [`CenterCrop`] first when it
/// should be.
#[derive(Debug, Clone, Copy)]
pub struct Resize {
    width: u32,
    height: u32,
}

impl Resize {
    const ID: &'static str = "easel::transform::Resize";

    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }
}

impl Transform for Resize {
    fn apply(
        &self,
        _pool: &mut dyn BitmapPool,
        source: &RgbaImage,
    ) -> Result<RgbaImage, TransformError> {
        Ok(image::imageops::resize(
            source,
            self.width,
            self.height,
            FilterType::Lanczos3,
        ))
    }

    fn update_cache_key(&self, digest: &mut CacheKeyDigest) {
        digest.update_str(Self::ID);
        digest.update(&self.width.to_le_bytes());
        digest.update(&self.height.to_le_bytes());
    }
}
