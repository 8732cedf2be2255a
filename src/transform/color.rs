//! Color-space transforms.

use super::{Transform, TransformError, acquire_or_alloc};
use crate::cache::CacheKeyDigest;
use crate::pool::BitmapPool;
use image::{Rgba, RgbaImage};

/// Desaturates to BT.601 luma, preserving the alpha channel.
#[derive(Debug, Default, Clone, Copy)]
pub struct Grayscale;

impl Grayscale {
    const ID: &'static str = "easel::transform::Grayscale";
}

impl Transform for Grayscale {
    fn apply(
        &self,
        pool: &mut dyn BitmapPool,
        source: &RgbaImage,
    ) -> Result<RgbaImage, TransformError> {
        let (width, height) = source.dimensions();
        let mut dest = acquire_or_alloc(pool, width, height)?;
        for (src, dst) in source.pixels().zip(dest.pixels_mut()) {
            let luma = 0.299 * f32::from(src[0])
                + 0.587 * f32::from(src[1])
                + 0.114 * f32::from(src[2]);
            let y = luma.round().clamp(0.0, 255.0) as u8;
            *dst = Rgba([y, y, y, src[3]]);
        }
        Ok(dest)
    }

    fn update_cache_key(&self, digest: &mut CacheKeyDigest) {
        digest.update_str(Self::ID);
    }
}
