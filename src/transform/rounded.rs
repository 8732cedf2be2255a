//! Rounded-corner alpha mask.

use super::geometry;
use super::{Transform, TransformError, acquire_or_alloc};
use crate::cache::CacheKeyDigest;
use crate::pool::BitmapPool;
use image::{Rgba, RgbaImage};

/// Masks the source to a rounded rectangle.
///
/// The rectangle is inset by `margin` pixels on every side; everything
/// outside it, including the corner cutouts, becomes fully transparent.
/// Corner edges are anti-aliased.
#[derive(Debug, Clone, Copy)]
pub struct RoundedCorners {
    radius_px: u32,
    margin_px: u32,
}

impl RoundedCorners {
    const ID: &'static str = "easel::transform::RoundedCorners";

    pub fn new(radius_px: u32, margin_px: u32) -> Self {
        Self {
            radius_px,
            margin_px,
        }
    }
}

impl Transform for RoundedCorners {
    fn apply(
        &self,
        pool: &mut dyn BitmapPool,
        source: &RgbaImage,
    ) -> Result<RgbaImage, TransformError> {
        let (width, height) = source.dimensions();
        let mut dest = acquire_or_alloc(pool, width, height)?;
        let radius = self.radius_px as f32;
        let margin = self.margin_px as f32;

        for py in 0..height {
            for px in 0..width {
                let cov = geometry::rounded_rect_coverage(px, py, width, height, radius, margin);
                let out = if cov <= 0.0 {
                    Rgba([0, 0, 0, 0])
                } else {
                    let src = *source.get_pixel(px, py);
                    let alpha = (f32::from(src[3]) * cov).round() as u8;
                    Rgba([src[0], src[1], src[2], alpha])
                };
                dest.put_pixel(px, py, out);
            }
        }
        Ok(dest)
    }

    fn update_cache_key(&self, digest: &mut CacheKeyDigest) {
        digest.update_str(Self::ID);
        digest.update(&self.radius_px.to_le_bytes());
        digest.update(&self.margin_px.to_le_bytes());
    }
}
