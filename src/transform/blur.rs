//! Gaussian blur.

use super::{Transform, TransformError};
use crate::cache::CacheKeyDigest;
use crate::pool::BitmapPool;
use image::RgbaImage;

/// Gaussian blur with the given sigma.
///
/// Delegates the separable convolution to `image::imageops::blur`, which
/// manages its own intermediate buffers; the pool is not consulted.
#[derive(Debug, Clone, Copy)]
pub struct Blur {
    sigma: f32,
}

impl Blur {
    const ID: &'static str = "easel::transform::Blur";

    pub fn new(sigma: f32) -> Self {
        Self { sigma }
    }
}

impl Transform for Blur {
    fn apply(
        &self,
        _pool: &mut dyn BitmapPool,
        source: &RgbaImage,
    ) -> Result<RgbaImage, TransformError> {
        if self.sigma <= 0.0 {
            return Ok(source.clone());
        }
        Ok(image::imageops::blur(source, self.sigma))
    }

    fn update_cache_key(&self, digest: &mut CacheKeyDigest) {
        digest.update_str(Self::ID);
        digest.update_str(&((self.sigma * 10.0).round() as i64).to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::NoPool;
    use image::Rgba;

    fn key_of(t: &dyn Transform) -> String {
        let mut digest = CacheKeyDigest::new();
        t.update_cache_key(&mut digest);
        digest.finish()
    }

    #[test]
    fn zero_sigma_is_identity() {
        let source = RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 255]));
        let out = Blur::new(0.0).apply(&mut NoPool, &source).unwrap();
        assert_eq!(out, source);
    }

    #[test]
    fn constant_image_stays_constant() {
        let source = RgbaImage::from_pixel(16, 16, Rgba([90, 90, 90, 255]));
        let out = Blur::new(2.0).apply(&mut NoPool, &source).unwrap();
        let center = out.get_pixel(8, 8);
        assert!(center[0].abs_diff(90) <= 1);
    }

    #[test]
    fn blur_spreads_a_single_bright_pixel() {
        let mut source = RgbaImage::from_pixel(15, 15, Rgba([0, 0, 0, 255]));
        source.put_pixel(7, 7, Rgba([255, 255, 255, 255]));
        let out = Blur::new(2.0).apply(&mut NoPool, &source).unwrap();
        // Energy leaks into the neighbor, and the peak drops.
        assert!(out.get_pixel(6, 7)[0] > 0);
        assert!(out.get_pixel(7, 7)[0] < 255);
    }

    #[test]
    fn different_sigmas_produce_different_keys() {
        assert_ne!(key_of(&Blur::new(5.0)), key_of(&Blur::new(10.0)));
        assert_eq!(key_of(&Blur::new(10.0)), key_of(&Blur::new(10.0)));
    }
}
