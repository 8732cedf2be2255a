//! Bitmap transforms and the chain that applies them.
//!
//! A [`Transform`] is a pure, synchronous function from one RGBA bitmap to
//! another, plus a deterministic cache-key contribution. Transforms borrow
//! their source read-only, draw into a destination obtained from a
//! [`BitmapPool`](crate::pool::BitmapPool), and never retain state between
//! calls — any number of them may run concurrently on different sources as
//! long as each call supplies its own pool borrow.
//!
//! The module is split into:
//! - **Geometry**: pure coverage/crop math (unit testable without images)
//! - **Circle**: [`BorderedCircle`], [`CircleCrop`], [`Border`]
//! - **Rounded**: [`RoundedCorners`]
//! - **Color**: [`Grayscale`]
//! - **Blur**: [`Blur`]
//! - **Fit**: [`CenterCrop`], [`Resize`]

pub mod geometry;

mod blur;
mod circle;
mod color;
mod fit;
mod rounded;

pub use blur::Blur;
pub use circle::{Border, BorderSpec, BorderedCircle, CircleCrop};
pub use color::Grayscale;
pub use fit::{CenterCrop, Resize};
pub use rounded::RoundedCorners;

use crate::cache::CacheKeyDigest;
use crate::pool::BitmapPool;
use image::RgbaImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("failed to allocate a {width}x{height} destination buffer")]
    Allocation { width: u32, height: u32 },
}

/// A bitmap transformation stage.
pub trait Transform: Send + Sync {
    /// Produce the transformed bitmap. The source is borrowed read-only
    /// and must not be mutated; the destination comes from `pool` when
    /// possible.
    fn apply(
        &self,
        pool: &mut dyn BitmapPool,
        source: &RgbaImage,
    ) -> Result<RgbaImage, TransformError>;

    /// Feed this transform's identity and parameters into the rolling
    /// cache-key digest. Equal parameters must contribute identical bytes.
    fn update_cache_key(&self, digest: &mut CacheKeyDigest);
}

/// An ordered list of transforms applied as one stage pipeline.
#[derive(Default)]
pub struct TransformChain {
    transforms: Vec<Box<dyn Transform>>,
}

impl TransformChain {
    pub fn new(transforms: Vec<Box<dyn Transform>>) -> Self {
        Self { transforms }
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Apply every transform in order. Intermediate bitmaps are returned
    /// to the pool once the next stage has consumed them.
    pub fn apply(
        &self,
        pool: &mut dyn BitmapPool,
        source: RgbaImage,
    ) -> Result<RgbaImage, TransformError> {
        let mut current = source;
        for transform in &self.transforms {
            let next = transform.apply(pool, &current)?;
            pool.release(current);
            current = next;
        }
        Ok(current)
    }

    /// Accumulate the contributions of every member, in order.
    pub fn update_cache_key(&self, digest: &mut CacheKeyDigest) {
        for transform in &self.transforms {
            transform.update_cache_key(digest);
        }
    }

    /// The finished hex key of this chain alone.
    pub fn cache_key(&self) -> String {
        let mut digest = CacheKeyDigest::new();
        self.update_cache_key(&mut digest);
        digest.finish()
    }
}

/// Destination buffer from the pool, else a fresh fallible allocation.
///
/// The buffer's prior content is undefined either way; callers write every
/// pixel. Exhaustion surfaces as [`TransformError::Allocation`], never a
/// partially valid buffer.
pub(crate) fn acquire_or_alloc(
    pool: &mut dyn BitmapPool,
    width: u32,
    height: u32,
) -> Result<RgbaImage, TransformError> {
    if let Some(buffer) = pool.acquire(width, height) {
        return Ok(buffer);
    }
    let len = width as usize * height as usize * 4;
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| TransformError::Allocation { width, height })?;
    data.resize(len, 0);
    RgbaImage::from_raw(width, height, data).ok_or(TransformError::Allocation { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::NoPool;
    use image::Rgba;

    fn solid(width: u32, height: u32, pixel: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(pixel))
    }

    #[test]
    fn empty_chain_returns_input_unchanged() {
        let chain = TransformChain::default();
        let img = solid(8, 8, [1, 2, 3, 4]);
        let out = chain.apply(&mut NoPool, img.clone()).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn empty_chain_contributes_nothing_to_the_key() {
        let chain = TransformChain::default();
        assert_eq!(chain.cache_key(), CacheKeyDigest::new().finish());
    }

    #[test]
    fn chain_applies_in_declaration_order() {
        // Grayscale-then-crop and crop-then-grayscale both end square and
        // gray, but their keys must differ by order.
        let a = TransformChain::new(vec![Box::new(Grayscale), Box::new(CircleCrop)]);
        let b = TransformChain::new(vec![Box::new(CircleCrop), Box::new(Grayscale)]);
        assert_ne!(a.cache_key(), b.cache_key());

        let img = solid(10, 6, [100, 150, 200, 255]);
        let out = a.apply(&mut NoPool, img).unwrap();
        assert_eq!(out.width(), 6);
        assert_eq!(out.height(), 6);
    }

    #[test]
    fn chain_key_equals_manual_concatenation() {
        let chain = TransformChain::new(vec![Box::new(Grayscale), Box::new(Resize::new(4, 4))]);

        let mut manual = CacheKeyDigest::new();
        Grayscale.update_cache_key(&mut manual);
        Resize::new(4, 4).update_cache_key(&mut manual);

        assert_eq!(chain.cache_key(), manual.finish());
    }

    #[test]
    fn acquire_or_alloc_prefers_the_pool() {
        let mut pool = crate::pool::BucketPool::default();
        pool.release(solid(5, 5, [7, 7, 7, 7]));
        let buf = acquire_or_alloc(&mut pool, 5, 5).unwrap();
        // Pool hit: old content still present.
        assert_eq!(buf.get_pixel(0, 0), &Rgba([7, 7, 7, 7]));
    }

    #[test]
    fn acquire_or_alloc_falls_back_to_fresh_zeroed_buffer() {
        let buf = acquire_or_alloc(&mut NoPool, 3, 2).unwrap();
        assert_eq!(buf.dimensions(), (3, 2));
        assert!(buf.pixels().all(|p| *p == Rgba([0, 0, 0, 0])));
    }
}
