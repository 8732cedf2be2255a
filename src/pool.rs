//! Destination-buffer reuse for transforms.
//!
//! Transforms that produce a new bitmap ask a [`BitmapPool`] for their
//! destination before falling back to a fresh allocation. A pool hit hands
//! back a previously released buffer of the exact size **with its old
//! pixels still in it** — callers must treat the buffer as undefined and
//! write every destination pixel.
//!
//! Thread safety is the pool's own contract, not the transforms'. The
//! provided [`BucketPool`] is a plain single-owner value; parallel callers
//! hold one pool per worker (see the batch pipeline).

use image::RgbaImage;
use std::collections::HashMap;

/// A reuse pool for fixed-size RGBA pixel buffers.
pub trait BitmapPool {
    /// Hand out a `width` x `height` buffer if one is available.
    ///
    /// The returned buffer's content is undefined.
    fn acquire(&mut self, width: u32, height: u32) -> Option<RgbaImage>;

    /// Return a buffer to the pool for later reuse. The pool may drop it.
    fn release(&mut self, bitmap: RgbaImage);
}

/// A pool that never holds anything. Every acquire misses and every
/// released buffer is dropped.
#[derive(Debug, Default)]
pub struct NoPool;

impl BitmapPool for NoPool {
    fn acquire(&mut self, _width: u32, _height: u32) -> Option<RgbaImage> {
        None
    }

    fn release(&mut self, _bitmap: RgbaImage) {}
}

/// Default pixel budget for [`BucketPool`]: roughly four 2048x2048 RGBA
/// buffers.
pub const DEFAULT_POOL_PIXELS: u64 = 4 * 2048 * 2048;

/// A (width, height)-bucketed freelist pool with a bounded pixel budget.
///
/// Released buffers land in their size bucket until the total retained
/// pixel count would exceed the budget; beyond that, released buffers are
/// simply dropped. Acquire pops from the matching bucket.
#[derive(Debug)]
pub struct BucketPool {
    buckets: HashMap<(u32, u32), Vec<RgbaImage>>,
    held_pixels: u64,
    max_pixels: u64,
}

impl BucketPool {
    pub fn new(max_pixels: u64) -> Self {
        Self {
            buckets: HashMap::new(),
            held_pixels: 0,
            max_pixels,
        }
    }

    /// Total pixels currently retained across all buckets.
    pub fn held_pixels(&self) -> u64 {
        self.held_pixels
    }
}

impl Default for BucketPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_PIXELS)
    }
}

impl BitmapPool for BucketPool {
    fn acquire(&mut self, width: u32, height: u32) -> Option<RgbaImage> {
        let bucket = self.buckets.get_mut(&(width, height))?;
        let bitmap = bucket.pop()?;
        self.held_pixels -= u64::from(width) * u64::from(height);
        Some(bitmap)
    }

    fn release(&mut self, bitmap: RgbaImage) {
        let pixels = u64::from(bitmap.width()) * u64::from(bitmap.height());
        if pixels == 0 || self.held_pixels + pixels > self.max_pixels {
            return;
        }
        self.held_pixels += pixels;
        self.buckets
            .entry((bitmap.width(), bitmap.height()))
            .or_default()
            .push(bitmap);
    }
}
