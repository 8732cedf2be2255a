//! Circular crops and stroked circle borders.

use super::geometry;
use super::{Transform, TransformError, acquire_or_alloc};
use crate::cache::CacheKeyDigest;
use crate::pool::BitmapPool;
use crate::request::Argb;
use image::{Rgba, RgbaImage};

/// Border styling: a stroke width in density-independent units and a
/// packed ARGB color. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderSpec {
    pub width_dp: f32,
    pub color: Argb,
}

impl BorderSpec {
    pub fn new(width_dp: f32, color: Argb) -> Self {
        Self { width_dp, color }
    }
}

/// Crops to a centered circle and strokes a ring on its edge.
///
/// The display density is resolved once here: the device-pixel stroke
/// width is `density * width_dp` and stays fixed for the transform's
/// lifetime. The crop square is shrunk by half the stroke width so the
/// ring, which straddles the circle's edge, is never clipped by the
/// bitmap bounds. A degenerate source smaller than the inset still
/// produces a 1x1 output.
pub struct BorderedCircle {
    border_px: f32,
    color: Argb,
}

impl BorderedCircle {
    const ID: &'static str = "easel::transform::BorderedCircle";

    pub fn new(spec: BorderSpec, density: f32) -> Self {
        Self {
            border_px: density * spec.width_dp,
            color: spec.color,
        }
    }

    /// The resolved device-pixel stroke width.
    pub fn border_px(&self) -> f32 {
        self.border_px
    }

    /// Nullable-source variant: an absent source is a skipped stage, not
    /// an error, and touches neither the pool nor the allocator.
    pub fn circle_crop(
        &self,
        pool: &mut dyn BitmapPool,
        source: Option<&RgbaImage>,
    ) -> Result<Option<RgbaImage>, TransformError> {
        match source {
            None => Ok(None),
            Some(source) => render_circle(pool, source, self.border_px, self.color).map(Some),
        }
    }
}

impl Transform for BorderedCircle {
    fn apply(
        &self,
        pool: &mut dyn BitmapPool,
        source: &RgbaImage,
    ) -> Result<RgbaImage, TransformError> {
        render_circle(pool, source, self.border_px, self.color)
    }

    fn update_cache_key(&self, digest: &mut CacheKeyDigest) {
        digest.update_str(Self::ID);
        digest.update_str(&scaled_width(self.border_px));
        // Border color is not part of the key: variants differing only in
        // color share a cache entry. See DESIGN.md.
    }
}

/// Crops to the centered inscribed circle, no border.
#[derive(Debug, Default, Clone, Copy)]
pub struct CircleCrop;

impl CircleCrop {
    const ID: &'static str = "easel::transform::CircleCrop";
}

impl Transform for CircleCrop {
    fn apply(
        &self,
        pool: &mut dyn BitmapPool,
        source: &RgbaImage,
    ) -> Result<RgbaImage, TransformError> {
        render_circle(pool, source, 0.0, Argb::TRANSPARENT)
    }

    fn update_cache_key(&self, digest: &mut CacheKeyDigest) {
        digest.update_str(Self::ID);
    }
}

/// Strokes the inscribed circle ring over an otherwise unmodified copy of
/// the source. No cropping happens; the output has the source dimensions.
pub struct Border {
    border_px: f32,
    color: Argb,
}

impl Border {
    const ID: &'static str = "easel::transform::Border";

    pub fn new(spec: BorderSpec, density: f32) -> Self {
        Self {
            border_px: density * spec.width_dp,
            color: spec.color,
        }
    }
}

impl Transform for Border {
    fn apply(
        &self,
        pool: &mut dyn BitmapPool,
        source: &RgbaImage,
    ) -> Result<RgbaImage, TransformError> {
        let (width, height) = source.dimensions();
        let mut dest = acquire_or_alloc(pool, width, height)?;
        dest.copy_from_slice(source.as_raw());

        if self.border_px > 0.0 {
            let cx = width as f32 / 2.0;
            let cy = height as f32 / 2.0;
            let radius = width.min(height) as f32 / 2.0 - self.border_px / 2.0;
            stroke_ring(&mut dest, cx, cy, radius, self.border_px, self.color);
        }
        Ok(dest)
    }

    fn update_cache_key(&self, digest: &mut CacheKeyDigest) {
        digest.update_str(Self::ID);
        digest.update_str(&scaled_width(self.border_px));
        // Same color omission as BorderedCircle.
    }
}

/// Device-pixel width scaled by a fixed factor of 10 and formatted as a
/// decimal integer, so the key bytes are identical across platforms
/// regardless of float formatting.
fn scaled_width(border_px: f32) -> String {
    ((border_px * 10.0).round() as i64).to_string()
}

fn render_circle(
    pool: &mut dyn BitmapPool,
    source: &RgbaImage,
    border_px: f32,
    border_color: Argb,
) -> Result<RgbaImage, TransformError> {
    let (width, height) = source.dimensions();
    let size = geometry::inset_square_size(width, height, border_px);
    let (ox, oy) = geometry::center_offsets(width, height, size);

    let mut dest = acquire_or_alloc(pool, size, size)?;
    let r = size as f32 / 2.0;

    for py in 0..size {
        for px in 0..size {
            let cov = geometry::circle_coverage(px, py, r, r, r);
            let out = if cov <= 0.0 {
                Rgba([0, 0, 0, 0])
            } else {
                // Sampling clamps to the source edge.
                let sx = (ox + px).min(width - 1);
                let sy = (oy + py).min(height - 1);
                let src = *source.get_pixel(sx, sy);
                let alpha = (f32::from(src[3]) * cov).round() as u8;
                Rgba([src[0], src[1], src[2], alpha])
            };
            dest.put_pixel(px, py, out);
        }
    }

    if border_px > 0.0 {
        let radius = r - border_px / 2.0;
        stroke_ring(&mut dest, r, r, radius, border_px, border_color);
    }

    Ok(dest)
}

fn stroke_ring(dest: &mut RgbaImage, cx: f32, cy: f32, radius: f32, stroke: f32, color: Argb) {
    let rgba = color.to_rgba();
    let (width, height) = dest.dimensions();
    for py in 0..height {
        for px in 0..width {
            let cov = geometry::ring_coverage(px, py, cx, cy, radius, stroke);
            if cov > 0.0 {
                let blended = geometry::blend_over(*dest.get_pixel(px, py), rgba, cov);
                dest.put_pixel(px, py, blended);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::NoPool;
    use crate::pool::tests::CountingPool;

    const GRAY: Argb = Argb(0xFFAC_ACAC);

    /// Source where each pixel encodes its own coordinates.
    fn coordinate_image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 0, 255])
        })
    }

    fn bordered(width_dp: f32, density: f32) -> BorderedCircle {
        BorderedCircle::new(BorderSpec::new(width_dp, GRAY), density)
    }

    fn key_of(transform: &dyn Transform) -> String {
        let mut digest = CacheKeyDigest::new();
        transform.update_cache_key(&mut digest);
        digest.finish()
    }

    // =========================================================================
    // Geometry of the crop
    // =========================================================================

    #[test]
    fn landscape_source_crops_to_inset_square() {
        // 200x100 with a 4 px stroke: size 98, crop origin (51, 1), so the
        // output center pixel maps back to source (100, 50).
        let transform = bordered(2.0, 2.0);
        assert_eq!(transform.border_px(), 4.0);

        let source = coordinate_image(200, 100);
        let out = transform.apply(&mut NoPool, &source).unwrap();

        assert_eq!(out.dimensions(), (98, 98));
        let center = out.get_pixel(49, 49);
        assert_eq!(center[0], 100);
        assert_eq!(center[1], 50);
    }

    #[test]
    fn square_source_with_zero_border_keeps_full_size() {
        let source = coordinate_image(96, 96);
        let out = CircleCrop.apply(&mut NoPool, &source).unwrap();
        assert_eq!(out.dimensions(), (96, 96));
        // Center pixel survives untouched.
        assert_eq!(out.get_pixel(48, 48), source.get_pixel(48, 48));
    }

    #[test]
    fn corners_outside_the_circle_are_transparent() {
        let source = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));
        let out = CircleCrop.apply(&mut NoPool, &source).unwrap();
        for (x, y) in [(0, 0), (99, 0), (0, 99), (99, 99)] {
            assert_eq!(out.get_pixel(x, y)[3], 0, "corner ({x}, {y}) not clear");
        }
    }

    #[test]
    fn ring_pixels_take_the_border_color() {
        let source = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));
        let transform = BorderedCircle::new(BorderSpec::new(4.0, Argb::rgb(255, 0, 0)), 1.0);
        let out = transform.apply(&mut NoPool, &source).unwrap();

        // size = floor(100 - 2) = 98, r = 49, ring radius 47. The pixel at
        // distance ~47 right of center sits in the middle of the band.
        assert_eq!(out.dimensions(), (98, 98));
        let on_ring = out.get_pixel(96, 49);
        assert_eq!(on_ring[0], 255);
        assert_eq!(on_ring[1], 0);
        assert_eq!(on_ring[2], 0);
        assert_eq!(on_ring[3], 255);

        // The interior well inside the ring stays white.
        assert_eq!(out.get_pixel(49, 49), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn degenerate_source_clamps_to_one_pixel() {
        let source = coordinate_image(2, 2);
        let out = bordered(100.0, 1.0).apply(&mut NoPool, &source).unwrap();
        assert_eq!(out.dimensions(), (1, 1));
    }

    #[test]
    fn absent_source_is_a_no_op_with_zero_allocations() {
        let mut pool = CountingPool::default();
        let out = bordered(2.0, 1.0).circle_crop(&mut pool, None).unwrap();
        assert!(out.is_none());
        assert_eq!(pool.acquires, 0);
        assert_eq!(pool.releases, 0);
    }

    #[test]
    fn pooled_destination_is_fully_overwritten() {
        let mut pool = crate::pool::BucketPool::default();
        // Poison a 96x96 buffer and hand it back through the pool.
        pool.release(RgbaImage::from_pixel(96, 96, Rgba([1, 2, 3, 4])));

        let source = RgbaImage::from_pixel(96, 96, Rgba([255, 255, 255, 255]));
        let out = CircleCrop.apply(&mut pool, &source).unwrap();

        // Corners must be written transparent, not left as pool garbage.
        assert_eq!(out.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
        assert_eq!(out.get_pixel(48, 48), &Rgba([255, 255, 255, 255]));
    }

    // =========================================================================
    // Cache keys
    // =========================================================================

    #[test]
    fn equal_specs_produce_identical_keys() {
        assert_eq!(key_of(&bordered(2.0, 1.5)), key_of(&bordered(2.0, 1.5)));
    }

    #[test]
    fn different_widths_produce_different_keys() {
        assert_ne!(key_of(&bordered(2.0, 1.0)), key_of(&bordered(4.0, 1.0)));
    }

    #[test]
    fn fractional_density_difference_changes_the_key() {
        // 2 dp at density 1.0 vs 1.05: 2.0 px vs 2.1 px, scaled to 20 vs 21.
        assert_ne!(key_of(&bordered(2.0, 1.0)), key_of(&bordered(2.0, 1.05)));
    }

    #[test]
    fn key_ignores_border_color() {
        let red = BorderedCircle::new(BorderSpec::new(2.0, Argb::rgb(255, 0, 0)), 1.0);
        let blue = BorderedCircle::new(BorderSpec::new(2.0, Argb::rgb(0, 0, 255)), 1.0);
        assert_eq!(key_of(&red), key_of(&blue));
    }

    #[test]
    fn border_and_bordered_circle_have_distinct_keys() {
        let spec = BorderSpec::new(2.0, GRAY);
        let ring = Border::new(spec, 1.0);
        let cropped = BorderedCircle::new(spec, 1.0);
        assert_ne!(key_of(&ring), key_of(&cropped));
    }

    #[test]
    fn circle_crop_key_is_stable() {
        assert_eq!(key_of(&CircleCrop), key_of(&CircleCrop));
        assert_ne!(key_of(&CircleCrop), key_of(&bordered(0.0, 1.0)));
    }

    // =========================================================================
    // Border (ring only)
    // =========================================================================

    #[test]
    fn border_keeps_source_dimensions() {
        let source = coordinate_image(120, 80);
        let out = Border::new(BorderSpec::new(2.0, GRAY), 1.0)
            .apply(&mut NoPool, &source)
            .unwrap();
        assert_eq!(out.dimensions(), (120, 80));
        // Pixels well away from the ring are untouched.
        assert_eq!(out.get_pixel(60, 40), source.get_pixel(60, 40));
    }

    #[test]
    fn border_strokes_the_inscribed_ring() {
        let source = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));
        let out = Border::new(BorderSpec::new(4.0, Argb::rgb(0, 255, 0)), 1.0)
            .apply(&mut NoPool, &source)
            .unwrap();
        // Ring radius 48 centered at (50, 50): the pixel just inside the
        // right edge midpoint is on the band.
        let on_ring = out.get_pixel(97, 50);
        assert_eq!(on_ring[1], 255);
        assert_eq!(on_ring[0], 0);
    }
}
