//! Pure geometry for the bitmap transforms.
//!
//! All functions here are pure and testable without any images. Coverage
//! functions return the fraction of a pixel inside a shape (0.0 to 1.0),
//! evaluated at the pixel center with a one-pixel anti-aliasing ramp.

use image::Rgba;

/// Side length of the centered square crop, shrunk so a stroked border
/// straddling the circle's edge is not clipped by the bitmap bounds.
///
/// `size = floor(min(width, height) - border_px / 2)`, clamped to a minimum
/// of 1 so a source smaller than the border inset still yields a valid
/// 1x1 crop instead of an empty bitmap.
pub fn inset_square_size(width: u32, height: u32, border_px: f32) -> u32 {
    let min_edge = width.min(height) as f32;
    let size = (min_edge - border_px.max(0.0) / 2.0).floor();
    (size as i64).clamp(1, i64::from(width.min(height).max(1))) as u32
}

/// Top-left origin of a centered `size` x `size` crop.
pub fn center_offsets(width: u32, height: u32, size: u32) -> (u32, u32) {
    let x = width.saturating_sub(size) / 2;
    let y = height.saturating_sub(size) / 2;
    (x, y)
}

/// Coverage of pixel `(x, y)` by a filled circle centered at `(cx, cy)`
/// with radius `r`.
///
/// Pixel centers strictly outside `r + 0.5` get zero coverage, so corners
/// outside the circle stay fully transparent.
pub fn circle_coverage(x: u32, y: u32, cx: f32, cy: f32, r: f32) -> f32 {
    let dx = x as f32 + 0.5 - cx;
    let dy = y as f32 + 0.5 - cy;
    let d = (dx * dx + dy * dy).sqrt();
    (r - d + 0.5).clamp(0.0, 1.0)
}

/// Coverage of pixel `(x, y)` by a stroked circle (ring) centered at
/// `(cx, cy)`: the band of width `stroke` straddling `radius`.
pub fn ring_coverage(x: u32, y: u32, cx: f32, cy: f32, radius: f32, stroke: f32) -> f32 {
    let dx = x as f32 + 0.5 - cx;
    let dy = y as f32 + 0.5 - cy;
    let d = (dx * dx + dy * dy).sqrt();
    let band = (d - radius).abs();
    (stroke / 2.0 - band + 0.5).clamp(0.0, 1.0)
}

/// Coverage of pixel `(x, y)` by a rounded rectangle filling a
/// `width` x `height` bitmap, inset by `margin` on every side, with corner
/// radius `radius`.
///
/// Signed-distance evaluation: the radius is clamped to the inset half
/// extents, and a non-positive inset area yields zero coverage everywhere.
pub fn rounded_rect_coverage(x: u32, y: u32, width: u32, height: u32, radius: f32, margin: f32) -> f32 {
    let half_w = width as f32 / 2.0 - margin;
    let half_h = height as f32 / 2.0 - margin;
    if half_w <= 0.0 || half_h <= 0.0 {
        return 0.0;
    }
    let r = radius.clamp(0.0, half_w.min(half_h));

    let px = (x as f32 + 0.5 - width as f32 / 2.0).abs();
    let py = (y as f32 + 0.5 - height as f32 / 2.0).abs();
    let qx = px - (half_w - r);
    let qy = py - (half_h - r);
    let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
    let inside = qx.max(qy).min(0.0);
    let d = outside + inside - r;
    (0.5 - d).clamp(0.0, 1.0)
}

/// Source-over composite of `src` onto `dst`, with the source alpha
/// modulated by `coverage`.
pub fn blend_over(dst: Rgba<u8>, src: Rgba<u8>, coverage: f32) -> Rgba<u8> {
    let sa = f32::from(src[3]) / 255.0 * coverage.clamp(0.0, 1.0);
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |s: u8, d: u8| {
        let v = (f32::from(s) * sa + f32::from(d) * da * (1.0 - sa)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // inset_square_size / center_offsets
    // =========================================================================

    #[test]
    fn square_source_with_zero_border_keeps_full_edge() {
        assert_eq!(inset_square_size(200, 200, 0.0), 200);
        assert_eq!(center_offsets(200, 200, 200), (0, 0));
    }

    #[test]
    fn landscape_source_with_border() {
        // 200x100 with a 4 px border: floor(100 - 2) = 98, origin (51, 1)
        let size = inset_square_size(200, 100, 4.0);
        assert_eq!(size, 98);
        assert_eq!(center_offsets(200, 100, size), (51, 1));
    }

    #[test]
    fn portrait_source_with_border() {
        let size = inset_square_size(100, 200, 4.0);
        assert_eq!(size, 98);
        assert_eq!(center_offsets(100, 200, size), (1, 51));
    }

    #[test]
    fn fractional_border_floors() {
        // floor(100 - 1.5/2) = floor(99.25) = 99
        assert_eq!(inset_square_size(100, 100, 1.5), 99);
    }

    #[test]
    fn degenerate_source_clamps_to_one() {
        assert_eq!(inset_square_size(1, 1, 10.0), 1);
        assert_eq!(inset_square_size(2, 2, 100.0), 1);
    }

    #[test]
    fn negative_border_treated_as_zero() {
        assert_eq!(inset_square_size(50, 50, -3.0), 50);
    }

    // =========================================================================
    // circle_coverage
    // =========================================================================

    #[test]
    fn circle_center_is_fully_covered() {
        assert_eq!(circle_coverage(49, 49, 49.0, 49.0, 49.0), 1.0);
    }

    #[test]
    fn circle_corner_is_uncovered() {
        assert_eq!(circle_coverage(0, 0, 49.0, 49.0, 49.0), 0.0);
        assert_eq!(circle_coverage(97, 0, 49.0, 49.0, 49.0), 0.0);
    }

    #[test]
    fn circle_edge_is_partial() {
        // Pixel center exactly on the radius gets the half-covered value.
        let cov = circle_coverage(10, 0, 0.5, 0.5, 10.0);
        assert!((cov - 0.5).abs() < 1e-6);
    }

    #[test]
    fn circle_just_outside_ramp_is_zero() {
        // Distance r + 0.5 or more: no coverage at all.
        assert_eq!(circle_coverage(99, 49, 49.0, 49.0, 49.0), 0.0);
    }

    // =========================================================================
    // ring_coverage
    // =========================================================================

    #[test]
    fn ring_band_center_is_fully_covered() {
        // Pixel center at distance 47 from center, ring radius 47, stroke 4.
        let cov = ring_coverage(96, 49, 49.0, 49.0, 47.0, 4.0);
        assert!(cov > 0.9, "band center coverage was {cov}");
    }

    #[test]
    fn ring_center_of_circle_is_uncovered() {
        assert_eq!(ring_coverage(49, 49, 49.0, 49.0, 47.0, 4.0), 0.0);
    }

    #[test]
    fn ring_far_outside_is_uncovered() {
        assert_eq!(ring_coverage(0, 0, 49.0, 49.0, 47.0, 4.0), 0.0);
    }

    // =========================================================================
    // rounded_rect_coverage
    // =========================================================================

    #[test]
    fn rounded_rect_center_is_covered() {
        assert_eq!(rounded_rect_coverage(50, 50, 100, 100, 20.0, 0.0), 1.0);
    }

    #[test]
    fn rounded_rect_corner_is_uncovered() {
        assert_eq!(rounded_rect_coverage(0, 0, 100, 100, 20.0, 0.0), 0.0);
    }

    #[test]
    fn rounded_rect_edge_midpoint_is_covered() {
        // Middle of the top edge sits inside the straight segment.
        assert_eq!(rounded_rect_coverage(50, 0, 100, 100, 20.0, 0.0), 1.0);
    }

    #[test]
    fn rounded_rect_margin_band_is_uncovered() {
        // With a 10 px margin the outer band has no coverage, even on edges.
        assert_eq!(rounded_rect_coverage(50, 2, 100, 100, 20.0, 10.0), 0.0);
        assert_eq!(rounded_rect_coverage(2, 50, 100, 100, 20.0, 10.0), 0.0);
    }

    #[test]
    fn rounded_rect_zero_radius_is_plain_rect() {
        assert_eq!(rounded_rect_coverage(1, 1, 100, 100, 0.0, 0.0), 1.0);
        assert_eq!(rounded_rect_coverage(0, 0, 100, 100, 0.0, 0.0), 1.0);
    }

    #[test]
    fn rounded_rect_margin_swallowing_rect_is_empty() {
        assert_eq!(rounded_rect_coverage(5, 5, 10, 10, 2.0, 6.0), 0.0);
    }

    // =========================================================================
    // blend_over
    // =========================================================================

    #[test]
    fn blend_full_coverage_opaque_src_replaces_dst() {
        let out = blend_over(Rgba([10, 20, 30, 255]), Rgba([200, 100, 50, 255]), 1.0);
        assert_eq!(out, Rgba([200, 100, 50, 255]));
    }

    #[test]
    fn blend_zero_coverage_keeps_dst() {
        let dst = Rgba([10, 20, 30, 255]);
        assert_eq!(blend_over(dst, Rgba([200, 100, 50, 255]), 0.0), dst);
    }

    #[test]
    fn blend_onto_transparent_keeps_src_color() {
        let out = blend_over(Rgba([0, 0, 0, 0]), Rgba([200, 100, 50, 255]), 0.5);
        assert_eq!(out[0], 200);
        assert_eq!(out[1], 100);
        assert_eq!(out[2], 50);
        assert_eq!(out[3], 128);
    }

    #[test]
    fn blend_transparent_src_is_identity() {
        let dst = Rgba([10, 20, 30, 200]);
        assert_eq!(blend_over(dst, Rgba([255, 255, 255, 0]), 1.0), dst);
    }
}
