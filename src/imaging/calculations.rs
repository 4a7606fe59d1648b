//! Pure calculation functions for rendition geometry.
//!
//! All functions here are pure and testable without any I/O or images.

/// A rectangle inside a raster, in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    /// Whether the rectangle is non-empty and lies inside a `width`×`height` raster.
    pub fn fits_within(&self, (width, height): (u32, u32)) -> bool {
        self.width > 0
            && self.height > 0
            && self.x.checked_add(self.width).is_some_and(|r| r <= width)
            && self.y.checked_add(self.height).is_some_and(|b| b <= height)
    }
}

/// Dimensions of `source` scaled down to fit inside `bound`, keeping aspect ratio.
///
/// Images that already fit are returned unchanged (never upscaled). The
/// realized size may be smaller than the bound on the non-constraining axis.
///
/// # Examples
/// ```
/// # use swipe_gal::imaging::fit_within_dimensions;
/// assert_eq!(fit_within_dimensions((4000, 3000), (2048, 2048)), (2048, 1536));
/// assert_eq!(fit_within_dimensions((640, 480), (2048, 2048)), (640, 480));
/// ```
pub fn fit_within_dimensions(source: (u32, u32), bound: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bound;

    if src_w == 0 || src_h == 0 || (src_w <= max_w && src_h <= max_h) {
        return source;
    }

    let ratio = (max_w as f64 / src_w as f64).min(max_h as f64 / src_h as f64);
    let w = ((src_w as f64 * ratio).round() as u32).clamp(1, max_w.max(1));
    let h = ((src_h as f64 * ratio).round() as u32).clamp(1, max_h.max(1));
    (w, h)
}

/// Largest window with the aspect ratio of `target` that fits inside `source`.
///
/// This is the starting crop before the smart-crop search shrinks or slides it.
pub fn crop_window(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;
    if tgt_w == 0 || tgt_h == 0 {
        return (0, 0);
    }

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: full height, trimmed width
        let w = ((src_h as f64 * tgt_aspect).round() as u32).clamp(1, src_w);
        (w, src_h)
    } else {
        // Source is taller: full width, trimmed height
        let h = ((src_w as f64 / tgt_aspect).round() as u32).clamp(1, src_h);
        (src_w, h)
    }
}

/// Offsets at which a window of `window` pixels is tried along an axis of `len`.
///
/// Always includes both ends; interior positions are spaced by `step`.
pub fn candidate_offsets(len: u32, window: u32, step: u32) -> Vec<u32> {
    if window >= len {
        return vec![0];
    }
    let last = len - window;
    let step = step.max(1);
    let mut offsets: Vec<u32> = (0..last).step_by(step as usize).collect();
    offsets.push(last);
    offsets
}

/// Map a rectangle found on a downscaled copy back to full-resolution coordinates.
///
/// The result is clamped so it still fits inside `full`.
pub fn scale_rect(rect: CropRect, scale: f64, full: (u32, u32)) -> CropRect {
    let (full_w, full_h) = full;
    let width = ((rect.width as f64 * scale).round() as u32).clamp(1, full_w.max(1));
    let height = ((rect.height as f64 * scale).round() as u32).clamp(1, full_h.max(1));
    let x = ((rect.x as f64 * scale).round() as u32).min(full_w.saturating_sub(width));
    let y = ((rect.y as f64 * scale).round() as u32).min(full_h.saturating_sub(height));
    CropRect {
        x,
        y,
        width,
        height,
    }
}
