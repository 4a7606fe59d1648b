//! Content-aware crop selection for thumbnails.
//!
//! The search runs on a copy downscaled to [`ANALYSIS_EDGE`] pixels:
//!
//! 1. Build a saliency map: luma edge strength (4-neighbour Laplacian) plus
//!    colour saturation.
//! 2. Integrate it into a summed-area table so any window sums in O(1).
//! 3. Slide windows of the target aspect ratio at a few scales across the
//!    image and score each by mean saliency, weighted by scale and a mild
//!    centre bias.
//! 4. Map the winner back to full-resolution coordinates.
//!
//! Larger windows win unless a smaller one is clearly denser, so thumbnails
//! keep as much of the frame as the aspect ratio allows.

use super::calculations::{CropRect, candidate_offsets, crop_window, scale_rect};
use image::{DynamicImage, GenericImageView, Rgb};

/// Longer edge of the analysis copy.
const ANALYSIS_EDGE: u32 = 256;

/// Window scales tried, relative to the largest window of the target aspect.
const SCALES: &[f64] = &[1.0, 0.9, 0.8];

/// Number of slide positions per axis (roughly).
const STEPS: u32 = 16;

const SATURATION_WEIGHT: f64 = 0.5;
const CENTER_BIAS: f64 = 0.1;

/// Pick the most salient rectangle with the aspect ratio of `target_w`×`target_h`.
///
/// Returns `None` for empty images or a zero target.
pub fn best_crop(img: &DynamicImage, target_w: u32, target_h: u32) -> Option<CropRect> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 || target_w == 0 || target_h == 0 {
        return None;
    }

    let analysis = if width.max(height) > ANALYSIS_EDGE {
        img.thumbnail(ANALYSIS_EDGE, ANALYSIS_EDGE)
    } else {
        img.clone()
    };
    let (aw, ah) = analysis.dimensions();
    let table = SummedArea::new(&saliency_map(&analysis), aw, ah);

    let (max_w, max_h) = crop_window((aw, ah), (target_w, target_h));
    let mut best: Option<(f64, CropRect)> = None;

    for &scale in SCALES {
        let win_w = ((max_w as f64 * scale).round() as u32).max(1);
        let win_h = ((max_h as f64 * scale).round() as u32).max(1);
        for y in candidate_offsets(ah, win_h, ah / STEPS) {
            for x in candidate_offsets(aw, win_w, aw / STEPS) {
                let rect = CropRect {
                    x,
                    y,
                    width: win_w,
                    height: win_h,
                };
                let score = score_window(&table, rect, (aw, ah), scale);
                if best.is_none_or(|(s, _)| score > s) {
                    best = Some((score, rect));
                }
            }
        }
    }

    let (_, rect) = best?;
    let factor = width as f64 / aw as f64;
    Some(scale_rect(rect, factor, (width, height)))
}

fn score_window(table: &SummedArea, rect: CropRect, (aw, ah): (u32, u32), scale: f64) -> f64 {
    let area = (rect.width as f64) * (rect.height as f64);
    let density = table.sum(rect) / area;

    let cx = (rect.x as f64 + rect.width as f64 / 2.0) / aw as f64 - 0.5;
    let cy = (rect.y as f64 + rect.height as f64 / 2.0) / ah as f64 - 0.5;
    let off_center = (cx * cx + cy * cy).sqrt() / std::f64::consts::FRAC_1_SQRT_2;

    // +1 keeps flat images (zero saliency) ranked by scale and centring
    (density + 1.0) * scale * (1.0 - CENTER_BIAS * off_center)
}

fn luminance(p: &Rgb<u8>) -> f64 {
    0.299 * p[0] as f64 + 0.587 * p[1] as f64 + 0.114 * p[2] as f64
}

/// Per-pixel interest score, row-major.
fn saliency_map(img: &DynamicImage) -> Vec<f64> {
    let rgb = img.to_rgb8();
    let (w, h) = rgb.dimensions();
    let luma: Vec<f64> = rgb.pixels().map(luminance).collect();

    let at = |x: u32, y: u32| luma[(y * w + x) as usize];
    let mut map = Vec::with_capacity(luma.len());
    for (i, px) in rgb.pixels().enumerate() {
        let x = i as u32 % w;
        let y = i as u32 / w;
        let center = at(x, y);
        let edge = (4.0 * center
            - at(x.saturating_sub(1), y)
            - at((x + 1).min(w - 1), y)
            - at(x, y.saturating_sub(1))
            - at(x, (y + 1).min(h - 1)))
        .abs();

        let max = px.0.iter().copied().max().unwrap_or(0) as f64;
        let min = px.0.iter().copied().min().unwrap_or(0) as f64;
        let saturation = if max > 0.0 {
            (max - min) / max * 255.0
        } else {
            0.0
        };

        map.push(edge + SATURATION_WEIGHT * saturation);
    }
    map
}

/// Integral image over a saliency map.
struct SummedArea {
    stride: usize,
    sums: Vec<f64>,
}

impl SummedArea {
    fn new(values: &[f64], width: u32, height: u32) -> Self {
        let stride = width as usize + 1;
        let mut sums = vec![0.0; stride * (height as usize + 1)];
        for y in 0..height as usize {
            let mut row = 0.0;
            for x in 0..width as usize {
                row += values[y * width as usize + x];
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row;
            }
        }
        Self { stride, sums }
    }

    fn sum(&self, rect: CropRect) -> f64 {
        let (x0, y0) = (rect.x as usize, rect.y as usize);
        let (x1, y1) = (x0 + rect.width as usize, y0 + rect.height as usize);
        self.sums[y1 * self.stride + x1]
            - self.sums[y0 * self.stride + x1]
            - self.sums[y1 * self.stride + x0]
            + self.sums[y0 * self.stride + x0]
    }
}
