// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Global and local (windowed) contrast.

use image::GrayImage;
use tracing::{debug, instrument};

use super::kernels::Plane;

/// Standard deviation of all grayscale intensities.
pub fn global_contrast(plane: &Plane) -> f64 {
    plane.std_dev()
}

/// Mean local standard deviation over a `window` x `window` box centred on
/// every pixel.
///
/// Local variance is `E[X²] - E[X]²` from two summed-area tables, floored at
/// zero before the square root. Near the borders the box is clipped to the
/// image.
#[instrument(skip(gray), fields(width = gray.width(), height = gray.height()))]
pub fn local_contrast(gray: &GrayImage, window: u32) -> f64 {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 || window == 0 {
        return 0.0;
    }

    let tables = IntegralTables::new(gray);
    let radius = window / 2;

    let mut total = 0.0;
    for y in 0..height {
        for x in 0..width {
            let (mean, mean_sq) = tables.region_moments(x, y, radius);
            let variance = (mean_sq - mean * mean).max(0.0);
            total += variance.sqrt();
        }
    }

    let contrast = total / (width as f64 * height as f64);
    debug!(contrast, window, "Local contrast computed");
    contrast
}

/// Summed-area tables of pixel values and squared pixel values.
///
/// `sum[y * (width+1) + x]` holds the sum over the rectangle [0, 0) to (x, y),
/// exclusive on both axes, with a zero-padded first row and column.
struct IntegralTables {
    width: u32,
    height: u32,
    sum: Vec<u64>,
    sum_sq: Vec<u64>,
}

impl IntegralTables {
    fn new(gray: &GrayImage) -> Self {
        let (w, h) = gray.dimensions();
        let stride = (w + 1) as usize;
        let mut sum = vec![0u64; stride * (h + 1) as usize];
        let mut sum_sq = vec![0u64; stride * (h + 1) as usize];

        for y in 0..h {
            let mut row_sum: u64 = 0;
            let mut row_sq: u64 = 0;
            for x in 0..w {
                let v = gray.get_pixel(x, y).0[0] as u64;
                row_sum += v;
                row_sq += v * v;
                let idx = (y + 1) as usize * stride + (x + 1) as usize;
                let above = y as usize * stride + (x + 1) as usize;
                sum[idx] = row_sum + sum[above];
                sum_sq[idx] = row_sq + sum_sq[above];
            }
        }

        Self {
            width: w,
            height: h,
            sum,
            sum_sq,
        }
    }

    /// Mean and mean square within the square of `radius` around (cx, cy).
    fn region_moments(&self, cx: u32, cy: u32, radius: u32) -> (f64, f64) {
        let stride = (self.width + 1) as usize;

        let x1 = cx.saturating_sub(radius) as usize;
        let y1 = cy.saturating_sub(radius) as usize;
        let x2 = ((cx + radius + 1) as usize).min(self.width as usize);
        let y2 = ((cy + radius + 1) as usize).min(self.height as usize);

        let area = ((x2 - x1) * (y2 - y1)) as f64;
        if area == 0.0 {
            return (0.0, 0.0);
        }

        let lookup = |table: &[u64]| {
            table[y2 * stride + x2] as f64 - table[y1 * stride + x2] as f64
                - table[y2 * stride + x1] as f64
                + table[y1 * stride + x1] as f64
        };

        (lookup(&self.sum) / area, lookup(&self.sum_sq) / area)
    }
}
