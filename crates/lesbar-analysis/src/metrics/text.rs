// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text-specific measures built on an adaptive binarization of the page:
// sharpness inside glyph-sized regions, and the text clarity composite.

use image::{GrayImage, Luma};
use imageproc::contours::{BorderType, find_contours};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::open;
use lesbar_core::config::{BinarizationConfig, BlurConfig, ClarityConfig};
use tracing::{debug, instrument};

use super::blur::{laplacian_variance, sobel_variance};
use super::kernels::{Gradients, Plane};

const INK: u8 = 0;
const PAPER: u8 = 255;

/// Adaptive thresholding against a Gaussian-weighted local mean.
///
/// A pixel becomes paper (255) when it is brighter than the local mean minus
/// `offset`, ink (0) otherwise. Flat regions of any brightness become paper.
#[instrument(skip_all, fields(block_size = config.block_size))]
pub fn binarize(gray: &GrayImage, config: &BinarizationConfig) -> GrayImage {
    let (width, height) = gray.dimensions();
    let local_mean = gaussian_blur_f32(gray, config.sigma());

    let mut output = GrayImage::new(width, height);
    for ((out, src), mean) in output
        .pixels_mut()
        .zip(gray.pixels())
        .zip(local_mean.pixels())
    {
        let threshold = mean.0[0] as f32 - config.offset;
        *out = Luma([if src.0[0] as f32 > threshold { PAPER } else { INK }]);
    }
    output
}

/// Axis-aligned bounding box of a connected ink blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Bounding boxes of the outermost connected ink components in a binarized
/// page. Ink islands enclosed by another blob (a dot inside a glyph's bowl)
/// belong to that blob and are not reported.
pub fn ink_regions(binary: &GrayImage) -> Vec<Region> {
    // Contour tracing treats non-zero pixels as foreground, so flip ink to 255.
    let mut ink = binary.clone();
    for pixel in ink.pixels_mut() {
        pixel.0[0] = if pixel.0[0] == INK { 255 } else { 0 };
    }

    find_contours::<u32>(&ink)
        .into_iter()
        .filter(|contour| contour.border_type == BorderType::Outer && contour.parent.is_none())
        .filter_map(|contour| {
            let first = contour.points.first()?;
            let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
            for p in &contour.points {
                min_x = min_x.min(p.x);
                min_y = min_y.min(p.y);
                max_x = max_x.max(p.x);
                max_y = max_y.max(p.y);
            }
            Some(Region {
                x: min_x,
                y: min_y,
                width: max_x - min_x + 1,
                height: max_y - min_y + 1,
            })
        })
        .collect()
}

/// Sharpness averaged over glyph-sized ink regions, scaled into [0, 1].
///
/// Regions whose bounding-box area lies strictly inside the configured range
/// are scored by `(Laplacian var + w * Sobel var) / (1 + w)` on the grayscale
/// crop. The mean score is divided by `text_region_scale`. A page without any
/// qualifying region scores 0.
#[instrument(skip_all)]
pub fn text_region_blur(gray: &GrayImage, binary: &GrayImage, config: &BlurConfig) -> f64 {
    let plane = Plane::from_gray(gray);
    let sobel_weight = config.text_region_sobel_weight;

    let scores: Vec<f64> = ink_regions(binary)
        .into_iter()
        .filter(|region| {
            let area = region.area();
            area > u64::from(config.text_region_min_area)
                && area < u64::from(config.text_region_max_area)
        })
        .map(|region| {
            let crop = plane.crop(
                region.x as usize,
                region.y as usize,
                region.width as usize,
                region.height as usize,
            );
            let lap = laplacian_variance(&crop);
            let sobel = sobel_variance(&Gradients::of(&crop));
            (lap + sobel * sobel_weight) / (1.0 + sobel_weight)
        })
        .collect();

    if scores.is_empty() {
        debug!("No text-sized regions found");
        return 0.0;
    }

    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    debug!(regions = scores.len(), mean, "Text region sharpness computed");
    (mean / config.text_region_scale).min(1.0)
}

/// Components of the text clarity composite, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClarityTerms {
    /// Share of paper pixels that survive a 3x3 opening.
    pub clean_ratio: f64,
    /// Scaled Canny edge density.
    pub edge_term: f64,
    /// Detected text lines relative to the expected count.
    pub line_term: f64,
}

impl ClarityTerms {
    pub fn composite(&self, config: &ClarityConfig) -> f64 {
        self.clean_ratio * config.clean_weight
            + self.edge_term * config.edge_weight
            + self.line_term * config.line_weight
    }
}

/// Measure the three clarity terms of a page.
#[instrument(skip_all)]
pub fn clarity_terms(gray: &GrayImage, binary: &GrayImage, config: &ClarityConfig) -> ClarityTerms {
    let (width, height) = gray.dimensions();
    let total = width as f64 * height as f64;
    if total == 0.0 {
        return ClarityTerms {
            clean_ratio: 0.0,
            edge_term: 0.0,
            line_term: 0.0,
        };
    }

    let opened = open(binary, Norm::LInf, 1);
    let paper_before = count_value(binary, PAPER);
    let paper_after = count_value(&opened, PAPER);
    let clean_ratio = if paper_before > 0 {
        paper_after as f64 / paper_before as f64
    } else {
        0.0
    };

    let edges = canny(gray, config.canny_low, config.canny_high);
    let edge_density = edges.as_raw().iter().filter(|&&v| v > 0).count() as f64 / total;
    let edge_term = (edge_density * config.edge_density_scale).min(1.0);

    let lines = count_text_lines(binary);
    let expected = height as f64 / config.line_spacing;
    let line_term = (lines as f64 / expected).min(1.0);

    debug!(clean_ratio, edge_density, lines, "Text clarity terms measured");
    ClarityTerms {
        clean_ratio,
        edge_term,
        line_term,
    }
}

/// Weighted text clarity composite of a page.
pub fn text_clarity(gray: &GrayImage, binary: &GrayImage, config: &ClarityConfig) -> f64 {
    clarity_terms(gray, binary, config).composite(config)
}

/// Number of runs of ink-bearing rows, scanning top to bottom.
pub fn count_text_lines(binary: &GrayImage) -> usize {
    let (width, height) = binary.dimensions();
    let raw = binary.as_raw();
    let mut lines = 0;
    let mut previous_has_ink = true;

    for y in 0..height as usize {
        let row = &raw[y * width as usize..(y + 1) * width as usize];
        let has_ink = row.iter().any(|&v| v == INK);
        if y > 0 && has_ink && !previous_has_ink {
            lines += 1;
        }
        previous_has_ink = has_ink;
    }
    lines
}

fn count_value(image: &GrayImage, value: u8) -> usize {
    image.as_raw().iter().filter(|&&v| v == value).count()
}
