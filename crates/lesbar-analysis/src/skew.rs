// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document skew estimation from straight text baselines.
//
// Pipeline:
//
// 1. Canny edge detection (done by the caller, shared with edge sharpness)
// 2. Hough line detection to find dominant straight edges
// 3. Trace each Hough line across the edge map, splitting it into segments
//    wherever the gap between supporting edge pixels exceeds `max_line_gap`
//    and keeping segments at least `min_line_length` long
// 4. Fold each segment angle into (-90, 90], drop near-vertical segments
// 5. Weighted mean of the remaining angles, trusting small angles more

use image::GrayImage;
use imageproc::hough::{LineDetectionOptions, PolarLine, detect_lines};
use lesbar_core::config::SkewConfig;
use tracing::{debug, instrument};

use crate::metrics::kernels::Gradients;

/// A straight run of edge pixels, endpoints in image coordinates (y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub start: (f64, f64),
    pub end: (f64, f64),
}

impl LineSegment {
    pub fn length(&self) -> f64 {
        (self.end.0 - self.start.0).hypot(self.end.1 - self.start.1)
    }

    /// Angle of the segment in degrees, folded into (-90, 90].
    ///
    /// Positive angles descend to the right, i.e. the page is rotated clockwise.
    pub fn angle_degrees(&self) -> f64 {
        let angle = (self.end.1 - self.start.1)
            .atan2(self.end.0 - self.start.0)
            .to_degrees();
        fold_angle(angle)
    }
}

/// Fold an angle in [-180, 180] into (-90, 90] so that a line and its reverse
/// agree.
pub fn fold_angle(degrees: f64) -> f64 {
    let mut angle = degrees;
    if angle > 90.0 {
        angle -= 180.0;
    }
    if angle <= -90.0 {
        angle += 180.0;
    }
    angle
}

/// Estimate the document rotation in degrees from a Canny edge map. Returns
/// 0.0 when no qualifying text line is found.
#[instrument(skip_all, fields(width = edges.width(), height = edges.height()))]
pub fn estimate_skew(edges: &GrayImage, gradients: &Gradients, config: &SkewConfig) -> f64 {
    let segments = detect_segments(edges, gradients, config);
    let angles: Vec<f64> = segments
        .iter()
        .filter(|segment| segment.length() > config.min_segment_length)
        .map(LineSegment::angle_degrees)
        .collect();

    let skew = weighted_skew(&angles, config.max_text_angle);
    debug!(segments = segments.len(), skew, "Skew estimated");
    skew
}

/// Combine segment angles, discarding any with `|angle| >= max_angle`.
///
/// Each remaining angle is weighted by `1 / (1 + |angle|)`.
pub fn weighted_skew(angles: &[f64], max_angle: f64) -> f64 {
    let (weighted_sum, weight_total) = angles
        .iter()
        .filter(|angle| angle.abs() < max_angle)
        .fold((0.0, 0.0), |(sum, total), &angle| {
            let weight = 1.0 / (1.0 + angle.abs());
            (sum + angle * weight, total + weight)
        });

    if weight_total == 0.0 {
        return 0.0;
    }
    weighted_sum / weight_total
}

/// Find straight segments in an edge map.
pub fn detect_segments(
    edges: &GrayImage,
    gradients: &Gradients,
    config: &SkewConfig,
) -> Vec<LineSegment> {
    let options = LineDetectionOptions {
        vote_threshold: config.vote_threshold,
        suppression_radius: config.suppression_radius,
    };
    let lines = detect_lines(edges, options);
    debug!(line_count = lines.len(), "Hough lines detected");

    let mut segments = Vec::new();
    for line in &lines {
        // A polar line's normal is at `angle_in_degrees`, so the line itself
        // runs at `angle_in_degrees - 90`. Skip anything that could only
        // yield a near-vertical segment.
        let direction = line.angle_in_degrees as f64 - 90.0;
        if direction.abs() >= config.max_text_angle + 5.0 {
            continue;
        }
        segments.extend(trace_line(edges, gradients, line, config));
    }
    segments
}

/// Walk along a Hough line and split its supporting edge pixels into
/// segments.
///
/// An edge pixel supports the line when it lies within one pixel of it and its
/// gradient points along the line normal (within `orientation_tolerance`).
fn trace_line(
    edges: &GrayImage,
    gradients: &Gradients,
    line: &PolarLine,
    config: &SkewConfig,
) -> Vec<LineSegment> {
    let (width, height) = edges.dimensions();
    let theta = (line.angle_in_degrees as f64).to_radians();
    let (sin, cos) = theta.sin_cos();
    let r = line.r as f64;

    // Foot of the perpendicular from the origin, and unit vectors along and
    // across the line.
    let foot = (r * cos, r * sin);
    let along = (-sin, cos);
    let across = (cos, sin);
    let Some((t_start, t_end)) = clip_to_image(foot, along, width, height) else {
        return Vec::new();
    };

    let mut segments = Vec::new();
    let mut run: Option<Run> = None;

    for t in t_start..=t_end {
        let base = (foot.0 + t as f64 * along.0, foot.1 + t as f64 * along.1);
        let hit = [0.0, -1.0, 1.0].iter().find_map(|&offset| {
            let x = (base.0 + offset * across.0).round();
            let y = (base.1 + offset * across.1).round();
            if x < 0.0 || y < 0.0 || x >= width as f64 || y >= height as f64 {
                return None;
            }
            let (xi, yi) = (x as u32, y as u32);
            (edges.get_pixel(xi, yi).0[0] > 0
                && supports(gradients, xi as usize, yi as usize, line, config))
            .then_some((x, y))
        });

        let Some(point) = hit else {
            continue;
        };

        match run.as_mut() {
            Some(current) if t - current.last_t <= config.max_line_gap as i64 + 1 => {
                current.last = point;
                current.last_t = t;
            }
            _ => {
                if let Some(finished) = run.take() {
                    push_if_long(&mut segments, finished, config);
                }
                run = Some(Run {
                    first: point,
                    last: point,
                    last_t: t,
                });
            }
        }
    }

    if let Some(finished) = run {
        push_if_long(&mut segments, finished, config);
    }
    segments
}

/// Range of the line parameter `t` for which `foot + t * along` lies within
/// one pixel of the image, or `None` if the line misses the image.
fn clip_to_image(foot: (f64, f64), along: (f64, f64), width: u32, height: u32) -> Option<(i64, i64)> {
    let mut lo = f64::NEG_INFINITY;
    let mut hi = f64::INFINITY;

    for (origin, step, limit) in [(foot.0, along.0, width as f64), (foot.1, along.1, height as f64)] {
        let (min, max) = (-1.0, limit);
        if step.abs() < 1e-12 {
            if origin < min || origin > max {
                return None;
            }
            continue;
        }
        let a = (min - origin) / step;
        let b = (max - origin) / step;
        lo = lo.max(a.min(b));
        hi = hi.min(a.max(b));
    }

    (lo <= hi).then(|| (lo.floor() as i64, hi.ceil() as i64))
}

/// Whether the gradient at (x, y) is perpendicular to the line.
fn supports(gradients: &Gradients, x: usize, y: usize, line: &PolarLine, config: &SkewConfig) -> bool {
    let Some(direction) = gradients.direction_degrees(x, y) else {
        return false;
    };
    let diff = (direction - line.angle_in_degrees as f64).rem_euclid(180.0);
    diff.min(180.0 - diff) <= config.orientation_tolerance
}

#[derive(Debug, Clone, Copy)]
struct Run {
    first: (f64, f64),
    last: (f64, f64),
    last_t: i64,
}

fn push_if_long(segments: &mut Vec<LineSegment>, run: Run, config: &SkewConfig) {
    let segment = LineSegment {
        start: run.first,
        end: run.last,
    };
    if segment.length() >= config.min_line_length as f64 {
        segments.push(segment);
    }
}
