// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Aggregator — normalizes the raw blur signals, combines them into one blur
// score and applies the deduction rules that produce the final report.

use lesbar_core::config::{BlurBand, BlurWeights, MetricDivisors, QualityConfig};
use lesbar_core::findings::Finding;
use lesbar_core::types::{BlurDetails, BlurMetricSet, NormalizedMetricSet, QualityReport};
use tracing::debug;

/// Every measurement the rules look at, gathered from the extractors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signals {
    pub width: u32,
    pub height: u32,
    pub blur: BlurMetricSet,
    pub global_contrast: f64,
    pub local_contrast: f64,
    pub text_clarity: f64,
    pub skew_angle: f64,
}

/// Clamp into [0, 1]; NaN maps to 0.
fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Divide the unbounded metrics by their divisors and clamp everything to [0, 1].
pub fn normalize(raw: &BlurMetricSet, divisors: &MetricDivisors) -> NormalizedMetricSet {
    NormalizedMetricSet {
        laplacian_variance: unit(raw.laplacian_variance / divisors.laplacian_variance),
        sobel_variance: unit(raw.sobel_variance / divisors.sobel_variance),
        gradient_mean: unit(raw.gradient_mean / divisors.gradient_mean),
        gradient_std: unit(raw.gradient_std / divisors.gradient_std),
        high_frequency_energy: unit(raw.high_frequency_energy / divisors.high_frequency_energy),
        text_region_blur: unit(raw.text_region_blur),
        edge_sharpness: unit(raw.edge_sharpness),
        multiscale_ratio: unit(raw.multiscale_ratio),
    }
}

/// Fixed-weight sum of the normalized metrics. Higher is sharper.
pub fn overall_blur_score(normalized: &NormalizedMetricSet, weights: &BlurWeights) -> f64 {
    let sum = normalized.laplacian_variance * weights.laplacian_variance
        + normalized.sobel_variance * weights.sobel_variance
        + normalized.gradient_mean * weights.gradient_mean
        + normalized.gradient_std * weights.gradient_std
        + normalized.high_frequency_energy * weights.high_frequency_energy
        + normalized.text_region_blur * weights.text_region_blur
        + normalized.edge_sharpness * weights.edge_sharpness
        + normalized.multiscale_ratio * weights.multiscale_ratio;
    unit(sum)
}

/// The first (most severe) band the score falls below, if any.
pub fn blur_band(score: f64, bands: &[BlurBand]) -> Option<&BlurBand> {
    bands.iter().find(|band| score < band.below)
}

/// Apply every deduction rule in evaluation order and build the report.
pub fn assess(signals: &Signals, config: &QualityConfig) -> QualityReport {
    let mut score: i32 = 100;
    let mut findings = Vec::new();

    let resolution = &config.resolution;
    if signals.width < resolution.min_width || signals.height < resolution.min_height {
        score -= resolution.penalty as i32;
        findings.push(Finding::LowResolution {
            width: signals.width,
            height: signals.height,
        });
    }

    let normalized = normalize(&signals.blur, &config.blur.divisors);
    let overall = overall_blur_score(&normalized, &config.blur.weights);
    if let Some(band) = blur_band(overall, &config.blur.bands) {
        score -= band.penalty as i32;
        findings.push(Finding::Blurred {
            severity: band.severity,
            score: overall,
        });
    }

    let contrast = &config.contrast;
    if signals.global_contrast < contrast.min_global || signals.local_contrast < contrast.min_local {
        score -= contrast.penalty as i32;
        findings.push(Finding::LowContrast {
            global: signals.global_contrast,
            local: signals.local_contrast,
        });
    }

    if signals.text_clarity < config.clarity.minimum {
        score -= config.clarity.penalty as i32;
        findings.push(Finding::PoorTextClarity {
            clarity: signals.text_clarity,
        });
    }

    if signals.skew_angle.abs() > config.skew.max_skew {
        score -= config.skew.penalty as i32;
        findings.push(Finding::Skewed {
            angle: signals.skew_angle,
        });
    }

    debug!(score, overall_blur = overall, deductions = findings.len(), "Rules applied");

    let details = BlurDetails {
        overall_blur_score: overall,
        individual_scores: signals.blur,
        normalized_scores: normalized,
        text_clarity: signals.text_clarity,
        skew_angle: signals.skew_angle,
        global_contrast: signals.global_contrast,
        local_contrast: signals.local_contrast,
        width: signals.width,
        height: signals.height,
    };
    QualityReport::from_findings(score, findings, details)
}
