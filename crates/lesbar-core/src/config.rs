// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quality scoring configuration.
//
// Every divisor, weight, threshold and penalty used by the scorer lives here so
// the heuristic can be re-tuned without touching the analysis pipeline. The
// defaults are the calibrated values; a JSON file may override any subset.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LesbarError, Result};
use crate::findings::BlurSeverity;

/// Complete set of tunables for one quality check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub resolution: ResolutionConfig,
    pub binarization: BinarizationConfig,
    pub blur: BlurConfig,
    pub contrast: ContrastConfig,
    pub clarity: ClarityConfig,
    pub skew: SkewConfig,
    /// Run the independent metric extractors on the rayon pool.
    pub parallel: bool,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            resolution: ResolutionConfig::default(),
            binarization: BinarizationConfig::default(),
            blur: BlurConfig::default(),
            contrast: ContrastConfig::default(),
            clarity: ClarityConfig::default(),
            skew: SkewConfig::default(),
            parallel: true,
        }
    }
}

/// Minimum acceptable image dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    pub min_width: u32,
    pub min_height: u32,
    /// Flat deduction when either dimension is below its minimum.
    pub penalty: u32,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            min_width: 500,
            min_height: 500,
            penalty: 15,
        }
    }
}

/// Gaussian-weighted adaptive thresholding shared by the text-region blur and
/// text clarity metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinarizationConfig {
    /// Odd neighbourhood size in pixels.
    pub block_size: u32,
    /// Constant subtracted from the local weighted mean.
    pub offset: f32,
}

impl Default for BinarizationConfig {
    fn default() -> Self {
        Self {
            block_size: 11,
            offset: 2.0,
        }
    }
}

impl BinarizationConfig {
    /// Gaussian sigma matching a kernel of `block_size` taps.
    pub fn sigma(&self) -> f32 {
        0.3 * ((self.block_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
    }
}

/// Divisors that map each unbounded raw blur metric into [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricDivisors {
    pub laplacian_variance: f64,
    pub sobel_variance: f64,
    pub gradient_mean: f64,
    pub gradient_std: f64,
    pub high_frequency_energy: f64,
}

impl Default for MetricDivisors {
    fn default() -> Self {
        Self {
            laplacian_variance: 400.0,
            sobel_variance: 800.0,
            gradient_mean: 40.0,
            gradient_std: 25.0,
            high_frequency_energy: 8.0,
        }
    }
}

/// Weights of the normalized blur metrics in the overall blur score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlurWeights {
    pub laplacian_variance: f64,
    pub sobel_variance: f64,
    pub gradient_mean: f64,
    pub gradient_std: f64,
    pub high_frequency_energy: f64,
    pub text_region_blur: f64,
    pub edge_sharpness: f64,
    pub multiscale_ratio: f64,
}

impl Default for BlurWeights {
    fn default() -> Self {
        Self {
            laplacian_variance: 0.12,
            sobel_variance: 0.12,
            gradient_mean: 0.10,
            gradient_std: 0.10,
            high_frequency_energy: 0.08,
            text_region_blur: 0.25,
            edge_sharpness: 0.15,
            multiscale_ratio: 0.08,
        }
    }
}

impl BlurWeights {
    pub fn total(&self) -> f64 {
        self.laplacian_variance
            + self.sobel_variance
            + self.gradient_mean
            + self.gradient_std
            + self.high_frequency_energy
            + self.text_region_blur
            + self.edge_sharpness
            + self.multiscale_ratio
    }
}

/// One blur band: scores strictly below `below` deduct `penalty`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlurBand {
    pub below: f64,
    pub penalty: u32,
    pub severity: BlurSeverity,
}

/// Settings for the blur metric family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlurConfig {
    pub divisors: MetricDivisors,
    pub weights: BlurWeights,
    /// Checked in order; the first band whose bound exceeds the score applies.
    pub bands: Vec<BlurBand>,
    /// Low-frequency disk radius is `min(width, height) / high_frequency_radius_divisor`.
    pub high_frequency_radius_divisor: u32,
    /// Exclusive bounding-box area range (px²) of glyph-sized blobs.
    pub text_region_min_area: u32,
    pub text_region_max_area: u32,
    /// Weight of the Sobel variance inside a text region.
    pub text_region_sobel_weight: f64,
    /// Averaged text-region sharpness is divided by this and clamped to 1.
    pub text_region_scale: f64,
    /// Gaussian radii used for the multiscale comparison.
    pub multiscale_radii: Vec<u32>,
    pub multiscale_divisor: f64,
    pub edge_canny_low: f32,
    pub edge_canny_high: f32,
    pub edge_mean_weight: f64,
    pub edge_max_weight: f64,
    pub edge_scale: f64,
}

impl Default for BlurConfig {
    fn default() -> Self {
        Self {
            divisors: MetricDivisors::default(),
            weights: BlurWeights::default(),
            bands: vec![
                BlurBand { below: 0.15, penalty: 55, severity: BlurSeverity::Severe },
                BlurBand { below: 0.30, penalty: 40, severity: BlurSeverity::High },
                BlurBand { below: 0.50, penalty: 30, severity: BlurSeverity::Moderate },
                BlurBand { below: 0.70, penalty: 20, severity: BlurSeverity::Slight },
            ],
            high_frequency_radius_divisor: 6,
            text_region_min_area: 50,
            text_region_max_area: 5000,
            text_region_sobel_weight: 0.5,
            text_region_scale: 300.0,
            multiscale_radii: vec![1, 2, 3],
            multiscale_divisor: 5.0,
            edge_canny_low: 50.0,
            edge_canny_high: 150.0,
            edge_mean_weight: 0.7,
            edge_max_weight: 0.3,
            edge_scale: 80.0,
        }
    }
}

/// Global and local contrast thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContrastConfig {
    /// Side of the square box filter used for local contrast.
    pub window: u32,
    pub min_global: f64,
    pub min_local: f64,
    pub penalty: u32,
}

impl Default for ContrastConfig {
    fn default() -> Self {
        Self {
            window: 9,
            min_global: 40.0,
            min_local: 20.0,
            penalty: 15,
        }
    }
}

/// Text clarity composite weights and threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClarityConfig {
    pub clean_weight: f64,
    pub edge_weight: f64,
    pub line_weight: f64,
    /// Edge density is multiplied by this before clamping to 1.
    pub edge_density_scale: f64,
    /// Expected text line pitch in pixels; `height / line_spacing` lines are expected.
    pub line_spacing: f64,
    pub canny_low: f32,
    pub canny_high: f32,
    pub minimum: f64,
    pub penalty: u32,
}

impl Default for ClarityConfig {
    fn default() -> Self {
        Self {
            clean_weight: 0.3,
            edge_weight: 0.4,
            line_weight: 0.3,
            edge_density_scale: 8.0,
            line_spacing: 50.0,
            canny_low: 30.0,
            canny_high: 100.0,
            minimum: 0.5,
            penalty: 25,
        }
    }
}

/// Line-based skew estimation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkewConfig {
    pub canny_low: f32,
    pub canny_high: f32,
    pub vote_threshold: u32,
    pub suppression_radius: u32,
    pub min_line_length: u32,
    pub max_line_gap: u32,
    /// Segments must be strictly longer than this to contribute an angle.
    pub min_segment_length: f64,
    /// Angles at or beyond this (degrees) are treated as structural lines.
    pub max_text_angle: f64,
    /// Maximum angle (degrees) between an edge pixel's gradient and the line
    /// normal for the pixel to count as lying on the line.
    pub orientation_tolerance: f64,
    /// Skews with magnitude strictly above this are penalised.
    pub max_skew: f64,
    pub penalty: u32,
}

impl Default for SkewConfig {
    fn default() -> Self {
        Self {
            canny_low: 50.0,
            canny_high: 150.0,
            vote_threshold: 80,
            suppression_radius: 8,
            min_line_length: 50,
            max_line_gap: 10,
            min_segment_length: 30.0,
            max_text_angle: 45.0,
            orientation_tolerance: 25.0,
            max_skew: 10.0,
            penalty: 15,
        }
    }
}

impl QualityConfig {
    /// Load a configuration from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would leave a metric or rule undefined.
    pub fn validate(&self) -> Result<()> {
        let d = &self.blur.divisors;
        for (name, value) in [
            ("laplacian_variance", d.laplacian_variance),
            ("sobel_variance", d.sobel_variance),
            ("gradient_mean", d.gradient_mean),
            ("gradient_std", d.gradient_std),
            ("high_frequency_energy", d.high_frequency_energy),
            ("text_region_scale", self.blur.text_region_scale),
            ("multiscale_divisor", self.blur.multiscale_divisor),
            ("edge_scale", self.blur.edge_scale),
            ("line_spacing", self.clarity.line_spacing),
        ] {
            if !(value > 0.0) {
                return Err(LesbarError::Config(format!(
                    "{name} divisor must be positive, got {value}"
                )));
            }
        }

        for (name, value) in [
            ("text_region_sobel_weight", self.blur.text_region_sobel_weight),
            ("edge_mean_weight", self.blur.edge_mean_weight),
            ("edge_max_weight", self.blur.edge_max_weight),
            ("clarity clean_weight", self.clarity.clean_weight),
            ("clarity edge_weight", self.clarity.edge_weight),
            ("clarity line_weight", self.clarity.line_weight),
        ] {
            if !(value >= 0.0) {
                return Err(LesbarError::Config(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }

        let total = self.blur.weights.total();
        if (total - 1.0).abs() > 1e-6 {
            return Err(LesbarError::Config(format!(
                "blur weights must sum to 1.0, got {total}"
            )));
        }

        if self
            .blur
            .bands
            .windows(2)
            .any(|pair| pair[0].below >= pair[1].below)
        {
            return Err(LesbarError::Config(
                "blur bands must be listed in strictly ascending order".into(),
            ));
        }

        if self.blur.text_region_min_area >= self.blur.text_region_max_area {
            return Err(LesbarError::Config(format!(
                "text region area range ({}, {}) is empty",
                self.blur.text_region_min_area, self.blur.text_region_max_area
            )));
        }

        if self.blur.multiscale_radii.iter().any(|&r| r == 0) {
            return Err(LesbarError::Config(
                "multiscale radii must be at least 1".into(),
            ));
        }

        if self.blur.high_frequency_radius_divisor == 0 {
            return Err(LesbarError::Config(
                "high_frequency_radius_divisor must be at least 1".into(),
            ));
        }

        if self.binarization.block_size < 3 || self.binarization.block_size % 2 == 0 {
            return Err(LesbarError::Config(format!(
                "binarization block_size must be odd and >= 3, got {}",
                self.binarization.block_size
            )));
        }

        if self.contrast.window % 2 == 0 {
            return Err(LesbarError::Config(format!(
                "contrast window must be odd, got {}",
                self.contrast.window
            )));
        }

        if self.skew.max_text_angle <= 0.0 || self.skew.max_text_angle > 90.0 {
            return Err(LesbarError::Config(format!(
                "max_text_angle must lie in (0, 90], got {}",
                self.skew.max_text_angle
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        QualityConfig::default().validate().expect("defaults must validate");
    }

    #[test]
    fn default_weights_sum_to_one() {
        let total = BlurWeights::default().total();
        assert!((total - 1.0).abs() < 1e-9, "weights sum to {total}");
    }

    #[test]
    fn default_binarization_sigma_matches_eleven_tap_kernel() {
        let sigma = BinarizationConfig::default().sigma();
        assert!((sigma - 2.0).abs() < 1e-6, "got {sigma}");
    }

    #[test]
    fn unbalanced_weights_are_rejected() {
        let mut config = QualityConfig::default();
        config.blur.weights.text_region_blur = 0.5;
        assert!(matches!(config.validate(), Err(LesbarError::Config(_))));
    }

    #[test]
    fn descending_bands_are_rejected() {
        let mut config = QualityConfig::default();
        config.blur.bands.reverse();
        assert!(matches!(config.validate(), Err(LesbarError::Config(_))));
    }

    #[test]
    fn zero_divisor_is_rejected() {
        let mut config = QualityConfig::default();
        config.blur.divisors.sobel_variance = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn even_block_size_is_rejected() {
        let mut config = QualityConfig::default();
        config.binarization.block_size = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn negative_metric_weights_are_rejected() {
        let cases: [fn(&mut QualityConfig); 6] = [
            |c| c.blur.text_region_sobel_weight = -1.0,
            |c| c.blur.edge_mean_weight = -0.1,
            |c| c.blur.edge_max_weight = -0.3,
            |c| c.clarity.clean_weight = -0.3,
            |c| c.clarity.edge_weight = -0.4,
            |c| c.clarity.line_weight = f64::NAN,
        ];
        for apply in cases {
            let mut config = QualityConfig::default();
            apply(&mut config);
            assert!(
                matches!(config.validate(), Err(LesbarError::Config(_))),
                "{config:?}"
            );
        }
    }

    #[test]
    fn zero_text_region_sobel_weight_is_allowed() {
        let mut config = QualityConfig::default();
        config.blur.text_region_sobel_weight = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn even_or_zero_contrast_window_is_rejected() {
        for window in [0, 8] {
            let mut config = QualityConfig::default();
            config.contrast.window = window;
            assert!(matches!(config.validate(), Err(LesbarError::Config(_))));
        }
    }

    #[test]
    fn partial_json_override_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "resolution": {{ "min_width": 800 }}, "parallel": false }}"#
        )
        .unwrap();

        let config = QualityConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.resolution.min_width, 800);
        assert_eq!(config.resolution.min_height, 500);
        assert!(!config.parallel);
        assert_eq!(config.blur, BlurConfig::default());
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = QualityConfig::from_json_file("/nonexistent/lesbar.json");
        assert!(matches!(result, Err(LesbarError::Io(_))));
    }
}
