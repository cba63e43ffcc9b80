// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Report types produced by a quality check.

use serde::{Deserialize, Serialize};

use crate::findings::{Finding, GOOD_QUALITY_MESSAGE};

/// Raw, unnormalized blur signals. Every value is >= 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BlurMetricSet {
    pub laplacian_variance: f64,
    pub sobel_variance: f64,
    pub gradient_mean: f64,
    pub gradient_std: f64,
    pub high_frequency_energy: f64,
    /// Already in [0, 1].
    pub text_region_blur: f64,
    /// Already in [0, 1].
    pub edge_sharpness: f64,
    /// Already in [0, 1].
    pub multiscale_ratio: f64,
}

/// The blur signals after division by their configured divisors, each in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMetricSet {
    pub laplacian_variance: f64,
    pub sobel_variance: f64,
    pub gradient_mean: f64,
    pub gradient_std: f64,
    pub high_frequency_energy: f64,
    pub text_region_blur: f64,
    pub edge_sharpness: f64,
    pub multiscale_ratio: f64,
}

impl NormalizedMetricSet {
    /// All values in declaration order, for range checks.
    pub fn values(&self) -> [f64; 8] {
        [
            self.laplacian_variance,
            self.sobel_variance,
            self.gradient_mean,
            self.gradient_std,
            self.high_frequency_energy,
            self.text_region_blur,
            self.edge_sharpness,
            self.multiscale_ratio,
        ]
    }
}

/// Detailed signals behind the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlurDetails {
    /// Weighted blur score in [0, 1]; higher is sharper.
    pub overall_blur_score: f64,
    pub individual_scores: BlurMetricSet,
    pub normalized_scores: NormalizedMetricSet,
    pub text_clarity: f64,
    /// Estimated rotation in degrees, within (-90, 90].
    pub skew_angle: f64,
    pub global_contrast: f64,
    pub local_contrast: f64,
    pub width: u32,
    pub height: u32,
}

/// Outcome of comparing a report against a caller's minimum score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Accept,
    Reject,
}

/// The result of a quality check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Overall quality, 0 (unusable) to 100 (no issues found).
    pub score: u8,
    /// Suggestions in evaluation order; a single positive message when clean.
    pub suggestions: Vec<String>,
    /// Absent only when the image could not be decoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blur_details: Option<BlurDetails>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub findings: Vec<Finding>,
}

impl QualityReport {
    /// The terminal report for input that could not be decoded.
    pub fn invalid_image() -> Self {
        let finding = Finding::InvalidImage;
        Self {
            score: 0,
            suggestions: vec![finding.suggestion()],
            blur_details: None,
            findings: vec![finding],
        }
    }

    /// Build a report from a running score and the findings that reduced it.
    ///
    /// The score is clamped into [0, 100]. With no findings the suggestion list
    /// holds exactly the positive message.
    pub fn from_findings(score: i32, findings: Vec<Finding>, details: BlurDetails) -> Self {
        let mut suggestions: Vec<String> = findings.iter().map(Finding::suggestion).collect();
        if suggestions.is_empty() {
            suggestions.push(GOOD_QUALITY_MESSAGE.into());
        }
        Self {
            score: score.clamp(0, 100) as u8,
            suggestions,
            blur_details: Some(details),
            findings,
        }
    }

    /// True when no check deducted points.
    pub fn is_good(&self) -> bool {
        self.findings.is_empty()
    }

    /// True when the input could not be decoded.
    pub fn is_invalid(&self) -> bool {
        self.findings.first() == Some(&Finding::InvalidImage)
    }

    /// Gate decision for a caller that requires at least `min_score`.
    pub fn verdict(&self, min_score: u8) -> Verdict {
        if self.is_invalid() || self.score < min_score {
            Verdict::Reject
        } else {
            Verdict::Accept
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::findings::{BlurSeverity, INVALID_IMAGE_MESSAGE};

    fn details() -> BlurDetails {
        BlurDetails {
            overall_blur_score: 0.9,
            individual_scores: BlurMetricSet::default(),
            normalized_scores: NormalizedMetricSet::default(),
            text_clarity: 0.8,
            skew_angle: 0.0,
            global_contrast: 80.0,
            local_contrast: 30.0,
            width: 1000,
            height: 1000,
        }
    }

    #[test]
    fn invalid_report_has_zero_score_and_message() {
        let report = QualityReport::invalid_image();
        assert_eq!(report.score, 0);
        assert_eq!(report.suggestions, vec![INVALID_IMAGE_MESSAGE.to_string()]);
        assert!(report.blur_details.is_none());
        assert!(report.is_invalid());
        assert_eq!(report.verdict(0), Verdict::Reject);
    }

    #[test]
    fn clean_report_gets_single_positive_message() {
        let report = QualityReport::from_findings(100, Vec::new(), details());
        assert_eq!(report.suggestions, vec![GOOD_QUALITY_MESSAGE.to_string()]);
        assert!(report.is_good());
        assert_eq!(report.verdict(30), Verdict::Accept);
    }

    #[test]
    fn score_is_clamped() {
        let findings = vec![Finding::Blurred {
            severity: BlurSeverity::Severe,
            score: 0.05,
        }];
        let low = QualityReport::from_findings(-45, findings.clone(), details());
        assert_eq!(low.score, 0);
        assert!(!low.suggestions.contains(&GOOD_QUALITY_MESSAGE.to_string()));

        let high = QualityReport::from_findings(130, Vec::new(), details());
        assert_eq!(high.score, 100);
    }

    #[test]
    fn verdict_uses_threshold() {
        let findings = vec![Finding::LowContrast {
            global: 10.0,
            local: 5.0,
        }];
        let report = QualityReport::from_findings(85, findings, details());
        assert_eq!(report.verdict(85), Verdict::Accept);
        assert_eq!(report.verdict(86), Verdict::Reject);
    }

    #[test]
    fn invalid_report_json_omits_details() {
        let json = serde_json::to_value(QualityReport::invalid_image()).unwrap();
        assert_eq!(json["score"], 0);
        assert!(json.get("blur_details").is_none());
    }

    #[test]
    fn report_json_uses_metric_names() {
        let report = QualityReport::from_findings(100, Vec::new(), details());
        let json = serde_json::to_value(&report).unwrap();
        let individual = &json["blur_details"]["individual_scores"];
        for key in [
            "laplacian_variance",
            "sobel_variance",
            "gradient_mean",
            "gradient_std",
            "high_frequency_energy",
            "text_region_blur",
            "edge_sharpness",
            "multiscale_ratio",
        ] {
            assert!(individual.get(key).is_some(), "missing {key}");
        }
        let back: QualityReport = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }
}
