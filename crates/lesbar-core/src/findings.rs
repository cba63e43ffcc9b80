// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quality findings and the plain-English suggestions shown to the person who
// captured the document.
//
// Every deduction the scorer makes is recorded as a `Finding`; the suggestion
// list in the report is rendered from these, in evaluation order.

use serde::{Deserialize, Serialize};

/// Message used when the image could not be decoded at all.
pub const INVALID_IMAGE_MESSAGE: &str = "Invalid image file. Please upload a valid image.";

/// Message used when no check deducted any points.
pub const GOOD_QUALITY_MESSAGE: &str = "Good quality image.";

/// How badly blurred the image is, ordered from worst to mildest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlurSeverity {
    Severe,
    High,
    Moderate,
    Slight,
}

/// A single deduction-triggering observation about the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    /// The image bytes could not be decoded. Terminal.
    InvalidImage,
    /// Width or height is below the configured minimum.
    LowResolution { width: u32, height: u32 },
    /// The combined blur score fell into one of the blur bands.
    Blurred { severity: BlurSeverity, score: f64 },
    /// Global or local contrast is below its minimum.
    LowContrast { global: f64, local: f64 },
    /// The text clarity composite is below its minimum.
    PoorTextClarity { clarity: f64 },
    /// Estimated document rotation exceeds the tolerated angle.
    Skewed { angle: f64 },
}

impl Finding {
    /// Plain-English suggestion for this finding.
    pub fn suggestion(&self) -> String {
        match self {
            Finding::InvalidImage => INVALID_IMAGE_MESSAGE.into(),
            Finding::LowResolution { .. } => {
                "Low resolution image. Please upload a higher resolution image.".into()
            }
            Finding::Blurred { severity, .. } => match severity {
                BlurSeverity::Severe => {
                    "Image is severely blurred. Please recapture clearly.".into()
                }
                BlurSeverity::High => {
                    "Image is very blurry. Improve focus when capturing.".into()
                }
                BlurSeverity::Moderate => "Image is moderately blurry.".into(),
                BlurSeverity::Slight => "Image is slightly blurry.".into(),
            },
            Finding::LowContrast { .. } => "Low contrast. Improve lighting conditions.".into(),
            Finding::PoorTextClarity { .. } => {
                "Text clarity is poor. Ensure focus and good lighting.".into()
            }
            Finding::Skewed { angle } => format!(
                "Document skewed by {:.1}° — please align properly.",
                angle.abs()
            ),
        }
    }
}
