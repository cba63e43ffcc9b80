// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// QualityAnalyzer — the entry point. Decodes the input, runs every extractor
// (optionally on the rayon pool) and hands the signals to the aggregator.
//
// Every `check_*` operation is total: decode failures become the terminal
// zero-score report and are only visible in the log.

use std::path::Path;

use image::{DynamicImage, GrayImage};
use imageproc::edges::canny;
use lesbar_core::config::QualityConfig;
use lesbar_core::error::{LesbarError, Result};
use lesbar_core::types::{BlurMetricSet, QualityReport};
use tracing::{info, instrument, warn};

use crate::decode::{decode_bytes, decode_path, ensure_not_empty, to_grayscale};
use crate::metrics::{
    Gradients, Plane, binarize, edge_sharpness, global_contrast, gradient_stats,
    high_frequency_energy, laplacian_variance, local_contrast, multiscale_ratio, sobel_variance,
    text_clarity, text_region_blur,
};
use crate::scoring::{Signals, assess};
use crate::skew::estimate_skew;

/// Stateless quality checker. Holds nothing but its configuration, so one
/// instance can be shared freely across threads.
#[derive(Debug, Clone, Default)]
pub struct QualityAnalyzer {
    config: QualityConfig,
}

impl QualityAnalyzer {
    /// Create an analyzer after validating `config`.
    pub fn new(config: QualityConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    /// Check an image file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn check_path(&self, path: impl AsRef<Path>) -> QualityReport {
        match decode_path(path) {
            Ok(gray) => self.check_gray(&gray),
            Err(err) => rejected(err),
        }
    }

    /// Check encoded image bytes (JPEG, PNG, TIFF, etc.).
    #[instrument(skip_all, fields(data_len = data.len()))]
    pub fn check_bytes(&self, data: &[u8]) -> QualityReport {
        match decode_bytes(data) {
            Ok(gray) => self.check_gray(&gray),
            Err(err) => rejected(err),
        }
    }

    /// Check an already decoded image of any colour type.
    pub fn check_image(&self, image: &DynamicImage) -> QualityReport {
        match to_grayscale(image) {
            Ok(gray) => self.check_gray(&gray),
            Err(err) => rejected(err),
        }
    }

    /// Check an 8-bit grayscale page.
    #[instrument(skip_all, fields(width = gray.width(), height = gray.height()))]
    pub fn check_gray(&self, gray: &GrayImage) -> QualityReport {
        if let Err(err) = ensure_not_empty(gray.width(), gray.height()) {
            return rejected(err);
        }

        let signals = self.measure(gray);
        let report = assess(&signals, &self.config);
        info!(
            score = report.score,
            suggestions = report.suggestions.len(),
            "Quality check complete"
        );
        report
    }

    /// Run every extractor on a non-empty page.
    ///
    /// The shared intermediates (gradients, their magnitude, the binarized
    /// page and the Canny edge map) are built once. The extractors then only
    /// read them; with `parallel` set they are forked onto the rayon pool and
    /// joined before aggregation.
    pub fn measure(&self, gray: &GrayImage) -> Signals {
        let config = &self.config;
        let parallel = config.parallel;

        let plane = Plane::from_gray(gray);
        let ((gradients, binary), (edges, skew_edges)) = join(
            parallel,
            || {
                join(
                    parallel,
                    || Gradients::of(&plane),
                    || binarize(gray, &config.binarization),
                )
            },
            || {
                let blur = (config.blur.edge_canny_low, config.blur.edge_canny_high);
                let skew = (config.skew.canny_low, config.skew.canny_high);
                let edges = canny(gray, blur.0, blur.1);
                // Only a second map when the two thresholds were tuned apart.
                let skew_edges = (skew != blur).then(|| canny(gray, skew.0, skew.1));
                (edges, skew_edges)
            },
        );
        let skew_edges = skew_edges.as_ref().unwrap_or(&edges);
        let magnitude = gradients.magnitude();
        let laplacian = laplacian_variance(&plane);

        let (((high_frequency, multiscale), (text_blur, edges)), ((clarity, skew), (local, spatial))) =
            join(
                parallel,
                || {
                    join(
                        parallel,
                        || {
                            join(
                                parallel,
                                || high_frequency_energy(&plane, config.blur.high_frequency_radius_divisor),
                                || multiscale_ratio(gray, laplacian, &config.blur),
                            )
                        },
                        || {
                            join(
                                parallel,
                                || text_region_blur(gray, &binary, &config.blur),
                                || edge_sharpness(&edges, &magnitude, &config.blur),
                            )
                        },
                    )
                },
                || {
                    join(
                        parallel,
                        || {
                            join(
                                parallel,
                                || text_clarity(gray, &binary, &config.clarity),
                                || estimate_skew(skew_edges, &gradients, &config.skew),
                            )
                        },
                        || {
                            join(
                                parallel,
                                || local_contrast(gray, config.contrast.window),
                                || (sobel_variance(&gradients), gradient_stats(&magnitude)),
                            )
                        },
                    )
                },
            );
        let (sobel, (gradient_mean, gradient_std)) = spatial;

        Signals {
            width: gray.width(),
            height: gray.height(),
            blur: BlurMetricSet {
                laplacian_variance: laplacian,
                sobel_variance: sobel,
                gradient_mean,
                gradient_std,
                high_frequency_energy: high_frequency,
                text_region_blur: text_blur,
                edge_sharpness: edges,
                multiscale_ratio: multiscale,
            },
            global_contrast: global_contrast(&plane),
            local_contrast: local,
            text_clarity: clarity,
            skew_angle: skew,
        }
    }
}

/// Check an image file with the default configuration.
pub fn check(path: impl AsRef<Path>) -> QualityReport {
    QualityAnalyzer::default().check_path(path)
}

fn rejected(err: LesbarError) -> QualityReport {
    warn!(error = %err, "Image rejected before analysis");
    QualityReport::invalid_image()
}

fn join<A, B, RA, RB>(parallel: bool, a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    if parallel {
        rayon::join(a, b)
    } else {
        (a(), b())
    }
}
