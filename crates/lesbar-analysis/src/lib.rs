// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// lesbar-analysis — Document image quality assessment.
//
// Decodes a scan or photo, measures focus (Laplacian, Sobel, gradient, FFT
// high-frequency energy, text-region sharpness, multiscale ratio, edge
// sharpness), contrast, text clarity and skew, and folds them into a 0-100
// score with suggestions.

pub mod analyzer;
pub mod decode;
pub mod metrics;
pub mod scoring;
pub mod skew;

#[cfg(test)]
mod fixtures;

pub use analyzer::{QualityAnalyzer, check};
pub use scoring::Signals;
