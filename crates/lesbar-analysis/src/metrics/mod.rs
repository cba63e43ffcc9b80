// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Metric extractors. Each one is a pure function of the grayscale page (or of
// planes derived from it) and may run in any order or in parallel.

pub mod blur;
pub mod contrast;
pub mod frequency;
pub mod kernels;
pub mod text;

pub use blur::{edge_sharpness, gradient_stats, laplacian_variance, multiscale_ratio, sobel_variance};
pub use contrast::{global_contrast, local_contrast};
pub use frequency::high_frequency_energy;
pub use kernels::{Gradients, Plane};
pub use text::{binarize, text_clarity, text_region_blur};
