// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spatial-domain focus measures: Laplacian and Sobel variance, gradient
// statistics, multiscale Laplacian ratio and edge sharpness.

use image::GrayImage;
use imageproc::filter::gaussian_blur_f32;
use lesbar_core::config::BlurConfig;
use tracing::{debug, instrument};

use super::kernels::{Gradients, Plane};

/// Variance of the Laplacian response. Low values mean a smooth image.
pub fn laplacian_variance(plane: &Plane) -> f64 {
    plane.laplacian().variance()
}

/// Sum of the variances of the horizontal and vertical Sobel responses.
pub fn sobel_variance(gradients: &Gradients) -> f64 {
    gradients.gx.variance() + gradients.gy.variance()
}

/// Mean and standard deviation of the gradient magnitude.
pub fn gradient_stats(magnitude: &Plane) -> (f64, f64) {
    (magnitude.mean(), magnitude.std_dev())
}

/// How much sharper the image is than Gaussian-blurred copies of itself.
///
/// For each radius the ratio `var(Lap(original)) / var(Lap(blurred))` is
/// taken; the mean ratio is divided by `multiscale_divisor` and clamped to 1.
/// An image that blurring barely changes was already blurred. Radii whose
/// blurred copy has zero Laplacian variance are skipped; with none left the
/// result is 0.
#[instrument(skip_all, fields(radii = ?config.multiscale_radii))]
pub fn multiscale_ratio(gray: &GrayImage, original_laplacian: f64, config: &BlurConfig) -> f64 {
    let ratios: Vec<f64> = config
        .multiscale_radii
        .iter()
        .filter(|&&radius| radius > 0)
        .filter_map(|&radius| {
            let blurred = gaussian_blur_f32(gray, radius as f32);
            let blurred_var = laplacian_variance(&Plane::from_gray(&blurred));
            (blurred_var > 0.0).then(|| original_laplacian / blurred_var)
        })
        .collect();

    if ratios.is_empty() {
        return 0.0;
    }
    let mean = ratios.iter().sum::<f64>() / ratios.len() as f64;
    debug!(mean_ratio = mean, "Multiscale ratios computed");
    (mean / config.multiscale_divisor).min(1.0)
}

/// Gradient magnitude measured only on the pixels set in a Canny edge map.
///
/// Combines the mean and maximum edge gradient with the configured weights,
/// divides by `edge_scale` and clamps to 1. Returns 0 when there are no edges.
#[instrument(skip_all)]
pub fn edge_sharpness(edges: &GrayImage, magnitude: &Plane, config: &BlurConfig) -> f64 {

    let mut count = 0usize;
    let mut sum = 0.0;
    let mut max = 0.0f64;
    for (edge, &value) in edges.as_raw().iter().zip(magnitude.data()) {
        if *edge > 0 {
            count += 1;
            sum += value;
            max = max.max(value);
        }
    }

    if count == 0 {
        debug!("No edges detected; edge sharpness is zero");
        return 0.0;
    }

    let mean = sum / count as f64;
    let combined = mean * config.edge_mean_weight + max * config.edge_max_weight;
    debug!(edge_pixels = count, mean, max, "Edge sharpness measured");
    (combined / config.edge_scale).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use image::Luma;
    use imageproc::edges::canny;

    fn sharpness_of(gray: &GrayImage) -> f64 {
        let config = BlurConfig::default();
        let edges = canny(gray, config.edge_canny_low, config.edge_canny_high);
        let magnitude = Gradients::of(&Plane::from_gray(gray)).magnitude();
        edge_sharpness(&edges, &magnitude, &config)
    }

    #[test]
    fn sharp_page_saturates_spatial_measures() {
        let page = fixtures::text_page(400, 400);
        let plane = Plane::from_gray(&page);
        let grads = Gradients::of(&plane);

        assert!(laplacian_variance(&plane) > 400.0);
        assert!(sobel_variance(&grads) > 800.0);
        let (mean, std) = gradient_stats(&grads.magnitude());
        assert!(mean > 0.0 && std > 0.0);
    }

    #[test]
    fn blurring_lowers_laplacian_variance() {
        let page = fixtures::text_page(300, 300);
        let sharp = laplacian_variance(&Plane::from_gray(&page));
        let soft = laplacian_variance(&Plane::from_gray(&fixtures::blurred(&page, 2.0)));
        assert!(soft < sharp, "soft {soft} vs sharp {sharp}");
    }

    #[test]
    fn multiscale_ratio_is_high_for_sharp_and_low_for_blurred() {
        let config = BlurConfig::default();
        let page = fixtures::text_page(300, 300);
        let sharp = multiscale_ratio(&page, laplacian_variance(&Plane::from_gray(&page)), &config);

        let soft_page = fixtures::blurred(&page, 4.0);
        let soft = multiscale_ratio(
            &soft_page,
            laplacian_variance(&Plane::from_gray(&soft_page)),
            &config,
        );

        assert!((0.0..=1.0).contains(&sharp));
        assert!((0.0..=1.0).contains(&soft));
        assert!(sharp > soft, "sharp {sharp} vs soft {soft}");
    }

    #[test]
    fn multiscale_ratio_of_uniform_image_is_zero() {
        let gray = GrayImage::from_pixel(64, 64, Luma([128u8]));
        assert_eq!(multiscale_ratio(&gray, 0.0, &BlurConfig::default()), 0.0);
    }

    #[test]
    fn edge_sharpness_zero_without_edges() {
        let gray = GrayImage::from_pixel(80, 80, Luma([128u8]));
        assert_eq!(sharpness_of(&gray), 0.0);
    }

    #[test]
    fn edge_sharpness_saturates_on_crisp_step() {
        let gray = GrayImage::from_fn(80, 80, |x, _| Luma([if x < 40 { 10 } else { 245 }]));
        let sharpness = sharpness_of(&gray);
        assert!(sharpness > 0.9, "got {sharpness}");
    }
}
