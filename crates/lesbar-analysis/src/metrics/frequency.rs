// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Frequency-domain sharpness: mean log-magnitude of the 2-D spectrum outside
// a central low-frequency disk.

use rustfft::FftPlanner;
use rustfft::num_complex::Complex;
use tracing::{debug, instrument};

use super::kernels::Plane;

/// Mean of `ln(|F(u, v)| + 1)` over every frequency whose distance from the
/// (shifted) spectrum centre exceeds `min(width, height) / radius_divisor`.
///
/// Returns 0.0 for an empty plane or when the disk covers every frequency.
#[instrument(skip(plane), fields(width = plane.width(), height = plane.height()))]
pub fn high_frequency_energy(plane: &Plane, radius_divisor: u32) -> f64 {
    let (w, h) = (plane.width(), plane.height());
    if w == 0 || h == 0 || radius_divisor == 0 {
        return 0.0;
    }

    let spectrum = fft2(plane);

    // `spectrum` is column-major after the second pass: index = x * h + y.
    let radius = (w.min(h) / radius_divisor as usize) as i64;
    let radius_sq = radius * radius;
    let (cx, cy) = ((w / 2) as i64, (h / 2) as i64);

    let mut sum = 0.0;
    let mut count = 0usize;
    for x in 0..w {
        // Position of this frequency after an fftshift.
        let dx = ((x + w / 2) % w) as i64 - cx;
        for y in 0..h {
            let dy = ((y + h / 2) % h) as i64 - cy;
            if dx * dx + dy * dy <= radius_sq {
                continue;
            }
            sum += (spectrum[x * h + y].norm() + 1.0).ln();
            count += 1;
        }
    }

    if count == 0 {
        return 0.0;
    }
    let energy = sum / count as f64;
    debug!(energy, radius, count, "High-frequency energy computed");
    energy
}

/// Forward 2-D DFT. Rows are transformed in place, then the buffer is
/// transposed and the former columns are transformed as rows, so the result
/// is laid out column-major.
fn fft2(plane: &Plane) -> Vec<Complex<f64>> {
    let (w, h) = (plane.width(), plane.height());
    let mut planner = FftPlanner::<f64>::new();

    let mut rows: Vec<Complex<f64>> = plane
        .data()
        .iter()
        .map(|&v| Complex::new(v, 0.0))
        .collect();
    let row_fft = planner.plan_fft_forward(w);
    let mut scratch = vec![Complex::new(0.0, 0.0); row_fft.get_inplace_scratch_len()];
    row_fft.process_with_scratch(&mut rows, &mut scratch);

    let mut cols = vec![Complex::new(0.0, 0.0); w * h];
    for y in 0..h {
        for x in 0..w {
            cols[x * h + y] = rows[y * w + x];
        }
    }
    drop(rows);

    let col_fft = planner.plan_fft_forward(h);
    let needed = col_fft.get_inplace_scratch_len();
    if scratch.len() < needed {
        scratch.resize(needed, Complex::new(0.0, 0.0));
    }
    col_fft.process_with_scratch(&mut cols, &mut scratch[..needed]);

    cols
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn constant_image_has_no_high_frequencies() {
        let plane = Plane::from_gray(&GrayImage::from_pixel(64, 48, Luma([200u8])));
        let energy = high_frequency_energy(&plane, 6);
        assert!(energy.abs() < 1e-6, "got {energy}");
    }

    #[test]
    fn checkerboard_has_strong_high_frequencies() {
        let img = GrayImage::from_fn(64, 64, |x, y| {
            Luma([if (x + y) % 2 == 0 { 0 } else { 255 }])
        });
        let energy = high_frequency_energy(&Plane::from_gray(&img), 6);
        assert!(energy > 0.0);
    }

    #[test]
    fn fine_detail_beats_coarse_detail() {
        // Speckle: independent pixel values from an LCG.
        let mut state: u32 = 12345;
        let fine = GrayImage::from_fn(96, 96, |_, _| {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            Luma([if (state >> 16) & 1 == 0 { 30 } else { 220 }])
        });
        let coarse = GrayImage::from_fn(96, 96, |x, _| {
            Luma([(x as f64 / 95.0 * 255.0) as u8])
        });
        let fine_energy = high_frequency_energy(&Plane::from_gray(&fine), 6);
        let coarse_energy = high_frequency_energy(&Plane::from_gray(&coarse), 6);
        assert!(
            fine_energy > coarse_energy,
            "fine {fine_energy} vs coarse {coarse_energy}"
        );
    }

    #[test]
    fn single_pixel_image_is_defined() {
        let plane = Plane::from_gray(&GrayImage::from_pixel(1, 1, Luma([9u8])));
        assert!(high_frequency_energy(&plane, 6).is_finite());
    }

    #[test]
    fn fft2_of_impulse_is_flat() {
        let mut img = GrayImage::from_pixel(8, 4, Luma([0u8]));
        img.put_pixel(0, 0, Luma([1u8]));
        let spectrum = fft2(&Plane::from_gray(&img));
        assert!(spectrum.iter().all(|c| (c.norm() - 1.0).abs() < 1e-9));
    }
}
