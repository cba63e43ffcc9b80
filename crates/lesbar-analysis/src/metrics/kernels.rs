// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Floating-point image planes and the 3x3 derivative kernels the blur and skew
// metrics are built on.

use image::GrayImage;

/// Discrete Laplacian (4-neighbour) kernel.
pub const LAPLACIAN: [f64; 9] = [0.0, 1.0, 0.0, 1.0, -4.0, 1.0, 0.0, 1.0, 0.0];

/// Horizontal first derivative (responds to vertical edges).
pub const SOBEL_X: [f64; 9] = [-1.0, 0.0, 1.0, -2.0, 0.0, 2.0, -1.0, 0.0, 1.0];

/// Vertical first derivative (responds to horizontal edges).
pub const SOBEL_Y: [f64; 9] = [-1.0, -2.0, -1.0, 0.0, 0.0, 0.0, 1.0, 2.0, 1.0];

/// A single-channel `f64` image stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl Plane {
    /// Widen an 8-bit grayscale image.
    pub fn from_gray(gray: &GrayImage) -> Self {
        Self {
            width: gray.width() as usize,
            height: gray.height() as usize,
            data: gray.as_raw().iter().map(|&v| v as f64).collect(),
        }
    }

    pub fn from_vec(width: usize, height: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(width * height, data.len());
        Self { width, height, data }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[y * self.width + x]
    }

    /// Copy out the `w` x `h` window whose top-left corner is `(x, y)`.
    /// The window is clipped to the plane.
    pub fn crop(&self, x: usize, y: usize, w: usize, h: usize) -> Plane {
        let x2 = (x + w).min(self.width);
        let y2 = (y + h).min(self.height);
        let x1 = x.min(x2);
        let y1 = y.min(y2);
        let mut data = Vec::with_capacity((x2 - x1) * (y2 - y1));
        for row in y1..y2 {
            data.extend_from_slice(&self.data[row * self.width + x1..row * self.width + x2]);
        }
        Plane::from_vec(x2 - x1, y2 - y1, data)
    }

    pub fn mean(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().sum::<f64>() / self.data.len() as f64
    }

    /// Population variance (divides by N). Zero for an empty plane.
    pub fn variance(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        self.data.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / self.data.len() as f64
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn max(&self) -> f64 {
        self.data.iter().copied().fold(0.0, f64::max)
    }

    /// Convolve with a 3x3 kernel, mirroring the image at its borders without
    /// repeating the edge pixel (`dcb|abcd|cba`).
    pub fn convolve3x3(&self, kernel: &[f64; 9]) -> Plane {
        let (w, h) = (self.width, self.height);
        let mut out = vec![0.0; w * h];
        if w == 0 || h == 0 {
            return Plane::from_vec(w, h, out);
        }

        for y in 0..h {
            let rows = [
                reflect(y as isize - 1, h),
                y,
                reflect(y as isize + 1, h),
            ];
            for x in 0..w {
                let cols = [
                    reflect(x as isize - 1, w),
                    x,
                    reflect(x as isize + 1, w),
                ];
                let mut acc = 0.0;
                for (ky, &ry) in rows.iter().enumerate() {
                    let row = &self.data[ry * w..(ry + 1) * w];
                    for (kx, &cx) in cols.iter().enumerate() {
                        acc += kernel[ky * 3 + kx] * row[cx];
                    }
                }
                out[y * w + x] = acc;
            }
        }

        Plane::from_vec(w, h, out)
    }

    /// Discrete Laplacian response.
    pub fn laplacian(&self) -> Plane {
        self.convolve3x3(&LAPLACIAN)
    }
}

/// Mirror an out-of-range index back into `0..n`.
fn reflect(i: isize, n: usize) -> usize {
    let n = n as isize;
    if n == 1 {
        return 0;
    }
    let mut i = i;
    if i < 0 {
        i = -i;
    }
    if i >= n {
        i = 2 * n - 2 - i;
    }
    i.clamp(0, n - 1) as usize
}

/// Horizontal and vertical Sobel responses of a plane.
#[derive(Debug, Clone)]
pub struct Gradients {
    pub gx: Plane,
    pub gy: Plane,
}

impl Gradients {
    pub fn of(plane: &Plane) -> Self {
        Self {
            gx: plane.convolve3x3(&SOBEL_X),
            gy: plane.convolve3x3(&SOBEL_Y),
        }
    }

    pub fn width(&self) -> usize {
        self.gx.width()
    }

    pub fn height(&self) -> usize {
        self.gx.height()
    }

    /// Gradient magnitude `sqrt(gx² + gy²)`.
    pub fn magnitude(&self) -> Plane {
        let data = self
            .gx
            .data()
            .iter()
            .zip(self.gy.data())
            .map(|(gx, gy)| gx.hypot(*gy))
            .collect();
        Plane::from_vec(self.width(), self.height(), data)
    }

    /// Gradient direction at `(x, y)` in degrees, or `None` on a flat pixel.
    pub fn direction_degrees(&self, x: usize, y: usize) -> Option<f64> {
        let gx = self.gx.get(x, y);
        let gy = self.gy.get(x, y);
        if gx == 0.0 && gy == 0.0 {
            return None;
        }
        Some(gy.atan2(gx).to_degrees())
    }
}
