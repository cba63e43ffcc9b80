// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Synthetic page images for tests.

use image::{GrayImage, Luma};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use imageproc::rect::Rect;

pub const GLYPH_HEIGHT: u32 = 16;
const STROKE: u32 = 2;
const GLYPH_GAP: u32 = 5;
const WORD_GAP: u32 = 18;
const LINE_PITCH: u32 = 40;

/// Deterministic linear congruential generator for glyph widths and word lengths.
struct Lcg(u32);

impl Lcg {
    fn next(&mut self) -> u32 {
        self.0 = self.0.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        (self.0 >> 16) & 0x7fff
    }
}

/// Black glyph-like boxes (outline plus a middle bar) set in words and lines
/// on white paper.
pub fn text_page(width: u32, height: u32) -> GrayImage {
    let mut page = GrayImage::from_pixel(width, height, Luma([255u8]));
    let margin = (width.min(height) / 10).clamp(8, 60);
    let mut rng = Lcg(0x5eed);

    let mut y = margin;
    while y + GLYPH_HEIGHT + margin <= height {
        let mut x = margin;
        let mut word_left = 4 + rng.next() % 5;
        loop {
            let glyph_width = 9 + rng.next() % 5;
            if x + glyph_width + margin > width {
                break;
            }
            draw_glyph(&mut page, x, y, glyph_width);
            x += glyph_width + GLYPH_GAP;
            word_left -= 1;
            if word_left == 0 {
                x += WORD_GAP - GLYPH_GAP;
                word_left = 4 + rng.next() % 5;
            }
        }
        y += LINE_PITCH;
    }
    page
}

fn draw_glyph(page: &mut GrayImage, x: u32, y: u32, width: u32) {
    let ink = Luma([0u8]);
    let (x, y) = (x as i32, y as i32);
    let right = x + (width - STROKE) as i32;
    let middle = y + ((GLYPH_HEIGHT - STROKE) / 2) as i32;
    let bottom = y + (GLYPH_HEIGHT - STROKE) as i32;

    draw_filled_rect_mut(page, Rect::at(x, y).of_size(STROKE, GLYPH_HEIGHT), ink);
    draw_filled_rect_mut(page, Rect::at(right, y).of_size(STROKE, GLYPH_HEIGHT), ink);
    for bar in [y, middle, bottom] {
        draw_filled_rect_mut(page, Rect::at(x, bar).of_size(width, STROKE), ink);
    }
}

/// The text page with ink and paper squeezed into a narrow gray band.
pub fn low_contrast_page(width: u32, height: u32) -> GrayImage {
    let mut page = text_page(width, height);
    for pixel in page.pixels_mut() {
        pixel.0[0] = 120 + (pixel.0[0] as u32 * 20 / 255) as u8;
    }
    page
}

pub fn blurred(image: &GrayImage, sigma: f32) -> GrayImage {
    gaussian_blur_f32(image, sigma)
}

/// Rotate clockwise (as displayed) about the centre, filling with white.
pub fn rotated(image: &GrayImage, degrees: f32) -> GrayImage {
    rotate_about_center(
        image,
        degrees.to_radians(),
        Interpolation::Bilinear,
        Luma([255u8]),
    )
}

pub fn uniform(width: u32, height: u32, value: u8) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([value]))
}
