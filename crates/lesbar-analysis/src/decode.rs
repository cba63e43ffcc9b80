// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Decode gate — turns a file path, encoded bytes or a decoded image into the
// 8-bit grayscale page every metric works on.

use std::path::Path;

use image::{DynamicImage, GrayImage};
use lesbar_core::error::{LesbarError, Result};
use tracing::{debug, info, instrument};

/// Load and convert an image file.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn decode_path(path: impl AsRef<Path>) -> Result<GrayImage> {
    let image = image::open(path.as_ref()).map_err(|err| {
        LesbarError::Decode(format!("failed to open {}: {}", path.as_ref().display(), err))
    })?;
    info!(width = image.width(), height = image.height(), "Image loaded");
    to_grayscale(&image)
}

/// Decode raw encoded bytes (JPEG, PNG, TIFF, etc.) and convert.
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn decode_bytes(data: &[u8]) -> Result<GrayImage> {
    let image = image::load_from_memory(data)
        .map_err(|err| LesbarError::Decode(format!("failed to decode image: {}", err)))?;
    debug!(
        width = image.width(),
        height = image.height(),
        "Image decoded from bytes"
    );
    to_grayscale(&image)
}

/// Convert any decoded image to 8-bit luma, rejecting zero-sized images.
pub fn to_grayscale(image: &DynamicImage) -> Result<GrayImage> {
    ensure_not_empty(image.width(), image.height())?;
    Ok(image.to_luma8())
}

pub(crate) fn ensure_not_empty(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(LesbarError::EmptyImage { width, height });
    }
    Ok(())
}
