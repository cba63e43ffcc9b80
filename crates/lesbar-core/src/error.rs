// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Lesbar.

use thiserror::Error;

/// Top-level error type for all Lesbar operations.
///
/// None of these ever reach a caller of the `check_*` entry points: a decode
/// failure becomes the terminal zero-score report instead.
#[derive(Debug, Error)]
pub enum LesbarError {
    // -- Input errors --
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("decoded image is empty ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    // -- Configuration --
    #[error("invalid quality configuration: {0}")]
    Config(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LesbarError>;
