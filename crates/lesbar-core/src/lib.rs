// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Lesbar — Core types, configuration and error definitions shared across all crates.

pub mod config;
pub mod error;
pub mod findings;
pub mod types;

pub use config::QualityConfig;
pub use error::LesbarError;
pub use findings::{BlurSeverity, Finding};
pub use types::*;
