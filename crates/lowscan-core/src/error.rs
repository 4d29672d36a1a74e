// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Lowscan.

use thiserror::Error;

/// Top-level error type for all Lowscan operations.
///
/// "No document found" is not an error: detection returns `Ok(None)` for it.
#[derive(Debug, Error)]
pub enum LowscanError {
    // -- Input --
    #[error("invalid input image: {0}")]
    InvalidInput(String),

    // -- Parameters --
    #[error("invalid configuration: {0}")]
    Configuration(String),

    // -- Output --
    #[error("image processing failed: {0}")]
    Image(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LowscanError>;
