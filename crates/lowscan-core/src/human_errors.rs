// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to plain English with a clear suggestion.

use crate::error::LowscanError;

/// Whether the user can fix the problem by changing something.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Picking a different photo or parameter will help.
    ActionRequired,
    /// Something outside the user's control went wrong (disk, encoder).
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    pub severity: Severity,
}

impl std::fmt::Display for HumanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.message, self.suggestion)
    }
}

/// Convert a `LowscanError` into a `HumanError`.
pub fn humanize_error(err: &LowscanError) -> HumanError {
    match err {
        LowscanError::InvalidInput(_) => HumanError {
            message: "We couldn't read this photo.".into(),
            suggestion: "Make sure the file is a JPEG or PNG image and isn't empty or damaged.".into(),
            severity: Severity::ActionRequired,
        },

        LowscanError::Configuration(detail) => HumanError {
            message: "One of the scan settings is out of range.".into(),
            suggestion: format!("Check the setting and try again. ({detail})"),
            severity: Severity::ActionRequired,
        },

        LowscanError::Image(_) => HumanError {
            message: "We couldn't write the processed image.".into(),
            suggestion: "Try saving with a .png or .jpg file name.".into(),
            severity: Severity::Permanent,
        },

        LowscanError::Io(io_err) => humanize_io_error(io_err),

        LowscanError::Serialization(_) => HumanError {
            message: "The settings file couldn't be understood.".into(),
            suggestion: "The settings file must be JSON. Remove it to fall back to the default settings.".into(),
            severity: Severity::ActionRequired,
        },
    }
}

fn humanize_io_error(err: &std::io::Error) -> HumanError {
    match err.kind() {
        std::io::ErrorKind::NotFound => HumanError {
            message: "The file couldn't be found.".into(),
            suggestion: "Check the file name and folder, then try again.".into(),
            severity: Severity::ActionRequired,
        },
        std::io::ErrorKind::PermissionDenied => HumanError {
            message: "We aren't allowed to open that file.".into(),
            suggestion: "Check the file's permissions or pick a different folder.".into(),
            severity: Severity::ActionRequired,
        },
        _ => HumanError {
            message: "Something went wrong reading or writing a file.".into(),
            suggestion: format!("Try again. ({err})"),
            severity: Severity::Permanent,
        },
    }
}
