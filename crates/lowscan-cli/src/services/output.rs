// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detection output — JSON for stdout and optional image files.

use std::path::Path;

use lowscan_core::{OrderedCorners, Result};
use lowscan_document::{DetectionReport, ImageProcessor};
use serde::Serialize;
use tracing::info;

/// What `lowscan` prints on stdout.
#[derive(Debug, Serialize)]
pub struct DetectionOutput<'a> {
    pub found: bool,
    pub corners: Option<&'a OrderedCorners>,
}

/// Render the corners of a report as pretty-printed JSON.
pub fn render_json(report: &DetectionReport) -> Result<String> {
    let output = DetectionOutput {
        found: report.corners.is_some(),
        corners: report.corners.as_ref(),
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Render the full report, counts included, for `--verbose`.
pub fn render_report(report: &DetectionReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Save an image produced by the pipeline, format chosen by extension.
pub fn write_image(processor: &ImageProcessor, path: &Path, what: &str) -> Result<()> {
    processor.save(path)?;
    info!(path = %path.display(), what, "Image written");
    Ok(())
}
