// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// lowscan-document — Document detection for the Lowscan scanner.
//
// Provides image plumbing (decode, proportional resize, channel extraction,
// brightness) and the detection pipeline that finds a sheet of paper in a
// photograph and returns its four corners, ordered for rectification.

pub mod image;
pub mod scan;

// Re-export the primary entry points so callers can use `lowscan_document::DocumentDetector` etc.
pub use crate::image::processor::ImageProcessor;
pub use scan::detect::{DetectionReport, DocumentDetector, detect_document};
pub use scan::geometry::{Quadrilateral, order_corners};
pub use scan::select::select_document_quadrilateral;
