// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline — preprocessing, edge and contour extraction, document
// quadrilateral selection, and corner ordering.

pub mod contours;
pub mod detect;
pub mod geometry;
pub mod preprocess;
pub mod select;

pub use contours::{Contour, detect_edges, extract_contours, rank_by_area};
pub use detect::{DetectionReport, DocumentDetector, detect_document};
pub use geometry::{Quadrilateral, approximate_polygon, arc_length, order_corners, signed_area};
pub use preprocess::preprocess;
pub use select::{Selection, SelectionParams, select_document_quadrilateral};
