// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document candidate selection — approximate the largest contours to polygons
// and choose the quadrilateral most likely to be the page.

use lowscan_core::ScanConfig;
use tracing::{debug, instrument, trace};

use super::contours::{Contour, rank_by_area};
use super::geometry::{Quadrilateral, approximate_polygon};

/// Tuning for the nested-rectangle heuristic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionParams {
    /// Approximation tolerance as a fraction of each contour's perimeter.
    pub approx_tolerance_factor: f64,
    /// Lower bound on `area / previous_area` for a nested quadrilateral.
    pub nesting_lower_bound: f64,
    /// Upper bound on `area / previous_area` for a nested quadrilateral.
    pub nesting_upper_bound: f64,
    /// The first quadrilateral must cover less than this fraction of the frame.
    pub border_exclusion_factor: f64,
    /// Approximate only this many of the largest contours.
    pub max_candidates: Option<usize>,
}

impl Default for SelectionParams {
    fn default() -> Self {
        Self::from(&ScanConfig::default())
    }
}

impl From<&ScanConfig> for SelectionParams {
    fn from(config: &ScanConfig) -> Self {
        Self {
            approx_tolerance_factor: config.approx_tolerance_factor,
            nesting_lower_bound: config.nesting_lower_bound,
            nesting_upper_bound: config.nesting_upper_bound,
            border_exclusion_factor: config.border_exclusion_factor,
            max_candidates: config.max_candidates,
        }
    }
}

/// Outcome of a selection scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    /// The chosen quadrilateral, if any candidate was ever accepted.
    pub best: Option<Quadrilateral>,
    /// How many contours approximated to exactly four vertices.
    pub quad_candidates: usize,
}

/// Choose the quadrilateral most likely to be the document outline.
///
/// Contours are scanned largest first. The first four-vertex approximation
/// is taken unless it is essentially the whole frame. Each later one
/// replaces the current choice when its area lies strictly between
/// `nesting_lower_bound` and `nesting_upper_bound` times the area of the
/// quadrilateral seen just before it, which prefers an inner page edge over
/// an outer border while ignoring near-duplicates of the same edge.
pub fn select_document_quadrilateral(
    contours: &[Contour],
    image_width: u32,
    image_height: u32,
    params: &SelectionParams,
) -> Option<Quadrilateral> {
    scan_candidates(contours, image_width, image_height, params).best
}

/// Same scan as [`select_document_quadrilateral`], also reporting how many
/// quadrilaterals were considered.
#[instrument(skip(contours, params), fields(contours = contours.len()))]
pub fn scan_candidates(
    contours: &[Contour],
    image_width: u32,
    image_height: u32,
    params: &SelectionParams,
) -> Selection {
    let image_area = image_width as f64 * image_height as f64;

    let mut ranked = rank_by_area(contours.to_vec());
    if let Some(limit) = params.max_candidates {
        ranked.truncate(limit);
    }

    let mut best: Option<Quadrilateral> = None;
    let mut previous_area = 0.0;
    let mut first = true;
    let mut quad_candidates = 0;

    for contour in &ranked {
        let epsilon = params.approx_tolerance_factor * contour.perimeter();
        let approx = approximate_polygon(contour.points(), epsilon, true);
        let Some(quad) = Quadrilateral::from_vertices(&approx) else {
            trace!(vertices = approx.len(), "Skipping non-quadrilateral contour");
            continue;
        };
        quad_candidates += 1;

        let area = quad.area();
        let accepted = if first {
            area > 0.0 && area < params.border_exclusion_factor * image_area
        } else {
            params.nesting_lower_bound * previous_area < area
                && area < params.nesting_upper_bound * previous_area
        };
        debug!(area, previous_area, first, accepted, "Quadrilateral candidate");

        if accepted {
            best = Some(quad);
        }
        previous_area = area;
        first = false;
    }

    Selection {
        best,
        quad_candidates,
    }
}
