// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Edge detection and contour extraction — Canny edge map, border following,
// simple chain approximation, and area ranking.

use image::GrayImage;
use imageproc::edges::canny;
use lowscan_core::Point2D;
use tracing::{debug, instrument};

use super::geometry::{arc_length, signed_area};

/// A closed polyline traced around a border in an edge map.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    points: Vec<Point2D>,
}

impl Contour {
    pub fn new(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Unsigned shoelace area. Open or degenerate traces come out as zero.
    pub fn area(&self) -> f64 {
        signed_area(&self.points).abs()
    }

    /// Perimeter of the contour as a closed curve.
    pub fn perimeter(&self) -> f64 {
        arc_length(&self.points, true)
    }
}

/// Binary edge map (255 on edges, 0 elsewhere) from the two-threshold Canny
/// detector.
#[instrument(skip(gray), fields(width = gray.width(), height = gray.height()))]
pub fn detect_edges(gray: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    let edges = canny(gray, low_threshold, high_threshold);
    debug!(
        edge_pixels = edges.pixels().filter(|p| p.0[0] > 0).count(),
        "Canny edge detection complete"
    );
    edges
}

/// Trace every border in a binary edge map.
///
/// Outer borders and hole borders are both returned and no hierarchy is
/// kept. Straight horizontal, vertical, and diagonal runs are reduced to
/// their endpoints. Contours come back in discovery order.
#[instrument(skip(edges), fields(width = edges.width(), height = edges.height()))]
pub fn extract_contours(edges: &GrayImage) -> Vec<Contour> {
    let traced: Vec<imageproc::contours::Contour<i32>> =
        imageproc::contours::find_contours(edges);

    let contours: Vec<Contour> = traced
        .into_iter()
        .filter(|c| !c.points.is_empty())
        .map(|c| {
            let points: Vec<(i32, i32)> = c.points.iter().map(|p| (p.x, p.y)).collect();
            Contour::new(
                compress_chain(&points)
                    .into_iter()
                    .map(|(x, y)| Point2D::new(x as f64, y as f64))
                    .collect(),
            )
        })
        .collect();

    debug!(contours = contours.len(), "Contours traced");
    contours
}

/// Drop every point that continues a straight run in the same step
/// direction, treating the chain as closed.
fn compress_chain(points: &[(i32, i32)]) -> Vec<(i32, i32)> {
    let n = points.len();
    if n <= 2 {
        return points.to_vec();
    }
    let step = |from: (i32, i32), to: (i32, i32)| (to.0 - from.0, to.1 - from.1);
    (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            step(prev, points[i]) != step(points[i], next)
        })
        .map(|i| points[i])
        .collect()
}

/// Sort contours by area, largest first. Equal areas keep discovery order.
pub fn rank_by_area(mut contours: Vec<Contour>) -> Vec<Contour> {
    contours.sort_by(|a, b| b.area().total_cmp(&a.area()));
    contours
}
