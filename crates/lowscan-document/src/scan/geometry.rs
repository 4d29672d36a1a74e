// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Planar geometry helpers — perimeter, area, Douglas–Peucker polygon
// approximation, quadrilateral candidates, and corner ordering.

use imageproc::geometry::{approximate_polygon_dp, oriented_contour_area};
use imageproc::point::Point;
use lowscan_core::{OrderedCorners, Point2D};
use serde::Serialize;

fn to_imageproc(points: &[Point2D]) -> Vec<Point<f64>> {
    points.iter().map(|p| Point::new(p.x, p.y)).collect()
}

fn from_imageproc(points: Vec<Point<f64>>) -> Vec<Point2D> {
    points.into_iter().map(|p| Point2D::new(p.x, p.y)).collect()
}

/// Length of a polyline. When `closed`, the segment from the last point back
/// to the first is included.
pub fn arc_length(points: &[Point2D], closed: bool) -> f64 {
    imageproc::geometry::arc_length(&to_imageproc(points), closed)
}

/// Signed planar area of a closed polygon (shoelace formula).
///
/// Positive for counter-clockwise vertices in a y-up frame, which is
/// clockwise on screen. Fewer than three vertices have zero area.
pub fn signed_area(points: &[Point2D]) -> f64 {
    oriented_contour_area(&to_imageproc(points))
}

/// Simplify a polyline with the Douglas–Peucker algorithm.
///
/// Every discarded point lies within `epsilon` of the simplified outline.
/// For a closed curve the outline is split at two mutually distant vertices
/// and each half is simplified on its own, so the result does not depend on
/// where tracing happened to start. A non-positive `epsilon` removes
/// nothing.
pub fn approximate_polygon(points: &[Point2D], epsilon: f64, closed: bool) -> Vec<Point2D> {
    if closed {
        approximate_closed(points, epsilon)
    } else {
        simplify_open(points, epsilon)
    }
}

fn approximate_closed(points: &[Point2D], epsilon: f64) -> Vec<Point2D> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let start = farthest_from(points, 0);
    let end = farthest_from(points, start);
    if start == end {
        // Every point coincides.
        return vec![points[start]];
    }

    let first_half = wrapping_chain(points, start, end);
    let second_half = wrapping_chain(points, end, start);

    let mut result = simplify_open(&first_half, epsilon);
    let tail = simplify_open(&second_half, epsilon);
    // Both halves share their endpoints.
    result.extend_from_slice(&tail[1..tail.len() - 1]);
    result
}

/// Points from `from` to `to` inclusive, wrapping past the end of the slice.
fn wrapping_chain(points: &[Point2D], from: usize, to: usize) -> Vec<Point2D> {
    let n = points.len();
    let len = (to + n - from) % n + 1;
    (0..len).map(|i| points[(from + i) % n]).collect()
}

fn farthest_from(points: &[Point2D], origin: usize) -> usize {
    let anchor = points[origin];
    let mut best = origin;
    let mut best_dist = 0.0;
    for (i, p) in points.iter().enumerate() {
        let d = anchor.distance_squared(*p);
        if d > best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

fn simplify_open(points: &[Point2D], epsilon: f64) -> Vec<Point2D> {
    if points.len() <= 2 || !(epsilon > 0.0) {
        return points.to_vec();
    }
    from_imageproc(approximate_polygon_dp(&to_imageproc(points), epsilon, false))
}

/// A four-vertex polygon approximated from a contour, with its area.
///
/// The area is always evaluated from the points, so there is no way to build
/// one with a stale area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quadrilateral {
    points: [Point2D; 4],
    signed_area: f64,
}

impl Quadrilateral {
    /// Build a candidate and evaluate its area up front.
    pub fn new(points: [Point2D; 4]) -> Self {
        let signed_area = signed_area(&points);
        Self {
            points,
            signed_area,
        }
    }

    /// Build from a polygon approximation. Anything but exactly four vertices
    /// is not a quadrilateral.
    pub fn from_vertices(vertices: &[Point2D]) -> Option<Self> {
        let points: [Point2D; 4] = vertices.try_into().ok()?;
        Some(Self::new(points))
    }

    /// Vertices in contour order.
    pub fn points(&self) -> [Point2D; 4] {
        self.points
    }

    /// Shoelace area, sign carrying the winding direction.
    pub fn signed_area(&self) -> f64 {
        self.signed_area
    }

    /// Unsigned area; what every selection comparison uses.
    pub fn area(&self) -> f64 {
        self.signed_area.abs()
    }
}

/// Label four unordered points as top-left, top-right, bottom-left, and
/// bottom-right.
///
/// The two smallest-x points form the left side; of those, the smaller y is
/// top-left. Of the two right points, the one farther from top-left is
/// bottom-right. Sorting is stable, so ties keep input order. Coordinates
/// are never changed, only relabelled.
pub fn order_corners(points: [Point2D; 4]) -> OrderedCorners {
    let mut by_x = points;
    by_x.sort_by(|a, b| a.x.total_cmp(&b.x));

    let mut left = [by_x[0], by_x[1]];
    left.sort_by(|a, b| a.y.total_cmp(&b.y));
    let [top_left, bottom_left] = left;

    let (first, second) = (by_x[2], by_x[3]);
    let (top_right, bottom_right) =
        if top_left.distance_squared(first) > top_left.distance_squared(second) {
            (second, first)
        } else {
            (first, second)
        };

    OrderedCorners {
        top_left,
        top_right,
        bottom_left,
        bottom_right,
    }
}
