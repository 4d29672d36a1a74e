// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core geometric types for document detection.

use serde::{Deserialize, Serialize};

/// A point in image coordinates (x to the right, y downwards).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Dot product, treating both points as vectors from the origin.
    pub fn dot(&self, other: Point2D) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Squared Euclidean distance. Avoids the square root so ordering
    /// comparisons never need to normalise anything.
    pub fn distance_squared(&self, other: Point2D) -> f64 {
        let d = *self - other;
        d.dot(d)
    }

    /// Both coordinates multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

impl std::ops::Sub for Point2D {
    type Output = Point2D;

    fn sub(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl std::fmt::Display for Point2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Document corners labelled for perspective rectification.
///
/// Always a relabelling of some quadrilateral's vertices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderedCorners {
    pub top_left: Point2D,
    pub top_right: Point2D,
    pub bottom_left: Point2D,
    pub bottom_right: Point2D,
}

impl OrderedCorners {
    /// Corners in zig-zag order: top-left, top-right, bottom-left, bottom-right.
    pub fn to_array(&self) -> [Point2D; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_left,
            self.bottom_right,
        ]
    }

    /// Every coordinate multiplied by `factor`; used to map corners found on
    /// the reduced image back to the source resolution.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            top_left: self.top_left.scaled(factor),
            top_right: self.top_right.scaled(factor),
            bottom_left: self.bottom_left.scaled(factor),
            bottom_right: self.bottom_right.scaled(factor),
        }
    }
}

impl std::fmt::Display for OrderedCorners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TL {} TR {} BL {} BR {}",
            self.top_left, self.top_right, self.bottom_left, self.bottom_right
        )
    }
}
