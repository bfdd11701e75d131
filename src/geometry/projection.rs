// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Dimension reduction of planar geometry to 2D
//!
//! Points are projected by dropping the dominant axis of the plane normal.
//! When that component is negative the two remaining axes are swapped, so a
//! ring that is counter-clockwise around the normal stays counter-clockwise in
//! 2D.

use super::primitives::{Plane, Point};
use crate::utils::math::{dominant_axis, float_eq0, tolerance};
use nalgebra::{Point2, Vector3};

/// Position of a point relative to a closed ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Inside,
    Boundary,
    Outside,
}

/// Orientation-preserving projection onto a coordinate plane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection2D {
    axis: usize,
    flip: bool,
}

impl Projection2D {
    /// Projection along the dominant axis of `normal`
    pub fn from_normal(normal: &Vector3<f64>) -> Self {
        let axis = dominant_axis(normal);
        Self {
            axis,
            flip: normal[axis] < 0.0,
        }
    }

    /// The dropped axis (0 = x, 1 = y, 2 = z)
    pub fn axis(&self) -> usize {
        self.axis
    }

    /// Indices of the two kept coordinates, in projected order
    fn kept_axes(&self) -> (usize, usize) {
        let (u, v) = match self.axis {
            0 => (1, 2),
            1 => (2, 0),
            _ => (0, 1),
        };
        if self.flip {
            (v, u)
        } else {
            (u, v)
        }
    }

    pub fn project(&self, point: &Point) -> Point2<f64> {
        let (u, v) = self.kept_axes();
        Point2::new(point[u], point[v])
    }

    pub fn project_ring(&self, ring: &[Point]) -> Vec<Point2<f64>> {
        ring.iter().map(|p| self.project(p)).collect()
    }

    /// Lift a projected point back onto `plane`
    pub fn unproject(&self, point: &Point2<f64>, plane: &Plane) -> Point {
        let (u, v) = self.kept_axes();
        let mut out = Point::origin();
        out[u] = point.x;
        out[v] = point.y;
        let n = plane.normal;
        let k = self.axis;
        out[k] = if float_eq0(n[k]) {
            0.0
        } else {
            (plane.d - n[u] * point.x - n[v] * point.y) / n[k]
        };
        out
    }

    /// Locate a point against a closed ring (crossing-number test)
    pub fn locate(&self, point: &Point2<f64>, ring: &[Point2<f64>]) -> Location {
        locate_in_ring(point, ring)
    }
}

/// Signed area of a ring; positive for counter-clockwise rings
pub fn signed_area_2d(ring: &[Point2<f64>]) -> f64 {
    let n = ring.len();
    let mut sum = 0.0;
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        sum += a.x * b.y - b.x * a.y;
    }
    sum * 0.5
}

/// Distance from `p` to the segment `[a, b]`
fn distance_to_segment(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// Locate a point against a closed ring
pub fn locate_in_ring(point: &Point2<f64>, ring: &[Point2<f64>]) -> Location {
    let n = ring.len();
    if n < 3 {
        return Location::Outside;
    }
    let tol = tolerance();
    let mut inside = false;
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        if distance_to_segment(point, &a, &b) <= tol {
            return Location::Boundary;
        }
        if (a.y > point.y) != (b.y > point.y) {
            let x = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if point.x < x {
                inside = !inside;
            }
        }
    }
    if inside {
        Location::Inside
    } else {
        Location::Outside
    }
}

/// Whether a point is inside or on a ring
pub fn point_in_polygon_2d(point: &Point2<f64>, ring: &[Point2<f64>]) -> bool {
    locate_in_ring(point, ring) != Location::Outside
}
