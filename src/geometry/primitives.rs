// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric primitives used by the intersection library and the editors

use super::projection::{Location, Projection2D};
use crate::utils::math::{float_eq0, newell_normal, points_eq, try_normalize};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A point in 3D space
pub type Point = Point3<f64>;

/// Infinite line through `origin` along the unit vector `direction`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub origin: Point,
    pub direction: Vector3<f64>,
}

impl Line {
    /// Create a line; returns `None` for a zero direction
    pub fn new(origin: Point, direction: Vector3<f64>) -> Option<Self> {
        try_normalize(&direction).map(|direction| Self { origin, direction })
    }

    /// Line through two distinct points
    pub fn through(a: Point, b: Point) -> Option<Self> {
        Self::new(a, b - a)
    }

    /// Point at signed distance `t` from the origin
    pub fn point_at(&self, t: f64) -> Point {
        self.origin + self.direction * t
    }
}

/// Half-infinite line starting at `origin`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Point,
    pub direction: Vector3<f64>,
}

impl Ray {
    /// Create a ray; returns `None` for a zero direction
    pub fn new(origin: Point, direction: Vector3<f64>) -> Option<Self> {
        try_normalize(&direction).map(|direction| Self { origin, direction })
    }

    pub fn point_at(&self, t: f64) -> Point {
        self.origin + self.direction * t
    }
}

/// Closed line segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Unnormalized direction (`end - start`)
    pub fn vector(&self) -> Vector3<f64> {
        self.end - self.start
    }

    pub fn length(&self) -> f64 {
        self.vector().norm()
    }

    /// Point at parameter `t`, where 0 is `start` and 1 is `end`
    pub fn point_at(&self, t: f64) -> Point {
        self.start + self.vector() * t
    }

    pub fn midpoint(&self) -> Point {
        self.point_at(0.5)
    }

    /// Parameter of the orthogonal projection of `point` onto the segment's line
    pub fn parameter_of(&self, point: &Point) -> f64 {
        let v = self.vector();
        let len2 = v.norm_squared();
        if len2 == 0.0 {
            0.0
        } else {
            (point - self.start).dot(&v) / len2
        }
    }

    /// Whether the segment has (near) zero length
    pub fn is_degenerate(&self) -> bool {
        points_eq(&self.start, &self.end)
    }
}

/// Oriented plane `normal · x = d` with a unit normal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub normal: Vector3<f64>,
    pub d: f64,
}

impl Plane {
    /// Plane through `point` with the given normal; `None` for a zero normal
    pub fn new(point: Point, normal: Vector3<f64>) -> Option<Self> {
        let normal = try_normalize(&normal)?;
        Some(Self {
            normal,
            d: normal.dot(&point.coords),
        })
    }

    /// Plane from a unit normal and offset
    pub fn from_normal_and_offset(normal: Vector3<f64>, d: f64) -> Option<Self> {
        let len = normal.norm();
        if float_eq0(len) {
            return None;
        }
        Some(Self {
            normal: normal / len,
            d: d / len,
        })
    }

    /// Plane through three points, oriented counter-clockwise
    pub fn from_points(a: &Point, b: &Point, c: &Point) -> Option<Self> {
        Self::new(*a, (b - a).cross(&(c - a)))
    }

    /// Signed distance; positive on the side the normal points to
    pub fn signed_distance(&self, point: &Point) -> f64 {
        self.normal.dot(&point.coords) - self.d
    }

    /// Whether the point lies on the plane within tolerance
    pub fn contains_point(&self, point: &Point) -> bool {
        float_eq0(self.signed_distance(point))
    }

    /// Orthogonal projection of a point onto the plane
    pub fn project_point(&self, point: &Point) -> Point {
        point - self.normal * self.signed_distance(point)
    }

    /// A point on the plane
    pub fn origin(&self) -> Point {
        Point::from(self.normal * self.d)
    }

    /// Same plane with the opposite orientation
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            d: -self.d,
        }
    }

    /// Whether both planes have parallel normals (either orientation)
    pub fn is_parallel_to(&self, other: &Plane) -> bool {
        float_eq0(self.normal.cross(&other.normal).norm())
    }

    /// Whether both planes describe the same point set
    pub fn is_coincident_with(&self, other: &Plane) -> bool {
        self.is_parallel_to(other) && other.contains_point(&self.origin())
    }
}

/// Planar simple polygon with optional holes.
///
/// The outer ring is counter-clockwise around the polygon normal and holes run
/// the other way; rings are stored open (the first point is not repeated).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub outer: Vec<Point>,
    pub holes: Vec<Vec<Point>>,
    plane: Plane,
}

impl Polygon {
    /// Create a polygon from its outer ring; `None` if the ring is degenerate
    pub fn new(outer: Vec<Point>) -> Option<Self> {
        Self::with_holes(outer, Vec::new())
    }

    /// Create a polygon with holes; the plane is taken from the outer ring
    pub fn with_holes(outer: Vec<Point>, holes: Vec<Vec<Point>>) -> Option<Self> {
        if outer.len() < 3 {
            return None;
        }
        let normal = newell_normal(outer.iter());
        let plane = Plane::new(outer[0], normal)?;
        Some(Self {
            outer,
            holes,
            plane,
        })
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    pub fn normal(&self) -> Vector3<f64> {
        self.plane.normal
    }

    /// Dimension reduction along the polygon normal
    pub fn projection(&self) -> Projection2D {
        Projection2D::from_normal(&self.plane.normal)
    }

    /// All rings, outer ring first
    pub fn rings(&self) -> impl Iterator<Item = &Vec<Point>> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }

    /// Every boundary edge of every ring
    pub fn edges(&self) -> impl Iterator<Item = Segment> + '_ {
        self.rings().flat_map(|ring| {
            (0..ring.len()).map(move |i| Segment::new(ring[i], ring[(i + 1) % ring.len()]))
        })
    }

    /// Area of the polygon with holes subtracted
    pub fn area(&self) -> f64 {
        let outer = newell_normal(self.outer.iter()).norm() * 0.5;
        let holes: f64 = self
            .holes
            .iter()
            .map(|h| newell_normal(h.iter()).norm() * 0.5)
            .sum();
        outer - holes
    }

    /// Average of the outer ring points
    pub fn centroid(&self) -> Point {
        let sum = self
            .outer
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Point::from(sum / self.outer.len() as f64)
    }

    /// Locate a point that is assumed to lie in the polygon plane
    pub fn locate_coplanar(&self, point: &Point) -> Location {
        let projection = self.projection();
        let p = projection.project(point);
        let outer = projection.project_ring(&self.outer);
        match projection.locate(&p, &outer) {
            Location::Outside => return Location::Outside,
            Location::Boundary => return Location::Boundary,
            Location::Inside => {}
        }
        for hole in &self.holes {
            let ring = projection.project_ring(hole);
            match projection.locate(&p, &ring) {
                Location::Inside => return Location::Outside,
                Location::Boundary => return Location::Boundary,
                Location::Outside => {}
            }
        }
        Location::Inside
    }

    /// Whether the point lies in the polygon plane and inside or on the polygon
    pub fn contains_point(&self, point: &Point) -> bool {
        self.plane.contains_point(point) && self.locate_coplanar(point) != Location::Outside
    }
}
