// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Pairwise intersection of points, lines, rays, segments, planes and polygons
//!
//! Every unordered pair has one canonical implementation below; the reversed
//! pair is generated by [`symmetric!`] and forwards to it. Lines, rays and
//! segments share a parametric form ([`Linear`]) so that each pair involving
//! them is solved once.
//!
//! Pairs that can produce several disjoint pieces (anything against a
//! non-convex polygon) return `Vec<Intersection>` ordered along the linear
//! primitive; callers must enumerate them rather than assume a single hit.

use super::primitives::{Line, Plane, Point, Polygon, Ray, Segment};
use super::projection::{signed_area_2d, Location};
use crate::utils::math::{float_eq0, points_eq, tolerance};
use geo::BooleanOps;
use nalgebra::{Point2, Vector3};

/// Tagged intersection result
#[derive(Debug, Clone, PartialEq)]
pub enum Intersection {
    Empty,
    Point(Point),
    Line(Line),
    Ray(Ray),
    Segment(Segment),
    Plane(Plane),
    Polygon(Polygon),
}

impl Intersection {
    pub fn is_empty(&self) -> bool {
        matches!(self, Intersection::Empty)
    }

    /// The intersection point, if the result is a single point
    pub fn as_point(&self) -> Option<Point> {
        match self {
            Intersection::Point(p) => Some(*p),
            _ => None,
        }
    }

    /// The intersection segment, if the result is a segment
    pub fn as_segment(&self) -> Option<Segment> {
        match self {
            Intersection::Segment(s) => Some(*s),
            _ => None,
        }
    }
}

/// Intersection predicate and construction between two primitives
pub trait Intersect<Rhs> {
    type Output;

    /// Whether the primitives share at least one point
    fn intersects(&self, rhs: &Rhs) -> bool;

    /// The shared point set
    fn intersection(&self, rhs: &Rhs) -> Self::Output;
}

/// Parametric form `origin + t * dir` restricted to `lo <= t <= hi`
#[derive(Debug, Clone, Copy)]
struct Linear {
    origin: Point,
    dir: Vector3<f64>,
    lo: f64,
    hi: f64,
}

impl Linear {
    fn at(&self, t: f64) -> Point {
        self.origin + self.dir * t
    }

    /// Parameter tolerance matching the length tolerance
    fn eps(&self) -> f64 {
        tolerance() / self.dir.norm()
    }

    fn degenerate(&self) -> Option<Point> {
        if float_eq0(self.dir.norm()) {
            Some(self.origin)
        } else {
            None
        }
    }

    fn param_of(&self, p: &Point) -> f64 {
        (p - self.origin).dot(&self.dir) / self.dir.norm_squared()
    }

    fn contains_param(&self, t: f64) -> bool {
        let eps = self.eps();
        t >= self.lo - eps && t <= self.hi + eps
    }

    fn clamp(&self, t: f64) -> f64 {
        t.max(self.lo).min(self.hi)
    }

    /// Build the result for the parameter range `[lo, hi]`
    fn piece(&self, lo: f64, hi: f64) -> Intersection {
        let unit = self.dir.normalize();
        if lo.is_finite() && hi.is_finite() && hi - lo <= self.eps() {
            return Intersection::Point(self.at((lo + hi) * 0.5));
        }
        match (lo.is_finite(), hi.is_finite()) {
            (false, false) => Intersection::Line(Line {
                origin: self.origin,
                direction: unit,
            }),
            (true, false) => Intersection::Ray(Ray {
                origin: self.at(lo),
                direction: unit,
            }),
            (false, true) => Intersection::Ray(Ray {
                origin: self.at(hi),
                direction: -unit,
            }),
            (true, true) => Intersection::Segment(Segment::new(self.at(lo), self.at(hi))),
        }
    }
}

trait AsLinear {
    fn as_linear(&self) -> Linear;
}

impl AsLinear for Line {
    fn as_linear(&self) -> Linear {
        Linear {
            origin: self.origin,
            dir: self.direction,
            lo: f64::NEG_INFINITY,
            hi: f64::INFINITY,
        }
    }
}

impl AsLinear for Ray {
    fn as_linear(&self) -> Linear {
        Linear {
            origin: self.origin,
            dir: self.direction,
            lo: 0.0,
            hi: f64::INFINITY,
        }
    }
}

impl AsLinear for Segment {
    fn as_linear(&self) -> Linear {
        Linear {
            origin: self.start,
            dir: self.vector(),
            lo: 0.0,
            hi: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Canonical implementations
// ---------------------------------------------------------------------------

fn point_point(a: &Point, b: &Point) -> Intersection {
    if points_eq(a, b) {
        Intersection::Point(*a)
    } else {
        Intersection::Empty
    }
}

fn point_linear(p: &Point, l: &Linear) -> Intersection {
    if let Some(q) = l.degenerate() {
        return point_point(p, &q);
    }
    let t = l.param_of(p);
    if !l.contains_param(t) {
        return Intersection::Empty;
    }
    if points_eq(&l.at(t), p) {
        Intersection::Point(*p)
    } else {
        Intersection::Empty
    }
}

fn point_plane(p: &Point, plane: &Plane) -> Intersection {
    if plane.contains_point(p) {
        Intersection::Point(*p)
    } else {
        Intersection::Empty
    }
}

fn point_polygon(p: &Point, polygon: &Polygon) -> Intersection {
    if polygon.contains_point(p) {
        Intersection::Point(*p)
    } else {
        Intersection::Empty
    }
}

fn linear_linear(a: &Linear, b: &Linear) -> Intersection {
    match (a.degenerate(), b.degenerate()) {
        (Some(p), Some(q)) => return point_point(&p, &q),
        (Some(p), None) => return point_linear(&p, b),
        (None, Some(q)) => return point_linear(&q, a),
        (None, None) => {}
    }

    let cross = a.dir.cross(&b.dir);
    if float_eq0(cross.norm() / (a.dir.norm() * b.dir.norm())) {
        // Parallel: only collinear configurations can overlap
        let offset = (b.origin - a.origin).cross(&a.dir).norm() / a.dir.norm();
        if !float_eq0(offset) {
            return Intersection::Empty;
        }
        let t0 = a.param_of(&b.origin);
        let scale = b.dir.dot(&a.dir) / a.dir.norm_squared();
        let map = |s: f64| {
            if s.is_infinite() {
                s * scale.signum()
            } else {
                t0 + s * scale
            }
        };
        let (mut lo, mut hi) = (map(b.lo), map(b.hi));
        if lo > hi {
            std::mem::swap(&mut lo, &mut hi);
        }
        let lo = lo.max(a.lo);
        let hi = hi.min(a.hi);
        if lo > hi + a.eps() {
            return Intersection::Empty;
        }
        return a.piece(lo, hi.max(lo));
    }

    // Closest points of the two supporting lines
    let w = a.origin - b.origin;
    let aa = a.dir.dot(&a.dir);
    let ab = a.dir.dot(&b.dir);
    let bb = b.dir.dot(&b.dir);
    let aw = a.dir.dot(&w);
    let bw = b.dir.dot(&w);
    let denom = aa * bb - ab * ab;
    let t = (ab * bw - bb * aw) / denom;
    let s = (aa * bw - ab * aw) / denom;
    if !a.contains_param(t) || !b.contains_param(s) {
        return Intersection::Empty;
    }
    let pa = a.at(a.clamp(t));
    let pb = b.at(b.clamp(s));
    if points_eq(&pa, &pb) {
        Intersection::Point(pa)
    } else {
        Intersection::Empty
    }
}

fn linear_plane(l: &Linear, plane: &Plane) -> Intersection {
    if let Some(p) = l.degenerate() {
        return point_plane(&p, plane);
    }
    let denom = plane.normal.dot(&l.dir);
    if float_eq0(denom / l.dir.norm()) {
        return if plane.contains_point(&l.origin) {
            l.piece(l.lo, l.hi)
        } else {
            Intersection::Empty
        };
    }
    let t = (plane.d - plane.normal.dot(&l.origin.coords)) / denom;
    if l.contains_param(t) {
        Intersection::Point(l.at(l.clamp(t)))
    } else {
        Intersection::Empty
    }
}

fn linear_polygon(l: &Linear, polygon: &Polygon) -> Vec<Intersection> {
    if let Some(p) = l.degenerate() {
        return non_empty(point_polygon(&p, polygon));
    }
    let plane = polygon.plane();
    if !float_eq0(plane.normal.dot(&l.dir) / l.dir.norm()) {
        return match linear_plane(l, plane) {
            Intersection::Point(p) if polygon.locate_coplanar(&p) != Location::Outside => {
                vec![Intersection::Point(p)]
            }
            _ => Vec::new(),
        };
    }
    if !plane.contains_point(&l.origin) {
        return Vec::new();
    }
    coplanar_linear_polygon(l, polygon)
}

/// Pieces of a linear primitive lying in the polygon plane
fn coplanar_linear_polygon(l: &Linear, polygon: &Polygon) -> Vec<Intersection> {
    let eps = l.eps();
    let mut breaks: Vec<f64> = Vec::new();
    for edge in polygon.edges() {
        match linear_linear(l, &edge.as_linear()) {
            Intersection::Point(p) => breaks.push(l.param_of(&p)),
            Intersection::Segment(s) => {
                breaks.push(l.param_of(&s.start));
                breaks.push(l.param_of(&s.end));
            }
            _ => {}
        }
    }
    if l.lo.is_finite() {
        breaks.push(l.lo);
    }
    if l.hi.is_finite() {
        breaks.push(l.hi);
    }
    breaks.retain(|t| l.contains_param(*t));
    for t in breaks.iter_mut() {
        *t = l.clamp(*t);
    }
    breaks.sort_by(|a, b| a.total_cmp(b));
    breaks.dedup_by(|a, b| (*a - *b).abs() <= eps);

    let inside = |t: f64| polygon.locate_coplanar(&l.at(t)) != Location::Outside;

    // Maximal covered intervals between consecutive breakpoints
    let mut pieces: Vec<(f64, f64)> = Vec::new();
    for pair in breaks.windows(2) {
        let (t0, t1) = (pair[0], pair[1]);
        if !inside((t0 + t1) * 0.5) {
            continue;
        }
        match pieces.last_mut() {
            Some(last) if (last.1 - t0).abs() <= eps => last.1 = t1,
            _ => pieces.push((t0, t1)),
        }
    }

    let mut result: Vec<(f64, Intersection)> = pieces
        .iter()
        .map(|&(t0, t1)| (t0, l.piece(t0, t1)))
        .collect();
    for &t in &breaks {
        let covered = pieces
            .iter()
            .any(|&(t0, t1)| t >= t0 - eps && t <= t1 + eps);
        if !covered && inside(t) {
            result.push((t, Intersection::Point(l.at(t))));
        }
    }
    result.sort_by(|a, b| a.0.total_cmp(&b.0));
    result.into_iter().map(|(_, piece)| piece).collect()
}

fn plane_plane(a: &Plane, b: &Plane) -> Intersection {
    if a.is_parallel_to(b) {
        return if a.is_coincident_with(b) {
            Intersection::Plane(*a)
        } else {
            Intersection::Empty
        };
    }
    let direction = a.normal.cross(&b.normal);
    let c = a.normal.dot(&b.normal);
    let det = 1.0 - c * c;
    let origin = Point::from(
        (a.normal * (a.d - b.d * c) + b.normal * (b.d - a.d * c)) / det,
    );
    match Line::new(origin, direction) {
        Some(line) => Intersection::Line(line),
        None => Intersection::Empty,
    }
}

fn plane_polygon(plane: &Plane, polygon: &Polygon) -> Vec<Intersection> {
    match plane_plane(plane, polygon.plane()) {
        Intersection::Plane(_) => vec![Intersection::Polygon(polygon.clone())],
        Intersection::Line(line) => coplanar_linear_polygon(&line.as_linear(), polygon),
        _ => Vec::new(),
    }
}

fn polygon_polygon(a: &Polygon, b: &Polygon) -> Vec<Intersection> {
    match plane_plane(a.plane(), b.plane()) {
        Intersection::Plane(_) => coplanar_polygon_polygon(a, b),
        Intersection::Line(line) => {
            let l = line.as_linear();
            let spans_a = spans(&l, &coplanar_linear_polygon(&l, a));
            let spans_b = spans(&l, &coplanar_linear_polygon(&l, b));
            let mut result = Vec::new();
            for &(a0, a1) in &spans_a {
                for &(b0, b1) in &spans_b {
                    let lo = a0.max(b0);
                    let hi = a1.min(b1);
                    if lo <= hi + l.eps() {
                        result.push(l.piece(lo, hi.max(lo)));
                    }
                }
            }
            result
        }
        _ => Vec::new(),
    }
}

/// Overlap of two coplanar polygons, computed in 2D
fn coplanar_polygon_polygon(a: &Polygon, b: &Polygon) -> Vec<Intersection> {
    let projection = a.projection();
    let to_geo = |polygon: &Polygon| {
        let ring = |points: &[Point]| {
            geo::LineString::from(
                projection
                    .project_ring(points)
                    .into_iter()
                    .map(|p| geo::Coord { x: p.x, y: p.y })
                    .collect::<Vec<_>>(),
            )
        };
        geo::Polygon::new(
            ring(&polygon.outer),
            polygon.holes.iter().map(|h| ring(h)).collect(),
        )
    };
    let overlap = BooleanOps::intersection(&to_geo(a), &to_geo(b));

    let lift = |ring: &geo::LineString<f64>, ccw: bool| -> Vec<Point> {
        // geo rings are closed; drop the repeated point
        let mut points: Vec<Point2<f64>> = ring.0.iter().map(|c| Point2::new(c.x, c.y)).collect();
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        if (signed_area_2d(&points) > 0.0) != ccw {
            points.reverse();
        }
        points
            .iter()
            .map(|p| projection.unproject(p, a.plane()))
            .collect()
    };

    let mut result: Vec<Intersection> = overlap
        .0
        .iter()
        .filter_map(|piece| {
            let outer = lift(piece.exterior(), true);
            let holes = piece.interiors().iter().map(|h| lift(h, false)).collect();
            Polygon::with_holes(outer, holes)
        })
        .filter(|polygon| !float_eq0(polygon.area()))
        .map(Intersection::Polygon)
        .collect();

    if result.is_empty() {
        // Touching polygons: report the shared boundary pieces
        for edge in b.edges() {
            result.extend(coplanar_linear_polygon(&edge.as_linear(), a));
        }
    }
    result
}

/// Parameter spans covered by pieces along `l`
fn spans(l: &Linear, pieces: &[Intersection]) -> Vec<(f64, f64)> {
    pieces
        .iter()
        .filter_map(|piece| match piece {
            Intersection::Point(p) => {
                let t = l.param_of(p);
                Some((t, t))
            }
            Intersection::Segment(s) => {
                let (t0, t1) = (l.param_of(&s.start), l.param_of(&s.end));
                Some((t0.min(t1), t0.max(t1)))
            }
            _ => None,
        })
        .collect()
}

fn non_empty(result: Intersection) -> Vec<Intersection> {
    if result.is_empty() {
        Vec::new()
    } else {
        vec![result]
    }
}

// ---------------------------------------------------------------------------
// Trait wiring
// ---------------------------------------------------------------------------

/// Forward the reversed pair to the canonical implementation
macro_rules! symmetric {
    ($canonical:ty, $reversed:ty) => {
        impl Intersect<$canonical> for $reversed {
            type Output = <$canonical as Intersect<$reversed>>::Output;

            fn intersects(&self, rhs: &$canonical) -> bool {
                rhs.intersects(self)
            }

            fn intersection(&self, rhs: &$canonical) -> Self::Output {
                rhs.intersection(self)
            }
        }
    };
}

macro_rules! single {
    ($lhs:ty, $rhs:ty, |$a:ident, $b:ident| $body:expr) => {
        impl Intersect<$rhs> for $lhs {
            type Output = Intersection;

            fn intersects(&self, rhs: &$rhs) -> bool {
                !self.intersection(rhs).is_empty()
            }

            fn intersection(&self, rhs: &$rhs) -> Intersection {
                let ($a, $b) = (self, rhs);
                $body
            }
        }
    };
}

macro_rules! multiple {
    ($lhs:ty, $rhs:ty, |$a:ident, $b:ident| $body:expr) => {
        impl Intersect<$rhs> for $lhs {
            type Output = Vec<Intersection>;

            fn intersects(&self, rhs: &$rhs) -> bool {
                !self.intersection(rhs).is_empty()
            }

            fn intersection(&self, rhs: &$rhs) -> Vec<Intersection> {
                let ($a, $b) = (self, rhs);
                $body
            }
        }
    };
}

single!(Point, Point, |a, b| point_point(a, b));
single!(Point, Line, |a, b| point_linear(a, &b.as_linear()));
single!(Point, Ray, |a, b| point_linear(a, &b.as_linear()));
single!(Point, Segment, |a, b| point_linear(a, &b.as_linear()));
single!(Point, Plane, |a, b| point_plane(a, b));
single!(Point, Polygon, |a, b| point_polygon(a, b));

single!(Line, Line, |a, b| linear_linear(&a.as_linear(), &b.as_linear()));
single!(Line, Ray, |a, b| linear_linear(&a.as_linear(), &b.as_linear()));
single!(Line, Segment, |a, b| linear_linear(&a.as_linear(), &b.as_linear()));
single!(Line, Plane, |a, b| linear_plane(&a.as_linear(), b));
multiple!(Line, Polygon, |a, b| linear_polygon(&a.as_linear(), b));

single!(Ray, Ray, |a, b| linear_linear(&a.as_linear(), &b.as_linear()));
single!(Ray, Segment, |a, b| linear_linear(&a.as_linear(), &b.as_linear()));
single!(Ray, Plane, |a, b| linear_plane(&a.as_linear(), b));
multiple!(Ray, Polygon, |a, b| linear_polygon(&a.as_linear(), b));

single!(Segment, Segment, |a, b| linear_linear(&a.as_linear(), &b.as_linear()));
single!(Segment, Plane, |a, b| linear_plane(&a.as_linear(), b));
multiple!(Segment, Polygon, |a, b| linear_polygon(&a.as_linear(), b));

single!(Plane, Plane, |a, b| plane_plane(a, b));
multiple!(Plane, Polygon, |a, b| plane_polygon(a, b));

multiple!(Polygon, Polygon, |a, b| polygon_polygon(a, b));

symmetric!(Point, Line);
symmetric!(Point, Ray);
symmetric!(Point, Segment);
symmetric!(Point, Plane);
symmetric!(Point, Polygon);
symmetric!(Line, Ray);
symmetric!(Line, Segment);
symmetric!(Line, Plane);
symmetric!(Line, Polygon);
symmetric!(Ray, Segment);
symmetric!(Ray, Plane);
symmetric!(Ray, Polygon);
symmetric!(Segment, Plane);
symmetric!(Segment, Polygon);
symmetric!(Plane, Polygon);
