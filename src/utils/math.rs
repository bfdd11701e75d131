// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Math utilities and the process-wide comparison tolerance

use nalgebra::{Point3, Vector3};
use std::sync::OnceLock;

/// Tolerance used when no value has been installed
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

static TOLERANCE: OnceLock<f64> = OnceLock::new();

/// Current comparison tolerance
pub fn tolerance() -> f64 {
    *TOLERANCE.get_or_init(|| DEFAULT_TOLERANCE)
}

/// Install the comparison tolerance once; later calls are ignored.
/// Returns whether the value was installed.
pub fn set_tolerance(value: f64) -> bool {
    TOLERANCE.set(value.max(f64::EPSILON)).is_ok()
}

/// Check if two floats are equal within the kernel tolerance
#[inline]
pub fn float_eq(a: f64, b: f64) -> bool {
    approx_eq(a, b, tolerance())
}

/// Check if a float is zero within the kernel tolerance
#[inline]
pub fn float_eq0(a: f64) -> bool {
    a.abs() <= tolerance()
}

/// Check if two floats are approximately equal
#[inline]
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() <= epsilon
}

/// Check if two points coincide within the kernel tolerance
#[inline]
pub fn points_eq(a: &Point3<f64>, b: &Point3<f64>) -> bool {
    float_eq0((a - b).norm())
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Componentwise linear interpolation between points
#[inline]
pub fn lerp_point(a: &Point3<f64>, b: &Point3<f64>, t: f64) -> Point3<f64> {
    a + (b - a) * t
}

/// Normalize a vector, returning `None` for vectors of (near) zero length
pub fn try_normalize(v: &Vector3<f64>) -> Option<Vector3<f64>> {
    let len = v.norm();
    if float_eq0(len) {
        None
    } else {
        Some(v / len)
    }
}

/// Index (0 = x, 1 = y, 2 = z) of the component with the largest magnitude
pub fn dominant_axis(v: &Vector3<f64>) -> usize {
    let (ax, ay, az) = (v.x.abs(), v.y.abs(), v.z.abs());
    if ax >= ay && ax >= az {
        0
    } else if ay >= az {
        1
    } else {
        2
    }
}

/// Newell normal of a closed polygon, unnormalized (length is twice the area)
pub fn newell_normal<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Vector3<f64> {
    let points: Vec<&Point3<f64>> = points.into_iter().collect();
    let mut normal = Vector3::zeros();
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approx_eq() {
        assert!(approx_eq(1.0, 1.0001, 0.001));
        assert!(!approx_eq(1.0, 1.1, 0.001));
    }

    #[test]
    fn test_float_eq_uses_tolerance() {
        assert!(float_eq(1.0, 1.0 + DEFAULT_TOLERANCE * 0.5));
        assert!(!float_eq(1.0, 1.0 + 1e-3));
        assert!(float_eq0(-1e-9));
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
        assert_eq!(lerp(0.0, 10.0, 0.0), 0.0);
        assert_eq!(lerp(0.0, 10.0, 1.0), 10.0);
    }

    #[test]
    fn test_dominant_axis() {
        assert_eq!(dominant_axis(&Vector3::new(0.1, -0.9, 0.2)), 1);
        assert_eq!(dominant_axis(&Vector3::new(0.0, 0.0, -1.0)), 2);
        assert_eq!(dominant_axis(&Vector3::new(1.0, 1.0, 1.0)), 0);
    }

    #[test]
    fn test_newell_normal_unit_square() {
        let square = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let n = newell_normal(square.iter());
        assert!(approx_eq(n.z, 2.0, 1e-12));
        assert!(approx_eq(n.x, 0.0, 1e-12));
    }
}
