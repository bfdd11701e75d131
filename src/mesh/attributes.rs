// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Attribute payloads carried by vertices, halfedges and faces
//!
//! Halfedges carry their own copy of the vertex payload, so a vertex shared by
//! several faces can still have a different normal or texture coordinate per
//! face corner.

use crate::utils::math::{lerp_point, try_normalize};
use nalgebra::{Matrix4, Point3, Vector2, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Payload stored on vertices and halfedges
pub trait VertexAttributes: Clone + Debug {
    /// Payload with the given position and no other data
    fn from_position(position: Point3<f64>) -> Self;

    fn position(&self) -> Point3<f64>;

    fn set_position(&mut self, position: Point3<f64>);

    fn normal(&self) -> Option<Vector3<f64>> {
        None
    }

    fn set_normal(&mut self, _normal: Vector3<f64>) {}

    fn texcoord(&self) -> Option<Vector2<f64>> {
        None
    }

    /// Linear interpolation between two payloads
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;

    fn transform(&mut self, matrix: &Matrix4<f64>);
}

/// Payload stored on faces
pub trait FaceAttributes: Clone + Debug {
    fn from_normal(normal: Vector3<f64>) -> Self;

    fn normal(&self) -> Vector3<f64>;

    fn set_normal(&mut self, normal: Vector3<f64>);

    fn transform(&mut self, matrix: &Matrix4<f64>);
}

/// Inverse transpose of `matrix`, used for normals
fn normal_matrix(matrix: &Matrix4<f64>) -> Matrix4<f64> {
    matrix
        .try_inverse()
        .map(|m| m.transpose())
        .unwrap_or(*matrix)
}

fn transform_normal(matrix: &Matrix4<f64>, normal: &Vector3<f64>) -> Vector3<f64> {
    let n = normal_matrix(matrix).transform_vector(normal);
    try_normalize(&n).unwrap_or(*normal)
}

/// Default vertex payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VertexData {
    pub position: Point3<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal: Option<Vector3<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texcoord: Option<Vector2<f64>>,
}

impl VertexData {
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            normal: None,
            texcoord: None,
        }
    }

    pub fn with_normal(mut self, normal: Vector3<f64>) -> Self {
        self.normal = Some(normal);
        self
    }

    pub fn with_texcoord(mut self, texcoord: Vector2<f64>) -> Self {
        self.texcoord = Some(texcoord);
        self
    }
}

impl VertexAttributes for VertexData {
    fn from_position(position: Point3<f64>) -> Self {
        Self::new(position)
    }

    fn position(&self) -> Point3<f64> {
        self.position
    }

    fn set_position(&mut self, position: Point3<f64>) {
        self.position = position;
    }

    fn normal(&self) -> Option<Vector3<f64>> {
        self.normal
    }

    fn set_normal(&mut self, normal: Vector3<f64>) {
        self.normal = Some(normal);
    }

    fn texcoord(&self) -> Option<Vector2<f64>> {
        self.texcoord
    }

    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        let normal = match (a.normal, b.normal) {
            (Some(na), Some(nb)) => try_normalize(&(na + (nb - na) * t)).or(Some(na)),
            (n, None) | (None, n) => n,
        };
        let texcoord = match (a.texcoord, b.texcoord) {
            (Some(ta), Some(tb)) => Some(ta + (tb - ta) * t),
            (c, None) | (None, c) => c,
        };
        Self {
            position: lerp_point(&a.position, &b.position, t),
            normal,
            texcoord,
        }
    }

    fn transform(&mut self, matrix: &Matrix4<f64>) {
        self.position = matrix.transform_point(&self.position);
        if let Some(normal) = self.normal {
            self.normal = Some(transform_normal(matrix, &normal));
        }
    }
}

/// Default face payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceData {
    pub normal: Vector3<f64>,
}

impl Default for FaceData {
    fn default() -> Self {
        Self {
            normal: Vector3::z(),
        }
    }
}

impl FaceAttributes for FaceData {
    fn from_normal(normal: Vector3<f64>) -> Self {
        Self { normal }
    }

    fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    fn set_normal(&mut self, normal: Vector3<f64>) {
        self.normal = normal;
    }

    fn transform(&mut self, matrix: &Matrix4<f64>) {
        self.normal = transform_normal(matrix, &self.normal);
    }
}

/// Surface payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
}

impl SurfaceData {
    pub fn with_material(material: impl Into<String>) -> Self {
        Self {
            material: Some(material.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lerp_interpolates_every_channel() {
        let a = VertexData::new(Point3::new(0.0, 0.0, 0.0))
            .with_normal(Vector3::x())
            .with_texcoord(Vector2::new(0.0, 0.0));
        let b = VertexData::new(Point3::new(2.0, 0.0, 0.0))
            .with_normal(Vector3::y())
            .with_texcoord(Vector2::new(1.0, 1.0));
        let m = VertexData::lerp(&a, &b, 0.5);
        assert_relative_eq!(m.position, Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(m.texcoord.unwrap(), Vector2::new(0.5, 0.5));
        let n = m.normal.unwrap();
        assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(n.x, n.y, epsilon = 1e-12);
    }

    #[test]
    fn test_transform_normal_uses_inverse_transpose() {
        let scale = Matrix4::new_nonuniform_scaling(&Vector3::new(2.0, 1.0, 1.0));
        let mut v = VertexData::new(Point3::new(1.0, 1.0, 0.0))
            .with_normal(Vector3::new(1.0, 1.0, 0.0).normalize());
        v.transform(&scale);
        assert_relative_eq!(v.position, Point3::new(2.0, 1.0, 0.0));
        let n = v.normal.unwrap();
        // Stretching along x flattens the normal towards y
        assert!(n.y > n.x);
        assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_face_transform() {
        let mut f = FaceData::from_normal(Vector3::z());
        f.transform(&Matrix4::new_rotation(Vector3::new(std::f64::consts::FRAC_PI_2, 0.0, 0.0)));
        assert_relative_eq!(f.normal, -Vector3::y(), epsilon = 1e-12);
    }
}
