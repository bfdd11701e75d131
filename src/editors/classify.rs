// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Vertex classification against a plane

use crate::geometry::{Plane, Point};
use crate::mesh::{FaceAttributes, Mesh, Scope, VertexAttributes, VertexId};
use crate::utils::math::float_eq0;

/// Side of a plane; `Outside` is the side the normal points to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Inside,
    On,
    Outside,
}

impl Side {
    pub fn of(plane: &Plane, point: &Point) -> Self {
        let d = plane.signed_distance(point);
        if float_eq0(d) {
            Side::On
        } else if d > 0.0 {
            Side::Outside
        } else {
            Side::Inside
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Side::Inside => Side::Outside,
            Side::On => Side::On,
            Side::Outside => Side::Inside,
        }
    }
}

/// Per-vertex sides, indexed by vertex id.
///
/// Vertices created after classification (cut points, duplicated seam
/// vertices) read as [`Side::On`].
#[derive(Debug, Clone, Default)]
pub struct Classification {
    sides: Vec<Side>,
    inside: usize,
    outside: usize,
}

impl Classification {
    /// Classify every vertex of the faces in `scope`
    pub fn classify<V: VertexAttributes, F: FaceAttributes>(
        mesh: &Mesh<V, F>,
        plane: &Plane,
        scope: Scope,
    ) -> Self {
        let (vertex_arena, _, _) = mesh.capacity_counts();
        let mut out = Self {
            sides: vec![Side::On; vertex_arena],
            inside: 0,
            outside: 0,
        };
        let mut seen = vec![false; vertex_arena];
        for f in mesh.scope_faces(scope) {
            for h in mesh.face_all_halfedges(f) {
                let v = mesh.origin(h);
                if std::mem::replace(&mut seen[v.index()], true) {
                    continue;
                }
                let side = Side::of(plane, &mesh.vertex_position(v));
                out.sides[v.index()] = side;
                match side {
                    Side::Inside => out.inside += 1,
                    Side::Outside => out.outside += 1,
                    Side::On => {}
                }
            }
        }
        out
    }

    pub fn side(&self, v: VertexId) -> Side {
        self.sides.get(v.index()).copied().unwrap_or(Side::On)
    }

    pub fn any_inside(&self) -> bool {
        self.inside > 0
    }

    pub fn any_outside(&self) -> bool {
        self.outside > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::test_support::centered_cube;
    use nalgebra::Vector3;

    #[test]
    fn test_side_of_plane() {
        let plane = Plane::new(Point::origin(), Vector3::z()).unwrap();
        assert_eq!(Side::of(&plane, &Point::new(0.0, 0.0, 1.0)), Side::Outside);
        assert_eq!(Side::of(&plane, &Point::new(0.0, 0.0, -1.0)), Side::Inside);
        assert_eq!(Side::of(&plane, &Point::new(5.0, 5.0, 1e-9)), Side::On);
        assert_eq!(Side::Outside.opposite(), Side::Inside);
    }

    #[test]
    fn test_classify_centered_cube() {
        let mesh = centered_cube();
        let plane = Plane::new(Point::origin(), Vector3::z()).unwrap();
        let sides = Classification::classify(&mesh, &plane, Scope::All);
        assert!(sides.any_inside() && sides.any_outside());
        let outside = mesh
            .vertices()
            .filter(|&v| sides.side(v) == Side::Outside)
            .count();
        assert_eq!(outside, 4);
        assert_eq!(sides.side(VertexId::new(1000)), Side::On);
    }
}
