// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Half-edge entity store
//!
//! A [`Mesh`] owns five arenas (vertices, halfedges, faces, surfaces,
//! submeshes) addressed by `u32` ids. Faces may carry holes; each halfedge
//! carries a copy of its origin vertex payload so attributes can differ per
//! face corner.

mod attributes;
mod builder;
mod entities;
mod ids;
mod pack;
mod store;
mod traverse;

pub use attributes::{FaceAttributes, FaceData, SurfaceData, VertexAttributes, VertexData};
pub use builder::MeshBuilder;
pub use entities::{Face, Halfedge, Hole, Submesh, Surface, Vertex};
pub use ids::{Epoch, FaceId, HalfedgeId, SubmeshId, SurfaceId, VertexId};
pub use pack::PackMap;
pub use store::Mesh;
pub use traverse::RingIter;

/// Part of a mesh an operation works on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    All,
    Submesh(SubmeshId),
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::geometry::Point;
    use nalgebra::Vector3;

    pub fn cube_positions() -> [Point; 8] {
        [
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(0.0, 0.0, 1.0),
            Point::new(1.0, 0.0, 1.0),
            Point::new(1.0, 1.0, 1.0),
            Point::new(0.0, 1.0, 1.0),
        ]
    }

    /// Bottom, top, front, back, left, right; all counter-clockwise from outside
    pub const CUBE_FACES: [[usize; 4]; 6] = [
        [0, 3, 2, 1],
        [4, 5, 6, 7],
        [0, 1, 5, 4],
        [2, 3, 7, 6],
        [0, 4, 7, 3],
        [1, 2, 6, 5],
    ];

    /// Unit cube on [0, 1]^3 in submesh "cube", surface "sides"
    pub fn cube() -> Mesh {
        let mut mesh = Mesh::new();
        let mut builder = MeshBuilder::new(&mut mesh, "cube");
        builder.add_positions(&cube_positions());
        for face in CUBE_FACES {
            builder.add_polygon("sides", &face).unwrap();
        }
        builder.finish();
        mesh
    }

    /// Unit cube centered at the origin
    pub fn centered_cube() -> Mesh {
        let mut mesh = cube();
        mesh.transform(&nalgebra::Matrix4::new_translation(&Vector3::new(-0.5, -0.5, -0.5)));
        mesh
    }

    /// Unit square in the z = 0 plane facing +z
    pub fn square() -> Mesh {
        Mesh::from_polygons(&cube_positions()[..4], &[vec![0, 1, 2, 3]]).unwrap()
    }

    /// 3x3 square with a centered 1x1 hole, facing +z
    pub fn square_with_hole() -> Mesh {
        let mut mesh = Mesh::new();
        let mut builder = MeshBuilder::new(&mut mesh, "plate");
        builder.add_positions(&[
            Point::new(0.0, 0.0, 0.0),
            Point::new(3.0, 0.0, 0.0),
            Point::new(3.0, 3.0, 0.0),
            Point::new(0.0, 3.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
            Point::new(1.0, 2.0, 0.0),
            Point::new(2.0, 2.0, 0.0),
            Point::new(2.0, 1.0, 0.0),
        ]);
        builder
            .add_polygon_with_holes("top", &[0, 1, 2, 3], &[vec![4, 5, 6, 7]])
            .unwrap();
        builder.finish();
        mesh
    }
}
