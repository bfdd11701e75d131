// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Incremental construction of submeshes from indexed polygons

use super::attributes::{FaceAttributes, VertexAttributes};
use super::ids::{FaceId, HalfedgeId, SubmeshId, VertexId};
use super::store::Mesh;
use crate::error::{KernelError, Result};
use crate::geometry::Point;
use crate::utils::math::{newell_normal, try_normalize};
use ahash::AHashMap;
use tracing::debug;

/// Builds one submesh from shared vertices and polygon index lists.
///
/// Each polygon corner gets its own halfedge carrying the polygon normal.
/// Partners are paired through the ordered vertex pair, so a directed edge
/// used by two polygons is rejected as non-manifold.
pub struct MeshBuilder<'a, V, F> {
    mesh: &'a mut Mesh<V, F>,
    submesh: SubmeshId,
    vertices: Vec<VertexId>,
    edges: AHashMap<(VertexId, VertexId), HalfedgeId>,
}

impl<'a, V: VertexAttributes, F: FaceAttributes> MeshBuilder<'a, V, F> {
    /// Start building into the submesh named `submesh` (created on demand)
    pub fn new(mesh: &'a mut Mesh<V, F>, submesh: &str) -> Self {
        let submesh = mesh.find_or_create_submesh(submesh);
        Self {
            mesh,
            submesh,
            vertices: Vec::new(),
            edges: AHashMap::new(),
        }
    }

    pub fn submesh(&self) -> SubmeshId {
        self.submesh
    }

    /// Add a vertex; returns its builder-local index
    pub fn add_vertex(&mut self, data: V) -> usize {
        let id = self.mesh.create_vertex(HalfedgeId::NONE, data);
        self.vertices.push(id);
        self.vertices.len() - 1
    }

    /// Add vertices at the given positions; returns the index of the first
    pub fn add_positions(&mut self, positions: &[Point]) -> usize {
        let first = self.vertices.len();
        for p in positions {
            self.add_vertex(V::from_position(*p));
        }
        first
    }

    /// Add a polygon without holes to the named surface
    pub fn add_polygon(&mut self, surface: &str, indices: &[usize]) -> Result<FaceId> {
        self.add_polygon_with_holes(surface, indices, &[])
    }

    /// Add a polygon to the named surface.
    ///
    /// The outer ring is counter-clockwise around the face normal; hole rings
    /// run clockwise.
    pub fn add_polygon_with_holes(
        &mut self,
        surface: &str,
        outer: &[usize],
        holes: &[Vec<usize>],
    ) -> Result<FaceId> {
        let rings: Vec<Vec<VertexId>> = std::iter::once(outer)
            .chain(holes.iter().map(|h| h.as_slice()))
            .map(|ring| self.resolve(ring))
            .collect::<Result<_>>()?;

        let positions: Vec<Point> = rings[0]
            .iter()
            .map(|&v| self.mesh.vertex(v).data.position())
            .collect();
        let normal = try_normalize(&newell_normal(positions.iter())).ok_or_else(|| {
            KernelError::precondition("add_polygon", "outer ring has zero area")
        })?;

        // Reject before touching the mesh so a failed call leaves it unchanged
        let mut seen = AHashMap::new();
        for ring in &rings {
            for i in 0..ring.len() {
                let key = (ring[i], ring[(i + 1) % ring.len()]);
                if self.edges.contains_key(&key) || seen.insert(key, ()).is_some() {
                    return Err(KernelError::NonManifold(format!(
                        "directed edge {} -> {} is used twice",
                        key.0, key.1
                    )));
                }
            }
        }

        let starts: Vec<HalfedgeId> = rings
            .iter()
            .map(|ring| self.create_ring(ring, &normal))
            .collect();
        let surface = self.mesh.find_or_create_surface(self.submesh, surface);
        let face = self
            .mesh
            .create_face(surface, starts[0], F::from_normal(normal));
        for &start in &starts[1..] {
            self.mesh.add_hole(face, start);
        }
        Ok(face)
    }

    fn resolve(&self, ring: &[usize]) -> Result<Vec<VertexId>> {
        if ring.len() < 3 {
            return Err(KernelError::precondition(
                "add_polygon",
                format!("ring needs at least 3 corners, got {}", ring.len()),
            ));
        }
        ring.iter()
            .map(|&i| {
                self.vertices.get(i).copied().ok_or_else(|| {
                    KernelError::precondition("add_polygon", format!("vertex index {} out of range", i))
                })
            })
            .collect()
    }

    fn create_ring(&mut self, ring: &[VertexId], normal: &nalgebra::Vector3<f64>) -> HalfedgeId {
        let n = ring.len();
        let ids: Vec<HalfedgeId> = ring
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let w = ring[(i + 1) % n];
                let partner = self.edges.get(&(w, v)).copied();
                let mut data = self.mesh.vertex(v).data.clone();
                data.set_normal(*normal);
                let h = self.mesh.create_halfedge_with(
                    partner,
                    HalfedgeId::NONE,
                    HalfedgeId::NONE,
                    v,
                    FaceId::NONE,
                    data,
                );
                self.edges.insert((v, w), h);
                h
            })
            .collect();
        for i in 0..n {
            let h = self.mesh.halfedge_mut(ids[i]);
            h.next = ids[(i + 1) % n];
            h.prev = ids[(i + n - 1) % n];
        }
        ids[0]
    }

    /// Finish the submesh, deleting vertices no polygon used
    pub fn finish(self) -> SubmeshId {
        let mut unused = 0;
        for &v in &self.vertices {
            let vertex = self.mesh.vertex_mut(v);
            if vertex.halfedge.is_none() {
                vertex.deleted = true;
                unused += 1;
            }
        }
        debug!(
            submesh = %self.submesh,
            vertices = self.vertices.len() - unused,
            halfedges = self.edges.len(),
            "built submesh"
        );
        self.submesh
    }
}

impl<V: VertexAttributes, F: FaceAttributes> Mesh<V, F> {
    /// Build a mesh with one submesh and one surface, both named `default`
    pub fn from_polygons(positions: &[Point], polygons: &[Vec<usize>]) -> Result<Self> {
        let mut mesh = Mesh::new();
        let mut builder = MeshBuilder::new(&mut mesh, "default");
        builder.add_positions(positions);
        for polygon in polygons {
            builder.add_polygon("default", polygon)?;
        }
        builder.finish();
        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::test_support::{cube, cube_positions};
    use crate::mesh::{FaceData, VertexData};

    #[test]
    fn test_cube_is_closed() {
        let mesh = cube();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.halfedge_total(), 24);
        assert_eq!(mesh.face_count(), 6);
        assert!(mesh.halfedges().all(|h| mesh.partner(h).is_some()));
        for h in mesh.halfedges() {
            let p = mesh.partner(h).unwrap();
            assert_eq!(mesh.origin(p), mesh.target(h));
        }
    }

    #[test]
    fn test_halfedges_carry_polygon_normal() {
        let mesh = cube();
        for f in mesh.faces() {
            let n = mesh.face(f).data.normal;
            for h in mesh.face_halfedges(f) {
                assert_eq!(mesh.halfedge(h).data.normal, Some(n));
            }
        }
    }

    #[test]
    fn test_duplicate_directed_edge_is_non_manifold() {
        let mut mesh: Mesh<VertexData, FaceData> = Mesh::new();
        let mut builder = MeshBuilder::new(&mut mesh, "bad");
        builder.add_positions(&cube_positions());
        builder.add_polygon("s", &[0, 1, 2, 3]).unwrap();
        let err = builder.add_polygon("s", &[0, 1, 5, 4]).unwrap_err();
        assert!(matches!(err, KernelError::NonManifold(_)));
        builder.finish();
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.halfedge_total(), 4);
    }

    #[test]
    fn test_rejects_short_and_degenerate_rings() {
        let mut mesh: Mesh = Mesh::new();
        let mut builder = MeshBuilder::new(&mut mesh, "bad");
        builder.add_positions(&[
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(2.0, 0.0, 0.0),
        ]);
        assert!(builder.add_polygon("s", &[0, 1]).is_err());
        assert!(builder.add_polygon("s", &[0, 1, 2]).is_err());
        assert!(builder.add_polygon("s", &[0, 1, 7]).is_err());
    }
}
