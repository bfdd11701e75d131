// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Ring, incidence and geometric queries

use super::attributes::VertexAttributes;
use super::entities::Halfedge;
use super::ids::{FaceId, HalfedgeId, SubmeshId, VertexId};
use super::store::Mesh;
use super::Scope;
use crate::geometry::{Point, Polygon, Segment};
use crate::utils::math::{newell_normal, try_normalize};
use nalgebra::Vector3;

/// Iterator over a halfedge ring, following `next` until the start comes back.
///
/// The walk is bounded by the arena length so a corrupted ring cannot loop
/// forever.
pub struct RingIter<'a, V> {
    halfedges: &'a [Halfedge<V>],
    start: HalfedgeId,
    current: HalfedgeId,
    remaining: usize,
}

impl<'a, V> Iterator for RingIter<'a, V> {
    type Item = HalfedgeId;

    fn next(&mut self) -> Option<HalfedgeId> {
        if self.remaining == 0 || self.current.is_none() {
            return None;
        }
        let h = self.current;
        self.remaining -= 1;
        let next = self.halfedges.get(h.index()).map_or(HalfedgeId::NONE, |e| e.next);
        self.current = if next == self.start {
            HalfedgeId::NONE
        } else {
            next
        };
        Some(h)
    }
}

impl<V: VertexAttributes, F> Mesh<V, F> {
    /// Halfedges of the ring containing `start`, beginning at `start`
    pub fn ring(&self, start: HalfedgeId) -> RingIter<'_, V> {
        RingIter {
            halfedges: &self.halfedges,
            start,
            current: start,
            remaining: self.halfedges.len(),
        }
    }

    /// Outer ring of a face
    #[track_caller]
    pub fn face_halfedges(&self, f: FaceId) -> RingIter<'_, V> {
        self.ring(self.face(f).halfedge)
    }

    /// Ring of the `index`-th hole of a face
    #[track_caller]
    pub fn hole_halfedges(&self, f: FaceId, index: usize) -> RingIter<'_, V> {
        self.ring(self.face(f).holes[index].halfedge)
    }

    /// Start halfedges of the outer ring followed by every hole ring
    #[track_caller]
    pub fn face_rings(&self, f: FaceId) -> Vec<HalfedgeId> {
        let face = self.face(f);
        std::iter::once(face.halfedge)
            .chain(face.holes.iter().map(|hole| hole.halfedge))
            .collect()
    }

    /// Every halfedge owned by a face, outer ring first
    #[track_caller]
    pub fn face_all_halfedges(&self, f: FaceId) -> Vec<HalfedgeId> {
        self.face_rings(f)
            .into_iter()
            .flat_map(|start| self.ring(start))
            .collect()
    }

    /// Number of halfedges on the outer ring
    #[track_caller]
    pub fn halfedge_count(&self, f: FaceId) -> usize {
        self.face_halfedges(f).count()
    }

    /// Outgoing halfedges around a vertex.
    ///
    /// Rotates through partners in both directions, so fans interrupted by a
    /// border are still enumerated completely.
    pub fn vertex_halfedges(&self, v: VertexId) -> Vec<HalfedgeId> {
        let start = match self.vertices.get(v.index()) {
            Some(vertex) if vertex.halfedge.is_some() => vertex.halfedge,
            _ => return Vec::new(),
        };
        let limit = self.halfedges.len();
        let link = |h: HalfedgeId| &self.halfedges[h.index()];

        let mut out = vec![start];
        let mut h = start;
        while out.len() <= limit {
            match link(link(h).prev).partner {
                Some(g) if g == start => return out,
                Some(g) => {
                    out.push(g);
                    h = g;
                }
                None => break,
            }
        }

        // Open fan: sweep the other way from the start
        let mut h = start;
        while out.len() <= limit {
            match link(h).partner {
                Some(p) => {
                    let g = link(p).next;
                    if g == start || out.contains(&g) {
                        break;
                    }
                    out.push(g);
                    h = g;
                }
                None => break,
            }
        }
        out
    }

    /// Position stored on the vertex
    #[track_caller]
    pub fn vertex_position(&self, v: VertexId) -> Point {
        self.vertex(v).data.position()
    }

    /// Position stored on the halfedge's own payload
    #[track_caller]
    pub fn halfedge_position(&self, h: HalfedgeId) -> Point {
        self.halfedge(h).data.position()
    }

    /// Directed edge from the origin to the target vertex
    #[track_caller]
    pub fn edge_segment(&self, h: HalfedgeId) -> Segment {
        Segment::new(
            self.vertex_position(self.origin(h)),
            self.vertex_position(self.target(h)),
        )
    }

    /// Vertex positions along the ring containing `start`
    pub fn ring_positions(&self, start: HalfedgeId) -> Vec<Point> {
        self.ring(start)
            .map(|h| self.vertex_position(self.origin(h)))
            .collect()
    }

    /// Vertex positions of a face's outer ring
    #[track_caller]
    pub fn face_positions(&self, f: FaceId) -> Vec<Point> {
        self.ring_positions(self.face(f).halfedge)
    }

    /// Unit Newell normal of the outer ring; falls back to the face payload for
    /// degenerate rings
    #[track_caller]
    pub fn face_normal(&self, f: FaceId) -> Vector3<f64>
    where
        F: super::FaceAttributes,
    {
        let positions = self.face_positions(f);
        try_normalize(&newell_normal(positions.iter())).unwrap_or_else(|| self.face(f).data.normal())
    }

    /// Average of the outer ring vertex positions
    #[track_caller]
    pub fn face_centroid(&self, f: FaceId) -> Point {
        let positions = self.face_positions(f);
        let sum = positions
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Point::from(sum / positions.len().max(1) as f64)
    }

    /// Area of the outer ring minus the holes
    #[track_caller]
    pub fn face_area(&self, f: FaceId) -> f64 {
        let face = self.face(f);
        let outer = newell_normal(self.ring_positions(face.halfedge).iter()).norm();
        let holes: f64 = face
            .holes
            .iter()
            .map(|hole| newell_normal(self.ring_positions(hole.halfedge).iter()).norm())
            .sum();
        (outer - holes) * 0.5
    }

    /// Face geometry as a polygon; `None` for a degenerate outer ring
    #[track_caller]
    pub fn face_polygon(&self, f: FaceId) -> Option<Polygon> {
        let face = self.face(f);
        let holes = face
            .holes
            .iter()
            .map(|hole| self.ring_positions(hole.halfedge))
            .collect();
        Polygon::with_holes(self.ring_positions(face.halfedge), holes)
    }

    /// Faces of a submesh
    #[track_caller]
    pub fn submesh_faces(&self, m: SubmeshId) -> &[FaceId] {
        &self.submesh(m).faces
    }

    /// Live faces within a scope
    pub fn scope_faces(&self, scope: Scope) -> Vec<FaceId> {
        match scope {
            Scope::All => self.faces().collect(),
            Scope::Submesh(m) => self.submesh_faces(m).to_vec(),
        }
    }

    /// Whether a face falls inside a scope
    pub fn in_scope(&self, f: FaceId, scope: Scope) -> bool {
        match scope {
            Scope::All => true,
            Scope::Submesh(m) => self.faces[f.index()].submesh == m,
        }
    }

    /// Enclosed volume (divergence theorem); meaningful for closed meshes
    pub fn volume(&self, scope: Scope) -> f64 {
        let mut total = 0.0;
        for f in self.scope_faces(scope) {
            for start in self.face_rings(f) {
                let positions = self.ring_positions(start);
                if let Some(p) = positions.first() {
                    total += p.coords.dot(&newell_normal(positions.iter()));
                }
            }
        }
        total / 6.0
    }
}

#[cfg(test)]
mod tests {
    use crate::mesh::test_support::{cube, square_with_hole};
    use crate::mesh::Scope;
    use approx::assert_relative_eq;

    #[test]
    fn test_ring_closes() {
        let mesh = cube();
        for f in mesh.faces() {
            assert_eq!(mesh.halfedge_count(f), 4);
            let first = mesh.face_halfedges(f).next().unwrap();
            let last = mesh.face_halfedges(f).last().unwrap();
            assert_eq!(mesh.next(last), first);
        }
    }

    #[test]
    fn test_vertex_halfedges_closed_fan() {
        let mesh = cube();
        for v in mesh.vertices() {
            let out = mesh.vertex_halfedges(v);
            assert_eq!(out.len(), 3);
            assert!(out.iter().all(|&h| mesh.origin(h) == v));
        }
    }

    #[test]
    fn test_vertex_halfedges_open_fan() {
        let mut mesh = cube();
        let top = mesh
            .faces()
            .find(|&f| mesh.face_normal(f).z > 0.5)
            .unwrap();
        mesh.delete_face(top);
        for v in mesh.vertices() {
            let out = mesh.vertex_halfedges(v);
            let expected = if mesh.vertex_position(v).z > 0.5 { 2 } else { 3 };
            assert_eq!(out.len(), expected);
        }
    }

    #[test]
    fn test_face_geometry() {
        let mesh = square_with_hole();
        let f = mesh.faces().next().unwrap();
        assert_relative_eq!(mesh.face_area(f), 8.0, epsilon = 1e-12);
        assert_relative_eq!(mesh.face_normal(f).z, 1.0, epsilon = 1e-12);
        let polygon = mesh.face_polygon(f).unwrap();
        assert_eq!(polygon.holes.len(), 1);
        assert_relative_eq!(polygon.area(), 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cube_volume() {
        let mesh = cube();
        assert_relative_eq!(mesh.volume(Scope::All), 1.0, epsilon = 1e-12);
    }
}
