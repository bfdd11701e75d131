// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Edge and face splitting

use crate::error::{KernelError, Result};
use crate::geometry::{Location, Point, Polygon};
use crate::mesh::{FaceAttributes, FaceId, HalfedgeId, Mesh, VertexAttributes, VertexId};
use crate::utils::math::points_eq;
use tracing::debug;

/// Where to split an edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SplitAt {
    /// Parameter along the halfedge, strictly between 0 (origin) and 1 (target)
    Parameter(f64),
    /// A point on the edge, strictly between its endpoints
    Point(Point),
}

/// Result of [`Mesh::split_edge`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeSplit {
    /// The inserted vertex
    pub vertex: VertexId,
    /// New halfedge following the split halfedge
    pub halfedge: HalfedgeId,
    /// New halfedge following the old partner; `None` on a border edge
    pub partner_halfedge: Option<HalfedgeId>,
}

impl<V: VertexAttributes, F: FaceAttributes> Mesh<V, F> {
    /// Split the edge of `h` by inserting a vertex.
    ///
    /// `h` keeps its origin and now ends at the new vertex; a new halfedge from
    /// the new vertex to the old target follows it. The partner side is split
    /// the same way and both pairs stay partnered. Payloads are interpolated
    /// and snapped to the exact cut point.
    #[track_caller]
    pub fn split_edge(&mut self, h: HalfedgeId, at: SplitAt) -> Result<EdgeSplit> {
        let segment = self.edge_segment(h);
        let (t, point) = match at {
            SplitAt::Parameter(t) => (t, segment.point_at(t)),
            SplitAt::Point(p) => (segment.parameter_of(&p), p),
        };
        if !(t > 0.0 && t < 1.0)
            || points_eq(&point, &segment.start)
            || points_eq(&point, &segment.end)
        {
            return Err(KernelError::precondition(
                "split_edge",
                format!("split point of {} must lie strictly inside the edge (t = {})", h, t),
            ));
        }

        let a = self.origin(h);
        let b = self.target(h);
        let old_next = self.next(h);
        let face = self.halfedge_face(h);
        let partner = self.partner(h);

        let mut vertex_data = V::lerp(&self.vertex(a).data, &self.vertex(b).data, t);
        vertex_data.set_position(point);
        let m = self.create_vertex(HalfedgeId::NONE, vertex_data);

        let mut data = V::lerp(&self.halfedge(h).data, &self.halfedge(old_next).data, t);
        data.set_position(point);
        let n = self.create_halfedge_with(None, old_next, h, m, face, data);
        self.halfedge_mut(h).next = n;
        self.halfedge_mut(old_next).prev = n;

        let partner_halfedge = match partner {
            Some(p) => {
                let p_next = self.next(p);
                let p_face = self.halfedge_face(p);
                let mut data = V::lerp(&self.halfedge(p).data, &self.halfedge(p_next).data, 1.0 - t);
                data.set_position(point);
                // Pairs become h <-> q and p <-> n
                let q = self.create_halfedge_with(Some(h), p_next, p, m, p_face, data);
                self.halfedge_mut(p).next = q;
                self.halfedge_mut(p_next).prev = q;
                self.halfedge_mut(n).partner = Some(p);
                self.halfedge_mut(p).partner = Some(n);
                Some(q)
            }
            None => None,
        };

        self.vertex_mut(m).halfedge = n;
        Ok(EdgeSplit {
            vertex: m,
            halfedge: n,
            partner_halfedge,
        })
    }

    /// Split a face along the chord between the origins of `ha` and `hb`.
    ///
    /// Both halfedges must be distinct, non-adjacent and on the outer ring of
    /// the same face. The new face owns the ring from `hb` up to (excluding)
    /// `ha` and copies the face payload and surface. Holes move to the piece
    /// that contains them.
    #[track_caller]
    pub fn split_face(&mut self, ha: HalfedgeId, hb: HalfedgeId) -> Result<FaceId> {
        let f = self.halfedge_face(ha);
        if self.halfedge_face(hb) != f {
            return Err(KernelError::precondition(
                "split_face",
                format!("{} and {} belong to different faces", ha, hb),
            ));
        }
        if ha == hb || self.next(ha) == hb || self.next(hb) == ha {
            return Err(KernelError::precondition(
                "split_face",
                format!("{} and {} are equal or adjacent", ha, hb),
            ));
        }
        let outer: Vec<HalfedgeId> = self.face_halfedges(f).collect();
        if !outer.contains(&ha) || !outer.contains(&hb) {
            return Err(KernelError::precondition(
                "split_face",
                format!("{} and {} must both be on the outer ring of {}", ha, hb, f),
            ));
        }

        let (e1, e2) = self.connect(ha, hb, Some(f), Some(f))?;
        let (surface, submesh, data, holes) = {
            let face = self.face(f);
            (face.surface, face.submesh, face.data.clone(), face.holes.clone())
        };
        let g = if surface.is_some() {
            self.create_face(surface, e2, data)
        } else {
            self.create_face_in(submesh, e2, data)
        };
        self.face_mut(f).halfedge = e1;

        if !holes.is_empty() {
            let piece = Polygon::new(self.ring_positions(e2));
            let (kept, moved): (Vec<_>, Vec<_>) = holes.into_iter().partition(|hole| {
                let probe = self.vertex_position(self.origin(hole.halfedge));
                piece
                    .as_ref()
                    .map_or(true, |p| p.locate_coplanar(&probe) == Location::Outside)
            });
            self.face_mut(f).holes = kept;
            for hole in moved {
                self.add_hole(g, hole.halfedge);
            }
        }

        debug!(face = %f, new_face = %g, "split face");
        Ok(g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::test_support::{cube, square, square_with_hole};
    use approx::assert_relative_eq;

    #[test]
    fn test_split_edge_links_both_sides() {
        let mut mesh = cube();
        let h = mesh.halfedges().next().unwrap();
        let p = mesh.partner(h).unwrap();
        let b = mesh.target(h);
        let expected = mesh.edge_segment(h).point_at(0.25);
        let split = mesh.split_edge(h, SplitAt::Parameter(0.25)).unwrap();

        assert_eq!(mesh.next(h), split.halfedge);
        assert_eq!(mesh.target(h), split.vertex);
        assert_eq!(mesh.target(split.halfedge), b);
        let q = split.partner_halfedge.unwrap();
        assert_eq!(mesh.next(p), q);
        assert_eq!(mesh.partner(h), Some(q));
        assert_eq!(mesh.partner(q), Some(h));
        assert_eq!(mesh.partner(p), Some(split.halfedge));
        assert_eq!(mesh.partner(split.halfedge), Some(p));

        assert_relative_eq!(mesh.vertex_position(split.vertex), expected);
        assert_relative_eq!(mesh.halfedge_position(q), mesh.vertex_position(split.vertex));
        assert_eq!(mesh.halfedge_count(mesh.halfedge_face(h)), 5);
        assert_eq!(mesh.halfedge_count(mesh.halfedge_face(p)), 5);
    }

    #[test]
    fn test_split_edge_rejects_endpoints() {
        let mut mesh = square();
        let h = mesh.halfedges().next().unwrap();
        assert!(mesh.split_edge(h, SplitAt::Parameter(0.0)).is_err());
        assert!(mesh.split_edge(h, SplitAt::Parameter(1.5)).is_err());
        let start = mesh.edge_segment(h).start;
        assert!(mesh.split_edge(h, SplitAt::Point(start)).is_err());
    }

    #[test]
    fn test_split_border_edge() {
        let mut mesh = square();
        let h = mesh.halfedges().next().unwrap();
        let split = mesh.split_edge(h, SplitAt::Parameter(0.5)).unwrap();
        assert!(split.partner_halfedge.is_none());
        assert!(mesh.halfedge(split.halfedge).is_border());
    }

    #[test]
    fn test_successive_splits_match_sorted_insertion() {
        let mut mesh = square();
        let h = mesh.halfedges().next().unwrap();
        let segment = mesh.edge_segment(h);
        let first = mesh.split_edge(h, SplitAt::Parameter(0.5)).unwrap();
        mesh.split_edge(h, SplitAt::Parameter(0.5)).unwrap();
        mesh.split_edge(first.halfedge, SplitAt::Parameter(0.5)).unwrap();

        let f = mesh.halfedge_face(h);
        let along: Vec<f64> = mesh
            .ring(h)
            .take(5)
            .map(|g| segment.parameter_of(&mesh.vertex_position(mesh.origin(g))))
            .collect();
        for (got, want) in along.iter().zip([0.0, 0.25, 0.5, 0.75, 1.0]) {
            assert_relative_eq!(*got, want, epsilon = 1e-12);
        }
        assert_eq!(mesh.halfedge_count(f), 7);
    }

    #[test]
    fn test_split_face_counts() {
        let mut mesh = cube();
        let f = mesh.faces().next().unwrap();
        let ring: Vec<HalfedgeId> = mesh.face_halfedges(f).collect();
        let g = mesh.split_face(ring[0], ring[2]).unwrap();
        assert_eq!(mesh.halfedge_count(f) + mesh.halfedge_count(g), 6);
        assert_eq!(mesh.face(g).surface, mesh.face(f).surface);
        assert!(mesh.face_halfedges(g).all(|h| mesh.halfedge_face(h) == g));
        assert!(mesh.face_halfedges(f).all(|h| mesh.halfedge_face(h) == f));
        assert!(mesh.split_face(ring[0], ring[1]).is_err());
    }

    #[test]
    fn test_split_face_moves_holes() {
        let mut mesh = square_with_hole();
        let f = mesh.faces().next().unwrap();
        let ring: Vec<HalfedgeId> = mesh.face_halfedges(f).collect();
        let s1 = mesh.split_edge(ring[0], SplitAt::Parameter(0.5)).unwrap();
        let s2 = mesh.split_edge(ring[1], SplitAt::Parameter(0.5)).unwrap();

        // Chord from (1.5, 0) to (3, 1.5) cuts off a corner; the hole goes
        // with the larger piece
        let g = mesh.split_face(s1.halfedge, s2.halfedge).unwrap();
        assert!(mesh.face(f).holes.is_empty());
        assert_eq!(mesh.face(g).holes.len(), 1);
        let hole = mesh.face(g).holes[0].halfedge;
        assert!(mesh.ring(hole).all(|h| mesh.halfedge_face(h) == g));
        assert_relative_eq!(mesh.face_area(f), 1.125, epsilon = 1e-12);
        assert_relative_eq!(mesh.face_area(g), 6.875, epsilon = 1e-12);
    }
}
