// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Cut and close phases shared by clip and split

use super::classify::{Classification, Side};
use crate::error::Result;
use crate::geometry::{
    point_in_polygon_2d, signed_area_2d, Intersect, Intersection, Plane, Projection2D,
};
use crate::mesh::{FaceAttributes, FaceId, HalfedgeId, Mesh, Scope, VertexAttributes};
use crate::topology::SplitAt;
use crate::utils::math::{float_eq0, try_normalize};
use nalgebra::{Point2, Vector3};
use tracing::{debug, warn};

/// Faces on each side after cutting
#[derive(Debug, Default)]
pub(crate) struct CutOutcome {
    pub inside: Vec<FaceId>,
    pub outside: Vec<FaceId>,
    pub split_edges: usize,
    pub split_faces: usize,
}

/// Split every straddling edge and face in `scope` so that no face has
/// vertices on both sides of the plane, then sort the faces by side.
pub(crate) fn cut<V: VertexAttributes, F: FaceAttributes>(
    mesh: &mut Mesh<V, F>,
    plane: &Plane,
    scope: Scope,
    sides: &Classification,
) -> Result<CutOutcome> {
    let faces = mesh.scope_faces(scope);
    let mut outcome = CutOutcome::default();

    let epoch = mesh.next_epoch();
    for &f in &faces {
        for h in mesh.face_all_halfedges(f) {
            if !mesh.mark_halfedge(h, epoch) {
                continue;
            }
            if let Some(p) = mesh.partner(h) {
                mesh.mark_halfedge(p, epoch);
            }
            let from = sides.side(mesh.origin(h));
            let to = sides.side(mesh.target(h));
            if from == Side::On || to == Side::On || from == to {
                continue;
            }
            let point = match mesh.edge_segment(h).intersection(plane) {
                Intersection::Point(p) => p,
                other => {
                    warn!(halfedge = %h, result = ?other, "straddling edge does not cross the plane at a point");
                    continue;
                }
            };
            let split = mesh.split_edge(h, SplitAt::Point(point))?;
            mesh.mark_halfedge(split.halfedge, epoch);
            if let Some(q) = split.partner_halfedge {
                mesh.mark_halfedge(q, epoch);
            }
            outcome.split_edges += 1;
        }
    }

    for &f in &faces {
        outcome.split_faces += split_straddling_face(mesh, plane, sides, f)?;
    }

    for f in mesh.scope_faces(scope) {
        let mut inside = false;
        let mut outside = false;
        for h in mesh.face_all_halfedges(f) {
            match sides.side(mesh.origin(h)) {
                Side::Inside => inside = true,
                Side::Outside => outside = true,
                Side::On => {}
            }
        }
        let keep = if outside {
            if inside {
                warn!(face = %f, "face still straddles the plane after cutting");
            }
            false
        } else if inside {
            true
        } else {
            // Lies in the plane
            mesh.face_normal(f).dot(&plane.normal) > 0.0
        };
        if keep {
            outcome.inside.push(f);
        } else {
            outcome.outside.push(f);
        }
    }

    debug!(
        split_edges = outcome.split_edges,
        split_faces = outcome.split_faces,
        inside = outcome.inside.len(),
        outside = outcome.outside.len(),
        "cut mesh"
    );
    Ok(outcome)
}

/// Ring positions where the side changes across a run of on-plane vertices.
///
/// Each returned index is the run vertex next to the outside neighbor. Runs
/// whose neighbors lie on the same side only touch the plane and are skipped.
fn transitions(sides: &[Side]) -> Vec<usize> {
    let n = sides.len();
    let start = match sides.iter().position(|&s| s != Side::On) {
        Some(i) => i,
        None => return Vec::new(),
    };
    let at = |k: usize| sides[(start + k) % n];

    let mut out = Vec::new();
    let mut k = 0;
    while k < n {
        if at(k) != Side::On {
            k += 1;
            continue;
        }
        let first = k;
        while at(k) == Side::On {
            k += 1;
        }
        let before = at(first + n - 1);
        let after = at(k);
        if before != after {
            let rep = if before == Side::Outside { first } else { k - 1 };
            out.push((start + rep) % n);
        }
    }
    out
}

/// Split one face along its on-plane transition vertices; returns the number
/// of faces created
fn split_straddling_face<V: VertexAttributes, F: FaceAttributes>(
    mesh: &mut Mesh<V, F>,
    plane: &Plane,
    sides: &Classification,
    f: FaceId,
) -> Result<usize> {
    let direction = match try_normalize(&plane.normal.cross(&mesh.face_normal(f))) {
        Some(d) => d,
        None => return Ok(0),
    };

    let mut crossings: Vec<(f64, HalfedgeId)> = Vec::new();
    for start in mesh.face_rings(f) {
        let ring: Vec<HalfedgeId> = mesh.ring(start).collect();
        let ring_sides: Vec<Side> = ring.iter().map(|&h| sides.side(mesh.origin(h))).collect();
        for i in transitions(&ring_sides) {
            let h = ring[i];
            let along = direction.dot(&mesh.vertex_position(mesh.origin(h)).coords);
            crossings.push((along, h));
        }
    }
    if crossings.is_empty() {
        return Ok(0);
    }
    if crossings.len() % 2 != 0 {
        warn!(face = %f, crossings = crossings.len(), "odd number of plane crossings; face left uncut");
        return Ok(0);
    }
    // Consecutive crossings along the cut line bound the pieces of the chord
    // that run through the face
    crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut created = 0;
    for pair in crossings.chunks(2) {
        let (ha, hb) = (pair[0].1, pair[1].1);
        let face = mesh.halfedge_face(ha);
        if mesh.halfedge_face(hb) != face {
            warn!(face = %f, "crossing pair ended up in different faces; skipped");
            continue;
        }
        let rings = mesh.face_rings(face);
        let ring_of = |h: HalfedgeId| {
            rings
                .iter()
                .position(|&start| mesh.ring(start).any(|g| g == h))
                .unwrap_or(0)
        };
        let (ra, rb) = (ring_of(ha), ring_of(hb));
        if ra == rb {
            if ra != 0 {
                warn!(face = %face, "both crossings lie on one hole ring; skipped");
                continue;
            }
            if mesh.next(ha) == hb || mesh.next(hb) == ha {
                continue;
            }
            mesh.split_face(ha, hb)?;
            created += 1;
        } else {
            // Bridge the rings; the absorbed hole record goes away
            let absorbed = rings[if rb != 0 { rb } else { ra }];
            mesh.connect(ha, hb, None, None)?;
            mesh.face_mut(face).holes.retain(|hole| hole.halfedge != absorbed);
        }
    }
    Ok(created)
}

/// A border loop left by the cut, seen from the cap side
struct CapLoop {
    border: Vec<HalfedgeId>,
    ring: Vec<Point2<f64>>,
    area: f64,
}

/// Close every on-plane border loop in `scope`.
///
/// Loops whose cap winds counter-clockwise around `cap_normal` become cap
/// faces; the others are holes and go to the smallest outer loop that
/// contains their first point. That association is a heuristic which can
/// misplace holes in strongly non-convex configurations.
pub(crate) fn close<V: VertexAttributes, F: FaceAttributes>(
    mesh: &mut Mesh<V, F>,
    scope: Scope,
    sides: &Classification,
    cap_normal: &Vector3<f64>,
    surface_name: &str,
) -> Result<Vec<FaceId>> {
    let projection = Projection2D::from_normal(cap_normal);
    let mut outers: Vec<CapLoop> = Vec::new();
    let mut holes: Vec<CapLoop> = Vec::new();

    for border in mesh.border_loops(scope)? {
        if !border.iter().all(|&h| sides.side(mesh.origin(h)) == Side::On) {
            continue;
        }
        // The cap runs against the border
        let positions: Vec<_> = border
            .iter()
            .rev()
            .map(|&h| mesh.vertex_position(mesh.origin(h)))
            .collect();
        let ring = projection.project_ring(&positions);
        let area = signed_area_2d(&ring);
        if float_eq0(area) {
            warn!(halfedges = border.len(), "border loop has no area; left open");
            continue;
        }
        let cap = CapLoop { border, ring, area };
        if area > 0.0 {
            outers.push(cap);
        } else {
            holes.push(cap);
        }
    }

    let mut assigned: Vec<Vec<Vec<HalfedgeId>>> = vec![Vec::new(); outers.len()];
    for hole in holes {
        let probe = hole.ring[0];
        let owner = outers
            .iter()
            .enumerate()
            .filter(|(_, outer)| point_in_polygon_2d(&probe, &outer.ring))
            .min_by(|a, b| a.1.area.total_cmp(&b.1.area))
            .map(|(i, _)| i);
        match owner {
            Some(i) => assigned[i].push(hole.border),
            None => warn!(
                halfedges = hole.border.len(),
                "hole loop has no enclosing outer loop; left open"
            ),
        }
    }

    let mut caps = Vec::with_capacity(outers.len());
    for (outer, hole_loops) in outers.into_iter().zip(assigned) {
        let submesh = mesh.face(mesh.halfedge_face(outer.border[0])).submesh;
        if submesh.is_none() {
            warn!("border loop belongs to a face without a submesh; left open");
            continue;
        }
        let surface = mesh.find_or_create_surface(submesh, surface_name);
        let face = mesh.create_border_with_holes_face(&outer.border, &hole_loops, surface)?;
        debug!(face = %face, holes = hole_loops.len(), "created cap face");
        caps.push(face);
    }
    Ok(caps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::mesh::test_support::square;
    use approx::assert_relative_eq;
    use Side::{Inside as I, On as O, Outside as X};

    #[test]
    fn test_transitions_single_vertices() {
        // I I O X X O
        assert_eq!(transitions(&[I, I, O, X, X, O]), vec![2, 5]);
    }

    #[test]
    fn test_transitions_run_picks_vertex_next_to_outside() {
        // Edge lying in the plane between inside and outside
        assert_eq!(transitions(&[I, O, O, X, O]), vec![2, 4]);
        assert_eq!(transitions(&[X, O, O, I, O]), vec![1, 4]);
    }

    #[test]
    fn test_transitions_touching_is_ignored() {
        assert!(transitions(&[I, I, O, I]).is_empty());
        assert!(transitions(&[X, O, O, X]).is_empty());
        assert!(transitions(&[O, O, O]).is_empty());
    }

    #[test]
    fn test_transitions_wraparound_run() {
        // The run O(4), O(0) wraps around the ring start
        assert_eq!(transitions(&[O, X, X, I, O]), vec![0]);
    }

    #[test]
    fn test_close_leaves_hole_without_outer_loop_open() {
        let mut mesh = square();
        let plane = Plane::new(Point::origin(), Vector3::z()).unwrap();
        let sides = Classification::classify(&mesh, &plane, Scope::All);

        // Seen from +z the cap of the square's border winds clockwise
        let caps = close(&mut mesh, Scope::All, &sides, &Vector3::z(), "cap").unwrap();
        assert!(caps.is_empty());
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.border_loops(Scope::All).unwrap().len(), 1);

        let caps = close(&mut mesh, Scope::All, &sides, &-Vector3::z(), "cap").unwrap();
        assert_eq!(caps.len(), 1);
        assert_relative_eq!(mesh.face_normal(caps[0]).z, -1.0, epsilon = 1e-12);
        assert!(mesh.border_loops(Scope::All).unwrap().is_empty());
    }
}
