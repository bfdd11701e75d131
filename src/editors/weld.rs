// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Welding coincident, oppositely oriented faces
//!
//! Two faces that lie on top of each other with opposite windings are removed
//! and the faces around them are stitched together directly: each outer
//! neighbor of the first face is partnered with the matching outer neighbor of
//! the second one, and the coincident corner vertices are merged.

use crate::error::{KernelError, Result};
use crate::geometry::Point;
use crate::mesh::{FaceAttributes, FaceId, HalfedgeId, Mesh, PackMap, VertexAttributes, VertexId};
use crate::utils::math::{float_eq, points_eq};
use tracing::{debug, info};

const OPERATION: &str = "weld";

/// Weld two faces and pack the mesh
pub fn weld<V: VertexAttributes, F: FaceAttributes>(
    mesh: &mut Mesh<V, F>,
    face_a: FaceId,
    face_b: FaceId,
) -> Result<PackMap> {
    weld_unpacked(mesh, face_a, face_b)?;
    Ok(mesh.pack())
}

/// Weld two faces, leaving deleted entities in place so other ids stay valid
pub fn weld_unpacked<V: VertexAttributes, F: FaceAttributes>(
    mesh: &mut Mesh<V, F>,
    face_a: FaceId,
    face_b: FaceId,
) -> Result<()> {
    let offset = check_weldable(mesh, face_a, face_b)?;
    let ring_a: Vec<HalfedgeId> = mesh.face_halfedges(face_a).collect();
    let ring_b: Vec<HalfedgeId> = mesh.face_halfedges(face_b).collect();
    let n = ring_a.len();

    // Fans are walked through partners, so gather them before unlinking
    let merges: Vec<(VertexId, VertexId, Vec<HalfedgeId>)> = ring_a
        .iter()
        .enumerate()
        .filter_map(|(i, &a)| {
            let keep = mesh.origin(a);
            let gone = mesh.origin(ring_b[(offset + n - i) % n]);
            (keep != gone).then(|| (gone, keep, mesh.vertex_halfedges(gone)))
        })
        .collect();

    // b_{(k - i - 1) mod n} runs along a_i in the opposite direction
    let mut pairs = Vec::with_capacity(n);
    for (i, &a) in ring_a.iter().enumerate() {
        let b = ring_b[(offset + 2 * n - i - 1) % n];
        let outer_a = mesh.partner(a);
        let outer_b = mesh.partner(b);
        mesh.halfedge_mut(a).partner = None;
        mesh.halfedge_mut(b).partner = None;
        if let Some(p) = outer_a {
            mesh.halfedge_mut(p).partner = None;
        }
        if let Some(p) = outer_b {
            mesh.halfedge_mut(p).partner = None;
        }
        pairs.push((outer_a, outer_b));
    }

    let merged = merges.len();
    for (gone, keep, outgoing) in merges {
        merge_vertex(mesh, gone, keep, &outgoing);
    }

    for (i, &(outer_a, outer_b)) in pairs.iter().enumerate() {
        if let (Some(pa), Some(pb)) = (outer_a, outer_b) {
            mesh.halfedge_mut(pa).partner = Some(pb);
            mesh.halfedge_mut(pb).partner = Some(pa);
        }
        // Move the corner's outgoing halfedge off the face about to go
        let corner = mesh.origin(ring_a[i]);
        let outgoing = outer_b.or_else(|| outer_a.map(|pa| mesh.next(pa)));
        if let Some(h) = outgoing {
            mesh.vertex_mut(corner).halfedge = h;
        }
    }

    mesh.delete_face(face_a);
    mesh.delete_face(face_b);
    debug!(face_a = %face_a, face_b = %face_b, corners = n, merged, "welded faces");
    Ok(())
}

/// Check every weld precondition; returns the ring offset `k` with
/// `corner_b[(k - i) mod n] == corner_a[i]`
fn check_weldable<V: VertexAttributes, F: FaceAttributes>(
    mesh: &Mesh<V, F>,
    face_a: FaceId,
    face_b: FaceId,
) -> Result<usize> {
    let (a, b) = (mesh.try_face(face_a)?, mesh.try_face(face_b)?);
    if face_a == face_b {
        return Err(KernelError::precondition(OPERATION, "cannot weld a face to itself"));
    }
    if !a.holes.is_empty() || !b.holes.is_empty() {
        return Err(KernelError::precondition(OPERATION, "faces with holes cannot be welded"));
    }
    let (na, nb) = (mesh.halfedge_count(face_a), mesh.halfedge_count(face_b));
    if na != nb {
        return Err(KernelError::precondition(
            OPERATION,
            format!("halfedge counts differ ({} vs {})", na, nb),
        ));
    }
    if !float_eq(mesh.face_normal(face_a).dot(&mesh.face_normal(face_b)), -1.0) {
        return Err(KernelError::precondition(OPERATION, "faces are not oppositely oriented"));
    }
    matching_offset(&mesh.face_positions(face_a), &mesh.face_positions(face_b))
        .ok_or_else(|| KernelError::precondition(OPERATION, "face corners do not coincide"))
}

/// Offset `k` such that `q[(k - i) mod n]` coincides with `p[i]` for all `i`
fn matching_offset(p: &[Point], q: &[Point]) -> Option<usize> {
    let n = p.len();
    if n == 0 || q.len() != n {
        return None;
    }
    (0..n).find(|&k| (0..n).all(|i| points_eq(&p[i], &q[(k + n - i) % n])))
}

/// Point the outgoing halfedges of `gone` at `keep` and delete `gone`
fn merge_vertex<V: VertexAttributes, F: FaceAttributes>(
    mesh: &mut Mesh<V, F>,
    gone: VertexId,
    keep: VertexId,
    outgoing: &[HalfedgeId],
) {
    for &h in outgoing {
        mesh.halfedge_mut(h).vertex = keep;
    }
    let vertex = mesh.vertex_mut(gone);
    vertex.halfedge = HalfedgeId::NONE;
    vertex.deleted = true;
}

/// Pairs of hole-free faces with coincident corners and opposite normals
pub fn find_coincident_faces<V: VertexAttributes, F: FaceAttributes>(mesh: &Mesh<V, F>) -> Vec<(FaceId, FaceId)> {
    let mut candidates: Vec<(FaceId, Point, Vec<Point>)> = mesh
        .faces()
        .filter(|&f| mesh.face(f).holes.is_empty())
        .map(|f| (f, mesh.face_centroid(f), mesh.face_positions(f)))
        .collect();
    candidates.sort_by(|a, b| a.1.x.total_cmp(&b.1.x));

    let mut used = vec![false; candidates.len()];
    let mut pairs = Vec::new();
    for i in 0..candidates.len() {
        if used[i] {
            continue;
        }
        let (fa, ca, pa) = (candidates[i].0, candidates[i].1, &candidates[i].2);
        for j in i + 1..candidates.len() {
            let (fb, cb, pb) = (candidates[j].0, candidates[j].1, &candidates[j].2);
            if !float_eq(ca.x, cb.x) {
                break;
            }
            if used[j] || !points_eq(&ca, &cb) {
                continue;
            }
            let opposite = float_eq(mesh.face_normal(fa).dot(&mesh.face_normal(fb)), -1.0);
            if opposite && matching_offset(pa, pb).is_some() {
                used[i] = true;
                used[j] = true;
                pairs.push((fa, fb));
                break;
            }
        }
    }
    pairs
}

/// Weld every coincident face pair; returns the number of welds
pub fn weld_coincident<V: VertexAttributes, F: FaceAttributes>(mesh: &mut Mesh<V, F>) -> Result<usize> {
    let pairs = find_coincident_faces(mesh);
    for &(a, b) in &pairs {
        weld_unpacked(mesh, a, b)?;
    }
    if !pairs.is_empty() {
        mesh.pack();
    }
    info!(welds = pairs.len(), "welded coincident faces");
    Ok(pairs.len())
}
