// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Plane splitting into two submeshes

use super::classify::Classification;
use super::cut::{close, cut};
use crate::error::{KernelError, Result};
use crate::geometry::Plane;
use crate::mesh::{
    FaceAttributes, FaceId, HalfedgeId, Mesh, Scope, SubmeshId, VertexAttributes, VertexId,
};
use ahash::{AHashMap, AHashSet};
use serde::Serialize;
use tracing::{debug, info};

/// Surface used for faces that had none before the split
const FALLBACK_SURFACE: &str = "default";

/// Summary of a split; ids are valid in the packed mesh
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitReport {
    /// Submesh holding the inside part, `NONE` when unchanged
    pub submesh_a: SubmeshId,
    /// Submesh holding the outside part, `NONE` when unchanged
    pub submesh_b: SubmeshId,
    pub faces_a: usize,
    pub faces_b: usize,
    pub split_edges: usize,
    pub split_faces: usize,
    pub caps_a: Vec<FaceId>,
    pub caps_b: Vec<FaceId>,
}

impl SplitReport {
    /// Report for a plane that does not separate the mesh
    pub fn unchanged() -> Self {
        Self {
            submesh_a: SubmeshId::NONE,
            submesh_b: SubmeshId::NONE,
            faces_a: 0,
            faces_b: 0,
            split_edges: 0,
            split_faces: 0,
            caps_a: Vec::new(),
            caps_b: Vec::new(),
        }
    }

    pub fn is_unchanged(&self) -> bool {
        self.submesh_a.is_none() && self.submesh_b.is_none()
    }
}

/// Split the whole mesh; the inside goes to `submesh_a`, the outside to
/// `submesh_b`, and both sides are capped in `surface_name`
pub fn split<V: VertexAttributes, F: FaceAttributes>(
    mesh: &mut Mesh<V, F>,
    plane: &Plane,
    submesh_a: &str,
    submesh_b: &str,
    surface_name: &str,
) -> Result<SplitReport> {
    split_scoped(mesh, plane, submesh_a, submesh_b, surface_name, Scope::All)
}

/// Split only the faces in `scope`
pub fn split_scoped<V: VertexAttributes, F: FaceAttributes>(
    mesh: &mut Mesh<V, F>,
    plane: &Plane,
    submesh_a: &str,
    submesh_b: &str,
    surface_name: &str,
    scope: Scope,
) -> Result<SplitReport> {
    if submesh_a == submesh_b {
        return Err(KernelError::precondition(
            "split",
            format!("both sides target submesh '{}'", submesh_a),
        ));
    }
    let sides = Classification::classify(mesh, plane, scope);
    if !sides.any_inside() || !sides.any_outside() {
        info!("split plane does not separate the mesh");
        return Ok(SplitReport::unchanged());
    }

    let outcome = cut(mesh, plane, scope, &sides)?;
    let a = mesh.find_or_create_submesh(submesh_a);
    let b = mesh.find_or_create_submesh(submesh_b);

    let mut sources = AHashSet::new();
    for &f in &outcome.inside {
        sources.insert(mesh.face(f).submesh);
        reassign(mesh, f, a);
    }
    for &f in &outcome.outside {
        sources.insert(mesh.face(f).submesh);
        reassign(mesh, f, b);
    }

    let seam = disconnect(mesh, &outcome.inside, &outcome.outside);
    let duplicated = duplicate_seam_vertices(mesh, &outcome.inside, &outcome.outside);
    debug!(seam, duplicated, "separated split sides");

    for m in sources {
        if m.is_some() && m != a && m != b {
            drop_emptied(mesh, m);
        }
    }

    let caps_a = close(mesh, Scope::Submesh(a), &sides, &plane.normal, surface_name)?;
    let caps_b = close(mesh, Scope::Submesh(b), &sides, &(-plane.normal), surface_name)?;

    let map = mesh.pack();
    let (a, b) = (
        map.submesh(a).unwrap_or(SubmeshId::NONE),
        map.submesh(b).unwrap_or(SubmeshId::NONE),
    );
    let report = SplitReport {
        submesh_a: a,
        submesh_b: b,
        faces_a: a.get().map_or(0, |a| mesh.submesh_faces(a).len()),
        faces_b: b.get().map_or(0, |b| mesh.submesh_faces(b).len()),
        split_edges: outcome.split_edges,
        split_faces: outcome.split_faces,
        caps_a: caps_a.into_iter().filter_map(|f| map.face(f)).collect(),
        caps_b: caps_b.into_iter().filter_map(|f| map.face(f)).collect(),
    };
    info!(
        faces_a = report.faces_a,
        faces_b = report.faces_b,
        split_faces = report.split_faces,
        caps = report.caps_a.len() + report.caps_b.len(),
        "split mesh"
    );
    Ok(report)
}

/// Move a face into the surface of the same name in `target`
fn reassign<V: VertexAttributes, F: FaceAttributes>(mesh: &mut Mesh<V, F>, f: FaceId, target: SubmeshId) {
    let face = mesh.face(f);
    if face.submesh == target {
        return;
    }
    let name = face
        .surface
        .get()
        .map_or_else(|| FALLBACK_SURFACE.to_string(), |s| mesh.surface(s).name.clone());
    let surface = mesh.find_or_create_surface(target, &name);
    mesh.move_face_to_surface(f, surface);
}

/// Clear partner links that cross from one side to the other
fn disconnect<V: VertexAttributes, F: FaceAttributes>(
    mesh: &mut Mesh<V, F>,
    inside: &[FaceId],
    outside: &[FaceId],
) -> usize {
    let epoch = mesh.next_epoch();
    for &f in outside {
        mesh.mark_face(f, epoch);
    }
    let mut count = 0;
    for &f in inside {
        for h in mesh.face_all_halfedges(f) {
            let Some(p) = mesh.partner(h) else { continue };
            if mesh.is_face_marked(mesh.halfedge_face(p), epoch) {
                mesh.halfedge_mut(h).partner = None;
                mesh.halfedge_mut(p).partner = None;
                count += 1;
            }
        }
    }
    count
}

/// Give the outside faces their own copy of every vertex they share with the
/// inside faces
fn duplicate_seam_vertices<V: VertexAttributes, F: FaceAttributes>(
    mesh: &mut Mesh<V, F>,
    inside: &[FaceId],
    outside: &[FaceId],
) -> usize {
    let mut inside_use: AHashMap<VertexId, HalfedgeId> = AHashMap::new();
    for &f in inside {
        for h in mesh.face_all_halfedges(f) {
            inside_use.entry(mesh.origin(h)).or_insert(h);
        }
    }

    let mut copies: AHashMap<VertexId, VertexId> = AHashMap::new();
    for &f in outside {
        for h in mesh.face_all_halfedges(f) {
            let v = mesh.origin(h);
            if !inside_use.contains_key(&v) {
                continue;
            }
            let copy = match copies.get(&v) {
                Some(&copy) => copy,
                None => {
                    let data = mesh.vertex(v).data.clone();
                    let copy = mesh.create_vertex(h, data);
                    copies.insert(v, copy);
                    copy
                }
            };
            mesh.halfedge_mut(h).vertex = copy;
        }
    }
    for &v in copies.keys() {
        if let Some(&h) = inside_use.get(&v) {
            mesh.vertex_mut(v).halfedge = h;
        }
    }
    copies.len()
}

/// Remove surfaces (and the submesh itself) left without faces
fn drop_emptied<V: VertexAttributes, F: FaceAttributes>(mesh: &mut Mesh<V, F>, m: SubmeshId) {
    let empty: Vec<_> = mesh
        .submesh(m)
        .surfaces
        .iter()
        .copied()
        .filter(|&s| mesh.surface(s).faces.is_empty())
        .collect();
    for s in empty {
        mesh.delete_surface(s);
    }
    if mesh.submesh(m).faces.is_empty() {
        mesh.delete_submesh(m);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::mesh::test_support::{centered_cube, cube};
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn z_plane() -> Plane {
        Plane::new(Point::origin(), Vector3::z()).unwrap()
    }

    #[test]
    fn test_split_centered_cube() {
        let mut mesh = centered_cube();
        let report = split(&mut mesh, &z_plane(), "lower", "upper", "cap").unwrap();

        assert_eq!(report.faces_a, 6);
        assert_eq!(report.faces_b, 6);
        assert_eq!(report.caps_a.len(), 1);
        assert_eq!(report.caps_b.len(), 1);
        // Partition law
        assert_eq!(report.faces_a + report.faces_b, 6 + report.split_faces + 2);

        let (a, b) = (report.submesh_a, report.submesh_b);
        assert_eq!(mesh.submesh(a).name, "lower");
        assert_eq!(mesh.submesh(b).name, "upper");
        assert!(mesh.submesh_by_name("cube").is_none());
        assert!(mesh.surface_by_name(a, "sides").is_some());
        assert!(mesh.surface_by_name(b, "cap").is_some());

        assert_relative_eq!(mesh.volume(Scope::Submesh(a)), 0.5, epsilon = 1e-12);
        assert_relative_eq!(mesh.volume(Scope::Submesh(b)), 0.5, epsilon = 1e-12);
        assert_relative_eq!(mesh.face_normal(report.caps_a[0]).z, 1.0, epsilon = 1e-12);
        assert_relative_eq!(mesh.face_normal(report.caps_b[0]).z, -1.0, epsilon = 1e-12);

        // The sides share no vertices and no partner links
        for &f in mesh.submesh_faces(a) {
            for h in mesh.face_all_halfedges(f) {
                let p = mesh.partner(h).unwrap();
                assert_eq!(mesh.face(mesh.halfedge_face(p)).submesh, a);
                let v = mesh.origin(h);
                for g in mesh.vertex_halfedges(v) {
                    assert_eq!(mesh.face(mesh.halfedge_face(g)).submesh, a);
                }
            }
        }
        assert_eq!(mesh.vertex_count(), 16);
    }

    #[test]
    fn test_split_one_sided_is_unchanged() {
        let mut mesh = cube();
        let report = split(&mut mesh, &z_plane(), "a", "b", "cap").unwrap();
        assert!(report.is_unchanged());
        assert!(mesh.submesh_by_name("a").is_none());
        assert_eq!(mesh.face_count(), 6);
    }

    #[test]
    fn test_split_needs_distinct_submeshes() {
        let mut mesh = centered_cube();
        let err = split(&mut mesh, &z_plane(), "same", "same", "cap").unwrap_err();
        assert!(matches!(err, KernelError::Precondition { operation: "split", .. }));
    }

    #[test]
    fn test_split_scoped_leaves_other_submeshes() {
        let mut mesh = centered_cube();
        let mut other = cube();
        other.transform(&nalgebra::Matrix4::new_translation(&Vector3::new(5.0, 0.0, -0.5)));
        // Rename so append keeps the two cubes apart
        let m = other.submesh_by_name("cube").unwrap();
        other.submesh_mut(m).name = "far".to_string();
        other.pack();
        mesh.append(other);

        let scope = Scope::Submesh(mesh.submesh_by_name("cube").unwrap());
        let report = split_scoped(&mut mesh, &z_plane(), "lower", "upper", "cap", scope).unwrap();
        assert_eq!(report.faces_a + report.faces_b, 12);
        let far = mesh.submesh_by_name("far").unwrap();
        assert_eq!(mesh.submesh_faces(far).len(), 6);
        assert_relative_eq!(mesh.volume(Scope::Submesh(far)), 1.0, epsilon = 1e-12);
    }
}
