// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Arena compaction

use super::attributes::{FaceAttributes, VertexAttributes};
use super::ids::{FaceId, HalfedgeId, SubmeshId, SurfaceId, VertexId};
use super::store::Mesh;
use tracing::debug;

/// Old-to-new id maps produced by [`Mesh::pack`]; deleted entries map to `NONE`
#[derive(Debug, Clone, Default)]
pub struct PackMap {
    pub vertices: Vec<VertexId>,
    pub halfedges: Vec<HalfedgeId>,
    pub faces: Vec<FaceId>,
    pub surfaces: Vec<SurfaceId>,
    pub submeshes: Vec<SubmeshId>,
}

macro_rules! remap_fn {
    ($name:ident, $field:ident, $id:ty) => {
        /// New id of an entity, `None` if it was removed
        pub fn $name(&self, old: $id) -> Option<$id> {
            if old.is_none() {
                return None;
            }
            self.$field.get(old.index()).and_then(|id| id.get())
        }
    };
}

impl PackMap {
    remap_fn!(vertex, vertices, VertexId);
    remap_fn!(halfedge, halfedges, HalfedgeId);
    remap_fn!(face, faces, FaceId);
    remap_fn!(surface, surfaces, SurfaceId);
    remap_fn!(submesh, submeshes, SubmeshId);
}

/// Map live entries to consecutive ids
fn build_map<T, I: From<usize> + Copy>(arena: &[T], deleted: impl Fn(&T) -> bool, none: I) -> Vec<I> {
    let mut next = 0;
    arena
        .iter()
        .map(|entity| {
            if deleted(entity) {
                none
            } else {
                next += 1;
                I::from(next - 1)
            }
        })
        .collect()
}

impl<V: VertexAttributes, F: FaceAttributes> Mesh<V, F> {
    /// Drop deleted entities and renumber the survivors, preserving order.
    ///
    /// Every cross reference is rewritten and the name indices are rebuilt.
    /// All ids held outside the mesh are invalidated; use the returned map to
    /// translate them.
    pub fn pack(&mut self) -> PackMap {
        let map = PackMap {
            vertices: build_map(&self.vertices, |v| v.deleted, VertexId::NONE),
            halfedges: build_map(&self.halfedges, |h| h.deleted, HalfedgeId::NONE),
            faces: build_map(&self.faces, |f| f.deleted, FaceId::NONE),
            surfaces: build_map(&self.surfaces, |s| s.deleted, SurfaceId::NONE),
            submeshes: build_map(&self.submeshes, |m| m.deleted, SubmeshId::NONE),
        };

        let v = |id: VertexId| {
            id.get()
                .and_then(|id| map.vertices.get(id.index()).copied())
                .unwrap_or(VertexId::NONE)
        };
        let h = |id: HalfedgeId| {
            id.get()
                .and_then(|id| map.halfedges.get(id.index()).copied())
                .unwrap_or(HalfedgeId::NONE)
        };
        let f = |id: FaceId| {
            id.get()
                .and_then(|id| map.faces.get(id.index()).copied())
                .unwrap_or(FaceId::NONE)
        };
        let s = |id: SurfaceId| {
            id.get()
                .and_then(|id| map.surfaces.get(id.index()).copied())
                .unwrap_or(SurfaceId::NONE)
        };
        let m = |id: SubmeshId| {
            id.get()
                .and_then(|id| map.submeshes.get(id.index()).copied())
                .unwrap_or(SubmeshId::NONE)
        };

        let removed = (
            self.vertices.len() - self.vertex_count(),
            self.halfedges.len() - self.halfedge_total(),
            self.faces.len() - self.face_count(),
        );

        self.vertices.retain(|vertex| !vertex.deleted);
        for vertex in &mut self.vertices {
            vertex.halfedge = h(vertex.halfedge);
        }

        self.halfedges.retain(|halfedge| !halfedge.deleted);
        for halfedge in &mut self.halfedges {
            halfedge.partner = halfedge.partner.and_then(|p| h(p).get());
            halfedge.next = h(halfedge.next);
            halfedge.prev = h(halfedge.prev);
            halfedge.vertex = v(halfedge.vertex);
            halfedge.face = f(halfedge.face);
        }

        self.faces.retain(|face| !face.deleted);
        for face in &mut self.faces {
            face.halfedge = h(face.halfedge);
            for hole in &mut face.holes {
                hole.halfedge = h(hole.halfedge);
            }
            face.surface = s(face.surface);
            face.submesh = m(face.submesh);
        }

        self.surfaces.retain(|surface| !surface.deleted);
        for surface in &mut self.surfaces {
            surface.submesh = m(surface.submesh);
            surface.faces = surface.faces.iter().filter_map(|&id| f(id).get()).collect();
        }

        self.submeshes.retain(|submesh| !submesh.deleted);
        for submesh in &mut self.submeshes {
            submesh.surfaces = submesh
                .surfaces
                .iter()
                .filter_map(|&id| s(id).get())
                .collect();
            submesh.faces = submesh.faces.iter().filter_map(|&id| f(id).get()).collect();
        }

        self.surface_index = self
            .surfaces
            .iter()
            .enumerate()
            .map(|(i, surface)| ((surface.submesh, surface.name.clone()), SurfaceId::new(i)))
            .collect();
        self.submesh_index = self
            .submeshes
            .iter()
            .enumerate()
            .map(|(i, submesh)| (submesh.name.clone(), SubmeshId::new(i)))
            .collect();

        debug!(
            vertices = removed.0,
            halfedges = removed.1,
            faces = removed.2,
            "packed mesh"
        );
        map
    }
}
