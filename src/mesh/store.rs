// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Entity store: arenas, creation, access and deletion

use super::attributes::{FaceAttributes, SurfaceData, VertexAttributes};
use super::entities::{Face, Halfedge, Hole, Submesh, Surface, Vertex};
use super::ids::{Epoch, FaceId, HalfedgeId, SubmeshId, SurfaceId, VertexId};
use super::{FaceData, VertexData};
use crate::error::{EntityKind, KernelError, Result};
use ahash::AHashMap;
use nalgebra::Matrix4;
use tracing::debug;

/// Half-edge boundary representation
///
/// Entities live in append-only arenas addressed by typed ids. Removal only
/// sets a `deleted` flag; [`Mesh::pack`] compacts the arenas and renumbers.
#[derive(Debug, Clone)]
pub struct Mesh<V = VertexData, F = FaceData> {
    pub(crate) vertices: Vec<Vertex<V>>,
    pub(crate) halfedges: Vec<Halfedge<V>>,
    pub(crate) faces: Vec<Face<F>>,
    pub(crate) surfaces: Vec<Surface>,
    pub(crate) submeshes: Vec<Submesh>,
    pub(crate) surface_index: AHashMap<(SubmeshId, String), SurfaceId>,
    pub(crate) submesh_index: AHashMap<String, SubmeshId>,
    epoch: Epoch,
}

impl<V, F> Default for Mesh<V, F> {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            halfedges: Vec::new(),
            faces: Vec::new(),
            surfaces: Vec::new(),
            submeshes: Vec::new(),
            surface_index: AHashMap::new(),
            submesh_index: AHashMap::new(),
            epoch: 0,
        }
    }
}

macro_rules! accessors {
    ($field:ident, $ty:ty, $id:ty, $kind:expr,
     $get:ident, $get_mut:ident, $try_get:ident, $contains:ident, $iter:ident, $count:ident) => {
        /// Access a live entity; panics on a deleted or out-of-range id
        #[track_caller]
        pub fn $get(&self, id: $id) -> &$ty {
            match self.$field.get(id.index()) {
                Some(entity) if !entity.deleted => entity,
                _ => panic!("invalid {} id {:?}", $kind, id),
            }
        }

        #[track_caller]
        pub fn $get_mut(&mut self, id: $id) -> &mut $ty {
            match self.$field.get_mut(id.index()) {
                Some(entity) if !entity.deleted => entity,
                _ => panic!("invalid {} id {:?}", $kind, id),
            }
        }

        /// Access a live entity, reporting bad ids as [`KernelError::InvalidId`]
        pub fn $try_get(&self, id: $id) -> Result<&$ty> {
            match self.$field.get(id.index()) {
                Some(entity) if !entity.deleted => Ok(entity),
                _ => Err(KernelError::InvalidId {
                    kind: $kind,
                    index: id.raw(),
                }),
            }
        }

        pub fn $contains(&self, id: $id) -> bool {
            matches!(self.$field.get(id.index()), Some(entity) if !entity.deleted)
        }

        /// Ids of live entities in arena order
        pub fn $iter(&self) -> impl Iterator<Item = $id> + '_ {
            self.$field
                .iter()
                .enumerate()
                .filter(|(_, entity)| !entity.deleted)
                .map(|(i, _)| <$id>::new(i))
        }

        /// Number of live entities
        pub fn $count(&self) -> usize {
            self.$field.iter().filter(|entity| !entity.deleted).count()
        }
    };
}

impl<V, F> Mesh<V, F> {
    pub fn new() -> Self {
        Self::default()
    }

    accessors!(vertices, Vertex<V>, VertexId, EntityKind::Vertex,
        vertex, vertex_mut, try_vertex, contains_vertex, vertices, vertex_count);
    accessors!(halfedges, Halfedge<V>, HalfedgeId, EntityKind::Halfedge,
        halfedge, halfedge_mut, try_halfedge, contains_halfedge, halfedges, halfedge_total);
    accessors!(faces, Face<F>, FaceId, EntityKind::Face,
        face, face_mut, try_face, contains_face, faces, face_count);
    accessors!(surfaces, Surface, SurfaceId, EntityKind::Surface,
        surface, surface_mut, try_surface, contains_surface, surfaces, surface_count);
    accessors!(submeshes, Submesh, SubmeshId, EntityKind::Submesh,
        submesh, submesh_mut, try_submesh, contains_submesh, submeshes, submesh_count);

    /// Whether the mesh has no live faces
    pub fn is_empty(&self) -> bool {
        self.face_count() == 0
    }

    /// Arena lengths including deleted entries
    pub fn capacity_counts(&self) -> (usize, usize, usize) {
        (self.vertices.len(), self.halfedges.len(), self.faces.len())
    }

    // -----------------------------------------------------------------------
    // Link shortcuts
    // -----------------------------------------------------------------------

    #[track_caller]
    pub fn next(&self, h: HalfedgeId) -> HalfedgeId {
        self.halfedge(h).next
    }

    #[track_caller]
    pub fn prev(&self, h: HalfedgeId) -> HalfedgeId {
        self.halfedge(h).prev
    }

    #[track_caller]
    pub fn partner(&self, h: HalfedgeId) -> Option<HalfedgeId> {
        self.halfedge(h).partner
    }

    /// Origin vertex
    #[track_caller]
    pub fn origin(&self, h: HalfedgeId) -> VertexId {
        self.halfedge(h).vertex
    }

    /// Target vertex (origin of the next halfedge)
    #[track_caller]
    pub fn target(&self, h: HalfedgeId) -> VertexId {
        self.halfedge(self.next(h)).vertex
    }

    #[track_caller]
    pub fn halfedge_face(&self, h: HalfedgeId) -> FaceId {
        self.halfedge(h).face
    }

    // -----------------------------------------------------------------------
    // Names
    // -----------------------------------------------------------------------

    pub fn submesh_by_name(&self, name: &str) -> Option<SubmeshId> {
        self.submesh_index.get(name).copied()
    }

    pub fn surface_by_name(&self, submesh: SubmeshId, name: &str) -> Option<SurfaceId> {
        self.surface_index.get(&(submesh, name.to_string())).copied()
    }

    /// Create a named submesh; names are unique per mesh
    pub fn create_submesh(&mut self, name: &str) -> Result<SubmeshId> {
        if self.submesh_index.contains_key(name) {
            return Err(KernelError::DuplicateName {
                kind: EntityKind::Submesh,
                name: name.to_string(),
            });
        }
        Ok(self.insert_submesh(name))
    }

    pub fn find_or_create_submesh(&mut self, name: &str) -> SubmeshId {
        match self.submesh_by_name(name) {
            Some(id) => id,
            None => self.insert_submesh(name),
        }
    }

    fn insert_submesh(&mut self, name: &str) -> SubmeshId {
        let id = SubmeshId::new(self.submeshes.len());
        self.submeshes.push(Submesh {
            name: name.to_string(),
            surfaces: Vec::new(),
            faces: Vec::new(),
            deleted: false,
        });
        self.submesh_index.insert(name.to_string(), id);
        id
    }

    /// Create a named surface in `submesh`; names are unique per submesh
    #[track_caller]
    pub fn create_surface(
        &mut self,
        submesh: SubmeshId,
        name: &str,
        data: SurfaceData,
    ) -> Result<SurfaceId> {
        self.submesh(submesh);
        if self.surface_by_name(submesh, name).is_some() {
            return Err(KernelError::DuplicateName {
                kind: EntityKind::Surface,
                name: name.to_string(),
            });
        }
        Ok(self.insert_surface(submesh, name, data))
    }

    #[track_caller]
    pub fn find_or_create_surface(&mut self, submesh: SubmeshId, name: &str) -> SurfaceId {
        self.submesh(submesh);
        match self.surface_by_name(submesh, name) {
            Some(id) => id,
            None => self.insert_surface(submesh, name, SurfaceData::default()),
        }
    }

    fn insert_surface(&mut self, submesh: SubmeshId, name: &str, data: SurfaceData) -> SurfaceId {
        let id = SurfaceId::new(self.surfaces.len());
        self.surfaces.push(Surface {
            name: name.to_string(),
            submesh,
            faces: Vec::new(),
            data,
            deleted: false,
        });
        self.submeshes[submesh.index()].surfaces.push(id);
        self.surface_index.insert((submesh, name.to_string()), id);
        id
    }

    // -----------------------------------------------------------------------
    // Traversal epochs
    // -----------------------------------------------------------------------

    /// Hand out a fresh traversal epoch; stamps from earlier epochs read as unmarked
    pub fn next_epoch(&mut self) -> Epoch {
        self.epoch = self.epoch.wrapping_add(1);
        if self.epoch == 0 {
            for v in &mut self.vertices {
                v.marked = 0;
                v.checked = 0;
            }
            for h in &mut self.halfedges {
                h.marked = 0;
            }
            for f in &mut self.faces {
                f.marked = 0;
            }
            self.epoch = 1;
        }
        self.epoch
    }

    /// Stamp a halfedge; returns false if it was already stamped in `epoch`
    pub fn mark_halfedge(&mut self, h: HalfedgeId, epoch: Epoch) -> bool {
        let entry = &mut self.halfedges[h.index()].marked;
        let fresh = *entry != epoch;
        *entry = epoch;
        fresh
    }

    pub fn is_halfedge_marked(&self, h: HalfedgeId, epoch: Epoch) -> bool {
        self.halfedges[h.index()].marked == epoch
    }

    /// Stamp a vertex; returns false if it was already stamped in `epoch`
    pub fn mark_vertex(&mut self, v: VertexId, epoch: Epoch) -> bool {
        let entry = &mut self.vertices[v.index()].marked;
        let fresh = *entry != epoch;
        *entry = epoch;
        fresh
    }

    pub fn is_vertex_marked(&self, v: VertexId, epoch: Epoch) -> bool {
        self.vertices[v.index()].marked == epoch
    }

    /// Second vertex stamp, for passes that need two independent flags
    pub fn check_vertex(&mut self, v: VertexId, epoch: Epoch) -> bool {
        let entry = &mut self.vertices[v.index()].checked;
        let fresh = *entry != epoch;
        *entry = epoch;
        fresh
    }

    pub fn mark_face(&mut self, f: FaceId, epoch: Epoch) -> bool {
        let entry = &mut self.faces[f.index()].marked;
        let fresh = *entry != epoch;
        *entry = epoch;
        fresh
    }

    pub fn is_face_marked(&self, f: FaceId, epoch: Epoch) -> bool {
        self.faces[f.index()].marked == epoch
    }
}

impl<V: VertexAttributes, F: FaceAttributes> Mesh<V, F> {
    // -----------------------------------------------------------------------
    // Creation
    // -----------------------------------------------------------------------

    pub fn create_vertex(&mut self, halfedge: HalfedgeId, data: V) -> VertexId {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex::new(halfedge, data));
        id
    }

    /// Create a halfedge whose payload is copied from its origin vertex.
    ///
    /// Links are stored as given; only the partner back-link and an unset
    /// vertex halfedge are filled in.
    #[track_caller]
    pub fn create_halfedge(
        &mut self,
        partner: Option<HalfedgeId>,
        next: HalfedgeId,
        prev: HalfedgeId,
        vertex: VertexId,
        face: FaceId,
    ) -> HalfedgeId {
        let data = self.vertex(vertex).data.clone();
        self.create_halfedge_with(partner, next, prev, vertex, face, data)
    }

    /// Create a halfedge with an explicit payload
    #[track_caller]
    pub fn create_halfedge_with(
        &mut self,
        partner: Option<HalfedgeId>,
        next: HalfedgeId,
        prev: HalfedgeId,
        vertex: VertexId,
        face: FaceId,
        data: V,
    ) -> HalfedgeId {
        let id = HalfedgeId::new(self.halfedges.len());
        self.halfedges.push(Halfedge {
            partner,
            next,
            prev,
            vertex,
            face,
            data,
            deleted: false,
            marked: 0,
        });
        if let Some(p) = partner {
            self.halfedge_mut(p).partner = Some(id);
        }
        let origin = self.vertex_mut(vertex);
        if origin.halfedge.is_none() {
            origin.halfedge = id;
        }
        id
    }

    /// Create a face on the ring starting at `halfedge` and register it in
    /// `surface` and the surface's submesh. Every ring halfedge is claimed.
    #[track_caller]
    pub fn create_face(&mut self, surface: SurfaceId, halfedge: HalfedgeId, data: F) -> FaceId {
        let submesh = self.surface(surface).submesh;
        self.push_face(surface, submesh, halfedge, data)
    }

    /// Create a face that belongs to `submesh` but no surface
    #[track_caller]
    pub fn create_face_in(&mut self, submesh: SubmeshId, halfedge: HalfedgeId, data: F) -> FaceId {
        self.submesh(submesh);
        self.push_face(SurfaceId::NONE, submesh, halfedge, data)
    }

    fn push_face(
        &mut self,
        surface: SurfaceId,
        submesh: SubmeshId,
        halfedge: HalfedgeId,
        data: F,
    ) -> FaceId {
        let id = FaceId::new(self.faces.len());
        self.faces.push(Face {
            halfedge,
            holes: Vec::new(),
            surface,
            submesh,
            data,
            deleted: false,
            marked: 0,
        });
        self.claim_ring(halfedge, id);
        self.register_face(id);
        id
    }

    /// Set the face id of every halfedge on the ring starting at `start`
    pub(crate) fn claim_ring(&mut self, start: HalfedgeId, face: FaceId) {
        let ring: Vec<HalfedgeId> = self.ring(start).collect();
        for h in ring {
            self.halfedges[h.index()].face = face;
        }
    }

    /// Add an existing ring as a hole of `face`
    #[track_caller]
    pub fn add_hole(&mut self, face: FaceId, start: HalfedgeId) {
        self.claim_ring(start, face);
        self.face_mut(face).holes.push(Hole { halfedge: start });
    }

    fn register_face(&mut self, f: FaceId) {
        let (surface, submesh) = {
            let face = &self.faces[f.index()];
            (face.surface, face.submesh)
        };
        if surface.is_some() {
            self.surfaces[surface.index()].faces.push(f);
        }
        if submesh.is_some() {
            self.submeshes[submesh.index()].faces.push(f);
        }
    }

    fn unregister_face(&mut self, f: FaceId) {
        let (surface, submesh) = {
            let face = &self.faces[f.index()];
            (face.surface, face.submesh)
        };
        if surface.is_some() {
            self.surfaces[surface.index()].faces.retain(|&g| g != f);
        }
        if submesh.is_some() {
            self.submeshes[submesh.index()].faces.retain(|&g| g != f);
        }
    }

    /// Move a face into another surface (and that surface's submesh)
    #[track_caller]
    pub fn move_face_to_surface(&mut self, f: FaceId, surface: SurfaceId) {
        let submesh = self.surface(surface).submesh;
        self.face(f);
        self.unregister_face(f);
        let face = &mut self.faces[f.index()];
        face.surface = surface;
        face.submesh = submesh;
        self.register_face(f);
    }

    // -----------------------------------------------------------------------
    // Deletion
    // -----------------------------------------------------------------------

    /// Delete a face together with all of its ring and hole halfedges.
    ///
    /// Surviving partners become border halfedges; vertices left without an
    /// outgoing halfedge are deleted.
    #[track_caller]
    pub fn delete_face(&mut self, f: FaceId) {
        let owned = self.face_all_halfedges(f);
        let epoch = self.next_epoch();
        for &h in &owned {
            self.mark_halfedge(h, epoch);
        }

        // Relink vertices whose outgoing halfedge is going away
        for &h in &owned {
            let v = self.halfedges[h.index()].vertex;
            let current = self.vertices[v.index()].halfedge;
            if current.is_some() && !self.is_halfedge_marked(current, epoch) {
                continue;
            }
            let replacement = self
                .vertex_halfedges(v)
                .into_iter()
                .find(|&g| !self.is_halfedge_marked(g, epoch));
            match replacement {
                Some(g) => self.vertices[v.index()].halfedge = g,
                None => {
                    let vertex = &mut self.vertices[v.index()];
                    vertex.halfedge = HalfedgeId::NONE;
                    vertex.deleted = true;
                }
            }
        }

        for &h in &owned {
            if let Some(p) = self.halfedges[h.index()].partner {
                if !self.is_halfedge_marked(p, epoch) {
                    self.halfedges[p.index()].partner = None;
                }
            }
        }
        for &h in &owned {
            let halfedge = &mut self.halfedges[h.index()];
            halfedge.partner = None;
            halfedge.deleted = true;
        }

        self.unregister_face(f);
        self.faces[f.index()].deleted = true;
        debug!(face = %f, halfedges = owned.len(), "deleted face");
    }

    /// Drop a face record while leaving its halfedges in place for reuse
    #[track_caller]
    pub(crate) fn retire_face(&mut self, f: FaceId) {
        self.face(f);
        self.unregister_face(f);
        let face = &mut self.faces[f.index()];
        face.holes.clear();
        face.deleted = true;
    }

    /// Delete a surface and all of its faces
    #[track_caller]
    pub fn delete_surface(&mut self, s: SurfaceId) {
        let faces = self.surface(s).faces.clone();
        for f in faces {
            self.delete_face(f);
        }
        let (submesh, name) = {
            let surface = &self.surfaces[s.index()];
            (surface.submesh, surface.name.clone())
        };
        self.surface_index.remove(&(submesh, name));
        if let Some(owner) = self.submeshes.get_mut(submesh.index()) {
            owner.surfaces.retain(|&t| t != s);
        }
        self.surfaces[s.index()].deleted = true;
    }

    /// Delete a submesh with all of its surfaces and faces
    #[track_caller]
    pub fn delete_submesh(&mut self, m: SubmeshId) {
        let faces = self.submesh(m).faces.clone();
        for f in faces {
            self.delete_face(f);
        }
        let surfaces = self.submeshes[m.index()].surfaces.clone();
        for s in surfaces {
            self.delete_surface(s);
        }
        let name = self.submeshes[m.index()].name.clone();
        self.submesh_index.remove(&name);
        self.submeshes[m.index()].deleted = true;
    }

    // -----------------------------------------------------------------------
    // Whole-mesh edits
    // -----------------------------------------------------------------------

    /// Apply an affine transform to every vertex, halfedge and face payload
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for vertex in self.vertices.iter_mut().filter(|v| !v.deleted) {
            vertex.data.transform(matrix);
        }
        for halfedge in self.halfedges.iter_mut().filter(|h| !h.deleted) {
            halfedge.data.transform(matrix);
        }
        for face in self.faces.iter_mut().filter(|f| !f.deleted) {
            face.data.transform(matrix);
        }
    }

    /// Merge another mesh into this one.
    ///
    /// Ids of `other` are offset by the current arena lengths. Submeshes and
    /// surfaces whose names already exist are merged into the existing ones.
    pub fn append(&mut self, mut other: Mesh<V, F>) {
        other.pack();
        let vo = self.vertices.len();
        let ho = self.halfedges.len();
        let fo = self.faces.len();

        let submesh_map: Vec<SubmeshId> = other
            .submeshes
            .iter()
            .map(|m| self.find_or_create_submesh(&m.name))
            .collect();
        let surface_map: Vec<SurfaceId> = other
            .surfaces
            .iter()
            .map(|s| {
                let submesh = submesh_map[s.submesh.index()];
                match self.surface_by_name(submesh, &s.name) {
                    Some(id) => id,
                    None => self.insert_surface(submesh, &s.name, s.data.clone()),
                }
            })
            .collect();

        let shift_h = |h: HalfedgeId| {
            if h.is_none() {
                h
            } else {
                HalfedgeId::new(h.index() + ho)
            }
        };

        for vertex in other.vertices {
            self.vertices.push(Vertex::new(shift_h(vertex.halfedge), vertex.data));
        }
        for halfedge in other.halfedges {
            self.halfedges.push(Halfedge {
                partner: halfedge.partner.map(shift_h),
                next: shift_h(halfedge.next),
                prev: shift_h(halfedge.prev),
                vertex: VertexId::new(halfedge.vertex.index() + vo),
                face: FaceId::new(halfedge.face.index() + fo),
                data: halfedge.data,
                deleted: false,
                marked: 0,
            });
        }
        for face in other.faces {
            let id = FaceId::new(self.faces.len());
            self.faces.push(Face {
                halfedge: shift_h(face.halfedge),
                holes: face
                    .holes
                    .iter()
                    .map(|hole| Hole {
                        halfedge: shift_h(hole.halfedge),
                    })
                    .collect(),
                surface: face
                    .surface
                    .get()
                    .map_or(SurfaceId::NONE, |s| surface_map[s.index()]),
                submesh: face
                    .submesh
                    .get()
                    .map_or(SubmeshId::NONE, |m| submesh_map[m.index()]),
                data: face.data,
                deleted: false,
                marked: 0,
            });
            self.register_face(id);
        }
        debug!(vertices = vo, halfedges = ho, faces = fo, "appended mesh");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::test_support::{cube, square};
    use crate::mesh::Scope;
    use nalgebra::{Point3, Vector3};

    #[test]
    fn test_duplicate_names_are_rejected() {
        let mut mesh: Mesh = Mesh::new();
        let m = mesh.create_submesh("part").unwrap();
        assert!(matches!(
            mesh.create_submesh("part"),
            Err(KernelError::DuplicateName { .. })
        ));
        mesh.create_surface(m, "side", SurfaceData::default()).unwrap();
        assert!(mesh.create_surface(m, "side", SurfaceData::default()).is_err());
        let other = mesh.create_submesh("other").unwrap();
        assert!(mesh.create_surface(other, "side", SurfaceData::default()).is_ok());
        assert_eq!(mesh.find_or_create_submesh("part"), m);
    }

    #[test]
    fn test_try_accessors_report_invalid_ids() {
        let mesh = square();
        assert!(mesh.try_face(FaceId::new(0)).is_ok());
        assert!(matches!(
            mesh.try_face(FaceId::new(9)),
            Err(KernelError::InvalidId { kind: EntityKind::Face, index: 9 })
        ));
    }

    #[test]
    #[should_panic(expected = "invalid vertex id")]
    fn test_accessor_panics_on_deleted_entity() {
        let mut mesh = square();
        let f = mesh.faces().next().unwrap();
        mesh.delete_face(f);
        mesh.vertex(VertexId::new(0));
    }

    #[test]
    fn test_create_face_registers_in_surface_and_submesh() {
        let mesh = square();
        let f = mesh.faces().next().unwrap();
        let face = mesh.face(f);
        assert!(mesh.surface(face.surface).faces.contains(&f));
        assert!(mesh.submesh(face.submesh).faces.contains(&f));
        assert!(mesh.face_halfedges(f).all(|h| mesh.halfedge_face(h) == f));
    }

    #[test]
    fn test_delete_face_turns_partners_into_borders() {
        let mut mesh = cube();
        let f = mesh.faces().next().unwrap();
        let partners: Vec<HalfedgeId> = mesh
            .face_halfedges(f)
            .filter_map(|h| mesh.partner(h))
            .collect();
        assert_eq!(partners.len(), 4);
        mesh.delete_face(f);
        assert_eq!(mesh.face_count(), 5);
        for p in partners {
            assert!(mesh.halfedge(p).is_border());
        }
        // Every vertex of a cube touches three faces, so none is orphaned
        assert_eq!(mesh.vertex_count(), 8);
        for v in mesh.vertices() {
            let h = mesh.vertex(v).halfedge;
            assert_eq!(mesh.origin(h), v);
        }
    }

    #[test]
    fn test_delete_submesh_cascades() {
        let mut mesh = cube();
        let m = mesh.submeshes().next().unwrap();
        mesh.delete_submesh(m);
        assert_eq!(mesh.face_count(), 0);
        assert_eq!(mesh.surface_count(), 0);
        assert_eq!(mesh.vertex_count(), 0);
        assert!(mesh.submesh_by_name("cube").is_none());
    }

    #[test]
    fn test_epochs_do_not_need_resetting() {
        let mut mesh = square();
        let e1 = mesh.next_epoch();
        assert!(mesh.mark_vertex(VertexId::new(0), e1));
        assert!(!mesh.mark_vertex(VertexId::new(0), e1));
        let e2 = mesh.next_epoch();
        assert!(!mesh.is_vertex_marked(VertexId::new(0), e2));
    }

    #[test]
    fn test_append_merges_named_groups() {
        let mut mesh = cube();
        let mut other = cube();
        other.transform(&Matrix4::new_translation(&Vector3::new(5.0, 0.0, 0.0)));
        mesh.append(other);
        assert_eq!(mesh.face_count(), 12);
        assert_eq!(mesh.submesh_count(), 1);
        let m = mesh.submesh_by_name("cube").unwrap();
        assert_eq!(mesh.submesh_faces(m).len(), 12);
        assert!(mesh.volume(Scope::All) > 1.99);
        let far = mesh
            .vertices()
            .filter(|&v| mesh.vertex(v).data.position.x > 4.0)
            .count();
        assert_eq!(far, 8);
    }

    #[test]
    fn test_transform_moves_halfedge_payloads() {
        let mut mesh = square();
        mesh.transform(&Matrix4::new_translation(&Vector3::new(0.0, 0.0, 2.0)));
        for h in mesh.halfedges() {
            assert_eq!(mesh.halfedge(h).data.position.z, 2.0);
        }
        let f = mesh.faces().next().unwrap();
        assert_eq!(mesh.face_centroid(f), Point3::new(0.5, 0.5, 2.0));
    }
}
