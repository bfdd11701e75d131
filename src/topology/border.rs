// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Border traversal
//!
//! A border halfedge has no partner. Border halfedges chain head to tail into
//! loops: the successor of a border halfedge is found by rotating around its
//! target vertex until the next partnerless halfedge comes up.

use crate::error::{KernelError, Result};
use crate::mesh::{FaceAttributes, HalfedgeId, Mesh, Scope, VertexAttributes};

impl<V: VertexAttributes, F: FaceAttributes> Mesh<V, F> {
    /// Next border halfedge of the loop through `h` (which must be a border)
    pub fn next_border_halfedge(&self, h: HalfedgeId) -> Option<HalfedgeId> {
        if !self.try_halfedge(h).ok()?.is_border() {
            return None;
        }
        let mut g = self.next(h);
        for _ in 0..self.halfedges.len() {
            match self.partner(g) {
                Some(p) => g = self.next(p),
                None => return Some(g),
            }
        }
        None
    }

    /// Previous border halfedge of the loop through `h` (which must be a border)
    pub fn prev_border_halfedge(&self, h: HalfedgeId) -> Option<HalfedgeId> {
        if !self.try_halfedge(h).ok()?.is_border() {
            return None;
        }
        let mut g = self.prev(h);
        for _ in 0..self.halfedges.len() {
            match self.partner(g) {
                Some(p) => g = self.prev(p),
                None => return Some(g),
            }
        }
        None
    }

    /// The full border loop starting at `h`; `None` if the walk does not close
    pub fn border_halfedges(&self, h: HalfedgeId) -> Option<Vec<HalfedgeId>> {
        let mut out = vec![h];
        let mut g = self.next_border_halfedge(h)?;
        while g != h {
            if out.len() > self.halfedges.len() {
                return None;
            }
            out.push(g);
            g = self.next_border_halfedge(g)?;
        }
        Some(out)
    }

    /// Every border loop touching a face in `scope`
    pub fn border_loops(&mut self, scope: Scope) -> Result<Vec<Vec<HalfedgeId>>> {
        let epoch = self.next_epoch();
        let mut loops = Vec::new();
        for f in self.scope_faces(scope) {
            for h in self.face_all_halfedges(f) {
                if !self.halfedge(h).is_border() || self.is_halfedge_marked(h, epoch) {
                    continue;
                }
                let border = self
                    .border_halfedges(h)
                    .ok_or(KernelError::OpenBorder { start: h.raw() })?;
                for &g in &border {
                    self.mark_halfedge(g, epoch);
                }
                loops.push(border);
            }
        }
        Ok(loops)
    }
}
