// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Inserting a partnered halfedge pair between two ring corners

use crate::error::{KernelError, Result};
use crate::mesh::{FaceAttributes, FaceId, HalfedgeId, Mesh, VertexAttributes};

impl<V: VertexAttributes, F: FaceAttributes> Mesh<V, F> {
    /// Insert a partnered pair between the origins of `ha` and `hb`.
    ///
    /// Returns `(e1, e2)`: `e1` runs from `origin(hb)` to `origin(ha)` and is
    /// followed by `ha`; `e2` runs back and is followed by `hb`. `e1` gets
    /// `face_a` (default `face(ha)`) and `e2` gets `face_b` (default
    /// `face(hb)`). Applied to one ring this splits it in two; applied to an
    /// outer ring and a hole ring it bridges them into a single ring.
    #[track_caller]
    pub fn connect(
        &mut self,
        ha: HalfedgeId,
        hb: HalfedgeId,
        face_a: Option<FaceId>,
        face_b: Option<FaceId>,
    ) -> Result<(HalfedgeId, HalfedgeId)> {
        let va = self.origin(ha);
        let vb = self.origin(hb);
        if ha == hb || va == vb {
            return Err(KernelError::precondition(
                "connect",
                format!("{} and {} start at the same vertex", ha, hb),
            ));
        }
        let face_a = face_a.unwrap_or_else(|| self.halfedge_face(ha));
        let face_b = face_b.unwrap_or_else(|| self.halfedge_face(hb));
        let prev_a = self.prev(ha);
        let prev_b = self.prev(hb);

        let data_b = self.halfedge(hb).data.clone();
        let e1 = self.create_halfedge_with(None, ha, prev_b, vb, face_a, data_b);
        let data_a = self.halfedge(ha).data.clone();
        let e2 = self.create_halfedge_with(Some(e1), hb, prev_a, va, face_b, data_a);

        self.halfedge_mut(prev_b).next = e1;
        self.halfedge_mut(ha).prev = e1;
        self.halfedge_mut(prev_a).next = e2;
        self.halfedge_mut(hb).prev = e2;
        Ok((e1, e2))
    }
}
