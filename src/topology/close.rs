// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Closing border loops with new faces or holes

use crate::error::{KernelError, Result};
use crate::geometry::Point;
use crate::mesh::{FaceAttributes, FaceId, HalfedgeId, Mesh, SurfaceId, VertexAttributes};
use crate::utils::math::{newell_normal, try_normalize};
use nalgebra::Vector3;
use tracing::debug;

impl<V: VertexAttributes, F: FaceAttributes> Mesh<V, F> {
    /// Close a border loop with a new face in `surface`
    #[track_caller]
    pub fn create_border_face(&mut self, border: &[HalfedgeId], surface: SurfaceId) -> Result<FaceId> {
        let normal = self.cap_normal("create_border_face", border)?;
        let start = self.cap_ring(border, FaceId::NONE, &normal);
        let face = self.create_face(surface, start, F::from_normal(normal));
        debug!(face = %face, corners = border.len(), "closed border loop");
        Ok(face)
    }

    /// Close a border loop with a new hole of `face`
    #[track_caller]
    pub fn create_border_hole(&mut self, border: &[HalfedgeId], face: FaceId) -> Result<()> {
        self.cap_normal("create_border_hole", border)?;
        let normal = self.face(face).data.normal();
        let start = self.cap_ring(border, face, &normal);
        self.add_hole(face, start);
        Ok(())
    }

    /// Close an outer border loop and several hole loops with one face
    #[track_caller]
    pub fn create_border_with_holes_face(
        &mut self,
        outer: &[HalfedgeId],
        holes: &[Vec<HalfedgeId>],
        surface: SurfaceId,
    ) -> Result<FaceId> {
        for hole in holes {
            self.cap_normal("create_border_with_holes_face", hole)?;
        }
        let face = self.create_border_face(outer, surface)?;
        for hole in holes {
            self.create_border_hole(hole, face)?;
        }
        Ok(face)
    }

    /// Positions of the complementary ring in ring order
    fn cap_positions(&self, border: &[HalfedgeId]) -> Vec<Point> {
        // Cap halfedge i starts at target(b_i) and is followed by cap i - 1
        (0..border.len())
            .map(|k| {
                let i = (border.len() - k) % border.len();
                self.vertex_position(self.target(border[i]))
            })
            .collect()
    }

    fn cap_normal(&self, operation: &'static str, border: &[HalfedgeId]) -> Result<Vector3<f64>> {
        if border.len() < 3 {
            return Err(KernelError::precondition(
                operation,
                format!("border loop has {} halfedges", border.len()),
            ));
        }
        if let Some(&h) = border.iter().find(|&&h| !self.halfedge(h).is_border()) {
            return Err(KernelError::precondition(
                operation,
                format!("{} is not a border halfedge", h),
            ));
        }
        try_normalize(&newell_normal(self.cap_positions(border).iter()))
            .ok_or_else(|| KernelError::precondition(operation, "border loop has zero area"))
    }

    /// Build the ring complementary to `border`, partnered to it
    fn cap_ring(&mut self, border: &[HalfedgeId], face: FaceId, normal: &Vector3<f64>) -> HalfedgeId {
        let n = border.len();
        let caps: Vec<HalfedgeId> = border
            .iter()
            .map(|&b| {
                let v = self.target(b);
                let mut data = self.vertex(v).data.clone();
                data.set_normal(*normal);
                self.create_halfedge_with(Some(b), HalfedgeId::NONE, HalfedgeId::NONE, v, face, data)
            })
            .collect();
        for i in 0..n {
            let h = self.halfedge_mut(caps[i]);
            h.next = caps[(i + n - 1) % n];
            h.prev = caps[(i + 1) % n];
        }
        caps[0]
    }
}
