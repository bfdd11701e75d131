// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Plane clipping
//!
//! Removes everything on the side the plane normal points to and closes the
//! cut with cap faces lying in the plane.

use super::classify::Classification;
use super::cut::{close, cut};
use crate::error::Result;
use crate::geometry::Plane;
use crate::mesh::{FaceAttributes, FaceId, Mesh, Scope, VertexAttributes};
use serde::Serialize;
use tracing::info;

/// Summary of a clip; face ids are valid in the packed mesh
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClipReport {
    /// Faces deleted from the outside, counted after cutting
    pub removed_faces: usize,
    pub split_edges: usize,
    pub split_faces: usize,
    pub cap_faces: Vec<FaceId>,
}

impl ClipReport {
    /// Report for a clip that left the mesh untouched
    pub fn unchanged() -> Self {
        Self::default()
    }

    pub fn is_unchanged(&self) -> bool {
        self.removed_faces == 0 && self.split_edges == 0 && self.cap_faces.is_empty()
    }
}

/// Clip the whole mesh; caps go to a surface named `surface_name` in the
/// submesh of the faces they close
pub fn clip<V: VertexAttributes, F: FaceAttributes>(
    mesh: &mut Mesh<V, F>,
    plane: &Plane,
    surface_name: &str,
) -> Result<ClipReport> {
    clip_scoped(mesh, plane, surface_name, Scope::All)
}

/// Clip only the faces in `scope`
pub fn clip_scoped<V: VertexAttributes, F: FaceAttributes>(
    mesh: &mut Mesh<V, F>,
    plane: &Plane,
    surface_name: &str,
    scope: Scope,
) -> Result<ClipReport> {
    let sides = Classification::classify(mesh, plane, scope);
    if !sides.any_outside() {
        info!("clip plane leaves the mesh untouched");
        return Ok(ClipReport::unchanged());
    }

    let outcome = cut(mesh, plane, scope, &sides)?;
    for &f in &outcome.outside {
        mesh.delete_face(f);
    }
    let caps = close(mesh, scope, &sides, &plane.normal, surface_name)?;

    let map = mesh.pack();
    let report = ClipReport {
        removed_faces: outcome.outside.len(),
        split_edges: outcome.split_edges,
        split_faces: outcome.split_faces,
        cap_faces: caps.into_iter().filter_map(|f| map.face(f)).collect(),
    };
    info!(
        removed = report.removed_faces,
        split_edges = report.split_edges,
        split_faces = report.split_faces,
        caps = report.cap_faces.len(),
        "clipped mesh"
    );
    Ok(report)
}
