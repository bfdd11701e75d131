// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Entity records stored in the mesh arenas

use super::attributes::SurfaceData;
use super::ids::{Epoch, FaceId, HalfedgeId, SubmeshId, SurfaceId, VertexId};
use serde::{Deserialize, Serialize};

/// Mesh vertex
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex<V> {
    /// One outgoing halfedge, `NONE` for an isolated vertex
    pub halfedge: HalfedgeId,
    pub data: V,
    pub deleted: bool,
    #[serde(skip)]
    pub(crate) marked: Epoch,
    #[serde(skip)]
    pub(crate) checked: Epoch,
}

impl<V> Vertex<V> {
    pub fn new(halfedge: HalfedgeId, data: V) -> Self {
        Self {
            halfedge,
            data,
            deleted: false,
            marked: 0,
            checked: 0,
        }
    }
}

/// Directed edge of a face ring
///
/// `vertex` is the origin; the target is `next.vertex`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Halfedge<V> {
    /// Oppositely directed halfedge of the adjacent face; `None` on a border
    pub partner: Option<HalfedgeId>,
    pub next: HalfedgeId,
    pub prev: HalfedgeId,
    pub vertex: VertexId,
    pub face: FaceId,
    /// Per-corner copy of the origin vertex payload
    pub data: V,
    pub deleted: bool,
    #[serde(skip)]
    pub(crate) marked: Epoch,
}

impl<V> Halfedge<V> {
    pub fn is_border(&self) -> bool {
        self.partner.is_none()
    }
}

/// Inner boundary ring of a face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hole {
    pub halfedge: HalfedgeId,
}

/// Polygonal face with optional holes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Face<F> {
    /// Start of the outer ring
    pub halfedge: HalfedgeId,
    pub holes: Vec<Hole>,
    pub surface: SurfaceId,
    pub submesh: SubmeshId,
    pub data: F,
    pub deleted: bool,
    #[serde(skip)]
    pub(crate) marked: Epoch,
}

/// Named group of faces within a submesh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Surface {
    pub name: String,
    pub submesh: SubmeshId,
    pub faces: Vec<FaceId>,
    pub data: SurfaceData,
    pub deleted: bool,
}

/// Named group of surfaces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submesh {
    pub name: String,
    pub surfaces: Vec<SurfaceId>,
    pub faces: Vec<FaceId>,
    pub deleted: bool,
}
