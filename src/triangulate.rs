// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Face triangulation
//!
//! Triangles are stitched back into the half-edge graph in place: boundary
//! halfedges of the face are reused, the first triangle keeps the face id and
//! interior halfedges are created in partner pairs. Quads are cut along their
//! shorter diagonal; everything else goes through `geo`'s triangulators in
//! the face's 2D reduction.

use crate::error::{KernelError, Result};
use crate::geometry::{signed_area_2d, Point, Projection2D};
use crate::mesh::{FaceAttributes, FaceId, HalfedgeId, Mesh, Scope, VertexAttributes};
use crate::utils::math::{float_eq0, newell_normal};
use ahash::{AHashMap, AHashSet};
use geo::{Coord, LineString, Polygon as GeoPolygon, TriangulateEarcut, TriangulateSpade};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, info};

/// Triangulator used for faces that are not triangles or plain quads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriangulationMethod {
    /// Constrained Delaunay triangulation (spade)
    #[default]
    ConstrainedDelaunay,
    /// Ear clipping (earcutr)
    EarClipping,
}

impl FromStr for TriangulationMethod {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "constrained-delaunay" | "cdt" | "delaunay" => Ok(Self::ConstrainedDelaunay),
            "ear-clipping" | "earcut" => Ok(Self::EarClipping),
            other => Err(KernelError::Config(format!(
                "unknown triangulation method '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for TriangulationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConstrainedDelaunay => f.write_str("constrained-delaunay"),
            Self::EarClipping => f.write_str("ear-clipping"),
        }
    }
}

/// Corner indices of one triangle, counter-clockwise around the face normal
type Triangle = [usize; 3];

/// Triangulate one face; returns the faces covering it, the input face id first
pub fn triangulate_face<V: VertexAttributes, F: FaceAttributes>(
    mesh: &mut Mesh<V, F>,
    f: FaceId,
    method: TriangulationMethod,
) -> Result<Vec<FaceId>> {
    mesh.try_face(f)?;
    let corners = mesh.face_all_halfedges(f);
    let holes = mesh.face(f).holes.len();
    let triangles = match (corners.len(), holes) {
        (3, 0) => return Ok(vec![f]),
        (4, 0) => quad_triangles(mesh, &corners),
        _ => polygon_triangles(mesh, f, &corners, method)?,
    };
    let expected = corners.len() + 2 * holes - 2;
    if triangles.len() != expected {
        return Err(KernelError::Triangulation {
            face: f.raw(),
            reason: format!("expected {} triangles, got {}", expected, triangles.len()),
        });
    }
    restitch(mesh, f, &corners, &triangles)
}

/// Triangulate every face in `scope`
pub fn triangulate_mesh<V: VertexAttributes, F: FaceAttributes>(
    mesh: &mut Mesh<V, F>,
    scope: Scope,
    method: TriangulationMethod,
) -> Result<Vec<FaceId>> {
    let faces = mesh.scope_faces(scope);
    let mut out = Vec::with_capacity(faces.len() * 2);
    for f in &faces {
        out.extend(triangulate_face(mesh, *f, method)?);
    }
    info!(faces = faces.len(), triangles = out.len(), %method, "triangulated mesh");
    Ok(out)
}

/// Split a quad along its shorter diagonal unless that diagonal leaves the
/// quad, in which case the other one is used
fn quad_triangles<V: VertexAttributes, F: FaceAttributes>(mesh: &Mesh<V, F>, corners: &[HalfedgeId]) -> Vec<Triangle> {
    let p: Vec<Point> = corners.iter().map(|&h| mesh.halfedge_position(h)).collect();
    let normal = newell_normal(p.iter());
    let along_02 = vec![[0, 1, 2], [0, 2, 3]];
    let along_13 = vec![[1, 2, 3], [1, 3, 0]];
    let inside = |triangles: &[Triangle]| {
        triangles
            .iter()
            .all(|t| (p[t[1]] - p[t[0]]).cross(&(p[t[2]] - p[t[0]])).dot(&normal) > 0.0)
    };

    let (short, long) = if (p[3] - p[1]).norm_squared() < (p[2] - p[0]).norm_squared() {
        (along_13, along_02)
    } else {
        (along_02, along_13)
    };
    if inside(&short) || !inside(&long) {
        short
    } else {
        long
    }
}

fn polygon_triangles<V: VertexAttributes, F: FaceAttributes>(
    mesh: &Mesh<V, F>,
    f: FaceId,
    corners: &[HalfedgeId],
    method: TriangulationMethod,
) -> Result<Vec<Triangle>> {
    let failure = |reason: String| KernelError::Triangulation { face: f.raw(), reason };
    let projection = Projection2D::from_normal(&mesh.face_normal(f));
    let points: Vec<Point2<f64>> = corners
        .iter()
        .map(|&h| projection.project(&mesh.halfedge_position(h)))
        .collect();

    let mut rings: Vec<LineString<f64>> = Vec::new();
    let mut offset = 0;
    for start in mesh.face_rings(f) {
        let len = mesh.ring(start).count();
        let coords: Vec<Coord<f64>> = points[offset..offset + len]
            .iter()
            .map(|p| Coord { x: p.x, y: p.y })
            .collect();
        rings.push(LineString::from(coords));
        offset += len;
    }
    let outer = rings.remove(0);
    let polygon = GeoPolygon::new(outer, rings);

    let raw = match method {
        TriangulationMethod::ConstrainedDelaunay => polygon
            .constrained_triangulation(Default::default())
            .map_err(|e| failure(format!("{:?}", e)))?,
        TriangulationMethod::EarClipping => polygon.earcut_triangles(),
    };

    raw.iter()
        .map(|triangle| {
            let mut t = [0; 3];
            for (slot, coord) in t.iter_mut().zip([triangle.v1(), triangle.v2(), triangle.v3()]) {
                *slot = corner_index(&points, coord)
                    .ok_or_else(|| failure(format!("vertex ({}, {}) is not a face corner", coord.x, coord.y)))?;
            }
            let area = signed_area_2d(&[points[t[0]], points[t[1]], points[t[2]]]);
            if area < 0.0 {
                t.swap(1, 2);
            }
            Ok(t)
        })
        .collect()
}

/// Index of the corner a triangulator output coordinate came from
fn corner_index(points: &[Point2<f64>], coord: Coord<f64>) -> Option<usize> {
    points
        .iter()
        .position(|p| p.x == coord.x && p.y == coord.y)
        .or_else(|| {
            points
                .iter()
                .enumerate()
                .map(|(i, p)| (i, (p.x - coord.x).hypot(p.y - coord.y)))
                .filter(|&(_, d)| float_eq0(d))
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(i, _)| i)
        })
}

/// Replace face `f` by `triangles`, reusing its halfedges
fn restitch<V: VertexAttributes, F: FaceAttributes>(
    mesh: &mut Mesh<V, F>,
    f: FaceId,
    corners: &[HalfedgeId],
    triangles: &[Triangle],
) -> Result<Vec<FaceId>> {
    let failure = |reason: &str| KernelError::Triangulation {
        face: f.raw(),
        reason: reason.to_string(),
    };
    let index_of: AHashMap<HalfedgeId, usize> = corners.iter().enumerate().map(|(i, &h)| (h, i)).collect();
    let successor: Vec<usize> = corners
        .iter()
        .map(|&h| index_of.get(&mesh.next(h)).copied().unwrap_or(usize::MAX))
        .collect();
    let is_boundary = |i: usize, j: usize| successor[i] == j;

    // Check the whole cover before touching the mesh
    let mut covered = vec![false; corners.len()];
    let mut interior = AHashSet::new();
    for t in triangles {
        for e in 0..3 {
            let (i, j) = (t[e], t[(e + 1) % 3]);
            if is_boundary(i, j) {
                if std::mem::replace(&mut covered[i], true) {
                    return Err(failure("boundary edge covered twice"));
                }
            } else if !interior.insert((i, j)) {
                return Err(failure("interior edge used twice in one direction"));
            }
        }
    }
    if covered.contains(&false) {
        return Err(failure("boundary edge not covered"));
    }
    if interior.iter().any(|&(i, j)| !interior.contains(&(j, i))) {
        return Err(failure("interior edge without a partner"));
    }

    let (data, surface, submesh) = {
        let face = mesh.face(f);
        (face.data.clone(), face.surface, face.submesh)
    };
    let mut created: AHashMap<(usize, usize), HalfedgeId> = AHashMap::new();
    let mut faces = Vec::with_capacity(triangles.len());
    for (k, t) in triangles.iter().enumerate() {
        let mut ring = [HalfedgeId::NONE; 3];
        for e in 0..3 {
            let (i, j) = (t[e], t[(e + 1) % 3]);
            ring[e] = if is_boundary(i, j) {
                corners[i]
            } else {
                let partner = created.get(&(j, i)).copied();
                let corner = mesh.halfedge(corners[i]);
                let (vertex, payload) = (corner.vertex, corner.data.clone());
                let h = mesh.create_halfedge_with(partner, HalfedgeId::NONE, HalfedgeId::NONE, vertex, FaceId::NONE, payload);
                created.insert((i, j), h);
                h
            };
        }
        for e in 0..3 {
            let h = mesh.halfedge_mut(ring[e]);
            h.next = ring[(e + 1) % 3];
            h.prev = ring[(e + 2) % 3];
        }
        let face = if k == 0 {
            let face = mesh.face_mut(f);
            face.halfedge = ring[0];
            face.holes.clear();
            mesh.claim_ring(ring[0], f);
            f
        } else {
            match surface.get() {
                Some(s) => mesh.create_face(s, ring[0], data.clone()),
                None => mesh.create_face_in(submesh, ring[0], data.clone()),
            }
        };
        faces.push(face);
    }
    debug!(face = %f, triangles = faces.len(), "triangulated face");
    Ok(faces)
}
