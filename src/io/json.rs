// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! JSON mesh documents
//!
//! A document lists positions once and describes every submesh as surfaces of
//! polygons indexing into that list. Per-corner payloads other than the
//! position are not stored; normals are recomputed from the rings on import.

use crate::error::Result;
use crate::geometry::Point;
use crate::mesh::{
    FaceAttributes, HalfedgeId, Mesh, MeshBuilder, SurfaceData, VertexAttributes, VertexId,
};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Surface name used for exported faces that belong to no surface
const UNNAMED_SURFACE: &str = "default";

/// Whole mesh
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshDocument {
    pub positions: Vec<[f64; 3]>,
    pub submeshes: Vec<SubmeshDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmeshDocument {
    pub name: String,
    pub surfaces: Vec<SurfaceDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceDocument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    pub polygons: Vec<PolygonDocument>,
}

/// Outer ring counter-clockwise around the face normal, holes clockwise
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolygonDocument {
    pub outer: Vec<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub holes: Vec<Vec<usize>>,
}

impl MeshDocument {
    /// Build a mesh; polygons sharing an edge within a submesh are connected
    pub fn to_mesh(&self) -> Result<Mesh> {
        let positions: Vec<Point> = self
            .positions
            .iter()
            .map(|&[x, y, z]| Point::new(x, y, z))
            .collect();
        let mut mesh = Mesh::new();
        for submesh in &self.submeshes {
            let mut builder = MeshBuilder::new(&mut mesh, &submesh.name);
            builder.add_positions(&positions);
            for surface in &submesh.surfaces {
                for polygon in &surface.polygons {
                    builder.add_polygon_with_holes(&surface.name, &polygon.outer, &polygon.holes)?;
                }
            }
            let m = builder.finish();
            for surface in &submesh.surfaces {
                let s = mesh.find_or_create_surface(m, &surface.name);
                if surface.material.is_some() {
                    mesh.surface_mut(s).data = SurfaceData {
                        material: surface.material.clone(),
                    };
                }
            }
        }
        mesh.pack();
        debug!(
            faces = mesh.face_count(),
            submeshes = mesh.submesh_count(),
            "built mesh from document"
        );
        Ok(mesh)
    }

    /// Describe a mesh; every live vertex gets one position
    pub fn from_mesh<V: VertexAttributes, F: FaceAttributes>(mesh: &Mesh<V, F>) -> Self {
        let mut index: AHashMap<VertexId, usize> = AHashMap::new();
        let mut positions = Vec::with_capacity(mesh.vertex_count());
        for v in mesh.vertices() {
            let p = mesh.vertex_position(v);
            index.insert(v, positions.len());
            positions.push([p.x, p.y, p.z]);
        }
        let ring = |start: HalfedgeId| -> Vec<usize> {
            mesh.ring(start)
                .filter_map(|h| index.get(&mesh.origin(h)).copied())
                .collect()
        };

        let mut submeshes = Vec::with_capacity(mesh.submesh_count());
        for m in mesh.submeshes() {
            let submesh = mesh.submesh(m);
            let mut surfaces: Vec<SurfaceDocument> = submesh
                .surfaces
                .iter()
                .map(|&s| {
                    let surface = mesh.surface(s);
                    SurfaceDocument {
                        name: surface.name.clone(),
                        material: surface.data.material.clone(),
                        polygons: Vec::new(),
                    }
                })
                .collect();
            let slot: AHashMap<_, usize> = submesh.surfaces.iter().enumerate().map(|(i, &s)| (s, i)).collect();

            for &f in &submesh.faces {
                let face = mesh.face(f);
                let polygon = PolygonDocument {
                    outer: ring(face.halfedge),
                    holes: face.holes.iter().map(|hole| ring(hole.halfedge)).collect(),
                };
                let i = match slot.get(&face.surface) {
                    Some(&i) => i,
                    None => match surfaces.iter().position(|s| s.name == UNNAMED_SURFACE) {
                        Some(i) => i,
                        None => {
                            surfaces.push(SurfaceDocument {
                                name: UNNAMED_SURFACE.to_string(),
                                ..SurfaceDocument::default()
                            });
                            surfaces.len() - 1
                        }
                    },
                };
                surfaces[i].polygons.push(polygon);
            }
            submeshes.push(SubmeshDocument {
                name: submesh.name.clone(),
                surfaces,
            });
        }
        Self {
            positions,
            submeshes,
        }
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }
}

/// Read a mesh from a JSON document
pub fn load_mesh(path: impl AsRef<Path>) -> Result<Mesh> {
    MeshDocument::read(path)?.to_mesh()
}

/// Write a mesh as a JSON document
pub fn save_mesh<V: VertexAttributes, F: FaceAttributes>(mesh: &Mesh<V, F>, path: impl AsRef<Path>) -> Result<()> {
    MeshDocument::from_mesh(mesh).write(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::test_support::{cube, square_with_hole};
    use crate::mesh::Scope;
    use crate::KernelError;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_document() {
        let doc = MeshDocument::from_mesh(&cube());
        assert_eq!(doc.positions.len(), 8);
        assert_eq!(doc.submeshes.len(), 1);
        assert_eq!(doc.submeshes[0].name, "cube");
        assert_eq!(doc.submeshes[0].surfaces[0].name, "sides");
        assert_eq!(doc.submeshes[0].surfaces[0].polygons.len(), 6);

        let mut mesh = doc.to_mesh().unwrap();
        assert_eq!(mesh.face_count(), 6);
        assert_eq!(mesh.vertex_count(), 8);
        assert!(mesh.border_loops(Scope::All).unwrap().is_empty());
        assert_relative_eq!(mesh.volume(Scope::All), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_holes_and_materials_survive_a_file() {
        let mut mesh = square_with_hole();
        let plate = mesh.submesh_by_name("plate").unwrap();
        let top = mesh.surface_by_name(plate, "top").unwrap();
        mesh.surface_mut(top).data = SurfaceData::with_material("steel");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plate.json");
        save_mesh(&mesh, &path).unwrap();
        let loaded = load_mesh(&path).unwrap();

        let plate = loaded.submesh_by_name("plate").unwrap();
        let top = loaded.surface_by_name(plate, "top").unwrap();
        assert_eq!(loaded.surface(top).data.material.as_deref(), Some("steel"));
        let f = loaded.surface(top).faces[0];
        assert_eq!(loaded.face(f).holes.len(), 1);
        assert_relative_eq!(loaded.face_area(f), 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bad_index_is_an_error() {
        let doc = MeshDocument {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            submeshes: vec![SubmeshDocument {
                name: "m".to_string(),
                surfaces: vec![SurfaceDocument {
                    name: "s".to_string(),
                    material: None,
                    polygons: vec![PolygonDocument {
                        outer: vec![0, 1, 7],
                        holes: Vec::new(),
                    }],
                }],
            }],
        };
        assert!(matches!(doc.to_mesh(), Err(KernelError::Precondition { .. })));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_mesh("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, KernelError::Io(_)));
    }
}
