// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Attaching a face into another one as a hole

use crate::error::{KernelError, Result};
use crate::geometry::{Intersect, Location, Polygon};
use crate::mesh::{FaceAttributes, FaceId, HalfedgeId, Mesh, PackMap, VertexAttributes};
use crate::utils::math::float_eq;
use nalgebra::Vector3;
use tracing::debug;

const OPERATION: &str = "attach";

/// Turn `face_b` into a hole of `face_a` and pack the mesh.
///
/// `face_b` must be coplanar with `face_a`, face the other way and lie
/// strictly inside it. Its outer ring becomes the hole as is, so whatever was
/// attached to `face_b` is now attached to `face_a`. Holes of `face_b` become
/// faces of their own, in `face_a`'s surface or, with `distinct_surfaces`, in
/// the surface of `face_a`'s submesh named like `face_b`'s surface.
pub fn attach<V: VertexAttributes, F: FaceAttributes>(
    mesh: &mut Mesh<V, F>,
    face_a: FaceId,
    face_b: FaceId,
    distinct_surfaces: bool,
) -> Result<PackMap> {
    check_attachable(mesh, face_a, face_b)?;
    let normal = mesh.face_normal(face_a);

    let (outer_b, holes_b, surface_b) = {
        let b = mesh.face(face_b);
        let holes: Vec<HalfedgeId> = b.holes.iter().map(|hole| hole.halfedge).collect();
        (b.halfedge, holes, b.surface)
    };
    let (surface_a, submesh_a) = {
        let a = mesh.face(face_a);
        (a.surface, a.submesh)
    };
    let target = if distinct_surfaces && surface_b.is_some() && submesh_a.is_some() {
        let name = mesh.surface(surface_b).name.clone();
        mesh.find_or_create_surface(submesh_a, &name)
    } else {
        surface_a
    };

    mesh.retire_face(face_b);
    set_ring_normal(mesh, outer_b, &normal);
    mesh.add_hole(face_a, outer_b);

    for &start in &holes_b {
        set_ring_normal(mesh, start, &normal);
        let face = match target.get() {
            Some(surface) => mesh.create_face(surface, start, F::from_normal(normal)),
            None => mesh.create_face_in(submesh_a, start, F::from_normal(normal)),
        };
        debug!(face = %face, "hole of attached face became a face");
    }
    debug!(face_a = %face_a, face_b = %face_b, holes = holes_b.len(), "attached face");
    Ok(mesh.pack())
}

fn check_attachable<V: VertexAttributes, F: FaceAttributes>(
    mesh: &Mesh<V, F>,
    face_a: FaceId,
    face_b: FaceId,
) -> Result<()> {
    mesh.try_face(face_a)?;
    mesh.try_face(face_b)?;
    if face_a == face_b {
        return Err(KernelError::precondition(OPERATION, "cannot attach a face to itself"));
    }
    if mesh.face(face_a).submesh.is_none() {
        return Err(KernelError::precondition(OPERATION, "target face belongs to no submesh"));
    }
    if !float_eq(mesh.face_normal(face_a).dot(&mesh.face_normal(face_b)), -1.0) {
        return Err(KernelError::precondition(OPERATION, "faces are not oppositely oriented"));
    }
    let polygon = mesh
        .face_polygon(face_a)
        .ok_or_else(|| KernelError::precondition(OPERATION, "target face is degenerate"))?;
    for h in mesh.face_all_halfedges(face_b) {
        if !polygon.plane().contains_point(&mesh.halfedge_position(h)) {
            return Err(KernelError::precondition(OPERATION, "faces are not coplanar"));
        }
    }
    for h in mesh.face_halfedges(face_b) {
        if polygon.locate_coplanar(&mesh.halfedge_position(h)) != Location::Inside {
            return Err(KernelError::precondition(
                OPERATION,
                format!("corner {} is not strictly inside the target face", mesh.origin(h)),
            ));
        }
    }

    // Corners inside are not enough for non-convex targets or targets with holes
    let outline_b = Polygon::new(mesh.face_positions(face_b))
        .ok_or_else(|| KernelError::precondition(OPERATION, "attached face is degenerate"))?;
    for edge in outline_b.edges() {
        if polygon.edges().any(|other| edge.intersects(&other)) {
            return Err(KernelError::precondition(
                OPERATION,
                "an edge of the attached face crosses the target face border",
            ));
        }
    }
    for hole in &polygon.holes {
        if hole.first().is_some_and(|p| outline_b.locate_coplanar(p) != Location::Outside) {
            return Err(KernelError::precondition(
                OPERATION,
                "attached face covers a hole of the target face",
            ));
        }
    }
    Ok(())
}

fn set_ring_normal<V: VertexAttributes, F: FaceAttributes>(
    mesh: &mut Mesh<V, F>,
    start: HalfedgeId,
    normal: &Vector3<f64>,
) {
    let ring: Vec<HalfedgeId> = mesh.ring(start).collect();
    for h in ring {
        mesh.halfedge_mut(h).data.set_normal(*normal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::mesh::{Mesh, MeshBuilder, Scope};
    use approx::assert_relative_eq;

    fn plate_and(boss: &[(f64, f64, f64)], boss_hole: Option<&[(f64, f64, f64)]>) -> (Mesh, FaceId, FaceId) {
        let mut mesh = Mesh::new();
        let mut builder = MeshBuilder::new(&mut mesh, "plate");
        builder.add_positions(&[
            Point::new(0.0, 0.0, 0.0),
            Point::new(3.0, 0.0, 0.0),
            Point::new(3.0, 3.0, 0.0),
            Point::new(0.0, 3.0, 0.0),
        ]);
        let a = builder.add_polygon("top", &[0, 1, 2, 3]).unwrap();
        let points: Vec<Point> = boss.iter().map(|&(x, y, z)| Point::new(x, y, z)).collect();
        let first = builder.add_positions(&points);
        let outer: Vec<usize> = (first..first + points.len()).collect();
        let holes = match boss_hole {
            Some(hole) => {
                let points: Vec<Point> = hole.iter().map(|&(x, y, z)| Point::new(x, y, z)).collect();
                let first = builder.add_positions(&points);
                vec![(first..first + points.len()).collect()]
            }
            None => Vec::new(),
        };
        let b = builder.add_polygon_with_holes("boss", &outer, &holes).unwrap();
        builder.finish();
        (mesh, a, b)
    }

    /// [1, 2]^2 wound clockwise seen from +z
    const INNER_CW: [(f64, f64, f64); 4] = [(1.0, 1.0, 0.0), (1.0, 2.0, 0.0), (2.0, 2.0, 0.0), (2.0, 1.0, 0.0)];

    #[test]
    fn test_attach_makes_a_hole() {
        let (mut mesh, a, b) = plate_and(&INNER_CW, None);
        let map = attach(&mut mesh, a, b, false).unwrap();
        let a = map.face(a).unwrap();
        assert_eq!(map.face(b), None);

        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.face(a).holes.len(), 1);
        assert_relative_eq!(mesh.face_area(a), 8.0, epsilon = 1e-12);
        for h in mesh.hole_halfedges(a, 0) {
            assert_eq!(mesh.halfedge_face(h), a);
            assert_relative_eq!(mesh.halfedge(h).data.normal.unwrap().z, 1.0, epsilon = 1e-12);
        }
        assert_eq!(mesh.border_loops(Scope::All).unwrap().len(), 2);
        let plate = mesh.submesh_by_name("plate").unwrap();
        let boss = mesh.surface_by_name(plate, "boss").unwrap();
        assert!(mesh.surface(boss).faces.is_empty());
    }

    #[test]
    fn test_attach_moves_holes_into_distinct_surface() {
        let outer = [(0.5, 0.5, 0.0), (0.5, 2.5, 0.0), (2.5, 2.5, 0.0), (2.5, 0.5, 0.0)];
        let hole = [(1.0, 1.0, 0.0), (2.0, 1.0, 0.0), (2.0, 2.0, 0.0), (1.0, 2.0, 0.0)];
        let (mut mesh, a, b) = plate_and(&outer, Some(&hole));
        let map = attach(&mut mesh, a, b, true).unwrap();
        let a = map.face(a).unwrap();

        assert_eq!(mesh.face_count(), 2);
        assert_relative_eq!(mesh.face_area(a), 5.0, epsilon = 1e-12);
        let plate = mesh.submesh_by_name("plate").unwrap();
        let boss = mesh.surface_by_name(plate, "boss").unwrap();
        let island = mesh.surface(boss).faces[0];
        assert_relative_eq!(mesh.face_area(island), 1.0, epsilon = 1e-12);
        assert_relative_eq!(mesh.face_normal(island).z, 1.0, epsilon = 1e-12);
        assert_eq!(mesh.face(island).submesh, plate);
    }

    #[test]
    fn test_attach_rejects_same_orientation() {
        let ccw: Vec<_> = INNER_CW.iter().rev().copied().collect();
        let (mut mesh, a, b) = plate_and(&ccw, None);
        let err = attach(&mut mesh, a, b, false).unwrap_err();
        assert!(err.to_string().contains("oppositely oriented"));
        assert_eq!(mesh.face_count(), 2);
    }

    #[test]
    fn test_attach_rejects_face_reaching_the_border() {
        let touching = [(0.0, 1.0, 0.0), (0.0, 2.0, 0.0), (2.0, 2.0, 0.0), (2.0, 1.0, 0.0)];
        let (mut mesh, a, b) = plate_and(&touching, None);
        let err = attach(&mut mesh, a, b, false).unwrap_err();
        assert!(err.to_string().contains("strictly inside"));
    }

    #[test]
    fn test_attach_rejects_face_crossing_a_notch() {
        // U-shaped plate open towards +y over x in [1, 2]
        let mut mesh: Mesh = Mesh::new();
        let mut builder = MeshBuilder::new(&mut mesh, "plate");
        builder.add_positions(&[
            Point::new(0.0, 0.0, 0.0),
            Point::new(3.0, 0.0, 0.0),
            Point::new(3.0, 3.0, 0.0),
            Point::new(2.0, 3.0, 0.0),
            Point::new(2.0, 1.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
            Point::new(1.0, 3.0, 0.0),
            Point::new(0.0, 3.0, 0.0),
            Point::new(0.5, 0.5, 0.0),
            Point::new(0.5, 2.5, 0.0),
            Point::new(2.5, 2.5, 0.0),
            Point::new(2.5, 0.5, 0.0),
        ]);
        let a = builder.add_polygon("top", &[0, 1, 2, 3, 4, 5, 6, 7]).unwrap();
        let b = builder.add_polygon("boss", &[8, 9, 10, 11]).unwrap();
        builder.finish();

        for h in mesh.face_halfedges(b) {
            let corner = mesh.halfedge_position(h);
            assert_eq!(mesh.face_polygon(a).unwrap().locate_coplanar(&corner), Location::Inside);
        }
        let err = attach(&mut mesh, a, b, false).unwrap_err();
        assert!(err.to_string().contains("crosses the target face border"));
        assert_eq!(mesh.face_count(), 2);
        assert!(mesh.face(a).holes.is_empty());
    }

    #[test]
    fn test_attach_rejects_face_covering_a_hole() {
        let outer = [(0.5, 0.5, 0.0), (0.5, 2.5, 0.0), (2.5, 2.5, 0.0), (2.5, 0.5, 0.0)];
        let (mut mesh, a, b) = plate_and(&outer, None);
        let (a, b) = {
            // Punch [1.25, 1.75]^2 into the plate first
            let mut other = Mesh::new();
            let mut builder = MeshBuilder::new(&mut other, "plate");
            builder.add_positions(&[
                Point::new(1.25, 1.25, 0.0),
                Point::new(1.25, 1.75, 0.0),
                Point::new(1.75, 1.75, 0.0),
                Point::new(1.75, 1.25, 0.0),
            ]);
            builder.add_polygon("punch", &[0, 1, 2, 3]).unwrap();
            builder.finish();
            mesh.append(other);
            let plate = mesh.submesh_by_name("plate").unwrap();
            let punch = mesh.surface_by_name(plate, "punch").unwrap();
            let punch = mesh.surface(punch).faces[0];
            let map = attach(&mut mesh, a, punch, false).unwrap();
            (map.face(a).unwrap(), map.face(b).unwrap())
        };
        assert_eq!(mesh.face(a).holes.len(), 1);

        let err = attach(&mut mesh, a, b, false).unwrap_err();
        assert!(err.to_string().contains("covers a hole"));
        assert_eq!(mesh.face(a).holes.len(), 1);
    }

    #[test]
    fn test_attach_rejects_offset_plane() {
        let lifted: Vec<_> = INNER_CW.iter().map(|&(x, y, _)| (x, y, 0.5)).collect();
        let (mut mesh, a, b) = plate_and(&lifted, None);
        let err = attach(&mut mesh, a, b, false).unwrap_err();
        assert!(err.to_string().contains("coplanar"));
    }
}
