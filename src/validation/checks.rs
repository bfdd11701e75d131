// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Structural invariant checks
//!
//! Every check walks one arena, records what it finds in the report and never
//! panics, even on a mesh whose links point at deleted or missing entities.
//! Each returns `true` when it found no errors.

use super::types::{CheckKind, CheckResult, ValidationReport};
use crate::mesh::{FaceAttributes, FaceId, HalfedgeId, Mesh, VertexAttributes};
use crate::utils::math::{float_eq0, points_eq, tolerance};
use ahash::AHashSet;
use std::time::Instant;
use tracing::debug;

/// Open a check section; returns the error count to compare against
fn begin(report: &mut ValidationReport, check: CheckKind) -> usize {
    report.checks.push(CheckResult::new(check));
    report.total_errors
}

fn finish(report: &mut ValidationReport, check: CheckKind, examined: usize, start: Instant, errors_before: usize) -> bool {
    let duration = start.elapsed();
    if let Some(result) = report.checks.iter_mut().rev().find(|r| r.check == check) {
        result.examined = examined;
        result.duration = duration;
    }
    report.total_duration += duration;
    debug!(check = check.as_str(), examined, errors = report.total_errors - errors_before, "ran check");
    report.total_errors == errors_before
}

/// Link symmetry, payload consistency and partner pairing of every halfedge
pub fn check_halfedges<V: VertexAttributes, F: FaceAttributes>(mesh: &Mesh<V, F>, report: &mut ValidationReport) -> bool {
    const CHECK: CheckKind = CheckKind::Halfedges;
    let start = Instant::now();
    let errors_before = begin(report, CHECK);
    let mut examined = 0;

    for h in mesh.halfedges() {
        examined += 1;
        let he = mesh.halfedge(h);
        if !mesh.contains_halfedge(he.next) || !mesh.contains_halfedge(he.prev) {
            report.error(CHECK, h, "next or prev is not a live halfedge");
            continue;
        }
        if mesh.halfedge(he.next).prev != h {
            report.error(CHECK, h, format!("prev of next {} is not this halfedge", he.next));
        }
        if mesh.halfedge(he.prev).next != h {
            report.error(CHECK, h, format!("next of prev {} is not this halfedge", he.prev));
        }
        if !mesh.contains_vertex(he.vertex) {
            report.error(CHECK, h, format!("origin {} is not a live vertex", he.vertex));
            continue;
        }
        if !points_eq(&he.data.position(), &mesh.vertex(he.vertex).data.position()) {
            report.error(CHECK, h, format!("payload position differs from origin {}", he.vertex));
        }
        if !mesh.contains_face(he.face) {
            report.error(CHECK, h, format!("face {} is not a live face", he.face));
        } else {
            if mesh.halfedge(he.next).face != he.face {
                report.error(CHECK, h, "next halfedge belongs to another face");
            }
            if let Some(normal) = he.data.normal() {
                if normal.dot(&mesh.face(he.face).data.normal()) < -tolerance() {
                    report.error(CHECK, h, "payload normal opposes the face normal");
                }
            }
        }

        let Some(p) = he.partner else { continue };
        if p == h || !mesh.contains_halfedge(p) {
            report.error(CHECK, h, format!("partner {} is not a live halfedge", p));
            continue;
        }
        let partner = mesh.halfedge(p);
        if partner.partner != Some(h) {
            report.error(CHECK, h, format!("partner {} does not point back", p));
        }
        if mesh.contains_halfedge(partner.next)
            && !points_eq(&he.data.position(), &mesh.halfedge(partner.next).data.position())
        {
            report.error(CHECK, h, format!("partner {} does not run the opposite way", p));
        }
    }
    finish(report, CHECK, examined, start, errors_before)
}

/// Every vertex has an outgoing halfedge that starts at it
pub fn check_vertices<V: VertexAttributes, F: FaceAttributes>(mesh: &Mesh<V, F>, report: &mut ValidationReport) -> bool {
    const CHECK: CheckKind = CheckKind::Vertices;
    let start = Instant::now();
    let errors_before = begin(report, CHECK);
    let mut examined = 0;

    for v in mesh.vertices() {
        examined += 1;
        let h = mesh.vertex(v).halfedge;
        if h.is_none() {
            report.warning(CHECK, v, "isolated vertex");
        } else if !mesh.contains_halfedge(h) {
            report.error(CHECK, v, format!("outgoing {} is not a live halfedge", h));
        } else if mesh.halfedge(h).vertex != v {
            report.error(CHECK, v, format!("outgoing {} starts at {}", h, mesh.halfedge(h).vertex));
        }
    }
    finish(report, CHECK, examined, start, errors_before)
}

/// Walk one ring; returns its length when it closes cleanly
fn walk_ring<V: VertexAttributes, F: FaceAttributes>(
    mesh: &Mesh<V, F>,
    f: FaceId,
    start: HalfedgeId,
    report: &mut ValidationReport,
) -> Option<usize> {
    const CHECK: CheckKind = CheckKind::Faces;
    let (_, limit, _) = mesh.capacity_counts();
    let mut h = start;
    let mut count = 0;
    loop {
        if !mesh.contains_halfedge(h) {
            report.error(CHECK, f, format!("ring reaches {} which is not live", h));
            return None;
        }
        let he = mesh.halfedge(h);
        if he.face != f {
            report.error(CHECK, f, format!("ring halfedge {} belongs to {}", h, he.face));
            return None;
        }
        count += 1;
        h = he.next;
        if h == start {
            return Some(count);
        }
        if count > limit {
            report.error(CHECK, f, format!("ring starting at {} does not close", start));
            return None;
        }
    }
}

/// Ring closure, ring ownership and registration of every face
pub fn check_faces<V: VertexAttributes, F: FaceAttributes>(mesh: &Mesh<V, F>, report: &mut ValidationReport) -> bool {
    const CHECK: CheckKind = CheckKind::Faces;
    let start = Instant::now();
    let errors_before = begin(report, CHECK);
    let mut examined = 0;

    for f in mesh.faces() {
        examined += 1;
        let face = mesh.face(f);
        let mut rings_ok = true;
        let rings = std::iter::once(face.halfedge).chain(face.holes.iter().map(|hole| hole.halfedge));
        for ring in rings {
            match walk_ring(mesh, f, ring, report) {
                Some(n) if n < 3 => {
                    report.error(CHECK, f, format!("ring starting at {} has {} halfedges", ring, n));
                    rings_ok = false;
                }
                Some(_) => {}
                None => rings_ok = false,
            }
        }
        if rings_ok && float_eq0(mesh.face_area(f)) {
            report.warning(CHECK, f, "face has zero area");
        }

        if face.surface.is_some() {
            match mesh.try_surface(face.surface) {
                Ok(surface) if surface.faces.contains(&f) => {}
                Ok(_) => report.error(CHECK, f, format!("not listed in its surface {}", face.surface)),
                Err(_) => report.error(CHECK, f, format!("surface {} is not live", face.surface)),
            }
        }
        if face.submesh.is_none() {
            report.warning(CHECK, f, "face belongs to no submesh");
        } else {
            match mesh.try_submesh(face.submesh) {
                Ok(submesh) if submesh.faces.contains(&f) => {}
                Ok(_) => report.error(CHECK, f, format!("not listed in its submesh {}", face.submesh)),
                Err(_) => report.error(CHECK, f, format!("submesh {} is not live", face.submesh)),
            }
        }
    }
    finish(report, CHECK, examined, start, errors_before)
}

/// Surface face lists, owner links and the name index
pub fn check_surfaces<V: VertexAttributes, F: FaceAttributes>(mesh: &Mesh<V, F>, report: &mut ValidationReport) -> bool {
    const CHECK: CheckKind = CheckKind::Surfaces;
    let start = Instant::now();
    let errors_before = begin(report, CHECK);
    let mut examined = 0;

    for s in mesh.surfaces() {
        examined += 1;
        let surface = mesh.surface(s);
        match mesh.try_submesh(surface.submesh) {
            Ok(submesh) if submesh.surfaces.contains(&s) => {}
            Ok(_) => report.error(CHECK, s, format!("not listed in its submesh {}", surface.submesh)),
            Err(_) => report.error(CHECK, s, format!("submesh {} is not live", surface.submesh)),
        }
        if mesh.contains_submesh(surface.submesh) && mesh.surface_by_name(surface.submesh, &surface.name) != Some(s) {
            report.error(CHECK, s, format!("name '{}' does not resolve to this surface", surface.name));
        }

        let mut seen = AHashSet::new();
        for &f in &surface.faces {
            if !seen.insert(f) {
                report.error(CHECK, s, format!("{} is listed twice", f));
            }
            match mesh.try_face(f) {
                Ok(face) if face.surface == s => {}
                Ok(face) => report.error(CHECK, s, format!("listed {} points to {}", f, face.surface)),
                Err(_) => report.error(CHECK, s, format!("listed {} is not live", f)),
            }
        }
    }
    finish(report, CHECK, examined, start, errors_before)
}

/// Submesh surface and face lists, owner links and the name index
pub fn check_submeshes<V: VertexAttributes, F: FaceAttributes>(mesh: &Mesh<V, F>, report: &mut ValidationReport) -> bool {
    const CHECK: CheckKind = CheckKind::Submeshes;
    let start = Instant::now();
    let errors_before = begin(report, CHECK);
    let mut examined = 0;

    for m in mesh.submeshes() {
        examined += 1;
        let submesh = mesh.submesh(m);
        if mesh.submesh_by_name(&submesh.name) != Some(m) {
            report.error(CHECK, m, format!("name '{}' does not resolve to this submesh", submesh.name));
        }
        for &s in &submesh.surfaces {
            match mesh.try_surface(s) {
                Ok(surface) if surface.submesh == m => {}
                Ok(surface) => report.error(CHECK, m, format!("listed {} belongs to {}", s, surface.submesh)),
                Err(_) => report.error(CHECK, m, format!("listed {} is not live", s)),
            }
        }
        let mut seen = AHashSet::new();
        for &f in &submesh.faces {
            if !seen.insert(f) {
                report.error(CHECK, m, format!("{} is listed twice", f));
            }
            match mesh.try_face(f) {
                Ok(face) if face.submesh == m => {}
                Ok(face) => report.error(CHECK, m, format!("listed {} points to {}", f, face.submesh)),
                Err(_) => report.error(CHECK, m, format!("listed {} is not live", f)),
            }
        }
    }
    finish(report, CHECK, examined, start, errors_before)
}
