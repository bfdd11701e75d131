// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Non-fatal mesh validation
//!
//! The checks report every violated invariant instead of stopping at the
//! first one, so a broken mesh can be diagnosed in one pass.

pub mod checks;
pub mod reporter;
pub mod types;

pub use checks::{check_faces, check_halfedges, check_submeshes, check_surfaces, check_vertices};
pub use reporter::ValidationReporter;
pub use types::{CheckKind, CheckResult, Issue, Severity, ValidationReport};

use crate::mesh::{FaceAttributes, Mesh, VertexAttributes};
use std::time::Instant;
use tracing::info;

type Check<V, F> = fn(&Mesh<V, F>, &mut ValidationReport) -> bool;

/// Run every check, the five of them in parallel
pub fn validate<V, F>(mesh: &Mesh<V, F>) -> ValidationReport
where
    V: VertexAttributes + Sync,
    F: FaceAttributes + Sync,
{
    let start = Instant::now();
    let run = |check: Check<V, F>| {
        let mut report = ValidationReport::new();
        check(mesh, &mut report);
        report
    };
    let ((halfedges, vertices), (faces, (surfaces, submeshes))) = rayon::join(
        || rayon::join(|| run(check_halfedges), || run(check_vertices)),
        || {
            rayon::join(
                || run(check_faces),
                || rayon::join(|| run(check_surfaces), || run(check_submeshes)),
            )
        },
    );

    let mut report = ValidationReport {
        vertices: mesh.vertex_count(),
        halfedges: mesh.halfedge_total(),
        faces: mesh.face_count(),
        surfaces: mesh.surface_count(),
        submeshes: mesh.submesh_count(),
        ..ValidationReport::default()
    };
    for part in [halfedges, vertices, faces, surfaces, submeshes] {
        report.merge(part);
    }
    report.total_duration = start.elapsed();
    info!(
        errors = report.total_errors,
        warnings = report.total_warnings,
        faces = report.faces,
        "validated mesh"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::test_support::cube;

    #[test]
    fn test_validate_runs_every_check() {
        let report = validate(&cube());
        assert!(report.is_valid());
        assert_eq!(report.faces, 6);
        assert_eq!(report.halfedges, 24);
        let kinds: Vec<_> = report.checks.iter().map(|c| c.check).collect();
        assert_eq!(kinds, CheckKind::ALL.to_vec());
        assert_eq!(report.checks[0].examined, 24);
    }

    #[test]
    fn test_validate_collects_all_issues() {
        let mut mesh = cube();
        let hs: Vec<_> = mesh.halfedges().take(2).collect();
        for h in hs {
            mesh.halfedge_mut(h).partner = None;
        }
        let report = validate(&mesh);
        assert!(!report.is_valid());
        assert!(report.issues_for(CheckKind::Halfedges).count() >= 2);
    }
}
