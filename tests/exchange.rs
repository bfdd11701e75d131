// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! JSON documents, configuration files and the command line tool

mod common;

use anyhow::Result;
use approx::assert_relative_eq;
use polybrep::config::KernelConfig;
use polybrep::io::{load_mesh, save_mesh, MeshDocument};
use polybrep::mesh::Scope;
use polybrep::triangulate::{triangulate_mesh, TriangulationMethod};
use polybrep::validation::{validate, ValidationReporter};
use std::process::Command;
use tempfile::TempDir;

#[test]
fn test_frame_survives_a_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("frame.json");
    save_mesh(&common::frame(), &path)?;

    let doc = MeshDocument::read(&path)?;
    assert_eq!(doc.positions.len(), 16);
    let names: Vec<_> = doc.submeshes[0].surfaces.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["top", "bottom", "outside", "inside"]);

    let mesh = load_mesh(&path)?;
    assert_eq!(mesh.face_count(), 10);
    assert_relative_eq!(mesh.volume(Scope::All), 8.0, epsilon = 1e-9);
    assert!(validate(&mesh).is_valid());
    Ok(())
}

#[test]
fn test_triangulated_frame_stays_closed() -> Result<()> {
    for method in [TriangulationMethod::ConstrainedDelaunay, TriangulationMethod::EarClipping] {
        let mut mesh = common::frame();
        triangulate_mesh(&mut mesh, Scope::All, method)?;
        mesh.pack();
        // 8 per holed cap, 2 per side quad
        assert_eq!(mesh.face_count(), 32, "{}", method);
        assert!(mesh.faces().all(|f| mesh.halfedge_count(f) == 3));
        assert!(mesh.border_loops(Scope::All)?.is_empty());
        assert_relative_eq!(mesh.volume(Scope::All), 8.0, epsilon = 1e-9);
        assert!(validate(&mesh).is_valid());
    }
    Ok(())
}

#[test]
fn test_config_file_selects_triangulator() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("polybrep.toml");
    std::fs::write(&path, "triangulation = \"ear-clipping\"\ncap_surface = \"lid\"\n")?;
    let config = KernelConfig::from_file(&path)?;
    assert_eq!(config.triangulation, TriangulationMethod::EarClipping);
    assert_eq!(config.cap_surface, "lid");
    assert!(config.pack_after_edit);
    Ok(())
}

#[test]
fn test_validation_reports_written() -> Result<()> {
    let dir = TempDir::new()?;
    let report = validate(&common::unit_cube());
    let json = dir.path().join("report.json");
    let md = dir.path().join("report.md");
    ValidationReporter::write_json(&report, &json)?;
    ValidationReporter::write_markdown(&report, &md)?;
    assert!(std::fs::read_to_string(&json)?.contains("\"total_errors\": 0"));
    assert!(std::fs::read_to_string(&md)?.contains("| halfedges | 24 | 0 | 0 |"));
    Ok(())
}

#[test]
fn test_cli_clip_and_stats() -> Result<()> {
    let dir = TempDir::new()?;
    let input = dir.path().join("cube.json");
    let output = dir.path().join("clipped.json");
    save_mesh(&common::unit_cube(), &input)?;

    let status = Command::new(env!("CARGO_BIN_EXE_polybrep"))
        .current_dir(dir.path())
        .args(["clip", "--point", "0,0,0.25", "--normal", "0,0,1", "--output"])
        .arg(&output)
        .arg(&input)
        .status()?;
    assert!(status.success());

    let mesh = load_mesh(&output)?;
    assert_eq!(mesh.face_count(), 6);
    assert_relative_eq!(mesh.volume(Scope::All), 0.25, epsilon = 1e-9);
    let cube = mesh.submesh_by_name("cube").expect("submesh");
    assert!(mesh.surface_by_name(cube, "cap").is_some());

    let stats = Command::new(env!("CARGO_BIN_EXE_polybrep"))
        .current_dir(dir.path())
        .arg("stats")
        .arg(&output)
        .output()?;
    assert!(stats.status.success());
    assert!(String::from_utf8_lossy(&stats.stdout).contains("Faces:"));

    let validate = Command::new(env!("CARGO_BIN_EXE_polybrep"))
        .current_dir(dir.path())
        .arg("validate")
        .arg(&output)
        .status()?;
    assert!(validate.success());
    Ok(())
}

#[test]
fn test_cli_rejects_zero_normal() -> Result<()> {
    let dir = TempDir::new()?;
    let input = dir.path().join("cube.json");
    save_mesh(&common::unit_cube(), &input)?;
    let status = Command::new(env!("CARGO_BIN_EXE_polybrep"))
        .current_dir(dir.path())
        .args(["clip", "--point", "0,0,0", "--normal", "0,0,0"])
        .arg(&input)
        .status()?;
    assert!(!status.success());
    Ok(())
}
