// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! polybrep command line tool
//!
//! Every subcommand reads a JSON mesh document; editing subcommands write the
//! result to `--output` or back over the input.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use nalgebra::Vector3;
use polybrep::config::KernelConfig;
use polybrep::editors::{clip, split, weld_coincident};
use polybrep::geometry::{Plane, Point};
use polybrep::io::{load_mesh, save_mesh};
use polybrep::mesh::{Mesh, Scope};
use polybrep::triangulate::{triangulate_mesh, TriangulationMethod};
use polybrep::validation::{validate, ValidationReporter};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "polybrep")]
#[command(about = "Half-edge B-rep mesh kernel: validate, clip, split and triangulate meshes", long_about = None)]
struct Cli {
    /// Configuration file (defaults to polybrep.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check every mesh invariant and report violations
    Validate {
        /// Input mesh document
        input: PathBuf,

        /// Write the report as JSON
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,

        /// Write the report as Markdown
        #[arg(long, value_name = "FILE")]
        markdown: Option<PathBuf>,
    },

    /// Remove everything on the side the plane normal points to and cap the cut
    Clip {
        input: PathBuf,

        /// Point on the plane, as x,y,z
        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
        point: Vector3<f64>,

        /// Plane normal, as x,y,z
        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
        normal: Vector3<f64>,

        /// Surface receiving the cap faces
        #[arg(long)]
        surface: Option<String>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Cut the mesh into two capped submeshes
    Split {
        input: PathBuf,

        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
        point: Vector3<f64>,

        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
        normal: Vector3<f64>,

        /// Submesh for the part behind the plane
        #[arg(long, default_value = "inside")]
        inside: String,

        /// Submesh for the part the normal points to
        #[arg(long, default_value = "outside")]
        outside: String,

        #[arg(long)]
        surface: Option<String>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Triangulate every face
    Triangulate {
        input: PathBuf,

        /// Triangulator: cdt or earcut (overrides the configuration)
        #[arg(short, long)]
        method: Option<TriangulationMethod>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Weld every pair of coincident, opposed faces
    Weld {
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print entity counts, surfaces and enclosed volume
    Stats { input: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let mut config = KernelConfig::from_file(path)?;
            config.apply_overrides(|key| std::env::var(key).ok())?;
            config
        }
        None => KernelConfig::load()?,
    };
    config.install();

    match cli.command {
        Commands::Validate { input, json, markdown } => {
            let mesh = read(&input)?;
            let report = validate(&mesh);
            if let Some(path) = json {
                ValidationReporter::write_json(&report, &path)?;
            }
            if let Some(path) = markdown {
                ValidationReporter::write_markdown(&report, &path)?;
            }
            ValidationReporter::print_summary_with_verbose(&report, cli.verbose);
            if !report.is_valid() {
                std::process::exit(1);
            }
        }
        Commands::Clip { input, point, normal, surface, output } => {
            let plane = plane(point, normal)?;
            let mut mesh = read(&input)?;
            let surface = surface.unwrap_or_else(|| config.cap_surface.clone());
            let report = clip(&mut mesh, &plane, &surface)?;
            if report.is_unchanged() {
                println!("{} nothing outside the plane", "clip:".bold());
            } else {
                println!(
                    "{} removed {} faces, split {} edges and {} faces, {} cap faces",
                    "clip:".bold(),
                    report.removed_faces.to_string().cyan(),
                    report.split_edges,
                    report.split_faces,
                    report.cap_faces.len().to_string().green()
                );
            }
            write(&mesh, output.as_deref().unwrap_or(&input))?;
        }
        Commands::Split { input, point, normal, inside, outside, surface, output } => {
            let plane = plane(point, normal)?;
            let mut mesh = read(&input)?;
            let surface = surface.unwrap_or_else(|| config.cap_surface.clone());
            let report = split(&mut mesh, &plane, &inside, &outside, &surface)?;
            if report.is_unchanged() {
                println!("{} the plane leaves the mesh on one side", "split:".bold());
            } else {
                println!(
                    "{} {} = {} faces ({} caps), {} = {} faces ({} caps)",
                    "split:".bold(),
                    inside.cyan(),
                    report.faces_a,
                    report.caps_a.len(),
                    outside.cyan(),
                    report.faces_b,
                    report.caps_b.len()
                );
            }
            write(&mesh, output.as_deref().unwrap_or(&input))?;
        }
        Commands::Triangulate { input, method, output } => {
            let mut mesh = read(&input)?;
            let method = method.unwrap_or(config.triangulation);
            let before = mesh.face_count();
            triangulate_mesh(&mut mesh, Scope::All, method)?;
            if config.pack_after_edit {
                mesh.pack();
            }
            println!(
                "{} {} faces -> {} triangles ({})",
                "triangulate:".bold(),
                before,
                mesh.face_count().to_string().green(),
                method
            );
            write(&mesh, output.as_deref().unwrap_or(&input))?;
        }
        Commands::Weld { input, output } => {
            let mut mesh = read(&input)?;
            let welded = weld_coincident(&mut mesh)?;
            println!("{} {} face pairs", "weld:".bold(), welded.to_string().cyan());
            write(&mesh, output.as_deref().unwrap_or(&input))?;
        }
        Commands::Stats { input } => {
            let mut mesh = read(&input)?;
            print_stats(&mut mesh, cli.verbose)?;
        }
    }

    Ok(())
}

fn read(path: &Path) -> Result<Mesh> {
    load_mesh(path).with_context(|| format!("failed to load {}", path.display()))
}

fn write(mesh: &Mesh, path: &Path) -> Result<()> {
    save_mesh(mesh, path).with_context(|| format!("failed to write {}", path.display()))
}

fn plane(point: Vector3<f64>, normal: Vector3<f64>) -> Result<Plane> {
    match Plane::new(Point::from(point), normal) {
        Some(plane) => Ok(plane),
        None => bail!("plane normal must not be zero"),
    }
}

fn parse_vector(s: &str) -> std::result::Result<Vector3<f64>, String> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| format!("'{}': {}", s, e))?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z, got '{}'", s)),
    }
}

fn print_stats(mesh: &mut Mesh, verbose: bool) -> Result<()> {
    let borders = mesh.border_loops(Scope::All)?;
    println!("{}", "Mesh".bold());
    println!("  {} {}", "Vertices:".white(), mesh.vertex_count().to_string().cyan());
    println!("  {} {}", "Halfedges:".white(), mesh.halfedge_total().to_string().cyan());
    println!("  {} {}", "Faces:".white(), mesh.face_count().to_string().cyan());
    println!(
        "  {} {}",
        "Border loops:".white(),
        if borders.is_empty() {
            "0 (closed)".green()
        } else {
            borders.len().to_string().yellow()
        }
    );
    if borders.is_empty() {
        println!("  {} {:.6}", "Volume:".white(), mesh.volume(Scope::All));
    }

    let submeshes: Vec<_> = mesh.submeshes().collect();
    for m in submeshes {
        let submesh = mesh.submesh(m);
        println!(
            "\n  {} {} ({} faces)",
            "Submesh".bold(),
            submesh.name.cyan(),
            submesh.faces.len()
        );
        for &s in &submesh.surfaces {
            let surface = mesh.surface(s);
            let area: f64 = surface.faces.iter().map(|&f| mesh.face_area(f)).sum();
            print!("    {} {} faces, area {:.6}", surface.name, surface.faces.len(), area);
            match (&surface.data.material, verbose) {
                (Some(material), true) => println!(", material {}", material),
                _ => println!(),
            }
        }
    }
    Ok(())
}
