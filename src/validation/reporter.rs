// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Validation report output

use anyhow::{Context, Result};
use colored::Colorize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use super::types::{Severity, ValidationReport};

/// Issues listed in the terminal summary unless verbose
const SUMMARY_ISSUES: usize = 10;

/// Validation reporter
pub struct ValidationReporter;

impl ValidationReporter {
    /// Write JSON report
    pub fn write_json(report: &ValidationReport, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(report)?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    /// Render the Markdown report
    pub fn markdown(report: &ValidationReport) -> String {
        let mut md = String::new();

        md.push_str("# Mesh Validation Report\n\n");
        md.push_str("## Summary\n\n");
        let _ = writeln!(md, "- **Vertices:** {}", report.vertices);
        let _ = writeln!(md, "- **Halfedges:** {}", report.halfedges);
        let _ = writeln!(md, "- **Faces:** {}", report.faces);
        let _ = writeln!(md, "- **Surfaces:** {}", report.surfaces);
        let _ = writeln!(md, "- **Submeshes:** {}", report.submeshes);
        let _ = writeln!(md, "- **Errors:** {}", report.total_errors);
        let _ = writeln!(md, "- **Warnings:** {}", report.total_warnings);
        let _ = writeln!(md, "- **Duration:** {:.3}s\n", report.total_duration.as_secs_f64());

        md.push_str("## Checks\n\n");
        md.push_str("| Check | Examined | Errors | Warnings |\n");
        md.push_str("|---|---|---|---|\n");
        for check in &report.checks {
            let _ = writeln!(
                md,
                "| {} | {} | {} | {} |",
                check.check.as_str(),
                check.examined,
                check.errors,
                check.warnings
            );
        }
        md.push('\n');

        if !report.issues.is_empty() {
            md.push_str("## Issues\n\n");
            for issue in &report.issues {
                let severity = match issue.severity {
                    Severity::Error => "error",
                    Severity::Warning => "warning",
                };
                let _ = writeln!(
                    md,
                    "- **{}** `{}` ({}): {}",
                    severity,
                    issue.entity,
                    issue.check.as_str(),
                    issue.message
                );
            }
        }
        md
    }

    /// Write Markdown report
    pub fn write_markdown(report: &ValidationReport, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, Self::markdown(report))
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    /// Print terminal summary
    pub fn print_summary(report: &ValidationReport) {
        Self::print_summary_with_verbose(report, false)
    }

    /// Print terminal summary with optional verbose mode
    pub fn print_summary_with_verbose(report: &ValidationReport, verbose: bool) {
        println!("\n{}", "═".repeat(80).white());
        println!("{}", "Validation Report".bold());
        println!("{}", "═".repeat(80).white());
        println!(
            "  {} {} vertices, {} halfedges, {} faces, {} surfaces, {} submeshes",
            "Mesh:".white(),
            report.vertices.to_string().cyan(),
            report.halfedges.to_string().cyan(),
            report.faces.to_string().cyan(),
            report.surfaces.to_string().cyan(),
            report.submeshes.to_string().cyan()
        );
        println!(
            "  {} {}",
            "Errors:".white(),
            if report.total_errors > 0 {
                report.total_errors.to_string().red()
            } else {
                report.total_errors.to_string().green()
            }
        );
        println!(
            "  {} {}",
            "Warnings:".white(),
            report.total_warnings.to_string().yellow()
        );
        println!(
            "  {} {:.3}s",
            "Duration:".white(),
            report.total_duration.as_secs_f64()
        );

        println!("\n{}", "Checks".bold());
        println!("{}", "─".repeat(80).white());
        for check in &report.checks {
            let status_icon = if check.passed() { "✓".green() } else { "✗".red() };
            println!(
                "  {} {}: {} examined, {} errors, {} warnings",
                status_icon,
                check.check.as_str().to_uppercase().cyan(),
                check.examined,
                if check.errors > 0 {
                    check.errors.to_string().red()
                } else {
                    check.errors.to_string().white()
                },
                check.warnings.to_string().yellow()
            );
        }

        if !report.issues.is_empty() {
            println!("\n{}", "Issues".bold());
            println!("{}", "─".repeat(80).white());
            let shown = if verbose {
                report.issues.len()
            } else {
                SUMMARY_ISSUES.min(report.issues.len())
            };
            for issue in report.issues.iter().take(shown) {
                let marker = match issue.severity {
                    Severity::Error => "error".red().bold(),
                    Severity::Warning => "warning".yellow(),
                };
                println!("  {} {} {}", marker, issue.entity.bold(), issue.message);
            }
            if report.issues.len() > shown {
                println!(
                    "  {}",
                    format!("... and {} more", report.issues.len() - shown).white()
                );
            }
        }

        println!("{}", "═".repeat(80).white());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::types::{CheckKind, CheckResult};

    fn sample() -> ValidationReport {
        let mut report = ValidationReport::new();
        report.faces = 2;
        report.checks.push(CheckResult::new(CheckKind::Faces));
        report.error(CheckKind::Faces, "f1", "ring does not close");
        report
    }

    #[test]
    fn test_markdown_lists_issues() {
        let md = ValidationReporter::markdown(&sample());
        assert!(md.contains("| faces | 0 | 1 | 0 |"));
        assert!(md.contains("- **error** `f1` (faces): ring does not close"));
    }

    #[test]
    fn test_write_files() {
        let dir = tempfile::tempdir().unwrap();
        let report = sample();
        let json = dir.path().join("report.json");
        let md = dir.path().join("report.md");
        ValidationReporter::write_json(&report, &json).unwrap();
        ValidationReporter::write_markdown(&report, &md).unwrap();

        let back: ValidationReport = serde_json::from_str(&fs::read_to_string(json).unwrap()).unwrap();
        assert_eq!(back.total_errors, 1);
        assert!(fs::read_to_string(md).unwrap().starts_with("# Mesh Validation Report"));
    }
}
