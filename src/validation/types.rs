// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Validation result types

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::Duration;

// Durations are stored as fractional seconds
fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64())
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    Ok(Duration::from_secs_f64(secs))
}

/// Group of invariants checked together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckKind {
    Halfedges,
    Vertices,
    Faces,
    Surfaces,
    Submeshes,
}

impl CheckKind {
    pub const ALL: [CheckKind; 5] = [
        CheckKind::Halfedges,
        CheckKind::Vertices,
        CheckKind::Faces,
        CheckKind::Surfaces,
        CheckKind::Submeshes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::Halfedges => "halfedges",
            CheckKind::Vertices => "vertices",
            CheckKind::Faces => "faces",
            CheckKind::Surfaces => "surfaces",
            CheckKind::Submeshes => "submeshes",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "halfedges" => Some(CheckKind::Halfedges),
            "vertices" => Some(CheckKind::Vertices),
            "faces" => Some(CheckKind::Faces),
            "surfaces" => Some(CheckKind::Surfaces),
            "submeshes" => Some(CheckKind::Submeshes),
            _ => None,
        }
    }
}

/// How bad an issue is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// A structural invariant is broken
    Error,
    /// Legal but suspicious, such as an isolated vertex
    Warning,
}

/// One violated invariant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub check: CheckKind,
    pub severity: Severity,
    /// Offending entity in id notation, e.g. `h12`
    pub entity: String,
    pub message: String,
}

/// Per-check summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub check: CheckKind,
    pub examined: usize,
    pub errors: usize,
    pub warnings: usize,
    #[serde(serialize_with = "serialize_duration", deserialize_with = "deserialize_duration")]
    pub duration: Duration,
}

impl CheckResult {
    pub fn new(check: CheckKind) -> Self {
        Self {
            check,
            examined: 0,
            errors: 0,
            warnings: 0,
            duration: Duration::ZERO,
        }
    }

    pub fn passed(&self) -> bool {
        self.errors == 0
    }
}

/// Complete validation report of one mesh
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub vertices: usize,
    pub halfedges: usize,
    pub faces: usize,
    pub surfaces: usize,
    pub submeshes: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    #[serde(serialize_with = "serialize_duration", deserialize_with = "deserialize_duration")]
    pub total_duration: Duration,
    pub checks: Vec<CheckResult>,
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue, counting it against the current check
    pub fn add_issue(&mut self, check: CheckKind, severity: Severity, entity: impl ToString, message: impl Into<String>) {
        match severity {
            Severity::Error => self.total_errors += 1,
            Severity::Warning => self.total_warnings += 1,
        }
        if let Some(result) = self.checks.iter_mut().rev().find(|r| r.check == check) {
            match severity {
                Severity::Error => result.errors += 1,
                Severity::Warning => result.warnings += 1,
            }
        }
        self.issues.push(Issue {
            check,
            severity,
            entity: entity.to_string(),
            message: message.into(),
        });
    }

    pub fn error(&mut self, check: CheckKind, entity: impl ToString, message: impl Into<String>) {
        self.add_issue(check, Severity::Error, entity, message);
    }

    pub fn warning(&mut self, check: CheckKind, entity: impl ToString, message: impl Into<String>) {
        self.add_issue(check, Severity::Warning, entity, message);
    }

    /// Fold the result of a check run on its own into this report
    pub fn merge(&mut self, other: ValidationReport) {
        self.total_errors += other.total_errors;
        self.total_warnings += other.total_warnings;
        self.total_duration += other.total_duration;
        self.checks.extend(other.checks);
        self.issues.extend(other.issues);
    }

    pub fn issues_for(&self, check: CheckKind) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |issue| issue.check == check)
    }

    pub fn is_valid(&self) -> bool {
        self.total_errors == 0
    }

    pub fn has_warnings(&self) -> bool {
        self.total_warnings > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_follow_issues() {
        let mut report = ValidationReport::new();
        report.checks.push(CheckResult::new(CheckKind::Faces));
        report.error(CheckKind::Faces, "f3", "ring does not close");
        report.warning(CheckKind::Faces, "f4", "zero area");

        assert!(!report.is_valid());
        assert!(report.has_warnings());
        assert_eq!(report.checks[0].errors, 1);
        assert_eq!(report.checks[0].warnings, 1);
        assert_eq!(report.issues_for(CheckKind::Faces).count(), 2);
        assert_eq!(report.issues_for(CheckKind::Vertices).count(), 0);
    }

    #[test]
    fn test_report_json_roundtrip() {
        let mut report = ValidationReport::new();
        report.checks.push(CheckResult::new(CheckKind::Halfedges));
        report.error(CheckKind::Halfedges, "h1", "partner is not symmetric");
        let json = serde_json::to_string(&report).unwrap();
        let back: ValidationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.issues, report.issues);
        assert_eq!(back.total_errors, 1);
    }

    #[test]
    fn test_check_kind_names() {
        for kind in CheckKind::ALL {
            assert_eq!(CheckKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(CheckKind::from_str("Faces"), Some(CheckKind::Faces));
        assert_eq!(CheckKind::from_str("edges"), None);
    }
}
