// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for kernel operations
//!
//! Two tiers are kept apart. Bad entity ids are contract violations and panic
//! inside the mesh accessors (the `try_*` accessors surface them as
//! [`KernelError::InvalidId`] instead). Operation preconditions that depend on
//! geometry, such as a weld between faces that do not coincide, come back as a
//! [`KernelError`]. Geometric degeneracy that has a well-defined answer, such
//! as a clip plane missing the mesh, is not an error at all.

use thiserror::Error;

/// Result type alias using [`KernelError`]
pub type Result<T> = std::result::Result<T, KernelError>;

/// Kind of entity an id refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Vertex,
    Halfedge,
    Face,
    Surface,
    Submesh,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Vertex => "vertex",
            EntityKind::Halfedge => "halfedge",
            EntityKind::Face => "face",
            EntityKind::Surface => "surface",
            EntityKind::Submesh => "submesh",
        };
        f.write_str(name)
    }
}

/// Errors that can occur during kernel operations
#[derive(Error, Debug)]
pub enum KernelError {
    /// An id is out of range or refers to a deleted entity
    #[error("invalid {kind} id {index}")]
    InvalidId { kind: EntityKind, index: u32 },

    /// A surface or submesh name is already taken in its scope
    #[error("{kind} named '{name}' already exists")]
    DuplicateName { kind: EntityKind, name: String },

    /// Input topology cannot be represented by a manifold half-edge graph
    #[error("non-manifold topology: {0}")]
    NonManifold(String),

    /// A caller-side precondition of an operation does not hold
    #[error("{operation}: {reason}")]
    Precondition {
        operation: &'static str,
        reason: String,
    },

    /// A border walk did not return to its starting halfedge
    #[error("border walk starting at halfedge {start} does not close")]
    OpenBorder { start: u32 },

    /// The triangulator output could not be stitched back onto the face
    #[error("triangulation of face {face} failed: {reason}")]
    Triangulation { face: u32, reason: String },

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    Config(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl KernelError {
    /// Create a precondition error
    pub fn precondition(operation: &'static str, reason: impl Into<String>) -> Self {
        KernelError::Precondition {
            operation,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = KernelError::precondition("weld", "halfedge counts differ (4 vs 3)");
        assert_eq!(err.to_string(), "weld: halfedge counts differ (4 vs 3)");

        let err = KernelError::InvalidId {
            kind: EntityKind::Face,
            index: 7,
        };
        assert_eq!(err.to_string(), "invalid face id 7");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<KernelError>();
    }
}
