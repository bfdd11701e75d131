// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyframe B-rep kernel
//!
//! A half-edge boundary representation for polygonal meshes whose faces may
//! carry holes. Faces are grouped into named surfaces and surfaces into named
//! submeshes. On top of the entity store sit topological primitives (edge and
//! face splits, connect, border closing), composite editors (plane clip,
//! plane split, weld, attach), face triangulation and a non-fatal validator.
//!
//! ```no_run
//! use polybrep::prelude::*;
//!
//! # fn main() -> polybrep::Result<()> {
//! let mut mesh = polybrep::io::load_mesh("part.json")?;
//! let plane = Plane::new(Point::new(0.0, 0.0, 0.5), Vector3::z()).unwrap();
//! let report = clip(&mut mesh, &plane, "cap")?;
//! assert!(validate(&mesh).is_valid());
//! # let _ = report;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod editors;
pub mod error;
pub mod geometry;
pub mod io;
pub mod mesh;
pub mod topology;
pub mod triangulate;
pub mod utils;
pub mod validation;

pub use config::KernelConfig;
pub use error::{EntityKind, KernelError, Result};
pub use mesh::{FaceId, HalfedgeId, Mesh, MeshBuilder, Scope, SubmeshId, SurfaceId, VertexId};

/// Common imports for working with meshes
pub mod prelude {
    pub use crate::editors::{attach, clip, split, weld, ClipReport, SplitReport};
    pub use crate::geometry::{Intersect, Intersection, Plane, Point, Polygon, Segment};
    pub use crate::mesh::{
        FaceData, FaceId, HalfedgeId, Mesh, MeshBuilder, Scope, SubmeshId, SurfaceId, VertexData,
        VertexId,
    };
    pub use crate::triangulate::{triangulate_mesh, TriangulationMethod};
    pub use crate::validation::validate;
    pub use crate::{KernelError, Result};
    pub use nalgebra::Vector3;
}
