// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Topological editing primitives
//!
//! Every primitive is a method on [`Mesh`](crate::mesh::Mesh) and keeps the
//! half-edge invariants intact: partners stay symmetric, rings stay closed and
//! every ring halfedge carries its face id.

mod border;
mod close;
mod connect;
mod split;

pub use split::{EdgeSplit, SplitAt};
