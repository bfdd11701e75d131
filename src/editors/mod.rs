// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Composite editors built from the topology primitives
//!
//! Clip and split run the same three phases. Classify puts every scoped
//! vertex on a side of the plane. Cut splits straddling edges at their
//! crossing points and straddling faces between the resulting on-plane
//! vertices. Close removes or reassigns the outside and caps the on-plane
//! border loops. Weld and attach stitch existing faces together. Every editor
//! packs the mesh when it changes it.

mod attach;
mod classify;
mod clip;
mod cut;
mod split;
mod weld;

pub use attach::attach;
pub use classify::{Classification, Side};
pub use clip::{clip, clip_scoped, ClipReport};
pub use split::{split, split_scoped, SplitReport};
pub use weld::{find_coincident_faces, weld, weld_coincident, weld_unpacked};
