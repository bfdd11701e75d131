// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Type-safe entity ids
//!
//! Every id is a `u32` index into the matching arena of a [`Mesh`](super::Mesh).
//! `u32::MAX` is reserved as the `NONE` sentinel for unset links.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Traversal stamp; an entity is "marked" when its stamp equals the current epoch
pub type Epoch = u32;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Sentinel for an unset link
            pub const NONE: Self = Self(u32::MAX);

            #[inline]
            pub fn new(index: usize) -> Self {
                debug_assert!(index < u32::MAX as usize, "index {} too large for an id", index);
                Self(index as u32)
            }

            /// Position in the arena
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub fn raw(self) -> u32 {
                self.0
            }

            #[inline]
            pub fn is_none(self) -> bool {
                self.0 == u32::MAX
            }

            #[inline]
            pub fn is_some(self) -> bool {
                !self.is_none()
            }

            /// `None` for the sentinel
            #[inline]
            pub fn get(self) -> Option<Self> {
                if self.is_none() {
                    None
                } else {
                    Some(self)
                }
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_none() {
                    write!(f, "{}-", $prefix)
                } else {
                    write!(f, "{}{}", $prefix, self.0)
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self, f)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::NONE
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                Self::new(index)
            }
        }
    };
}

define_id!(
    /// Vertex id
    VertexId,
    "v"
);
define_id!(
    /// Halfedge id
    HalfedgeId,
    "h"
);
define_id!(
    /// Face id
    FaceId,
    "f"
);
define_id!(
    /// Surface id
    SurfaceId,
    "s"
);
define_id!(
    /// Submesh id
    SubmeshId,
    "m"
);
