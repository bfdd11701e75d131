// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - primitives, 2D reduction and intersection queries

mod intersection;
mod primitives;
mod projection;

pub use intersection::{Intersect, Intersection};
pub use primitives::{Line, Plane, Point, Polygon, Ray, Segment};
pub use projection::{locate_in_ring, point_in_polygon_2d, signed_area_2d, Location, Projection2D};
