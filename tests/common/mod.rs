// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Shared fixtures for integration tests

#![allow(dead_code)]

use nalgebra::Vector3;
use polybrep::geometry::{Plane, Point};
use polybrep::mesh::{Mesh, MeshBuilder};
use rand::Rng;

/// Axis-aligned box from `min` to `max`, one quad per side
pub fn cuboid(name: &str, min: Point, max: Point) -> Mesh {
    let positions = [
        Point::new(min.x, min.y, min.z),
        Point::new(max.x, min.y, min.z),
        Point::new(max.x, max.y, min.z),
        Point::new(min.x, max.y, min.z),
        Point::new(min.x, min.y, max.z),
        Point::new(max.x, min.y, max.z),
        Point::new(max.x, max.y, max.z),
        Point::new(min.x, max.y, max.z),
    ];
    let mut mesh = Mesh::new();
    let mut builder = MeshBuilder::new(&mut mesh, name);
    builder.add_positions(&positions);
    for face in [
        [0, 3, 2, 1],
        [4, 5, 6, 7],
        [0, 1, 5, 4],
        [2, 3, 7, 6],
        [0, 4, 7, 3],
        [1, 2, 6, 5],
    ] {
        builder.add_polygon("sides", &face).expect("cuboid face");
    }
    builder.finish();
    mesh
}

pub fn unit_cube() -> Mesh {
    cuboid("cube", Point::origin(), Point::new(1.0, 1.0, 1.0))
}

/// Square tube: 3x3 outline with a 1x1 hole through it, height 1, volume 8
pub fn frame() -> Mesh {
    square_tube("frame", (0.0, 3.0), (1.0, 2.0))
}

/// Axis-aligned square tube of height 1 between `z = 0` and `z = 1`; `outer`
/// and `inner` are the coordinate ranges of the outline and the hole in both
/// x and y
pub fn square_tube(name: &str, outer: (f64, f64), inner: (f64, f64)) -> Mesh {
    let corners = |(lo, hi): (f64, f64)| [(lo, lo), (hi, lo), (hi, hi), (lo, hi)];
    let mut positions = Vec::new();
    for z in [0.0, 1.0] {
        for (x, y) in corners(outer).into_iter().chain(corners(inner)) {
            positions.push(Point::new(x, y, z));
        }
    }
    // 0..4 outer bottom, 4..8 inner bottom, 8..12 outer top, 12..16 inner top
    let mut mesh = Mesh::new();
    let mut builder = MeshBuilder::new(&mut mesh, name);
    builder.add_positions(&positions);
    builder
        .add_polygon_with_holes("top", &[8, 9, 10, 11], &[vec![12, 15, 14, 13]])
        .expect("top");
    builder
        .add_polygon_with_holes("bottom", &[0, 3, 2, 1], &[vec![4, 5, 6, 7]])
        .expect("bottom");
    for k in 0..4 {
        let (a, b) = (k, (k + 1) % 4);
        builder
            .add_polygon("outside", &[a, b, b + 8, a + 8])
            .expect("outer side");
        let (a, b) = (a + 4, b + 4);
        builder
            .add_polygon("inside", &[b, a, a + 8, b + 8])
            .expect("inner side");
    }
    builder.finish();
    mesh
}

/// Plane through a point of `[lo, hi]^3` with a random direction
pub fn random_plane(rng: &mut impl Rng, lo: f64, hi: f64) -> Plane {
    loop {
        let normal = Vector3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        if normal.norm() < 0.1 {
            continue;
        }
        let point = Point::new(
            rng.gen_range(lo..hi),
            rng.gen_range(lo..hi),
            rng.gen_range(lo..hi),
        );
        if let Some(plane) = Plane::new(point, normal) {
            return plane;
        }
    }
}
