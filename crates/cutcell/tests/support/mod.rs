//! Geometry builders shared by the integration tests.

#![allow(dead_code)]

use std::f64::consts::PI;

use cutcell_math::{Point3, Vec3};
use cutcell_polygon::{GroupId, PolygonStore};

/// Two triangles covering the plane `x = x` for `y, z` in `[lo, hi]`.
pub fn add_x_wall(store: &mut PolygonStore, group: GroupId, x: f64, lo: f64, hi: f64) {
    let p = |y: f64, z: f64| Point3::new(x, y, z);
    store.add_triangle(group, [p(lo, lo), p(hi, lo), p(hi, hi)]).unwrap();
    store.add_triangle(group, [p(lo, lo), p(hi, hi), p(lo, hi)]).unwrap();
}

/// Store holding one group `"wall"` with boundary id `bid` and a wall at
/// `x = 0.5` spanning the unit square.
pub fn wall_store(bid: i32) -> PolygonStore {
    let mut store = PolygonStore::new();
    let g = store.add_group(None, "wall", bid).unwrap();
    add_x_wall(&mut store, g, 0.5, 0.0, 1.0);
    store.build_index();
    store
}

/// Closed surface of an axis-aligned box, twelve outward-facing triangles.
pub fn add_box(store: &mut PolygonStore, group: GroupId, min: Point3, max: Point3) {
    let corner = |i: usize| {
        Point3::new(
            if i & 1 == 0 { min.x } else { max.x },
            if i & 2 == 0 { min.y } else { max.y },
            if i & 4 == 0 { min.z } else { max.z },
        )
    };
    // counter-clockwise seen from outside
    let faces = [
        [0, 4, 6, 2],
        [1, 3, 7, 5],
        [0, 1, 5, 4],
        [2, 6, 7, 3],
        [0, 2, 3, 1],
        [4, 5, 7, 6],
    ];
    for [a, b, c, d] in faces {
        store
            .add_triangle(group, [corner(a), corner(b), corner(c)])
            .unwrap();
        store
            .add_triangle(group, [corner(a), corner(c), corner(d)])
            .unwrap();
    }
}

/// Latitude/longitude sphere with outward-facing triangles.
pub fn add_sphere(
    store: &mut PolygonStore,
    group: GroupId,
    center: Point3,
    radius: f64,
    stacks: usize,
    slices: usize,
) {
    let point = |stack: usize, slice: usize| {
        let theta = PI * stack as f64 / stacks as f64;
        let phi = 2.0 * PI * slice as f64 / slices as f64;
        center + Vec3::new(theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos()) * radius
    };
    for stack in 0..stacks {
        for slice in 0..slices {
            let a = point(stack, slice);
            let b = point(stack + 1, slice);
            let c = point(stack + 1, slice + 1);
            let d = point(stack, slice + 1);
            if stack > 0 {
                store.add_triangle(group, [a, b, d]).unwrap();
            }
            if stack + 1 < stacks {
                store.add_triangle(group, [b, c, d]).unwrap();
            }
        }
    }
}
