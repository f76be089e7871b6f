// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dynamic tree basics.
//!
//! Insert a handful of boxes, move one, query a region, cast a ray, and rebuild.
//!
//! Run:
//! - `cargo run -p understory_dynamic_tree --example tree_basics`

use core::ops::ControlFlow;

use kurbo::{Point, Rect, Vec2};
use understory_dynamic_tree::util::ray_cast_rect;
use understory_dynamic_tree::{DynamicTree, RayCastInput};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    // A row of crates and one ball.
    let mut tree = DynamicTree::new();
    for i in 0..6_u8 {
        let x = f64::from(i) * 4.0;
        let _ = tree.create_proxy(Rect::new(x, 0.0, x + 2.0, 2.0), format!("crate {i}"));
    }
    let ball = tree.create_proxy(Rect::new(0.0, 6.0, 1.0, 7.0), String::from("ball"));
    println!(
        "{} proxies, height {}, quality {:.2}",
        tree.proxy_count(),
        tree.height(),
        tree.area_ratio()
    );

    // The ball falls; the fat box is stretched downward along the motion.
    let moved = tree.move_proxy(ball, Rect::new(0.0, 3.0, 1.0, 4.0), Vec2::new(0.0, -3.0));
    println!("ball restructured: {moved}, fat box {:?}", tree.fat_aabb(ball));

    // Everything near the first two crates.
    tree.query(Rect::new(0.0, 0.0, 6.0, 5.0), |id| {
        println!("  near: {}", tree.user_data(id));
        ControlFlow::Continue(())
    });

    // Closest crate hit by a ray along the floor.
    let input = RayCastInput::new(Point::new(30.0, 1.0), Point::new(-10.0, 1.0));
    let mut closest = None;
    tree.ray_cast(&input, |sub, id| match ray_cast_rect(&tree.fat_aabb(id), sub) {
        Some(hit) => {
            closest = Some((tree.user_data(id).clone(), hit.fraction, hit.normal));
            hit.fraction
        }
        None => -1.0,
    });
    if let Some((name, fraction, normal)) = closest {
        println!("ray hit {name} at {:?} (normal {normal:?})", input.point_at(fraction));
    }

    tree.rebuild_bottom_up();
    tree.validate().expect("rebuilt tree is valid");
    println!("after rebuild: height {}, quality {:.2}", tree.height(), tree.area_ratio());
}
