// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Broad-phase pair reporting.
//!
//! Simulate a few frames of boxes sliding toward each other and print the pairs the
//! broad phase reports each frame.
//!
//! Run:
//! - `cargo run -p understory_dynamic_tree --example broad_phase_pairs`

use kurbo::{Rect, Vec2};
use understory_dynamic_tree::BroadPhase;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    let mut bp = BroadPhase::new();
    let mut bodies: Vec<(Rect, Vec2, _)> = Vec::new();
    for i in 0..5_u8 {
        let x = f64::from(i) * 6.0;
        let velocity = Vec2::new(if i % 2 == 0 { 1.0 } else { -1.0 }, 0.0);
        let aabb = Rect::new(x, 0.0, x + 1.0, 1.0);
        let id = bp.create_proxy(aabb, i);
        bodies.push((aabb, velocity, id));
    }

    for frame in 0..6 {
        for (aabb, velocity, id) in &mut bodies {
            *aabb = *aabb + *velocity;
            bp.move_proxy(*id, *aabb, *velocity);
        }

        let mut pairs = Vec::new();
        bp.update_pairs(|a, b| pairs.push((*a, *b)));
        println!(
            "frame {frame}: pairs {pairs:?} (height {}, balance {})",
            bp.tree_height(),
            bp.tree_balance()
        );
    }
}
