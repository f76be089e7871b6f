// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_dynamic_tree --heading-base-level=0

//! Understory Dynamic Tree: an incrementally balanced AABB tree for broad-phase collision.
//!
//! A [`DynamicTree`] stores "proxies": axis-aligned boxes with a user payload. Each
//! proxy is kept as a *fat* box, enlarged by a margin and stretched in the direction
//! of travel, so that small motions do not touch the tree at all.
//!
//! - Insert, move, and remove proxies; ids stay stable across restructuring.
//! - Query by overlapping rectangle, or cast a ray and clip it as hits are found.
//! - Heights stay balanced through rotations on every insert and remove.
//! - Rebuild bottom-up on demand, shift the world origin, and inspect quality metrics.
//!
//! [`BroadPhase`] layers pair tracking on top: it buffers proxies that moved and
//! reports each newly overlapping pair once per update.
//!
//! Boxes, points, and vectors are [`kurbo`] types.
//!
//! # Example
//!
//! ```rust
//! use core::ops::ControlFlow;
//! use kurbo::{Rect, Vec2};
//! use understory_dynamic_tree::DynamicTree;
//!
//! let mut tree = DynamicTree::new();
//! let ball = tree.create_proxy(Rect::new(0.0, 0.0, 1.0, 1.0), "ball");
//! let wall = tree.create_proxy(Rect::new(10.0, -5.0, 11.0, 5.0), "wall");
//!
//! // A small nudge stays inside the fat box and leaves the tree untouched.
//! assert!(!tree.move_proxy(ball, Rect::new(0.05, 0.0, 1.05, 1.0), Vec2::new(0.05, 0.0)));
//!
//! // A larger move re-inserts the proxy with a box stretched along the motion.
//! assert!(tree.move_proxy(ball, Rect::new(8.0, 0.0, 9.0, 1.0), Vec2::new(1.0, 0.0)));
//!
//! let mut hits = Vec::new();
//! tree.query(Rect::new(9.5, 0.0, 10.5, 1.0), |id| {
//!     hits.push(*tree.user_data(id));
//!     ControlFlow::Continue(())
//! });
//! hits.sort();
//! assert_eq!(hits, ["ball", "wall"]);
//! assert_eq!(tree.validate(), Ok(()));
//! # let _ = wall;
//! ```
//!
//! ### Float semantics
//!
//! Coordinates are `f64` and assumed finite. Overlap tests are inclusive, so boxes
//! that only touch are reported.
//!
//! ### Threading
//!
//! The tree is not synchronized. Mutation needs `&mut`, so concurrent read-only
//! queries are fine and anything else must be serialized by the caller.

#![no_std]

extern crate alloc;

mod arena;
mod balance;
mod broad_phase;
mod error;
mod maintenance;
mod query;
mod tree;
mod types;
pub mod util;
mod validate;

pub use broad_phase::BroadPhase;
pub use error::ValidationError;
pub use tree::DynamicTree;
pub use types::{ProxyId, RayCastInput, RayCastOutput, TreeConfig};
