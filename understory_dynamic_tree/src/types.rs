// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types: proxy handles, tree configuration, and ray-cast records.

use kurbo::{Point, Vec2};

/// Sentinel index meaning "no node".
pub(crate) const NULL_NODE: u32 = u32::MAX;

/// Handle of a proxy (a leaf) in a [`DynamicTree`](crate::DynamicTree).
///
/// A `ProxyId` is the arena index of the leaf. It stays stable while the tree is
/// restructured by insertions, removals, rotations, and rebuilds.
///
/// ## Reuse
///
/// Destroying a proxy returns its slot to the free list, so a later
/// [`create_proxy`](crate::DynamicTree::create_proxy) may hand out the same index again.
/// There is no generation counter: callers must drop ids they have destroyed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProxyId(pub(crate) u32);

impl ProxyId {
    pub(crate) const fn new(idx: u32) -> Self {
        Self(idx)
    }

    /// The raw arena index of this proxy.
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// Tuning knobs for a [`DynamicTree`](crate::DynamicTree).
///
/// The defaults suit worlds measured in meters with bodies around a meter in size.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TreeConfig {
    /// Margin added on every side of a proxy box before it is stored.
    ///
    /// Motion smaller than this margin never restructures the tree.
    pub aabb_margin: f64,
    /// Multiplier applied to the displacement passed to
    /// [`move_proxy`](crate::DynamicTree::move_proxy) to enlarge the fat box in the
    /// direction of travel.
    pub displacement_multiplier: f64,
    /// Number of node slots allocated up front. Clamped to at least one.
    pub initial_capacity: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            aabb_margin: 0.1,
            displacement_multiplier: 2.0,
            initial_capacity: 16,
        }
    }
}

/// A ray segment from `p1` toward `p2`.
///
/// The segment extends to `p1 + max_fraction * (p2 - p1)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayCastInput {
    /// Start of the ray.
    pub p1: Point,
    /// Second point defining the ray direction and unit of `max_fraction`.
    pub p2: Point,
    /// Portion of `p1..p2` to consider.
    pub max_fraction: f64,
}

impl RayCastInput {
    /// Create a ray covering the whole segment `p1..p2`.
    pub const fn new(p1: Point, p2: Point) -> Self {
        Self {
            p1,
            p2,
            max_fraction: 1.0,
        }
    }

    /// Point on the ray at the given fraction.
    pub fn point_at(&self, fraction: f64) -> Point {
        self.p1 + fraction * (self.p2 - self.p1)
    }
}

/// A ray hit: the ray reaches the surface at `p1 + fraction * (p2 - p1)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayCastOutput {
    /// Outward normal of the face that was hit.
    pub normal: Vec2,
    /// Fraction along the input segment.
    pub fraction: f64,
}
