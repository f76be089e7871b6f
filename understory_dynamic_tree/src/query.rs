// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only traversals: box overlap queries and ray casts.

use alloc::vec;
use alloc::vec::Vec;
use core::ops::ControlFlow;

use kurbo::{Rect, Vec2};

use crate::tree::DynamicTree;
use crate::types::{NULL_NODE, ProxyId, RayCastInput};
use crate::util::{segment_bounds, test_overlap};

impl<P> DynamicTree<P> {
    /// Report every proxy whose fat box overlaps `aabb`.
    ///
    /// Overlap is inclusive: boxes that only touch are reported. The callback may
    /// return [`ControlFlow::Break`] to stop the traversal early.
    ///
    /// ```
    /// use core::ops::ControlFlow;
    /// use kurbo::Rect;
    /// use understory_dynamic_tree::DynamicTree;
    ///
    /// let mut tree = DynamicTree::new();
    /// let near = tree.create_proxy(Rect::new(0.0, 0.0, 1.0, 1.0), "near");
    /// let _far = tree.create_proxy(Rect::new(50.0, 50.0, 51.0, 51.0), "far");
    ///
    /// let mut hits = Vec::new();
    /// tree.query(Rect::new(0.5, 0.5, 2.0, 2.0), |id| {
    ///     hits.push(id);
    ///     ControlFlow::Continue(())
    /// });
    /// assert_eq!(hits, vec![near]);
    /// ```
    pub fn query<F>(&self, aabb: Rect, mut callback: F)
    where
        F: FnMut(ProxyId) -> ControlFlow<()>,
    {
        if self.root == NULL_NODE {
            return;
        }

        let mut stack: Vec<u32> = Vec::with_capacity(64);
        stack.push(self.root);
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if !test_overlap(&node.aabb, &aabb) {
                continue;
            }
            match node.children() {
                Some((child1, child2)) => {
                    stack.push(child1);
                    stack.push(child2);
                }
                None => {
                    if callback(ProxyId::new(index)).is_break() {
                        return;
                    }
                }
            }
        }
    }

    /// Collect the ids of every proxy whose fat box overlaps `aabb`.
    pub fn query_collect(&self, aabb: Rect) -> Vec<ProxyId> {
        let mut out = Vec::new();
        self.query(aabb, |id| {
            out.push(id);
            ControlFlow::Continue(())
        });
        out
    }

    /// Cast a ray through the tree, reporting proxies whose fat box the ray may hit.
    ///
    /// The callback receives the ray clipped to the current maximum fraction and the
    /// proxy id, and returns the new maximum fraction:
    ///
    /// - `0.0` terminates the cast,
    /// - a positive value clips the ray to that fraction (use the input's
    ///   `max_fraction` to continue unchanged),
    /// - a negative value ignores this proxy.
    ///
    /// Proxies are visited in no particular order; exact shape intersection is the
    /// callback's job.
    ///
    /// # Panics
    ///
    /// Debug builds panic if `p1 == p2`.
    pub fn ray_cast<F>(&self, input: &RayCastInput, mut callback: F)
    where
        F: FnMut(&RayCastInput, ProxyId) -> f64,
    {
        let r = input.p2 - input.p1;
        debug_assert!(r.hypot2() > 0.0, "ray has zero length");

        // Perpendicular to the segment. The separation test below only uses its sign,
        // so `v` is left unnormalized.
        let v = Vec2::new(-r.y, r.x);
        let abs_v = Vec2::new(v.x.abs(), v.y.abs());

        let mut max_fraction = input.max_fraction;
        let mut segment = segment_bounds(input, max_fraction);

        if self.root == NULL_NODE {
            return;
        }
        let mut stack = vec![self.root];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if !test_overlap(&node.aabb, &segment) {
                continue;
            }

            // Separating axis for the segment: |dot(v, p1 - c)| > dot(|v|, h).
            let c = node.aabb.center();
            let h = Vec2::new(0.5 * node.aabb.width(), 0.5 * node.aabb.height());
            let separation = v.dot(input.p1 - c).abs() - abs_v.dot(h);
            if separation > 0.0 {
                continue;
            }

            match node.children() {
                Some((child1, child2)) => {
                    stack.push(child1);
                    stack.push(child2);
                }
                None => {
                    let sub_input = RayCastInput {
                        max_fraction,
                        ..*input
                    };
                    let value = callback(&sub_input, ProxyId::new(index));
                    if value == 0.0 {
                        return;
                    }
                    if value > 0.0 {
                        max_fraction = value;
                        segment = segment_bounds(input, max_fraction);
                    }
                }
            }
        }
    }
}
