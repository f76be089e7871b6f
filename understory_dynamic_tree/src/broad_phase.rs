// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Broad phase: tracks moved proxies and reports newly overlapping pairs.

use alloc::vec::Vec;
use core::ops::ControlFlow;

use kurbo::{Rect, Vec2};

use crate::tree::DynamicTree;
use crate::types::{ProxyId, RayCastInput, TreeConfig};
use crate::util;

/// Pair manager over a [`DynamicTree`].
///
/// Proxies that are created, moved far enough to restructure the tree, or touched
/// are buffered. [`update_pairs`](Self::update_pairs) then queries the tree once per
/// buffered proxy and reports every overlapping pair exactly once.
///
/// ```
/// use kurbo::Rect;
/// use understory_dynamic_tree::BroadPhase;
///
/// let mut bp = BroadPhase::new();
/// let _ = bp.create_proxy(Rect::new(0.0, 0.0, 1.0, 1.0), "crate");
/// let _ = bp.create_proxy(Rect::new(0.5, 0.5, 1.5, 1.5), "barrel");
/// let _ = bp.create_proxy(Rect::new(9.0, 9.0, 10.0, 10.0), "tree");
///
/// let mut pairs = Vec::new();
/// bp.update_pairs(|a, b| pairs.push((*a, *b)));
/// assert_eq!(pairs.len(), 1);
/// ```
pub struct BroadPhase<P> {
    tree: DynamicTree<P>,
    proxy_count: usize,
    move_buffer: Vec<Option<ProxyId>>,
    pair_buffer: Vec<(ProxyId, ProxyId)>,
}

impl<P> core::fmt::Debug for BroadPhase<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BroadPhase")
            .field("tree", &self.tree)
            .field("proxy_count", &self.proxy_count)
            .field("buffered_moves", &self.move_buffer.len())
            .finish_non_exhaustive()
    }
}

impl<P> Default for BroadPhase<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> BroadPhase<P> {
    /// Create an empty broad phase with the default [`TreeConfig`].
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    /// Create an empty broad phase whose tree uses `config`.
    pub fn with_config(config: TreeConfig) -> Self {
        Self {
            tree: DynamicTree::with_config(config),
            proxy_count: 0,
            move_buffer: Vec::with_capacity(16),
            pair_buffer: Vec::with_capacity(16),
        }
    }

    /// Create a proxy and schedule it for pairing on the next update.
    pub fn create_proxy(&mut self, aabb: Rect, payload: P) -> ProxyId {
        let id = self.tree.create_proxy(aabb, payload);
        self.proxy_count += 1;
        self.move_buffer.push(Some(id));
        id
    }

    /// Destroy a proxy, dropping any pending pairing for it, and return its payload.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a live proxy.
    pub fn destroy_proxy(&mut self, id: ProxyId) -> P {
        let payload = self.tree.destroy_proxy(id);
        self.unbuffer_move(id);
        self.proxy_count -= 1;
        payload
    }

    /// Move a proxy; it is scheduled for pairing only if its fat box had to change.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a live proxy.
    pub fn move_proxy(&mut self, id: ProxyId, aabb: Rect, displacement: Vec2) {
        if self.tree.move_proxy(id, aabb, displacement) {
            self.move_buffer.push(Some(id));
        }
    }

    /// Schedule a proxy for pairing on the next update even though it did not move.
    pub fn touch_proxy(&mut self, id: ProxyId) {
        self.move_buffer.push(Some(id));
    }

    fn unbuffer_move(&mut self, id: ProxyId) {
        for slot in &mut self.move_buffer {
            if *slot == Some(id) {
                *slot = None;
            }
        }
    }

    /// Report each pair of overlapping fat boxes that involves a buffered proxy.
    ///
    /// Pairs are reported once, ordered by proxy id, and a proxy is never paired
    /// with itself. The move buffer is cleared.
    pub fn update_pairs<F>(&mut self, mut callback: F)
    where
        F: FnMut(&P, &P),
    {
        self.pair_buffer.clear();

        for query_id in self.move_buffer.drain(..).flatten() {
            // A touched id may have been destroyed and its slot reused or freed.
            if !self.tree.is_proxy(query_id) {
                continue;
            }
            let fat = self.tree.fat_aabb(query_id);
            let pairs = &mut self.pair_buffer;
            self.tree.query(fat, |other| {
                if other != query_id {
                    pairs.push((query_id.min(other), query_id.max(other)));
                }
                ControlFlow::Continue(())
            });
        }

        self.pair_buffer.sort_unstable();
        self.pair_buffer.dedup();

        tracing::trace!(
            pairs = self.pair_buffer.len(),
            proxies = self.proxy_count,
            "updated broad-phase pairs"
        );

        for &(a, b) in &self.pair_buffer {
            callback(self.tree.user_data(a), self.tree.user_data(b));
        }
    }

    /// Whether the fat boxes of two proxies overlap.
    ///
    /// # Panics
    ///
    /// Panics if an id is not a live proxy.
    pub fn test_overlap(&self, a: ProxyId, b: ProxyId) -> bool {
        util::test_overlap(&self.tree.fat_aabb(a), &self.tree.fat_aabb(b))
    }

    /// The fat box stored for a proxy.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a live proxy.
    pub fn fat_aabb(&self, id: ProxyId) -> Rect {
        self.tree.fat_aabb(id)
    }

    /// The payload stored for a proxy.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a live proxy.
    pub fn user_data(&self, id: ProxyId) -> &P {
        self.tree.user_data(id)
    }

    /// Number of live proxies.
    pub fn proxy_count(&self) -> usize {
        self.proxy_count
    }

    /// Height of the underlying tree.
    pub fn tree_height(&self) -> i32 {
        self.tree.height()
    }

    /// Largest sibling height difference in the underlying tree.
    pub fn tree_balance(&self) -> i32 {
        self.tree.max_balance()
    }

    /// Perimeter ratio of the underlying tree; see [`DynamicTree::area_ratio`].
    pub fn tree_quality(&self) -> f64 {
        self.tree.area_ratio()
    }

    /// Read access to the underlying tree.
    pub fn tree(&self) -> &DynamicTree<P> {
        &self.tree
    }

    /// See [`DynamicTree::query`].
    pub fn query<F>(&self, aabb: Rect, callback: F)
    where
        F: FnMut(ProxyId) -> ControlFlow<()>,
    {
        self.tree.query(aabb, callback);
    }

    /// See [`DynamicTree::ray_cast`].
    pub fn ray_cast<F>(&self, input: &RayCastInput, callback: F)
    where
        F: FnMut(&RayCastInput, ProxyId) -> f64,
    {
        self.tree.ray_cast(input, callback);
    }

    /// See [`DynamicTree::shift_origin`].
    pub fn shift_origin(&mut self, new_origin: Vec2) {
        self.tree.shift_origin(new_origin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    fn unit(x: f64, y: f64) -> Rect {
        Rect::new(x, y, x + 1.0, y + 1.0)
    }

    fn collect_pairs(bp: &mut BroadPhase<u32>) -> Vec<(u32, u32)> {
        let mut pairs = Vec::new();
        bp.update_pairs(|a, b| pairs.push((*a.min(b), *a.max(b))));
        pairs.sort_unstable();
        pairs
    }

    #[test]
    fn reports_each_overlap_once() {
        let mut bp = BroadPhase::new();
        let _ = bp.create_proxy(unit(0.0, 0.0), 0);
        let _ = bp.create_proxy(unit(0.5, 0.0), 1);
        let _ = bp.create_proxy(unit(1.0, 0.5), 2);
        let _ = bp.create_proxy(unit(20.0, 20.0), 3);

        assert_eq!(collect_pairs(&mut bp), vec![(0, 1), (0, 2), (1, 2)]);
        assert_eq!(bp.proxy_count(), 4);
    }

    #[test]
    fn idle_update_reports_nothing() {
        let mut bp = BroadPhase::new();
        let _ = bp.create_proxy(unit(0.0, 0.0), 0);
        let _ = bp.create_proxy(unit(0.5, 0.0), 1);
        assert_eq!(collect_pairs(&mut bp).len(), 1);
        assert!(collect_pairs(&mut bp).is_empty());
    }

    #[test]
    fn small_move_is_not_buffered_but_touch_is() {
        let mut bp = BroadPhase::new();
        let a = bp.create_proxy(unit(0.0, 0.0), 0);
        let _ = bp.create_proxy(unit(0.5, 0.0), 1);
        let _ = collect_pairs(&mut bp);

        bp.move_proxy(a, unit(0.05, 0.0), Vec2::ZERO);
        assert!(collect_pairs(&mut bp).is_empty());

        bp.touch_proxy(a);
        assert_eq!(collect_pairs(&mut bp), vec![(0, 1)]);
    }

    #[test]
    fn moving_into_contact_creates_a_pair() {
        let mut bp = BroadPhase::new();
        let a = bp.create_proxy(unit(0.0, 0.0), 0);
        let b = bp.create_proxy(unit(10.0, 0.0), 1);
        assert!(collect_pairs(&mut bp).is_empty());
        assert!(!bp.test_overlap(a, b));

        bp.move_proxy(a, unit(9.5, 0.0), Vec2::new(9.5, 0.0));
        assert_eq!(collect_pairs(&mut bp), vec![(0, 1)]);
        assert!(bp.test_overlap(a, b));
    }

    #[test]
    fn destroyed_proxy_is_dropped_from_the_move_buffer() {
        let mut bp = BroadPhase::new();
        let a = bp.create_proxy(unit(0.0, 0.0), 0);
        let _ = bp.create_proxy(unit(0.5, 0.0), 1);
        assert_eq!(bp.destroy_proxy(a), 0);
        assert_eq!(bp.proxy_count(), 1);
        assert!(collect_pairs(&mut bp).is_empty());
        bp.tree().validate().expect("valid after destroy");
    }

    #[test]
    #[should_panic(expected = "is not a live proxy")]
    fn destroying_twice_panics_before_touching_the_count() {
        let mut bp = BroadPhase::new();
        let a = bp.create_proxy(unit(0.0, 0.0), 0_u32);
        let _ = bp.destroy_proxy(a);
        assert_eq!(bp.proxy_count(), 0);
        let _ = bp.destroy_proxy(a);
    }

    #[test]
    #[should_panic(expected = "is not a live proxy")]
    fn forwarded_accessors_panic_on_destroyed_proxy() {
        let mut bp = BroadPhase::new();
        let a = bp.create_proxy(unit(0.0, 0.0), 0_u32);
        let b = bp.create_proxy(unit(3.0, 0.0), 1_u32);
        let _ = bp.destroy_proxy(a);
        let _ = bp.test_overlap(a, b);
    }

    #[test]
    fn forwards_tree_metrics() {
        let mut bp = BroadPhase::new();
        assert_eq!(bp.tree_height(), 0);
        for i in 0..8_u32 {
            let _ = bp.create_proxy(unit(f64::from(i) * 3.0, 0.0), i);
        }
        assert!(bp.tree_height() >= 3);
        assert!(bp.tree_balance() <= 1);
        assert!(bp.tree_quality() >= 1.0);

        let before = bp.fat_aabb(ProxyId::new(0));
        bp.shift_origin(Vec2::new(1.0, 1.0));
        assert_eq!(bp.fat_aabb(ProxyId::new(0)), before - Vec2::new(1.0, 1.0));
    }
}
