// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Out-of-band maintenance: bottom-up rebuild, origin shifting, and quality metrics.

use alloc::vec::Vec;

use kurbo::Vec2;

use crate::arena::NodeKind;
use crate::tree::DynamicTree;
use crate::types::NULL_NODE;
use crate::util::{perimeter, shift, union};

impl<P> DynamicTree<P> {
    /// Height of the tree: `0` for a single leaf or an empty tree.
    pub fn height(&self) -> i32 {
        if self.root == NULL_NODE {
            return 0;
        }
        self.nodes[self.root].height
    }

    /// Sum of the perimeters of all allocated nodes divided by the root's perimeter.
    ///
    /// Lower is better; a freshly rebuilt tree is a good baseline. Returns `0.0` for
    /// an empty tree.
    pub fn area_ratio(&self) -> f64 {
        if self.root == NULL_NODE {
            return 0.0;
        }
        let root_area = perimeter(&self.nodes[self.root].aabb);
        let total: f64 = self
            .nodes
            .iter()
            .filter(|n| !n.is_free())
            .map(|n| perimeter(&n.aabb))
            .sum();
        total / root_area
    }

    /// Largest height difference between the two children of any internal node.
    pub fn max_balance(&self) -> i32 {
        self.nodes
            .iter()
            .filter(|n| n.height > 1)
            .filter_map(|n| n.children())
            .map(|(c1, c2)| (self.nodes[c2].height - self.nodes[c1].height).abs())
            .max()
            .unwrap_or(0)
    }

    /// Rebuild the whole tree bottom-up by greedily pairing the two entries whose
    /// combined box has the smallest perimeter.
    ///
    /// Leaves keep their ids and payloads; internal nodes are discarded and recreated.
    /// This is cubic in the number of proxies, so run it only on demand or when the
    /// tree has degraded after heavy churn.
    ///
    /// The greedy pairing does not consider heights, so the rebuilt tree may lean by
    /// more than one level at some nodes until later insertions and removals rotate
    /// them.
    pub fn rebuild_bottom_up(&mut self) {
        let mut entries: Vec<u32> = Vec::with_capacity(self.nodes.count());

        // Collect the leaves and free everything else.
        for i in 0..self.nodes.capacity() {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "Arena capacity always fits in u32."
            )]
            let id = i as u32;
            let node = &mut self.nodes[id];
            if node.is_leaf() {
                node.parent = NULL_NODE;
                entries.push(id);
            } else if !node.is_free() {
                let _ = self.nodes.free(id);
            }
        }

        let leaf_count = entries.len();
        while entries.len() > 1 {
            let (i_min, j_min) = self.cheapest_pair(&entries);

            let index1 = entries[i_min];
            let index2 = entries[j_min];
            let (c1, c2) = (&self.nodes[index1], &self.nodes[index2]);
            let aabb = union(&c1.aabb, &c2.aabb);
            let height = 1 + c1.height.max(c2.height);

            let parent = self.nodes.allocate(
                aabb,
                NodeKind::Internal {
                    child1: index1,
                    child2: index2,
                },
            );
            self.nodes[parent].height = height;
            self.nodes[index1].parent = parent;
            self.nodes[index2].parent = parent;

            let _ = entries.swap_remove(j_min);
            entries[i_min] = parent;
        }

        self.root = entries.first().copied().unwrap_or(NULL_NODE);

        tracing::debug!(leaves = leaf_count, height = self.height(), "rebuilt tree bottom-up");
        debug_assert_eq!(self.validate(), Ok(()), "rebuild produced an invalid tree");
    }

    /// Indices `(i, j)` with `i < j` of the two entries with the smallest combined perimeter.
    fn cheapest_pair(&self, entries: &[u32]) -> (usize, usize) {
        let mut min_cost = f64::MAX;
        let mut best = (0, 1);
        for (i, &a) in entries.iter().enumerate() {
            let aabb_i = self.nodes[a].aabb;
            for (j, &b) in entries.iter().enumerate().skip(i + 1) {
                let cost = perimeter(&union(&aabb_i, &self.nodes[b].aabb));
                if cost < min_cost {
                    min_cost = cost;
                    best = (i, j);
                }
            }
        }
        best
    }

    /// Translate every node by `-new_origin`, for worlds that periodically re-center
    /// their coordinate frame.
    pub fn shift_origin(&mut self, new_origin: Vec2) {
        for node in self.nodes.iter_mut().filter(|n| !n.is_free()) {
            node.aabb = shift(&node.aabb, new_origin);
        }
        tracing::trace!(x = new_origin.x, y = new_origin.y, "shifted tree origin");
    }
}
