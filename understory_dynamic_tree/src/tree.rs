// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree: proxy lifecycle, leaf insertion and removal, accessors.

use kurbo::{Rect, Vec2};

use crate::arena::{NodeArena, NodeKind};
use crate::types::{NULL_NODE, ProxyId, TreeConfig};
use crate::util::{contains, extend_along, fatten, perimeter, union};

/// A dynamic AABB tree.
///
/// Leaves ("proxies") hold a fattened box and a payload `P`. Internal nodes hold the
/// union of their two children. Rotations at every ancestor touched by an insertion
/// or removal keep sibling heights within one of each other.
///
/// The tree is not internally synchronized: mutate it from one thread, and only run
/// read-only queries concurrently with each other.
pub struct DynamicTree<P> {
    pub(crate) nodes: NodeArena<P>,
    pub(crate) root: u32,
    pub(crate) config: TreeConfig,
    insertion_count: u64,
}

impl<P> core::fmt::Debug for DynamicTree<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DynamicTree")
            .field("node_capacity", &self.nodes.capacity())
            .field("node_count", &self.nodes.count())
            .field("height", &self.height())
            .field("insertion_count", &self.insertion_count)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<P> Default for DynamicTree<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> DynamicTree<P> {
    /// Create an empty tree with the default [`TreeConfig`].
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    /// Create an empty tree with the given configuration.
    pub fn with_config(config: TreeConfig) -> Self {
        Self {
            nodes: NodeArena::with_capacity(config.initial_capacity),
            root: NULL_NODE,
            config,
            insertion_count: 0,
        }
    }

    /// The configuration this tree was built with.
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Create a proxy for `aabb`, stored fattened by the configured margin.
    ///
    /// The returned id stays valid until it is passed to [`destroy_proxy`](Self::destroy_proxy).
    pub fn create_proxy(&mut self, aabb: Rect, payload: P) -> ProxyId {
        let fat = fatten(&aabb, self.config.aabb_margin);
        let leaf = self.nodes.allocate(fat, NodeKind::Leaf { payload });
        self.insert_leaf(leaf);
        ProxyId::new(leaf)
    }

    /// Remove a proxy and return its payload.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a live proxy.
    pub fn destroy_proxy(&mut self, id: ProxyId) -> P {
        self.assert_proxy(id);
        self.remove_leaf(id.0);
        match self.nodes.free(id.0) {
            NodeKind::Leaf { payload } => payload,
            _ => unreachable!("proxy {} was not a leaf", id.0),
        }
    }

    /// Move a proxy to `aabb`, predicting further motion along `displacement`.
    ///
    /// Returns `false` without touching the tree when the current fat box still
    /// contains `aabb`. Otherwise the proxy is re-inserted with a new fat box that is
    /// `aabb` expanded by the margin and stretched along
    /// `displacement * displacement_multiplier`, and `true` is returned.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a live proxy.
    pub fn move_proxy(&mut self, id: ProxyId, aabb: Rect, displacement: Vec2) -> bool {
        self.assert_proxy(id);

        if contains(&self.nodes[id.0].aabb, &aabb) {
            return false;
        }

        self.remove_leaf(id.0);

        let fat = fatten(&aabb, self.config.aabb_margin);
        let predicted = extend_along(&fat, self.config.displacement_multiplier * displacement);
        self.nodes[id.0].aabb = predicted;

        self.insert_leaf(id.0);
        true
    }

    /// The fat box stored for a proxy.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a live proxy.
    pub fn fat_aabb(&self, id: ProxyId) -> Rect {
        self.assert_proxy(id);
        self.nodes[id.0].aabb
    }

    /// The payload stored for a proxy.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a live proxy.
    pub fn user_data(&self, id: ProxyId) -> &P {
        match self.nodes.get(id.0).map(|n| &n.kind) {
            Some(NodeKind::Leaf { payload }) => payload,
            _ => panic!("{id:?} is not a live proxy"),
        }
    }

    /// Mutable access to the payload stored for a proxy.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a live proxy.
    pub fn user_data_mut(&mut self, id: ProxyId) -> &mut P {
        match self.nodes.get_mut(id.0).map(|n| &mut n.kind) {
            Some(NodeKind::Leaf { payload }) => payload,
            _ => panic!("{id:?} is not a live proxy"),
        }
    }

    /// Whether `id` currently names a live proxy.
    pub fn is_proxy(&self, id: ProxyId) -> bool {
        self.nodes.get(id.0).is_some_and(|n| n.is_leaf())
    }

    /// Number of live proxies.
    pub fn proxy_count(&self) -> usize {
        // A full binary tree with `n` leaves has `n - 1` internal nodes.
        self.nodes.count().div_ceil(2)
    }

    /// Number of allocated nodes, leaves and internal.
    pub fn node_count(&self) -> usize {
        self.nodes.count()
    }

    /// Number of node slots in the arena.
    pub fn node_capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Total leaf insertions performed, including re-insertions by moves.
    pub fn insertion_count(&self) -> u64 {
        self.insertion_count
    }

    /// The root node index, if any.
    #[cfg(test)]
    pub(crate) fn root(&self) -> Option<u32> {
        (self.root != NULL_NODE).then_some(self.root)
    }

    fn assert_proxy(&self, id: ProxyId) {
        assert!(self.is_proxy(id), "{id:?} is not a live proxy");
    }

    /// Attach an allocated leaf at the cheapest position and repair its ancestors.
    pub(crate) fn insert_leaf(&mut self, leaf: u32) {
        self.insertion_count += 1;

        if self.root == NULL_NODE {
            self.root = leaf;
            self.nodes[leaf].parent = NULL_NODE;
            return;
        }

        let leaf_aabb = self.nodes[leaf].aabb;
        let sibling = self.find_best_sibling(&leaf_aabb);

        let old_parent = self.nodes[sibling].parent;
        let combined = union(&leaf_aabb, &self.nodes[sibling].aabb);
        let new_parent = self.nodes.allocate(
            combined,
            NodeKind::Internal {
                child1: sibling,
                child2: leaf,
            },
        );
        self.nodes[new_parent].parent = old_parent;
        self.nodes[new_parent].height = self.nodes[sibling].height + 1;

        if old_parent == NULL_NODE {
            self.root = new_parent;
        } else {
            self.nodes[old_parent].replace_child(sibling, new_parent);
        }
        self.nodes[sibling].parent = new_parent;
        self.nodes[leaf].parent = new_parent;

        self.refit_from(new_parent);
    }

    /// Descend from the root choosing the sibling that minimizes added perimeter.
    fn find_best_sibling(&self, leaf_aabb: &Rect) -> u32 {
        let mut index = self.root;
        while let Some((child1, child2)) = self.nodes[index].children() {
            let node_aabb = &self.nodes[index].aabb;
            let area = perimeter(node_aabb);
            let combined_area = perimeter(&union(node_aabb, leaf_aabb));

            // Cost of pairing the leaf with this node under a new parent.
            let cost = 2.0 * combined_area;
            // Minimum cost of pushing the leaf further down the tree.
            let inheritance_cost = 2.0 * (combined_area - area);

            let cost1 = self.descent_cost(child1, leaf_aabb) + inheritance_cost;
            let cost2 = self.descent_cost(child2, leaf_aabb) + inheritance_cost;

            if cost < cost1 && cost < cost2 {
                break;
            }

            index = if cost1 <= cost2 { child1 } else { child2 };
        }
        index
    }

    fn descent_cost(&self, child: u32, leaf_aabb: &Rect) -> f64 {
        let child = &self.nodes[child];
        let combined = perimeter(&union(leaf_aabb, &child.aabb));
        if child.is_leaf() {
            combined
        } else {
            combined - perimeter(&child.aabb)
        }
    }

    /// Detach a leaf, splicing its sibling into the parent's place. The leaf stays allocated.
    pub(crate) fn remove_leaf(&mut self, leaf: u32) {
        if leaf == self.root {
            self.root = NULL_NODE;
            return;
        }

        let parent = self.nodes[leaf].parent;
        let grand_parent = self.nodes[parent].parent;
        let Some((child1, child2)) = self.nodes[parent].children() else {
            unreachable!("parent {parent} of leaf {leaf} is not internal");
        };
        let sibling = if child1 == leaf { child2 } else { child1 };

        self.nodes[sibling].parent = grand_parent;
        let _ = self.nodes.free(parent);
        self.nodes[leaf].parent = NULL_NODE;

        if grand_parent == NULL_NODE {
            self.root = sibling;
        } else {
            self.nodes[grand_parent].replace_child(parent, sibling);
            self.refit_from(grand_parent);
        }
    }

    /// Walk to the root rebalancing and recomputing height and box at each ancestor.
    fn refit_from(&mut self, start: u32) {
        let mut index = start;
        while index != NULL_NODE {
            index = self.rebalance(index);
            index = self.nodes[index].parent;
        }
    }

    /// Recompute an internal node's height and box from its children.
    pub(crate) fn refit_node(&mut self, index: u32) {
        let Some((child1, child2)) = self.nodes[index].children() else {
            debug_assert!(false, "refit of non-internal node {index}");
            return;
        };
        let (c1, c2) = (&self.nodes[child1], &self.nodes[child2]);
        let height = 1 + c1.height.max(c2.height);
        let aabb = union(&c1.aabb, &c2.aabb);
        let node = &mut self.nodes[index];
        node.height = height;
        node.aabb = aabb;
    }
}
