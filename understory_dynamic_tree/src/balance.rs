// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! AVL-style rotations keeping sibling subtree heights within one of each other.

use crate::arena::NodeKind;
use crate::tree::DynamicTree;
use crate::types::NULL_NODE;

impl<P> DynamicTree<P> {
    /// Perform one rotation at `ia` if its children's heights differ by more than one.
    ///
    /// The taller child takes `ia`'s place. `ia` keeps its shorter child and receives
    /// the lower of the promoted child's two children; the higher one stays with the
    /// promoted node. Both nodes are refitted. Returns the root of the subtree, which
    /// is `ia` itself when no rotation was needed.
    pub(crate) fn balance(&mut self, ia: u32) -> u32 {
        debug_assert_ne!(ia, NULL_NODE, "balancing the null node");

        let a = &self.nodes[ia];
        if a.height < 2 {
            return ia;
        }
        let Some((ib, ic)) = a.children() else {
            return ia;
        };

        let balance = self.nodes[ic].height - self.nodes[ib].height;
        if balance > 1 {
            self.rotate_up(ia, ic)
        } else if balance < -1 {
            self.rotate_up(ia, ib)
        } else {
            ia
        }
    }

    /// [`balance`](Self::balance) at `index`, then settle the node the rotation pushed
    /// down and refit the subtree root. Returns the subtree root.
    pub(crate) fn rebalance(&mut self, index: u32) -> u32 {
        let top = self.balance(index);
        if top != index {
            // The demoted node pairs the short side with a grandchild and may still
            // lean by more than one.
            let _ = self.rebalance(index);
        }
        self.refit_node(top);
        top
    }

    /// Promote child `it` of `ia` into `ia`'s position.
    fn rotate_up(&mut self, ia: u32, it: u32) -> u32 {
        let Some((i1, i2)) = self.nodes[it].children() else {
            unreachable!("promoted node {it} has height >= 1 but no children");
        };
        let (high, low) = if self.nodes[i1].height > self.nodes[i2].height {
            (i1, i2)
        } else {
            (i2, i1)
        };

        let grand_parent = self.nodes[ia].parent;
        self.nodes[it].parent = grand_parent;
        self.nodes[ia].parent = it;
        if grand_parent == NULL_NODE {
            self.root = it;
        } else {
            self.nodes[grand_parent].replace_child(ia, it);
        }

        self.nodes[it].kind = NodeKind::Internal {
            child1: ia,
            child2: high,
        };
        self.nodes[ia].replace_child(it, low);
        self.nodes[low].parent = ia;

        self.refit_node(ia);
        self.refit_node(it);
        it
    }
}
