// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by [`DynamicTree::validate`](crate::DynamicTree::validate).

/// A broken tree invariant, with the node where it was observed.
///
/// Any of these indicates a bug in the tree (or memory corruption); a tree driven
/// only through its public API never reports one.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// The root node has a parent link.
    #[error("root node {root} has parent {parent}")]
    RootHasParent {
        /// Root index.
        root: u32,
        /// Parent index found on the root.
        parent: u32,
    },
    /// A node index points outside the arena.
    #[error("node {node} refers to out-of-range index {index}")]
    IndexOutOfRange {
        /// Node holding the bad link.
        node: u32,
        /// The offending index.
        index: u32,
    },
    /// A free slot is linked into the tree.
    #[error("node {node} is reachable from the root but sits on the free list")]
    FreeNodeInTree {
        /// The free node.
        node: u32,
    },
    /// A child does not point back at its parent.
    #[error("child {child} of node {node} has parent {found}")]
    ParentMismatch {
        /// Parent node.
        node: u32,
        /// Child node.
        child: u32,
        /// Parent link stored on the child.
        found: u32,
    },
    /// A stored height disagrees with the height derived from the children.
    #[error("node {node} stores height {stored}, expected {expected}")]
    HeightMismatch {
        /// Node index.
        node: u32,
        /// Stored height.
        stored: i32,
        /// Height derived from the children (`0` for leaves).
        expected: i32,
    },
    /// An internal node's box is not the exact union of its children's boxes.
    #[error("node {node} box is not the union of its children")]
    AabbMismatch {
        /// Node index.
        node: u32,
    },
    /// A free slot does not carry the `-1` height marker.
    #[error("free node {node} has height {height}")]
    FreeNodeHeight {
        /// Node index.
        node: u32,
        /// Stored height.
        height: i32,
    },
    /// An allocated node is linked into the free list.
    #[error("allocated node {node} is on the free list")]
    AllocatedNodeOnFreeList {
        /// Node index.
        node: u32,
    },
    /// The free list loops back on itself.
    #[error("free list revisits node {node}")]
    FreeListCycle {
        /// First repeated node.
        node: u32,
    },
    /// Allocated plus free slots do not add up to the arena capacity.
    #[error("{allocated} allocated + {free} free != capacity {capacity}")]
    CountMismatch {
        /// Allocated node count.
        allocated: usize,
        /// Free-list length.
        free: usize,
        /// Arena capacity.
        capacity: usize,
    },
    /// Some allocated nodes are not reachable from the root.
    #[error("{reachable} nodes reachable from the root, {allocated} allocated")]
    Unreachable {
        /// Nodes visited from the root.
        reachable: usize,
        /// Allocated node count.
        allocated: usize,
    },
}
