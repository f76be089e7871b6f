// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node storage: a growable pool of tree nodes with an intrusive free list.

use alloc::vec::Vec;
use core::ops::{Index, IndexMut};

use kurbo::Rect;

use crate::types::NULL_NODE;

/// What a slot currently holds.
#[derive(Clone, Debug)]
pub(crate) enum NodeKind<P> {
    /// Unallocated; links to the next free slot.
    Free { next: u32 },
    /// A proxy with its caller payload.
    Leaf { payload: P },
    /// A branch with exactly two children.
    Internal { child1: u32, child2: u32 },
}

#[derive(Clone, Debug)]
pub(crate) struct Node<P> {
    /// Fat box for leaves, union of the children for internal nodes.
    pub(crate) aabb: Rect,
    pub(crate) parent: u32,
    /// `0` for leaves, `1 + max(children)` for internal nodes, `-1` when free.
    pub(crate) height: i32,
    pub(crate) kind: NodeKind<P>,
}

impl<P> Node<P> {
    const fn free(next: u32) -> Self {
        Self {
            aabb: Rect::ZERO,
            parent: NULL_NODE,
            height: -1,
            kind: NodeKind::Free { next },
        }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    #[inline]
    pub(crate) fn is_free(&self) -> bool {
        matches!(self.kind, NodeKind::Free { .. })
    }

    /// Both children of an internal node, `None` otherwise.
    #[inline]
    pub(crate) fn children(&self) -> Option<(u32, u32)> {
        match self.kind {
            NodeKind::Internal { child1, child2 } => Some((child1, child2)),
            _ => None,
        }
    }

    /// Re-point whichever child link equals `old` at `new`.
    pub(crate) fn replace_child(&mut self, old: u32, new: u32) {
        if let NodeKind::Internal { child1, child2 } = &mut self.kind {
            if *child1 == old {
                *child1 = new;
            } else {
                debug_assert_eq!(*child2, old, "node is not a parent of {old}");
                *child2 = new;
            }
        } else {
            debug_assert!(false, "replace_child on a non-internal node");
        }
    }
}

/// Contiguous node pool addressed by `u32` index.
///
/// Capacity doubles when the free list runs dry; existing indices stay valid.
#[derive(Clone, Debug)]
pub(crate) struct NodeArena<P> {
    nodes: Vec<Node<P>>,
    free_list: u32,
    count: usize,
}

impl<P> NodeArena<P> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let mut arena = Self {
            nodes: Vec::new(),
            free_list: NULL_NODE,
            count: 0,
        };
        arena.grow_to(capacity.max(1));
        arena
    }

    /// Number of slots, allocated or not.
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Number of allocated slots.
    #[inline]
    pub(crate) fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub(crate) fn free_list_head(&self) -> u32 {
        self.free_list
    }

    #[inline]
    pub(crate) fn get(&self, id: u32) -> Option<&Node<P>> {
        self.nodes.get(id as usize)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: u32) -> Option<&mut Node<P>> {
        self.nodes.get_mut(id as usize)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Node<P>> + '_ {
        self.nodes.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Node<P>> + '_ {
        self.nodes.iter_mut()
    }

    /// Take a slot off the free list, growing the pool if needed.
    ///
    /// The returned node has no parent, height `0`, and the given box and kind.
    pub(crate) fn allocate(&mut self, aabb: Rect, kind: NodeKind<P>) -> u32 {
        if self.free_list == NULL_NODE {
            debug_assert_eq!(self.count, self.capacity(), "free list empty with free slots");
            let old = self.capacity();
            self.grow_to(old * 2);
            tracing::debug!(old_capacity = old, new_capacity = self.capacity(), "grew node arena");
        }

        let id = self.free_list;
        let node = &mut self.nodes[id as usize];
        let NodeKind::Free { next } = node.kind else {
            unreachable!("free list head {id} is allocated");
        };
        self.free_list = next;
        *node = Node {
            aabb,
            parent: NULL_NODE,
            height: 0,
            kind,
        };
        self.count += 1;
        id
    }

    /// Return a slot to the free list, handing back what it held.
    pub(crate) fn free(&mut self, id: u32) -> NodeKind<P> {
        debug_assert!((id as usize) < self.capacity(), "node {id} out of range");
        debug_assert!(self.count > 0, "freeing from an empty arena");
        let node = &mut self.nodes[id as usize];
        debug_assert!(!node.is_free(), "node {id} freed twice");
        node.height = -1;
        node.parent = NULL_NODE;
        let kind = core::mem::replace(
            &mut node.kind,
            NodeKind::Free {
                next: self.free_list,
            },
        );
        self.free_list = id;
        self.count -= 1;
        kind
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "Capacity is asserted to stay below the null sentinel, so indices fit in u32."
    )]
    fn grow_to(&mut self, new_capacity: usize) {
        let old = self.nodes.len();
        assert!(
            new_capacity < NULL_NODE as usize,
            "node arena cannot hold {new_capacity} nodes"
        );
        self.nodes.reserve_exact(new_capacity - old);
        for i in old..new_capacity {
            let next = if i + 1 == new_capacity {
                self.free_list
            } else {
                (i + 1) as u32
            };
            self.nodes.push(Node::free(next));
        }
        self.free_list = old as u32;
    }
}

impl<P> Index<u32> for NodeArena<P> {
    type Output = Node<P>;

    #[inline]
    fn index(&self, id: u32) -> &Node<P> {
        &self.nodes[id as usize]
    }
}

impl<P> IndexMut<u32> for NodeArena<P> {
    #[inline]
    fn index_mut(&mut self, id: u32) -> &mut Node<P> {
        &mut self.nodes[id as usize]
    }
}
