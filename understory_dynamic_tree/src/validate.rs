// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Consistency checks over the whole tree.

use alloc::vec;

use crate::arena::NodeKind;
use crate::error::ValidationError;
use crate::tree::DynamicTree;
use crate::types::NULL_NODE;
use crate::util::union;

impl<P> DynamicTree<P> {
    /// Height of the tree recomputed from the leaves up, ignoring stored heights.
    pub fn compute_height(&self) -> i32 {
        if self.root == NULL_NODE {
            return 0;
        }
        self.compute_height_of(self.root)
    }

    fn compute_height_of(&self, index: u32) -> i32 {
        match self.nodes[index].children() {
            Some((child1, child2)) => {
                1 + self
                    .compute_height_of(child1)
                    .max(self.compute_height_of(child2))
            }
            None => 0,
        }
    }

    /// Check every structural and metric invariant of the tree.
    ///
    /// Verifies parent/child links, stored heights, that internal boxes are the exact
    /// union of their children, that every allocated node is reachable from the root,
    /// and that the free list accounts for all remaining slots.
    ///
    /// This walks the entire arena; call it from tests and debug tooling rather than
    /// every frame.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant found.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Arena capacity always fits in u32."
    )]
    pub fn validate(&self) -> Result<(), ValidationError> {
        let capacity = self.nodes.capacity();
        let check_range = |node: u32, index: u32| {
            if (index as usize) < capacity {
                Ok(())
            } else {
                Err(ValidationError::IndexOutOfRange { node, index })
            }
        };

        let mut reachable = 0;
        if self.root != NULL_NODE {
            check_range(self.root, self.root)?;
            let parent = self.nodes[self.root].parent;
            if parent != NULL_NODE {
                return Err(ValidationError::RootHasParent {
                    root: self.root,
                    parent,
                });
            }

            let mut stack = vec![self.root];
            while let Some(index) = stack.pop() {
                reachable += 1;
                let node = &self.nodes[index];
                match node.kind {
                    NodeKind::Free { .. } => {
                        return Err(ValidationError::FreeNodeInTree { node: index });
                    }
                    NodeKind::Leaf { .. } => {
                        if node.height != 0 {
                            return Err(ValidationError::HeightMismatch {
                                node: index,
                                stored: node.height,
                                expected: 0,
                            });
                        }
                    }
                    NodeKind::Internal { child1, child2 } => {
                        for child in [child1, child2] {
                            check_range(index, child)?;
                            let found = self.nodes[child].parent;
                            if found != index {
                                return Err(ValidationError::ParentMismatch {
                                    node: index,
                                    child,
                                    found,
                                });
                            }
                        }
                        let (n1, n2) = (&self.nodes[child1], &self.nodes[child2]);
                        let expected = 1 + n1.height.max(n2.height);
                        if node.height != expected {
                            return Err(ValidationError::HeightMismatch {
                                node: index,
                                stored: node.height,
                                expected,
                            });
                        }
                        if node.aabb != union(&n1.aabb, &n2.aabb) {
                            return Err(ValidationError::AabbMismatch { node: index });
                        }
                        stack.push(child1);
                        stack.push(child2);
                    }
                }
            }
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_free() && node.height != -1 {
                return Err(ValidationError::FreeNodeHeight {
                    node: i as u32,
                    height: node.height,
                });
            }
        }

        let mut free = 0;
        let mut index = self.nodes.free_list_head();
        while index != NULL_NODE {
            check_range(index, index)?;
            if free >= capacity {
                return Err(ValidationError::FreeListCycle { node: index });
            }
            let NodeKind::Free { next } = self.nodes[index].kind else {
                return Err(ValidationError::AllocatedNodeOnFreeList { node: index });
            };
            free += 1;
            index = next;
        }

        let allocated = self.nodes.count();
        if allocated + free != capacity {
            return Err(ValidationError::CountMismatch {
                allocated,
                free,
                capacity,
            });
        }
        if reachable != allocated {
            return Err(ValidationError::Unreachable {
                reachable,
                allocated,
            });
        }

        let (stored, expected) = (self.height(), self.compute_height());
        if stored != expected {
            return Err(ValidationError::HeightMismatch {
                node: self.root,
                stored,
                expected,
            });
        }

        Ok(())
    }
}
