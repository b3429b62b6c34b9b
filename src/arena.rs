//! The node arena: owns every [`Node`] reachable from a collection's root,
//! addressed by [`NodeId`]. Detached subtrees are recycled onto a free list
//! so that long-running collections under repeated `collect()`/`rollback()`
//! don't grow without bound, the memory-ownership analogue of the original
//! Go implementation's garbage collector reclaiming unreferenced nodes.

use crate::node::{Node, NodeId, NodeSnapshot};

#[derive(Clone, Debug, Default)]
pub(crate) struct Arena {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
}

impl Arena {
    pub(crate) fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    pub(crate) fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.nodes[id.0 as usize] = node;
            id
        } else {
            let id = NodeId(self.nodes.len() as u32);
            self.nodes.push(node);
            id
        }
    }

    /// Creates two fresh placeholder children of `id`, clearing any leaf
    /// state on `id` itself (the caller is responsible for `id`'s own
    /// `key`/`values`/`known` afterwards).
    pub(crate) fn branch(&mut self, id: NodeId) -> (NodeId, NodeId) {
        let left = self.alloc(Node {
            parent: Some(id),
            ..Node::default()
        });
        let right = self.alloc(Node {
            parent: Some(id),
            ..Node::default()
        });

        let node = self.get_mut(id);
        node.left = Some(left);
        node.right = Some(right);

        (left, right)
    }

    /// Detaches both children of `id` without recycling them, leaving it a
    /// leaf. Use this (instead of [`Arena::prune`]) when a transaction is
    /// open and a backup might still need to resurrect these children on
    /// rollback; [`Arena::confirm`] recycles them once that can no longer
    /// happen.
    pub(crate) fn detach_children(&mut self, id: NodeId) -> (Option<NodeId>, Option<NodeId>) {
        let node = self.get_mut(id);
        (node.left.take(), node.right.take())
    }

    /// Detaches and immediately recycles both children of `id`, leaving it
    /// a leaf. Only safe when no outstanding backup could reference these
    /// children again: outside a transaction, or once backups have already
    /// been dropped (e.g. `collect()` at the tail of `end()`).
    pub(crate) fn prune(&mut self, id: NodeId) {
        let (left, right) = self.detach_children(id);

        if let Some(left) = left {
            self.retire_subtree(left);
        }
        if let Some(right) = right {
            self.retire_subtree(right);
        }
    }

    /// Recursively frees `id` and everything reachable below it. `id` must
    /// already be unreachable from the collection's root.
    fn retire_subtree(&mut self, id: NodeId) {
        let (left, right) = {
            let node = self.get(id);
            (node.left, node.right)
        };

        if let Some(left) = left {
            self.retire_subtree(left);
        }
        if let Some(right) = right {
            self.retire_subtree(right);
        }

        self.free.push(id);
    }

    /// Snapshots `id`'s current state, if no snapshot is outstanding yet.
    /// Idempotent within a single open transaction.
    pub(crate) fn backup(&mut self, id: NodeId) {
        let node = self.get_mut(id);
        if node.backup.is_some() {
            return;
        }
        node.backup = Some(Box::new(NodeSnapshot {
            digest: node.digest,
            known: node.known,
            inconsistent: node.inconsistent,
            key: node.key.clone(),
            values: node.values.clone(),
            left: node.left,
            right: node.right,
        }));
    }

    /// Overwrites `id` with its snapshot (if any), recycling any subtree
    /// that was grown since the snapshot was taken and is now discarded.
    pub(crate) fn restore(&mut self, id: NodeId) {
        let snapshot = match self.get_mut(id).backup.take() {
            Some(snapshot) => snapshot,
            None => return,
        };

        let (previous_left, previous_right) = {
            let node = self.get(id);
            (node.left, node.right)
        };

        let node = self.get_mut(id);
        node.digest = snapshot.digest;
        node.known = snapshot.known;
        node.inconsistent = snapshot.inconsistent;
        node.key = snapshot.key;
        node.values = snapshot.values;
        node.left = snapshot.left;
        node.right = snapshot.right;

        if previous_left != snapshot.left {
            if let Some(left) = previous_left {
                self.retire_subtree(left);
            }
        }
        if previous_right != snapshot.right {
            if let Some(right) = previous_right {
                self.retire_subtree(right);
            }
        }
    }

    /// Drops `id`'s backup (if any), keeping its current content. Recycles
    /// whichever children the snapshot remembers that are no longer
    /// current — the mirror image of [`Arena::restore`], used to finish
    /// reclaiming a subtree that [`Arena::detach_children`] left dangling
    /// during a transaction that went on to commit.
    pub(crate) fn confirm(&mut self, id: NodeId) {
        let snapshot = match self.get_mut(id).backup.take() {
            Some(snapshot) => snapshot,
            None => return,
        };

        let (current_left, current_right) = {
            let node = self.get(id);
            (node.left, node.right)
        };

        if snapshot.left != current_left {
            if let Some(left) = snapshot.left {
                self.retire_subtree(left);
            }
        }
        if snapshot.right != current_right {
            if let Some(right) = snapshot.right {
                self.retire_subtree(right);
            }
        }
    }

    /// Whether `id` currently carries a pending transactional snapshot.
    pub(crate) fn has_backup(&self, id: NodeId) -> bool {
        self.get(id).backup.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Digest;

    #[test]
    fn branch_creates_placeholder_children_with_parent_back_link() {
        let mut arena = Arena::default();
        let root = arena.alloc(Node::default());
        let (left, right) = arena.branch(root);

        assert!(arena.get(left).is_placeholder());
        assert!(arena.get(right).is_placeholder());
        assert_eq!(arena.get(left).parent, Some(root));
        assert_eq!(arena.get(right).parent, Some(root));
        assert!(!arena.get(root).is_leaf());
    }

    #[test]
    fn prune_detaches_children_and_recycles_their_ids() {
        let mut arena = Arena::default();
        let root = arena.alloc(Node::default());
        let (left, _right) = arena.branch(root);
        arena.prune(root);

        assert!(arena.get(root).is_leaf());
        let reused = arena.alloc(Node::default());
        assert_eq!(reused, left);
    }

    #[test]
    fn backup_is_idempotent_and_restore_reverts_content() {
        let mut arena = Arena::default();
        let id = arena.alloc(Node {
            digest: Digest([1; 32]),
            known: true,
            key: b"original".to_vec(),
            ..Node::default()
        });

        arena.backup(id);
        arena.backup(id);
        assert!(arena.has_backup(id));

        arena.get_mut(id).key = b"mutated".to_vec();
        arena.get_mut(id).digest = Digest([2; 32]);

        arena.restore(id);

        assert_eq!(arena.get(id).key, b"original");
        assert_eq!(arena.get(id).digest, Digest([1; 32]));
        assert!(!arena.has_backup(id));
    }

    #[test]
    fn restore_recycles_children_grown_after_the_snapshot() {
        let mut arena = Arena::default();
        let id = arena.alloc(Node::default());
        arena.backup(id);
        let (left, _right) = arena.branch(id);
        assert!(!arena.get(id).is_leaf());

        arena.restore(id);

        assert!(arena.get(id).is_leaf());
        let reused = arena.alloc(Node::default());
        assert_eq!(reused, left);
    }
}
