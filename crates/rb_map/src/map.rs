//! The map itself: downward search, insertion, and the insertion-fixup cases.

use std::cmp::Ordering;
use std::fmt;

use crate::node::{Color, Id, NodeArena};

/// Ordered map backed by a red-black tree.
///
/// - Keys are unique; `insert` overwrites the existing value and returns the
///   old one.
/// - Lookups descend from the root without mutating the tree.
/// - `clear` drops the whole node arena at once.
pub struct RbTreeMap<K: Ord, V> {
    arena: NodeArena<K, V>,
    root: Id,
    len: usize,
}

enum SearchResult {
    Found(Id),
    /// `parent` is the last node visited on the way down, the prospective
    /// parent for an insertion; `NIL` when the tree is empty.
    Vacant { parent: Id },
}

impl<K: Ord, V> RbTreeMap<K, V> {
    pub fn new() -> Self {
        Self {
            arena: NodeArena::new(),
            root: Id::NIL,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Single root-to-leaf descent backing `insert`, `get`, and
    /// `contains_key`.
    fn find_node(&self, key: &K) -> SearchResult {
        let mut current = self.root;
        let mut parent = Id::NIL;
        while !current.is_nil() {
            parent = current;
            let node = self.arena.node(current);
            current = match key.cmp(&node.key) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return SearchResult::Found(current),
            };
        }
        SearchResult::Vacant { parent }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        match self.find_node(key) {
            SearchResult::Found(node) => Some(&self.arena.node(node).value),
            SearchResult::Vacant { .. } => None,
        }
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        match self.find_node(key) {
            SearchResult::Found(node) => Some(&mut self.arena.node_mut(node).value),
            SearchResult::Vacant { .. } => None,
        }
    }

    pub fn contains_key(&self, key: &K) -> bool {
        matches!(self.find_node(key), SearchResult::Found(_))
    }

    /// Inserts `key` → `value` and returns the previous value if the key was
    /// already present. A duplicate key only swaps the value in place; the
    /// structure and colors stay untouched.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let parent = match self.find_node(&key) {
            SearchResult::Found(node) => {
                let slot = &mut self.arena.node_mut(node).value;
                return Some(std::mem::replace(slot, value));
            }
            SearchResult::Vacant { parent } => parent,
        };

        if parent.is_nil() {
            // First entry goes in directly as the black root.
            self.root = self.arena.alloc(key, value, Color::Black);
            self.len = 1;
            return None;
        }

        let ordering = key.cmp(&self.arena.node(parent).key);
        debug_assert_ne!(ordering, Ordering::Equal);
        let node = self.arena.alloc(key, value, Color::Red);
        if ordering == Ordering::Less {
            self.arena.set_left(parent, node);
        } else {
            self.arena.set_right(parent, node);
        }
        self.len += 1;
        self.rebalance_after_insert(node);
        None
    }

    /// Restores the coloring invariants after `node` was linked in as a red
    /// leaf. The five cases are mutually exclusive and checked in order; only
    /// the red-uncle recoloring loops, moving the cursor to the grandparent
    /// (which may itself be the root, hence re-entry at the top).
    fn rebalance_after_insert(&mut self, node: Id) {
        let mut current = node;
        loop {
            // Case 1: the cursor reached the root; paint it black.
            if current == self.root {
                self.arena.set_black(current);
                return;
            }

            // Case 2: a black parent absorbs a red child as is.
            let parent = self.arena.parent(current);
            if self.arena.is_black(parent) {
                return;
            }

            // Case 3: red parent and red uncle; recolor and retry from the
            // grandparent.
            let uncle = self.arena.uncle(current);
            if self.arena.is_red(uncle) {
                let grandparent = self.arena.grandparent(current);
                self.arena.set_black(parent);
                self.arena.set_black(uncle);
                self.arena.set_red(grandparent);
                current = grandparent;
                continue;
            }

            // Case 4: inner grandchild; rotate the parent so the conflict
            // lies on a straight line, then continue from the former parent.
            if self.arena.is_left_child(parent) && self.arena.is_right_child(current) {
                self.arena.rotate_left(parent);
                current = parent;
            } else if self.arena.is_right_child(parent) && self.arena.is_left_child(current) {
                self.arena.rotate_right(parent);
                current = parent;
            }

            // Case 5: outer grandchild; recolor, rotate the grandparent away
            // from the cursor's side, and stop.
            let parent = self.arena.parent(current);
            let grandparent = self.arena.grandparent(current);
            let grandparent_was_root = grandparent == self.root;
            self.arena.set_black(parent);
            self.arena.set_red(grandparent);
            let subtree_root = if self.arena.is_left_child(current) {
                self.arena.rotate_right(grandparent)
            } else {
                self.arena.rotate_left(grandparent)
            };
            if grandparent_was_root {
                self.root = subtree_root;
            }
            return;
        }
    }

    /// Resets to the empty state; the arena storage is released wholesale.
    pub fn clear(&mut self) {
        self.root = Id::NIL;
        self.len = 0;
        self.arena.clear();
    }
}

impl<K: Ord, V> Default for RbTreeMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for RbTreeMap<K, V>
where
    K: Ord + fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RBT ")?;
        self.fmt_node(f, self.root)
    }
}

impl<K, V> RbTreeMap<K, V>
where
    K: Ord + fmt::Debug,
    V: fmt::Debug,
{
    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, node: Id) -> fmt::Result {
        if node.is_nil() {
            return write!(f, "nil");
        }
        let n = self.arena.node(node);
        write!(f, "{{ {:?}: ", n.color)?;
        self.fmt_node(f, n.left)?;
        write!(f, " [{:?}, {:?}] ", n.key, n.value)?;
        self.fmt_node(f, n.right)?;
        write!(f, " }}")
    }
}

#[cfg(test)]
impl<K: Ord, V> RbTreeMap<K, V> {
    pub(crate) fn from_raw_parts(arena: NodeArena<K, V>, root: Id, len: usize) -> Self {
        Self { arena, root, len }
    }

    /// Walks the whole tree and reports the first violated invariant.
    pub(crate) fn check_invariants(&self) -> Result<(), String> {
        if self.root.is_nil() {
            if self.len != 0 {
                return Err(format!("empty tree but len is {}", self.len));
            }
            return Ok(());
        }
        if !self.arena.parent(self.root).is_nil() {
            return Err("root has a parent back-reference".to_string());
        }
        if self.arena.is_red(self.root) {
            return Err("root is red".to_string());
        }
        let mut count = 0;
        self.check_subtree(self.root, None, None, &mut count)?;
        if count != self.len {
            return Err(format!(
                "len is {} but {count} nodes are reachable",
                self.len
            ));
        }
        Ok(())
    }

    /// Returns the black height of the subtree, counting absent positions.
    fn check_subtree(
        &self,
        node: Id,
        low: Option<&K>,
        high: Option<&K>,
        count: &mut usize,
    ) -> Result<u32, String> {
        if node.is_nil() {
            return Ok(1);
        }
        *count += 1;
        let n = self.arena.node(node);
        for child in [n.left, n.right] {
            if !child.is_nil() && self.arena.parent(child) != node {
                return Err("child back-reference does not point at its parent".to_string());
            }
        }
        if let Some(low) = low {
            if n.key <= *low {
                return Err("BST order violated on a left bound".to_string());
            }
        }
        if let Some(high) = high {
            if n.key >= *high {
                return Err("BST order violated on a right bound".to_string());
            }
        }
        if self.arena.is_red(node) && (self.arena.is_red(n.left) || self.arena.is_red(n.right)) {
            return Err("red node has a red child".to_string());
        }
        let left_bh = self.check_subtree(n.left, low, Some(&n.key), count)?;
        let right_bh = self.check_subtree(n.right, Some(&n.key), high, count)?;
        if left_bh != right_bh {
            return Err("black heights differ between subtrees".to_string());
        }
        Ok(left_bh + u32::from(self.arena.is_black(node)))
    }

    pub(crate) fn keys_in_order(&self) -> Vec<K>
    where
        K: Clone,
    {
        let mut out = Vec::with_capacity(self.len);
        self.push_keys(self.root, &mut out);
        out
    }

    fn push_keys(&self, node: Id, out: &mut Vec<K>)
    where
        K: Clone,
    {
        if node.is_nil() {
            return;
        }
        let n = self.arena.node(node);
        self.push_keys(n.left, out);
        out.push(n.key.clone());
        self.push_keys(n.right, out);
    }

    pub(crate) fn height(&self) -> usize {
        self.subtree_height(self.root)
    }

    fn subtree_height(&self, node: Id) -> usize {
        if node.is_nil() {
            return 0;
        }
        let n = self.arena.node(node);
        1 + self.subtree_height(n.left).max(self.subtree_height(n.right))
    }
}
