//! Arena-backed tree vertices and the structural surgery on them.
//!
//! Nodes live in a `Vec` and point at each other through `Id` indices; `NIL`
//! stands for "no node". Child links and the parent back-reference are always
//! updated as a pair, so the link invariant (`parent.left == node` or
//! `parent.right == node` whenever a parent is present) holds between any two
//! calls into the arena.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Color {
    Red,
    Black,
}

#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Id(u32);

impl Id {
    pub(crate) const NIL: Self = Self(u32::MAX);

    #[inline(always)]
    pub(crate) fn is_nil(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline(always)]
    fn idx(self) -> usize {
        self.0 as usize
    }
}

pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) color: Color,
    pub(crate) left: Id,
    pub(crate) right: Id,
    pub(crate) parent: Id,
}

pub(crate) struct NodeArena<K, V> {
    nodes: Vec<Node<K, V>>,
}

impl<K, V> NodeArena<K, V> {
    pub(crate) fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub(crate) fn alloc(&mut self, key: K, value: V, color: Color) -> Id {
        debug_assert!(self.nodes.len() < u32::MAX as usize);
        let id = Id(self.nodes.len() as u32);
        self.nodes.push(Node {
            key,
            value,
            color,
            left: Id::NIL,
            right: Id::NIL,
            parent: Id::NIL,
        });
        id
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
    }

    #[inline(always)]
    pub(crate) fn node(&self, x: Id) -> &Node<K, V> {
        debug_assert!(!x.is_nil());
        debug_assert!(x.idx() < self.nodes.len());
        if cfg!(debug_assertions) {
            &self.nodes[x.idx()]
        } else {
            // SAFETY: `Id` values are only created by `alloc` and `NIL` is checked.
            unsafe { self.nodes.get_unchecked(x.idx()) }
        }
    }

    #[inline(always)]
    pub(crate) fn node_mut(&mut self, x: Id) -> &mut Node<K, V> {
        debug_assert!(!x.is_nil());
        debug_assert!(x.idx() < self.nodes.len());
        if cfg!(debug_assertions) {
            &mut self.nodes[x.idx()]
        } else {
            // SAFETY: `Id` values are only created by `alloc` and `NIL` is checked.
            unsafe { self.nodes.get_unchecked_mut(x.idx()) }
        }
    }

    #[inline(always)]
    pub(crate) fn parent(&self, x: Id) -> Id {
        self.node(x).parent
    }

    /// Installs `child` (possibly `NIL`) as the left link of `parent`, fixing
    /// the back-references on both sides.
    pub(crate) fn set_left(&mut self, parent: Id, child: Id) {
        let old = self.node(parent).left;
        // A previous occupant that was already relinked elsewhere keeps its
        // new back-reference; only a child still pointing here is detached.
        if !old.is_nil() && self.node(old).parent == parent {
            self.node_mut(old).parent = Id::NIL;
        }
        self.node_mut(parent).left = child;
        if !child.is_nil() {
            self.node_mut(child).parent = parent;
        }
    }

    pub(crate) fn set_right(&mut self, parent: Id, child: Id) {
        let old = self.node(parent).right;
        if !old.is_nil() && self.node(old).parent == parent {
            self.node_mut(old).parent = Id::NIL;
        }
        self.node_mut(parent).right = child;
        if !child.is_nil() {
            self.node_mut(child).parent = parent;
        }
    }

    pub(crate) fn is_left_child(&self, x: Id) -> bool {
        let p = self.node(x).parent;
        !p.is_nil() && self.node(p).left == x
    }

    pub(crate) fn is_right_child(&self, x: Id) -> bool {
        let p = self.node(x).parent;
        !p.is_nil() && self.node(p).right == x
    }

    pub(crate) fn grandparent(&self, x: Id) -> Id {
        let p = self.node(x).parent;
        if p.is_nil() {
            return Id::NIL;
        }
        self.node(p).parent
    }

    /// The grandparent's other child, `NIL` when there is no grandparent.
    pub(crate) fn uncle(&self, x: Id) -> Id {
        let g = self.grandparent(x);
        if g.is_nil() {
            return Id::NIL;
        }
        let p = self.node(x).parent;
        if self.node(g).left == p {
            self.node(g).right
        } else {
            self.node(g).left
        }
    }

    /// Rotates the subtree rooted at `x` to the right and returns the new
    /// subtree root (`x`'s former left child). `x`'s former parent is
    /// repointed at the new root; when `x` had no parent the caller is
    /// responsible for updating the tree's root reference. Colors are left
    /// untouched.
    pub(crate) fn rotate_right(&mut self, x: Id) -> Id {
        let pivot = self.node(x).left;
        debug_assert!(!pivot.is_nil(), "rotate_right needs a left child");
        let inner = self.node(pivot).right;
        self.set_left(x, inner);
        self.replace_in_parent(x, pivot);
        self.set_right(pivot, x);
        pivot
    }

    /// Mirror of [`rotate_right`](Self::rotate_right).
    pub(crate) fn rotate_left(&mut self, x: Id) -> Id {
        let pivot = self.node(x).right;
        debug_assert!(!pivot.is_nil(), "rotate_left needs a right child");
        let inner = self.node(pivot).left;
        self.set_right(x, inner);
        self.replace_in_parent(x, pivot);
        self.set_left(pivot, x);
        pivot
    }

    fn replace_in_parent(&mut self, x: Id, new_child: Id) {
        let p = self.node(x).parent;
        if p.is_nil() {
            return;
        }
        if self.node(p).left == x {
            self.set_left(p, new_child);
        } else {
            self.set_right(p, new_child);
        }
    }

    #[inline(always)]
    pub(crate) fn is_red(&self, x: Id) -> bool {
        !x.is_nil() && self.node(x).color == Color::Red
    }

    /// An absent position counts as black, the usual leaf convention.
    #[inline(always)]
    pub(crate) fn is_black(&self, x: Id) -> bool {
        x.is_nil() || self.node(x).color == Color::Black
    }

    #[inline(always)]
    pub(crate) fn set_red(&mut self, x: Id) {
        self.node_mut(x).color = Color::Red;
    }

    #[inline(always)]
    pub(crate) fn set_black(&mut self, x: Id) {
        self.node_mut(x).color = Color::Black;
    }
}
