//! Ordered map backed by a red-black tree with parent-linked arena nodes.
//!
//! Insertion runs the classic five-case fixup (recolor toward the root,
//! rotate once at the end); lookups are plain BST descents. Deletion is
//! intentionally not provided.

mod map;
mod node;

pub use map::RbTreeMap;
