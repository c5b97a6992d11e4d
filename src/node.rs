use std::fmt;

/// Arena slot reserved for the sentinel. Every missing child, and the
/// parent of the root, point here.
pub(crate) const NIL: usize = 0;

/// Color of a tree node. The sentinel is always [Color::Black].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

/// Which child link of a parent a node hangs from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) fn flip(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Handle to a node returned by [RbTree::insert] and the lookup API.
///
/// A handle stays valid until the entry it names is erased. Erasing a node
/// with two children moves its in-order successor's key into it, the
/// successor's slot is released and handles to it turn stale.
///
/// [RbTree::insert]: crate::RbTree::insert
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub(crate) tree: u32,
    pub(crate) index: usize,
    pub(crate) gen: u32,
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "NodeRef<{}:{}@{}>", self.tree, self.index, self.gen)
    }
}

// Node corresponds to a single entry in RbTree instance, or to the sentinel
// when key is None.
pub(crate) struct Node<K> {
    pub key: Option<K>,
    pub color: Color,
    pub left: usize,   // store: left child
    pub right: usize,  // store: right child
    pub parent: usize, // store: parent, back reference
    pub gen: u32,      // bumped each time the slot is released
}

impl<K> Node<K> {
    pub fn sentinel() -> Node<K> {
        Node {
            key: None,
            color: Color::Black,
            left: NIL,
            right: NIL,
            parent: NIL,
            gen: 0,
        }
    }

    #[inline]
    pub fn child(&self, side: Side) -> usize {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub fn set_child(&mut self, side: Side, child: usize) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    #[inline]
    pub fn is_red(&self) -> bool {
        self.color == Color::Red
    }

    #[inline]
    pub fn is_black(&self) -> bool {
        self.color == Color::Black
    }

    /// Reset links for a slot that is handed out again.
    pub fn reset(&mut self, key: K) {
        self.key = Some(key);
        self.color = Color::Red;
        self.left = NIL;
        self.right = NIL;
        self.parent = NIL;
    }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
