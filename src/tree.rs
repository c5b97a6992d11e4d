//! Module provide the ordered index implemented by [RbTree] type.
//!
//! RbTree is a classic [red-black tree][wiki-rbt] with parent links and a
//! shared black sentinel:
//!
//! - Parametrised over a single `key-type`, duplicates allowed.
//! - insert(), find(), erase() api, addressed by [NodeRef] handles.
//! - min(), max(), successor(), predecessor() walks.
//! - Full table scan via iter() and to_array().
//! - No Durability guarantee.
//! - Not thread safe.
//!
//! Nodes are kept in an arena owned by the tree. Slot ZERO of the arena is
//! the sentinel, so child and parent links are plain indices and the
//! rebalancing code never has to special case a missing node.
//!
//! Full table scan:
//! ```
//! use rbtree::RbTree;
//!
//! let index: RbTree<String> = vec!["key2", "key1", "key3"]
//!     .into_iter()
//!     .map(|s| s.to_string())
//!     .collect();
//!
//! for (i, key) in index.iter().enumerate() {
//!     assert_eq!(key, &format!("key{}", i + 1));
//! }
//! let keys: Vec<&String> = index.iter().rev().collect();
//! assert_eq!(keys, vec!["key3", "key2", "key1"]);
//! ```
//!
//! [wiki-rbt]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree

use log::debug;

use std::{
    borrow::Borrow,
    cmp::Ordering,
    fmt,
    iter::FromIterator,
    mem,
    sync::atomic::{AtomicU32, Ordering::SeqCst},
};

use crate::{
    arena::Arena,
    node::{Color, NodeRef, Side, NIL},
    Error, Result,
};

static TREE_ID: AtomicU32 = AtomicU32::new(1);

fn next_tree_id() -> u32 {
    TREE_ID.fetch_add(1, SeqCst)
}

/// RbTree manage a single instance of in-memory ordered index using
/// [red-black][rbt] tree.
///
/// [rbt]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree
pub struct RbTree<K> {
    pub(crate) id: u32,
    pub(crate) root: usize,
    pub(crate) arena: Arena<K>,
}

impl<K> Default for RbTree<K> {
    fn default() -> RbTree<K> {
        RbTree::new()
    }
}

impl<K> RbTree<K> {
    /// Create an empty instance of RbTree.
    pub fn new() -> RbTree<K> {
        RbTree {
            id: next_tree_id(),
            root: NIL,
            arena: Arena::new(),
        }
    }

    /// Create an empty instance with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> RbTree<K> {
        RbTree {
            id: next_tree_id(),
            root: NIL,
            arena: Arena::with_capacity(capacity),
        }
    }
}

/// Maintenance API.
impl<K> RbTree<K> {
    /// Return number of entries in this instance.
    #[inline]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Check whether this index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root == NIL
    }

    /// Number of nodes the tree can hold without growing its storage.
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Remove all entries. Handles issued before the call become invalid.
    pub fn clear(&mut self) {
        let n = self.teardown(self.root);
        self.arena.clear();
        self.root = NIL;
        self.id = next_tree_id();
        debug!("rbtree clear, released {} nodes", n);
    }

    /// Validate the tree with following rules:
    ///
    /// * Sentinel and root are black.
    /// * From root to any leaf, no consecutive reds allowed in its path.
    /// * Number of blacks should be same under left child and right child.
    /// * Every child points back to its parent.
    /// * Keys are in non-decreasing in-order sequence.
    /// * Number of reachable nodes matches len().
    pub fn validate(&self) -> Result<()>
    where
        K: Ord + fmt::Debug,
    {
        if self.arena.get(NIL).is_red() {
            return self.fatal(err_at!(Fatal, msg: "sentinel is red"));
        }
        if self.arena.get(self.root).is_red() {
            return self.fatal(err_at!(Fatal, msg: "root is red"));
        }
        if self.root != NIL && self.arena.get(self.root).parent != NIL {
            return self.fatal(err_at!(Fatal, msg: "root has a parent"));
        }

        let mut n_count = 0;
        self.fatal(self.validate_tree(self.root, false, &mut n_count))?;
        if n_count != self.len() {
            let msg = format!("mismatch in count {} != {}", n_count, self.len());
            return self.fatal(err_at!(Fatal, msg: "{}", msg));
        }

        let mut prev: Option<&K> = None;
        for key in self.iter() {
            match prev {
                Some(prev) if prev > key => {
                    return self.fatal(err_at!(Fatal, msg: "sort {:?} > {:?}", prev, key));
                }
                _ => (),
            }
            prev = Some(key);
        }

        Ok(())
    }

    fn fatal<T>(&self, res: Result<T>) -> Result<T> {
        if let Err(err) = &res {
            debug!("rbtree-{} validate failed {}", self.id, err);
        }
        res
    }

    #[allow(dead_code)]
    #[cfg(test)]
    pub fn pretty_print(&self)
    where
        K: fmt::Debug,
    {
        self.pretty_print_at(self.root, "".to_string())
    }
}

impl<K> RbTree<K> {
    /// Insert `key` into the index and return a handle to its node. Equal
    /// keys are placed after existing ones. Fails only when node storage
    /// cannot grow, in which case the tree is left untouched.
    pub fn insert(&mut self, key: K) -> Result<NodeRef>
    where
        K: Ord,
    {
        let (mut parent, mut side, mut at) = (NIL, Side::Left, self.root);
        while at != NIL {
            parent = at;
            side = match key.cmp(self.arena.key(at)) {
                Ordering::Less => Side::Left,
                Ordering::Equal | Ordering::Greater => Side::Right,
            };
            at = self.arena.get(at).child(side);
        }

        let node = self.arena.alloc(key)?;
        self.arena.get_mut(node).parent = parent;
        match parent {
            NIL => self.root = node,
            parent => self.arena.get_mut(parent).set_child(side, node),
        }

        self.insert_fixup(node);
        Ok(self.to_node_ref(node))
    }

    /// Remove the node named by `node` and return the key it held.
    ///
    /// When the node has two children, its in-order successor's key is
    /// moved into it and the successor's slot is released instead, so
    /// `node` stays valid for the successor's key while the successor's own
    /// handle turns stale.
    pub fn erase(&mut self, node: NodeRef) -> Result<K> {
        let at = self.resolve(node)?;
        let (left, right) = {
            let n = self.arena.get(at);
            (n.left, n.right)
        };

        let (parent, side, black, key) = if left != NIL && right != NIL {
            let next = self.successor_at(at);
            let (parent, side) = (self.arena.get(next).parent, self.side_of(next));
            let child = self.arena.get(next).right;
            self.replace_child(parent, side, child);

            let black = self.arena.get(next).is_black();
            let next_key = self.arena.free(next);
            let key = mem::replace(self.arena.key_mut(at), next_key);
            (parent, side, black, key)
        } else {
            let child = if left != NIL { left } else { right };
            if at == self.root {
                self.root = child;
                if child != NIL {
                    let c = self.arena.get_mut(child);
                    c.parent = NIL;
                    c.color = Color::Black;
                }
                return Ok(self.arena.free(at));
            }

            let (parent, side) = (self.arena.get(at).parent, self.side_of(at));
            self.replace_child(parent, side, child);
            let black = self.arena.get(at).is_black();
            (parent, side, black, self.arena.free(at))
        };

        if black {
            self.erase_fixup(parent, side);
        }
        Ok(key)
    }

    /// Find an entry for `key` and erase it, return the erased key.
    pub fn erase_key<Q>(&mut self, key: &Q) -> Result<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.find(key) {
            Some(node) => self.erase(node),
            None => err_at!(NotFound, msg: "erase_key in rbtree-{}", self.id),
        }
    }

    fn replace_child(&mut self, parent: usize, side: Side, child: usize) {
        self.arena.get_mut(parent).set_child(side, child);
        if child != NIL {
            self.arena.get_mut(child).parent = parent;
        }
    }
}

impl<K> RbTree<K> {
    /// Return the key held by `node`.
    pub fn get(&self, node: NodeRef) -> Result<&K> {
        let at = self.resolve(node)?;
        Ok(self.arena.key(at))
    }

    /// Return the color of `node`.
    pub fn color(&self, node: NodeRef) -> Result<Color> {
        let at = self.resolve(node)?;
        Ok(self.arena.get(at).color)
    }

    /// Find a node holding `key`. With duplicates, the first match met on
    /// the way down from the root is returned.
    pub fn find<Q>(&self, key: &Q) -> Option<NodeRef>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut at = self.root;
        while at != NIL {
            let node = self.arena.get(at);
            at = match key.cmp(self.arena.key(at).borrow()) {
                Ordering::Less => node.left,
                Ordering::Equal => return Some(self.to_node_ref(at)),
                Ordering::Greater => node.right,
            };
        }
        None
    }

    /// Check whether there is at least one entry for `key`.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Return number of entries equal to `key`.
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let at = match self.find(key) {
            Some(node) => node.index,
            None => return 0,
        };

        let mut n = 1;
        let mut prev = self.predecessor_at(at);
        while prev != NIL && key.cmp(self.arena.key(prev).borrow()) == Ordering::Equal {
            n += 1;
            prev = self.predecessor_at(prev);
        }
        let mut next = self.successor_at(at);
        while next != NIL && key.cmp(self.arena.key(next).borrow()) == Ordering::Equal {
            n += 1;
            next = self.successor_at(next);
        }
        n
    }

    /// Node holding the smallest key, None if the tree is empty.
    pub fn min(&self) -> Option<NodeRef> {
        match self.root {
            NIL => None,
            root => Some(self.to_node_ref(self.min_at(root))),
        }
    }

    /// Node holding the largest key, None if the tree is empty.
    pub fn max(&self) -> Option<NodeRef> {
        match self.root {
            NIL => None,
            root => Some(self.to_node_ref(self.max_at(root))),
        }
    }

    /// Next node in key order, None if `node` is the last one.
    pub fn successor(&self, node: NodeRef) -> Result<Option<NodeRef>> {
        let at = self.resolve(node)?;
        Ok(match self.successor_at(at) {
            NIL => None,
            next => Some(self.to_node_ref(next)),
        })
    }

    /// Previous node in key order, None if `node` is the first one.
    pub fn predecessor(&self, node: NodeRef) -> Result<Option<NodeRef>> {
        let at = self.resolve(node)?;
        Ok(match self.predecessor_at(at) {
            NIL => None,
            prev => Some(self.to_node_ref(prev)),
        })
    }

    /// Return upto `max_count` keys in sorted order.
    pub fn to_array(&self, max_count: usize) -> Vec<K>
    where
        K: Clone,
    {
        let mut keys = Vec::with_capacity(max_count.min(self.len()));
        let mut at = self.min_at(self.root);
        while at != NIL && keys.len() < max_count {
            keys.push(self.arena.key(at).clone());
            at = self.successor_at(at);
        }
        keys
    }

    /// Return an iterator over all entries in this instance.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            tree: self,
            front: self.min_at(self.root),
            back: self.max_at(self.root),
            remaining: self.len(),
        }
    }

    /// Return a random entry from this index.
    #[cfg(any(test, feature = "rand"))]
    pub fn random<R>(&self, rng: &mut R) -> Option<NodeRef>
    where
        R: rand::Rng,
    {
        if self.root == NIL {
            return None;
        }

        let mut at = self.root;
        let mut at_depth = rng.gen::<u8>() % 40;
        loop {
            let node = self.arena.get(at);
            let next = match rng.gen::<u8>() % 2 {
                0 => node.left,
                _ => node.right,
            };
            if at_depth == 0 || next == NIL {
                break Some(self.to_node_ref(at));
            }
            at_depth -= 1;
            at = next;
        }
    }
}

impl<K> RbTree<K> {
    pub(crate) fn resolve(&self, node: NodeRef) -> Result<usize> {
        if node.tree != self.id {
            err_at!(InvalidHandle, msg: "{:?} not from rbtree-{}", node, self.id)
        } else if !self.arena.is_live(node.index, node.gen) {
            err_at!(InvalidHandle, msg: "{:?} is not live", node)
        } else {
            Ok(node.index)
        }
    }

    pub(crate) fn to_node_ref(&self, at: usize) -> NodeRef {
        NodeRef {
            tree: self.id,
            index: at,
            gen: self.arena.get(at).gen,
        }
    }

    /// Side of its parent that `at` hangs from. Caller ensures `at` is not
    /// the root.
    pub(crate) fn side_of(&self, at: usize) -> Side {
        let parent = self.arena.get(at).parent;
        if self.arena.get(parent).left == at {
            Side::Left
        } else {
            Side::Right
        }
    }

    pub(crate) fn min_at(&self, mut at: usize) -> usize {
        while at != NIL && self.arena.get(at).left != NIL {
            at = self.arena.get(at).left;
        }
        at
    }

    pub(crate) fn max_at(&self, mut at: usize) -> usize {
        while at != NIL && self.arena.get(at).right != NIL {
            at = self.arena.get(at).right;
        }
        at
    }

    pub(crate) fn successor_at(&self, at: usize) -> usize {
        self.neighbour_at(at, Side::Right)
    }

    pub(crate) fn predecessor_at(&self, at: usize) -> usize {
        self.neighbour_at(at, Side::Left)
    }

    // Next node towards `side` in key order: the extreme of the subtree on
    // that side, else the first ancestor reached by climbing out of the
    // opposite side.
    fn neighbour_at(&self, at: usize, side: Side) -> usize {
        if at == NIL {
            return NIL;
        }

        let child = self.arena.get(at).child(side);
        if child != NIL {
            return match side {
                Side::Right => self.min_at(child),
                Side::Left => self.max_at(child),
            };
        }

        let (mut at, mut parent) = (at, self.arena.get(at).parent);
        while parent != NIL && self.arena.get(parent).child(side) == at {
            at = parent;
            parent = self.arena.get(parent).parent;
        }
        parent
    }

    // Post-order walk releasing every node, children before parents.
    fn teardown(&mut self, at: usize) -> usize {
        if at == NIL {
            return 0;
        }
        let (left, right) = (self.arena.get(at).left, self.arena.get(at).right);
        let n = self.teardown(left) + self.teardown(right);
        self.arena.free(at);
        n + 1
    }

    fn validate_tree(&self, at: usize, fromred: bool, n_count: &mut usize) -> Result<usize> {
        if at == NIL {
            return Ok(0);
        }

        *n_count += 1;
        let node = self.arena.get(at);
        if fromred && node.is_red() {
            return err_at!(Fatal, msg: "consecutive reds at slot {}", at);
        }

        for &child in [node.left, node.right].iter() {
            if child != NIL && self.arena.get(child).parent != at {
                return err_at!(Fatal, msg: "broken parent link {} -> {}", child, at);
            }
        }

        let lblacks = self.validate_tree(node.left, node.is_red(), n_count)?;
        let rblacks = self.validate_tree(node.right, node.is_red(), n_count)?;
        if lblacks != rblacks {
            return err_at!(Fatal, msg: "unbalanced blacks {} {}", lblacks, rblacks);
        }

        Ok(lblacks + if node.is_black() { 1 } else { 0 })
    }

    #[cfg(test)]
    fn pretty_print_at(&self, at: usize, mut prefix: String)
    where
        K: fmt::Debug,
    {
        if at == NIL {
            return;
        }
        let node = self.arena.get(at);
        match node.is_black() {
            true => println!("{}(b)<{:?}>", prefix, self.arena.key(at)),
            false => println!("{}(r)<{:?}>", prefix, self.arena.key(at)),
        }
        prefix.push_str("  ");
        self.pretty_print_at(node.left, prefix.clone());
        self.pretty_print_at(node.right, prefix);
    }
}

impl<K> Extend<K> for RbTree<K>
where
    K: Ord,
{
    /// Panics if node storage cannot grow.
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = K>,
    {
        for key in iter {
            if let Err(err) = self.insert(key) {
                panic!("extend(): {}", err)
            }
        }
    }
}

impl<K> FromIterator<K> for RbTree<K>
where
    K: Ord,
{
    fn from_iter<I>(iter: I) -> RbTree<K>
    where
        I: IntoIterator<Item = K>,
    {
        let mut index = RbTree::new();
        index.extend(iter);
        index
    }
}

impl<K> fmt::Debug for RbTree<K>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, K> IntoIterator for &'a RbTree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

/// In-order iterator over keys, walking successor links from the front and
/// predecessor links from the back.
pub struct Iter<'a, K> {
    tree: &'a RbTree<K>,
    front: usize,
    back: usize,
    remaining: usize,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let key = self.tree.arena.key(self.front);
        self.front = self.tree.successor_at(self.front);
        self.remaining -= 1;
        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K> DoubleEndedIterator for Iter<'a, K> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let key = self.tree.arena.key(self.back);
        self.back = self.tree.predecessor_at(self.back);
        self.remaining -= 1;
        Some(key)
    }
}

impl<'a, K> ExactSizeIterator for Iter<'a, K> {}

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;
