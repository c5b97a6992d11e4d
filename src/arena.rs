//! Slot storage for tree nodes.
//!
//! Slot ZERO holds the sentinel for the lifetime of the arena. Released
//! slots are recycled through a free list, and each release bumps the
//! slot's generation so that stale handles can be told apart from live ones.

use crate::{
    node::{Color, Node, NIL},
    Error, Result,
};

pub(crate) struct Arena<K> {
    slots: Vec<Node<K>>,
    free: Vec<usize>,
}

impl<K> Arena<K> {
    pub fn new() -> Arena<K> {
        Arena {
            slots: vec![Node::sentinel()],
            free: Vec::default(),
        }
    }

    /// `capacity` is a hint, when it cannot be reserved the arena starts
    /// empty and grows on demand.
    pub fn with_capacity(capacity: usize) -> Arena<K> {
        let mut slots = Vec::new();
        slots.try_reserve(capacity.saturating_add(1)).ok();
        slots.push(Node::sentinel());
        Arena {
            slots,
            free: Vec::default(),
        }
    }

    /// Number of live nodes, the sentinel is not counted.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len() - 1 - self.free.len()
    }

    pub fn capacity(&self) -> usize {
        self.slots.capacity().saturating_sub(1)
    }

    /// Allocate a red node with sentinel links. On failure nothing is
    /// modified.
    pub fn alloc(&mut self, key: K) -> Result<usize> {
        match self.free.pop() {
            Some(at) => {
                self.slots[at].reset(key);
                Ok(at)
            }
            None => {
                err_at!(AllocationFailure, self.slots.try_reserve(1))?;
                let mut node = Node::sentinel();
                node.reset(key);
                self.slots.push(node);
                Ok(self.slots.len() - 1)
            }
        }
    }

    /// Release a live node and return its key.
    pub fn free(&mut self, at: usize) -> K {
        if at == NIL {
            panic!("free(): releasing the sentinel ? call the programmer")
        }
        let node = &mut self.slots[at];
        let key = match node.key.take() {
            Some(key) => key,
            None => panic!("free(): double free of slot {}, call the programmer", at),
        };
        node.gen = node.gen.wrapping_add(1);
        node.color = Color::Black;
        node.left = NIL;
        node.right = NIL;
        node.parent = NIL;
        self.free.push(at);
        key
    }

    /// Drop every node, keep the sentinel.
    pub fn clear(&mut self) {
        self.slots.truncate(1);
        self.free.clear();
    }

    /// Whether `at` names a live node of generation `gen`.
    pub fn is_live(&self, at: usize, gen: u32) -> bool {
        match self.slots.get(at) {
            Some(node) if at != NIL => node.key.is_some() && node.gen == gen,
            _ => false,
        }
    }

    #[inline]
    pub fn get(&self, at: usize) -> &Node<K> {
        &self.slots[at]
    }

    #[inline]
    pub fn get_mut(&mut self, at: usize) -> &mut Node<K> {
        &mut self.slots[at]
    }

    #[inline]
    pub fn key(&self, at: usize) -> &K {
        match self.slots[at].key.as_ref() {
            Some(key) => key,
            None => panic!("key(): slot {} holds no key, call the programmer", at),
        }
    }

    #[inline]
    pub fn key_mut(&mut self, at: usize) -> &mut K {
        match self.slots[at].key.as_mut() {
            Some(key) => key,
            None => panic!("key_mut(): slot {} holds no key, call the programmer", at),
        }
    }
}

#[cfg(test)]
#[path = "arena_test.rs"]
mod arena_test;
