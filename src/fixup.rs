//! Rotation and color repair for [RbTree].
//!
//! Both repairs are loops climbing toward the root. Insert repair removes a
//! red-red violation introduced by a new red leaf, erase repair removes the
//! missing black left behind by splicing out a black node.

use log::trace;

use crate::{
    node::{Color, Side, NIL},
    tree::RbTree,
};

impl<K> RbTree<K> {
    //              (g)                        (g)
    //               |                          |
    //               p                         node
    //              / \        Side::Right     /  \
    //           node  c        ==>           a    p
    //           /  \           <==               / \
    //          a    b       Side::Left          b   c
    //
    /// Promote `node` above its parent, the parent moves down toward `dir`.
    /// `node` must hang from the side opposite to `dir`. In-order sequence
    /// is preserved.
    pub(crate) fn rotate(&mut self, node: usize, dir: Side) {
        let parent = self.arena.get(node).parent;
        if parent == NIL {
            panic!("rotate(): rotating the root ? call the programmer")
        }
        let side = self.side_of(node);
        if side != dir.flip() {
            panic!("rotate(): node {} is a {:?} child ? call the programmer", node, side)
        }

        let inner = self.arena.get(node).child(dir);
        let grand = self.arena.get(parent).parent;

        self.arena.get_mut(parent).set_child(side, inner);
        if inner != NIL {
            self.arena.get_mut(inner).parent = parent;
        }

        match grand {
            NIL => self.root = node,
            grand => {
                let pside = self.side_of(parent);
                self.arena.get_mut(grand).set_child(pside, node);
            }
        }
        self.arena.get_mut(node).parent = grand;

        self.arena.get_mut(node).set_child(dir, parent);
        self.arena.get_mut(parent).parent = node;
    }

    pub(crate) fn insert_fixup(&mut self, mut node: usize) {
        loop {
            if node == self.root {
                self.set_color(node, Color::Black);
                return;
            }

            let parent = self.arena.get(node).parent;
            if self.arena.get(parent).is_black() {
                return;
            }

            // red parent is never the root, grand is a real black node.
            let grand = self.arena.get(parent).parent;
            let pside = self.side_of(parent);
            let uncle = self.arena.get(grand).child(pside.flip());

            if self.arena.get(uncle).is_red() {
                trace!("insert_fixup red uncle at {}", grand);
                self.set_color(parent, Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(grand, Color::Red);
                node = grand;
                continue;
            }

            let top = if self.side_of(node) == pside {
                trace!("insert_fixup line at {}", grand);
                self.rotate(parent, pside.flip());
                parent
            } else {
                trace!("insert_fixup zigzag at {}", grand);
                self.rotate(node, pside);
                self.rotate(node, pside.flip());
                node
            };
            self.set_color(top, Color::Black);
            self.set_color(grand, Color::Red);
            return;
        }
    }

    /// Repair a missing black on `side` of `parent`.
    pub(crate) fn erase_fixup(&mut self, mut parent: usize, mut side: Side) {
        loop {
            let node = self.arena.get(parent).child(side);
            if self.arena.get(node).is_red() {
                self.set_color(node, Color::Black);
                return;
            }

            let sibling = self.arena.get(parent).child(side.flip());
            if self.arena.get(sibling).is_red() {
                trace!("erase_fixup red sibling at {}", parent);
                self.rotate(sibling, side);
                self.swap_colors(sibling, parent);
                continue;
            }

            let far = self.arena.get(sibling).child(side.flip());
            let near = self.arena.get(sibling).child(side);
            if self.arena.get(far).is_red() {
                trace!("erase_fixup red far nephew at {}", parent);
                self.rotate(sibling, side);
                self.swap_colors(sibling, parent);
                self.set_color(far, Color::Black);
                return;
            }
            if self.arena.get(near).is_red() {
                trace!("erase_fixup red near nephew at {}", parent);
                self.rotate(near, side.flip());
                self.swap_colors(sibling, near);
                continue;
            }

            trace!("erase_fixup black nephews at {}", parent);
            self.set_color(sibling, Color::Red);
            if parent == self.root {
                return;
            }
            side = self.side_of(parent);
            parent = self.arena.get(parent).parent;
        }
    }

    fn set_color(&mut self, at: usize, color: Color) {
        if at == NIL && color == Color::Red {
            panic!("set_color(): painting the sentinel red ? call the programmer")
        }
        self.arena.get_mut(at).color = color;
    }

    fn swap_colors(&mut self, a: usize, b: usize) {
        let (ca, cb) = (self.arena.get(a).color, self.arena.get(b).color);
        self.set_color(a, cb);
        self.set_color(b, ca);
    }
}

#[cfg(test)]
#[path = "fixup_test.rs"]
mod fixup_test;
