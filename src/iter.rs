//! Pre-order iteration over every value whose composed key begins with a
//! given dotted prefix.
//!
//! There is no single original-source counterpart: the kernel's SKC reader
//! only ever calls `skc_node_find_value` for one key at a time. This walks
//! the same `next`/`child` chain `skc_node_find_child` does, generalized to
//! keep descending after the prefix is exhausted instead of stopping at one
//! node.

use crate::arena::{Arena, NodeId, NodeKind, NODE_MAX};
use crate::error::Result;
use crate::query;
use arrayvec::ArrayVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Seeking,
    Yielding,
    Done,
}

/// Iterates every value node whose composed key begins with a prefix
/// (on a `.` boundary), in pre-order.
///
/// Built with [`Arena::iter_prefix`]. Once `next()` returns `None` the
/// iterator is done for good, matching spec.md's `{Seeking, Yielding, Done}`
/// state machine.
pub struct PrefixIter<'arena, 'a> {
    arena: &'arena Arena<'a>,
    state: State,
    match_root: Option<NodeId>,
    stack: ArrayVec<NodeId, NODE_MAX>,
    root_pending: bool,
    cur_leaf: Option<NodeId>,
    cur_value: Option<NodeId>,
}

impl<'arena, 'a> PrefixIter<'arena, 'a> {
    /// Begin searching for `prefix`. Descends from the top-level statements,
    /// the same way [`query::find_child`] does, to find the node at which
    /// `prefix` is fully consumed; that node becomes the root of the
    /// pre-order walk `next()` performs.
    pub fn start(arena: &'arena Arena<'a>, prefix: &str) -> Self {
        let match_root = locate(arena, prefix);
        let mut stack = ArrayVec::new();
        if let Some(root) = match_root {
            stack.push(root);
        }
        PrefixIter {
            arena,
            state: if match_root.is_some() { State::Seeking } else { State::Done },
            match_root,
            stack,
            root_pending: true,
            cur_leaf: None,
            cur_value: None,
        }
    }

    /// Advance to the next matching value, returning its string and node.
    ///
    /// Idempotent once exhausted: calling this again after `None` keeps
    /// returning `None`.
    pub fn next(&mut self) -> Option<(&'a str, NodeId)> {
        loop {
            if let Some(v) = self.cur_value {
                let data = self.arena.data(v);
                let leaf = self.cur_leaf.expect("cur_value implies cur_leaf");
                self.cur_value = self.arena.next(v);
                self.state = State::Yielding;
                return Some((data, leaf));
            }
            if self.state == State::Done {
                return None;
            }
            let node = match self.stack.pop() {
                Some(n) => n,
                None => {
                    self.state = State::Done;
                    return None;
                }
            };

            if !self.root_pending {
                if let Some(next) = self.arena.next(node) {
                    // Capacity is `NODE_MAX`, the total node count, so this
                    // can never overflow.
                    let _ = self.stack.try_push(next);
                }
            }
            self.root_pending = false;

            if let Some(child) = self.arena.child(node) {
                if self.arena.kind(child) == NodeKind::Key {
                    let _ = self.stack.try_push(child);
                }
            }

            if self.arena.is_leaf(node) {
                self.cur_leaf = Some(node);
                self.cur_value = self.arena.child(node);
            }
        }
    }

    /// Write up to `n` dot-separated words (or all remaining words if
    /// `n == 0`) that follow the matched prefix in the composed key of the
    /// leaf behind the value last returned by `next()`.
    ///
    /// Returns the number of bytes written, or `Err` if called before the
    /// first successful `next()` or if `buf` is too small.
    pub fn unmatched_words(&self, n: usize, buf: &mut [u8]) -> Result<usize> {
        let leaf = self.cur_leaf.ok_or(crate::error::Error::OutOfRange)?;
        let root = self.match_root.expect("cur_leaf implies a match root");
        let chain = query::ancestor_chain(self.arena, leaf)?;
        let root_pos = chain
            .iter()
            .position(|&id| id == root)
            .expect("match root is an ancestor of the yielded leaf");

        let words = chain[root_pos + 1..].iter().map(|id| self.arena.data(*id));
        if n == 0 {
            query::write_dotted(words, buf)
        } else {
            query::write_dotted(words.take(n), buf)
        }
    }
}

/// Descend from the top-level statements consuming `prefix` word by word,
/// mirroring `skc_node_find_child`, and return the node at which the whole
/// prefix was consumed.
fn locate(arena: &Arena<'_>, prefix: &str) -> Option<NodeId> {
    if prefix.is_empty() {
        return None;
    }
    let mut node = arena.children(None).next()?;
    let mut rest = prefix;
    loop {
        if !query::match_prefix(arena, node, &mut rest) {
            node = arena.next(node)?;
            continue;
        }
        if rest.is_empty() {
            return Some(node);
        }
        if arena.kind(node) != NodeKind::Key {
            return None;
        }
        node = arena.child(node)?;
    }
}
