//! Pure read-only queries over a finished [`Arena`].
//!
//! Ported from `skc_node_find_child`/`skc_node_find_value`/
//! `skc_node_compose_key`/`skc_node_find_next_leaf`/
//! `skc_node_find_next_key_value` in the kernel's `skc.c`. Unlike the
//! parser, nothing here mutates the arena, so every function here is safe to
//! call from multiple threads at once as long as no parse is concurrently
//! in flight (see the crate-level docs).

use crate::arena::{Arena, NodeId, NodeKind, DEPTH_MAX};
use crate::error::{Error, Result};
use arrayvec::ArrayVec;

/// Find the child of `parent` (or, if `parent` is `None`, of the root)
/// whose composed key matches the dotted `key`.
///
/// Splits `key` on `.`; at each level walks the sibling chain for an exact
/// payload match, then descends into that node's children for the next
/// segment. Returns `None` if the descent falls off the chain or lands on a
/// value node with key segments still unmatched.
pub fn find_child(arena: &Arena<'_>, parent: Option<NodeId>, key: &str) -> Option<NodeId> {
    let mut node = arena.children(parent).next()?;
    let mut rest = key;

    loop {
        if !match_prefix(arena, node, &mut rest) {
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

/// Does `arena.data(node)` match the leading dot-delimited component(s) of
/// `*rest`? On success, advances `*rest` past the matched portion (and its
/// trailing `.`, if any) and returns `true`.
pub(crate) fn match_prefix(arena: &Arena<'_>, node: NodeId, rest: &mut &str) -> bool {
    let payload = arena.data(node);
    if !rest.starts_with(payload) {
        return false;
    }
    let tail = &rest[payload.len()..];
    match tail.strip_prefix('.') {
        Some(stripped) => {
            *rest = stripped;
            true
        }
        None if tail.is_empty() => {
            *rest = tail;
            true
        }
        None => false,
    }
}

/// Find the value string for `key` under `parent` (or the whole tree if
/// `parent` is `None`).
///
/// Returns `None` if no key matches `key`. If the key exists but holds no
/// value, returns `Some(("", None))`. If the value is an array, the first
/// entry's string and node are returned.
pub fn find_value<'a>(arena: &Arena<'a>, parent: Option<NodeId>, key: &str) -> Option<(&'a str, Option<NodeId>)> {
    let node = find_child(arena, parent, key)?;
    if arena.kind(node) != NodeKind::Key {
        return None;
    }
    match arena.child(node) {
        None => Some(("", None)),
        Some(v) if arena.kind(v) == NodeKind::Value => Some((arena.data(v), Some(v))),
        Some(_) => None,
    }
}

/// Collect `node`'s ancestor chain, root-first, into a fixed `DEPTH_MAX`-deep
/// stack. If `node` is a value node, its parent key starts the chain
/// instead, per spec.md's `compose_key` contract.
pub(crate) fn ancestor_chain(arena: &Arena<'_>, node: NodeId) -> Result<ArrayVec<NodeId, DEPTH_MAX>> {
    let mut stack: ArrayVec<NodeId, DEPTH_MAX> = ArrayVec::new();

    let mut cur = if arena.kind(node) == NodeKind::Value {
        arena.parent(node)
    } else {
        Some(node)
    };

    while let Some(n) = cur {
        if stack.try_push(n).is_err() {
            return Err(Error::OutOfRange);
        }
        cur = arena.parent(n);
    }
    stack.reverse();
    Ok(stack)
}

/// Compose the full dotted key of `node` into `buf`, returning the number of
/// bytes written.
///
/// Mirrors `skc_node_compose_key(node, buf, size)`: `buf` is a fixed-size
/// byte buffer, not a growable string, so a key that doesn't fit reports
/// [`Error::TooBig`] rather than growing silently. Walks ancestors with a
/// fixed `DEPTH_MAX`-deep stack rather than recursing, per spec.md's
/// suggested iterative rewrite.
pub fn compose_key(arena: &Arena<'_>, node: NodeId, buf: &mut [u8]) -> Result<usize> {
    let stack = ancestor_chain(arena, node)?;
    write_dotted(stack.iter().map(|id| arena.data(*id)), buf)
}

/// Write `words` joined by `.` into `buf`, failing with `TooBig` if they
/// don't fit.
pub(crate) fn write_dotted<'a>(words: impl Iterator<Item = &'a str>, buf: &mut [u8]) -> Result<usize> {
    let mut len = 0;
    for (i, word) in words.enumerate() {
        let sep = usize::from(i > 0);
        if len + sep + word.len() > buf.len() {
            return Err(Error::TooBig);
        }
        if sep == 1 {
            buf[len] = b'.';
            len += 1;
        }
        buf[len..len + word.len()].copy_from_slice(word.as_bytes());
        len += word.len();
    }
    Ok(len)
}

/// Pre-order traversal restricted to the subtree rooted at `root` (or the
/// whole tree if `root` is `None`), visiting only leaves (key nodes whose
/// child is absent or is a value node).
///
/// `node` is the previous leaf, or `None` to start the traversal.
pub fn next_leaf(arena: &Arena<'_>, root: Option<NodeId>, node: Option<NodeId>) -> Option<NodeId> {
    let mut cur = match node {
        // `root: None` scopes to the whole document: start at the first
        // real top-level statement, not at the virtual wrapper root
        // itself, so an empty document correctly yields no leaves at all.
        None => match root {
            Some(r) => Some(r),
            None => arena.child(arena.root()),
        },
        Some(n) => {
            if Some(n) == root {
                return None;
            }
            let mut cursor = n;
            loop {
                match arena.next(cursor) {
                    Some(sib) => break Some(sib),
                    None => {
                        if Some(cursor) == root {
                            return None;
                        }
                        match arena.parent(cursor) {
                            Some(p) => cursor = p,
                            None => return None,
                        }
                    }
                }
            }
        }
    }?;

    while !arena.is_leaf(cur) {
        cur = arena.child(cur)?;
    }
    Some(cur)
}

/// Advance `*cursor` to the next leaf under `root` and return its value
/// string (empty if the leaf is key-only). `*cursor` starts as `None`.
pub fn next_key_value<'a>(arena: &Arena<'a>, root: Option<NodeId>, cursor: &mut Option<NodeId>) -> Option<&'a str> {
    *cursor = next_leaf(arena, root, *cursor);
    let leaf = (*cursor)?;
    match arena.child(leaf) {
        Some(v) => Some(arena.data(v)),
        None => Some(""),
    }
}
