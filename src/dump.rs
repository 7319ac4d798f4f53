//! Human-readable re-serializations of a parsed [`Arena`].
//!
//! Ported from `skc_show_tree()`/`skc_show_array()` in `skced.c` and
//! `skc_debug_dump()` in `skc.c`. These are library functions a CLI front
//! end can call, not a CLI of their own.

use crate::arena::{Arena, NodeId, NodeKind};
use crate::query;
use std::fmt::{self, Write};

/// Brace-structured re-serialization of the tree, one statement per line
/// with tab indentation per nesting level. Mirrors `skc_show_tree()`.
pub fn write_tree(arena: &Arena<'_>, out: &mut dyn Write) -> fmt::Result {
    let mut node = match arena.children(None).next() {
        Some(n) => n,
        None => return Ok(()),
    };
    let mut depth = 0usize;

    loop {
        indent(out, depth)?;
        match arena.child(node) {
            Some(c) if arena.kind(c) == NodeKind::Key => {
                writeln!(out, "{} {{", arena.data(node))?;
                node = c;
                depth += 1;
                continue;
            }
            Some(v) => {
                write!(out, "{} = ", arena.data(node))?;
                write_array(arena, v, out)?;
            }
            None => {
                writeln!(out, "{};", arena.data(node))?;
            }
        }

        loop {
            if let Some(next) = arena.next(node) {
                node = next;
                break;
            }
            match arena.parent(node) {
                Some(p) => {
                    node = p;
                    depth -= 1;
                    indent(out, depth)?;
                    writeln!(out, "}}")?;
                }
                None => return Ok(()),
            }
        }
    }
}

fn write_array(arena: &Arena<'_>, first_value: NodeId, out: &mut dyn Write) -> fmt::Result {
    let mut v = Some(first_value);
    while let Some(id) = v {
        let next = arena.next(id);
        write!(out, "\"{}\"", arena.data(id))?;
        writeln!(out, "{}", if next.is_some() { "," } else { ";" })?;
        v = next;
    }
    Ok(())
}

fn indent(out: &mut dyn Write, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        out.write_char('\t')?;
    }
    Ok(())
}

/// Flat `dotted.key = "value";` listing, one leaf per line (arrays spread
/// across one quoted value per line). Mirrors `skc_show_kvlist()`.
pub fn write_kv_list(arena: &Arena<'_>, out: &mut dyn Write) -> fmt::Result {
    let mut buf = [0u8; 1024];
    let mut cursor = None;
    loop {
        cursor = query::next_leaf(arena, None, cursor);
        let Some(leaf) = cursor else { break };
        let n = query::compose_key(arena, leaf, &mut buf).unwrap_or(0);
        let key = std::str::from_utf8(&buf[..n]).unwrap_or("");

        match arena.child(leaf) {
            Some(v) => {
                write!(out, "{key} = ")?;
                write_array(arena, v, out)?;
            }
            None => writeln!(out, "{key};")?,
        }
    }
    Ok(())
}

/// Raw per-node dump: index, payload, kind, and the `next`/`child`/`parent`
/// links. Mirrors `skc_debug_dump()`.
pub fn write_debug(arena: &Arena<'_>, out: &mut dyn Write) -> fmt::Result {
    for i in 0..arena.len() {
        let id = NodeId::from_index(i);
        let raw = arena.raw(id);
        let kind = match arena.kind(id) {
            NodeKind::Key => "key",
            NodeKind::Value => "value",
        };
        writeln!(
            out,
            "[{i}] {} ({kind}) .next={} .child={} .parent={}",
            arena.data(id),
            raw.next,
            raw.child,
            raw.parent
        )?;
    }
    Ok(())
}
