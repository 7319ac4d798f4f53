//! Single-pass tokenizer and tree builder.
//!
//! Ported from the Linux kernel's Supplemental Kernel Commandline parser
//! (`skc_init`/`__skc_parse_keys`/`skc_parse_kv`/`__skc_open_brace`/
//! `__skc_close_brace` in `skc.c`): one left-to-right scan over the text,
//! splitting on `{ } = ; , \n #`, that writes NUL terminators over consumed
//! delimiters in place and appends nodes to a fixed-capacity arena as it
//! goes. A `current_parent` cursor (the kernel's `last_parent`) tracks brace
//! scoping and dotted-key descent.

use crate::arena::{Arena, NodeId, DATA_MAX, NODE_MAX, NO_PARENT};
use crate::error::{Error, Result};

const STMT_DELIMS: &[u8] = b"{}=;\n#";
const VALUE_DELIMS: &[u8] = b",;\n#}";

fn is_ws(b: u8) -> bool {
    b == b' ' || b == b'\t' || b == b'\r'
}

fn is_key_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

fn find_one_of(bytes: &[u8], from: usize, delims: &[u8]) -> Option<usize> {
    bytes[from..].iter().position(|b| delims.contains(b)).map(|i| from + i)
}

/// Parse `text` in place, returning the populated node arena.
///
/// `text` must be between 1 and `DATA_MAX - 1` bytes long.
pub fn parse(text: &mut str) -> Result<Arena<'_>> {
    let len = text.len();
    if len == 0 || len > DATA_MAX - 1 {
        return Err(Error::OutOfRange);
    }

    let ptr = text.as_mut_ptr();

    // SAFETY: `ptr`/`len` describe the bytes behind `text` for its whole
    // lifetime `'_`. The parser below only ever overwrites single-byte ASCII
    // delimiter characters (`{ } = ; , \n # " '` and quote/word boundaries)
    // with the ASCII NUL byte, which can never turn a valid UTF-8 byte
    // sequence invalid: every byte it touches is itself a one-byte ASCII
    // character, never a continuation byte of a multi-byte sequence. The
    // mutable byte view below is used to completion before the shared `&str`
    // view is constructed from the same bytes, so the two never alias.
    let bytes: &mut [u8] = unsafe { std::slice::from_raw_parts_mut(ptr, len) };

    let mut builder = Builder {
        bytes,
        nodes: arrayvec::ArrayVec::new(),
        current_parent: None,
    };
    builder.push_root();
    builder.run()?;
    builder.verify()?;

    log::debug!("parsed {} nodes from {} bytes", builder.nodes.len(), len);

    // SAFETY: see above; mutation is complete by this point.
    let text: &str = unsafe { std::str::from_utf8_unchecked(std::slice::from_raw_parts(ptr, len)) };
    Ok(Arena::from_parts(builder.nodes, text))
}

struct Builder<'a> {
    bytes: &'a mut [u8],
    nodes: arrayvec::ArrayVec<crate::arena::RawNode, NODE_MAX>,
    current_parent: Option<NodeId>,
}

impl<'a> Builder<'a> {
    fn push_root(&mut self) {
        self.nodes.push(crate::arena::RawNode {
            next: 0,
            child: 0,
            parent: NO_PARENT,
            data_offset: 0,
            is_value: false,
        });
    }

    fn node(&self, id: NodeId) -> crate::arena::RawNode {
        self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut crate::arena::RawNode {
        &mut self.nodes[id.index()]
    }

    fn data(&self, offset: u16) -> &[u8] {
        let rest = &self.bytes[offset as usize..];
        match rest.iter().position(|&b| b == 0) {
            Some(end) => &rest[..end],
            None => rest,
        }
    }

    fn add_node(&mut self, offset: usize, is_value: bool) -> Result<NodeId> {
        if self.nodes.len() == NODE_MAX {
            return Err(Error::NoMem);
        }
        if offset >= DATA_MAX {
            return Err(Error::NoMem);
        }
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(crate::arena::RawNode {
            next: 0,
            child: 0,
            parent: NO_PARENT,
            data_offset: offset as u16,
            is_value,
        });
        Ok(id)
    }

    fn last_sibling(&self, first: NodeId) -> NodeId {
        let mut node = first;
        loop {
            let next = self.node(node).next;
            if next == 0 {
                return node;
            }
            node = NodeId::from_index(next as usize);
        }
    }

    /// Append a new node as the last sibling of `parent`'s children (or of
    /// the root's children if `parent` is `None`), without changing
    /// `current_parent`. Mirrors `skc_add_sibling`.
    fn add_sibling(&mut self, parent: Option<NodeId>, offset: usize, is_value: bool) -> Result<NodeId> {
        let node = self.add_node(offset, is_value)?;
        match parent {
            None => {
                self.node_mut(node).parent = NO_PARENT;
                let root_child = self.node(NodeId::ROOT).child;
                if root_child == 0 {
                    self.node_mut(NodeId::ROOT).child = node.index() as u16;
                } else {
                    let last = self.last_sibling(NodeId::from_index(root_child as usize));
                    self.node_mut(last).next = node.index() as u16;
                }
            }
            Some(p) => {
                self.node_mut(node).parent = p.index() as u16;
                let pchild = self.node(p).child;
                if pchild == 0 {
                    self.node_mut(p).child = node.index() as u16;
                } else {
                    let last = self.last_sibling(NodeId::from_index(pchild as usize));
                    self.node_mut(last).next = node.index() as u16;
                }
            }
        }
        Ok(node)
    }

    fn valid_keyword(&self, bytes: &[u8]) -> bool {
        !bytes.is_empty() && bytes.iter().all(|&b| is_key_char(b))
    }

    fn find_match_child(&self, parent: Option<NodeId>, word: &[u8]) -> Option<NodeId> {
        let first = match parent {
            None => {
                let c = self.node(NodeId::ROOT).child;
                if c == 0 {
                    return None;
                }
                NodeId::from_index(c as usize)
            }
            Some(p) => {
                let c = self.node(p).child;
                if c == 0 {
                    return None;
                }
                NodeId::from_index(c as usize)
            }
        };
        let mut node = Some(first);
        while let Some(n) = node {
            if !self.node(n).is_value && self.data(self.node(n).data_offset) == word {
                return Some(n);
            }
            let next = self.node(n).next;
            node = if next == 0 { None } else { Some(NodeId::from_index(next as usize)) };
        }
        None
    }

    /// Resolve (or create) a single key word under `parent`.
    fn add_key_word(&mut self, parent: Option<NodeId>, start: usize, end: usize) -> Result<NodeId> {
        let word = &self.bytes[start..end];
        if !self.valid_keyword(word) {
            return Err(Error::InvalidKey { offset: start });
        }
        if let Some(existing) = self.find_match_child(parent, word) {
            return Ok(existing);
        }
        self.add_sibling(parent, start, false)
    }

    /// Resolve (creating as needed) the dotted key chain in `bytes[start..end]`,
    /// descending from `parent`. Returns the innermost key node.
    fn resolve_dotted(&mut self, mut parent: Option<NodeId>, start: usize, end: usize) -> Result<NodeId> {
        let mut word_start = start;
        let mut pos = start;
        while pos < end {
            if self.bytes[pos] == b'.' {
                self.bytes[pos] = 0;
                let node = self.add_key_word(parent, word_start, pos)?;
                parent = Some(node);
                word_start = pos + 1;
            }
            pos += 1;
        }
        self.add_key_word(parent, word_start, end)
    }

    /// Trim ASCII whitespace from `bytes[start..end]`, returning the trimmed
    /// bounds.
    fn trim(&self, mut start: usize, mut end: usize) -> (usize, usize) {
        while start < end && is_ws(self.bytes[start]) {
            start += 1;
        }
        while end > start && is_ws(self.bytes[end - 1]) {
            end -= 1;
        }
        (start, end)
    }

    fn skip_ws(&self, mut pos: usize) -> usize {
        while pos < self.bytes.len() && is_ws(self.bytes[pos]) {
            pos += 1;
        }
        pos
    }

    fn skip_comment(&self, mut pos: usize) -> usize {
        while pos < self.bytes.len() && self.bytes[pos] != b'\n' {
            pos += 1;
        }
        if pos < self.bytes.len() {
            pos += 1; // consume the newline
        }
        pos
    }

    /// Parse one value (quoted or bare), terminating it in place.
    ///
    /// Returns `(data_offset, terminator, next_pos)`. `terminator` is the
    /// delimiter byte that ended the value (after any leading/trailing
    /// comments have been skipped).
    fn parse_value(&mut self, mut pos: usize) -> Result<(usize, u8, usize)> {
        pos = self.skip_ws(pos);
        while pos < self.bytes.len() && self.bytes[pos] == b'#' {
            pos = self.skip_comment(pos);
            pos = self.skip_ws(pos);
        }
        if pos >= self.bytes.len() {
            return Err(Error::NoDelimiter { offset: pos });
        }

        let quote = self.bytes[pos];
        if quote == b'"' || quote == b'\'' {
            let value_start = pos + 1;
            let mut i = value_start;
            let end = loop {
                match self.bytes[i..].iter().position(|&b| b == quote) {
                    None => return Err(Error::NoClosingQuote { offset: pos }),
                    Some(rel) => {
                        let at = i + rel;
                        if at > value_start && self.bytes[at - 1] == b'\\' {
                            i = at + 1;
                            continue;
                        }
                        break at;
                    }
                }
            };
            self.bytes[end] = 0;
            let mut after = self.skip_ws(end + 1);
            if after >= self.bytes.len() || !VALUE_DELIMS.contains(&self.bytes[after]) {
                return Err(Error::NoDelimiter { offset: end });
            }
            let mut term = self.bytes[after];
            self.bytes[after] = 0;
            after += 1;
            if term == b'#' {
                after = self.skip_comment(after);
                term = b'\n';
            }
            Ok((value_start, term, after))
        } else {
            let delim = match find_one_of(self.bytes, pos, VALUE_DELIMS) {
                Some(d) => d,
                None => return Err(Error::NoDelimiter { offset: pos }),
            };
            let mut term = self.bytes[delim];
            self.bytes[delim] = 0;
            let (tstart, tend) = self.trim(pos, delim);
            if tstart == tend {
                return Err(Error::NoDelimiter { offset: pos });
            }
            if tend < delim {
                self.bytes[tend] = 0;
            }
            let mut after = delim + 1;
            if term == b'#' {
                after = self.skip_comment(after);
                term = b'\n';
            }
            Ok((tstart, term, after))
        }
    }

    /// Parse a `,`-separated chain of values, attaching them as siblings
    /// under `key`. Mirrors `skc_parse_array`.
    fn parse_array(&mut self, key: NodeId, mut pos: usize) -> Result<(u8, usize)> {
        loop {
            let (offset, term, next) = self.parse_value(pos)?;
            if self.data(offset as u16).is_empty() {
                log::warn!("empty array element at byte {offset}");
            }
            self.add_sibling(Some(key), offset, true)?;
            pos = next;
            if term != b',' {
                return Ok((term, pos));
            }
        }
    }

    fn open_brace(&mut self, key: NodeId) {
        self.node_mut(key).next = NO_PARENT;
    }

    fn close_brace(&mut self, offset_for_error: usize) -> Result<()> {
        let mut node = match self.current_parent {
            Some(n) if self.node(n).next == NO_PARENT => n,
            _ => return Err(Error::UnexpectedBrace { offset: offset_for_error }),
        };
        self.node_mut(node).next = 0;
        loop {
            let parent = self.node(node).parent;
            if parent == NO_PARENT {
                self.current_parent = None;
                break;
            }
            let p = NodeId::from_index(parent as usize);
            if self.node(p).next == NO_PARENT {
                self.current_parent = Some(p);
                break;
            }
            node = p;
        }
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        let mut pos = 0usize;
        loop {
            let key_start = pos;
            let delim_pos = match find_one_of(self.bytes, pos, STMT_DELIMS) {
                Some(d) => d,
                None => {
                    let (s, e) = self.trim(pos, self.bytes.len());
                    if s < e {
                        return Err(Error::Parse { msg: "no delimiter".into(), offset: s });
                    }
                    break;
                }
            };
            let c = self.bytes[delim_pos];
            self.bytes[delim_pos] = 0;
            let key_end = delim_pos;
            let next = delim_pos + 1;

            log::trace!("token '{}' at byte {delim_pos}", c as char);

            match c {
                b'=' => {
                    pos = self.stmt_kv(key_start, key_end, next)?;
                    log::debug!("parsed key=value statement ending at byte {pos}");
                }
                b'{' => {
                    pos = self.stmt_open_brace(key_start, key_end, next)?;
                    log::debug!("opened brace block at byte {pos}");
                }
                b'#' => {
                    self.stmt_key_only(key_start, key_end)?;
                    pos = self.skip_comment(next);
                    log::debug!("parsed key-only statement before comment, ending at byte {pos}");
                }
                b';' | b'\n' => {
                    self.stmt_key_only(key_start, key_end)?;
                    pos = next;
                    log::debug!("parsed key-only statement ending at byte {pos}");
                }
                b'}' => {
                    pos = self.stmt_close_brace(key_start, key_end, next)?;
                    log::debug!("closed brace block at byte {pos}");
                }
                _ => unreachable!("delimiter set is exhaustive"),
            }
        }
        Ok(())
    }

    fn stmt_key_only(&mut self, start: usize, end: usize) -> Result<()> {
        let (s, e) = self.trim(start, end);
        if s == e {
            return Ok(());
        }
        self.resolve_dotted(self.current_parent, s, e)?;
        Ok(())
    }

    fn stmt_kv(&mut self, key_start: usize, key_end: usize, value_pos: usize) -> Result<usize> {
        let (s, e) = self.trim(key_start, key_end);
        let key = self.resolve_dotted(self.current_parent, s, e)?;

        let (offset, term, mut next) = self.parse_value(value_pos)?;
        self.add_sibling(Some(key), offset, true)?;

        let term = if term == b',' {
            let (t, n) = self.parse_array(key, next)?;
            next = n;
            t
        } else {
            term
        };

        if term == b'}' {
            self.close_brace(next.saturating_sub(1))?;
        }

        Ok(next)
    }

    fn stmt_open_brace(&mut self, key_start: usize, key_end: usize, next: usize) -> Result<usize> {
        let (s, e) = self.trim(key_start, key_end);
        if s == e {
            return Err(Error::InvalidKey { offset: key_start });
        }
        let key = self.resolve_dotted(self.current_parent, s, e)?;
        self.open_brace(key);
        self.current_parent = Some(key);
        Ok(next)
    }

    fn stmt_close_brace(&mut self, key_start: usize, key_end: usize, next: usize) -> Result<usize> {
        self.stmt_key_only(key_start, key_end)?;
        self.close_brace(next.saturating_sub(1))?;
        Ok(next)
    }

    fn verify(&self) -> Result<()> {
        for node in &self.nodes {
            if node.next == NO_PARENT {
                return Err(Error::NoClosingBrace);
            }
        }
        Ok(())
    }
}
