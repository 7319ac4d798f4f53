//! Error kinds surfaced by parsing and by the bounded query/compose APIs.

use thiserror::Error;

/// Everything that can go wrong while parsing or querying a structured
/// command line.
///
/// `NotFound` from spec.md §7 has no variant here: a missed query is
/// represented as `None`, never as an `Err` (see [`crate::query`]).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A generic grammar or lexical violation.
    #[error("parse error at byte {offset}: {msg}")]
    Parse {
        /// Human-readable description of the violation.
        msg: String,
        /// Byte offset of the offending character in the original text.
        offset: usize,
    },

    /// A key word contained a character outside `[A-Za-z0-9_-]`, or was empty.
    #[error("invalid keyword at byte {offset}")]
    InvalidKey {
        /// Byte offset of the start of the offending word.
        offset: usize,
    },

    /// A quoted value (`"..."` or `'...'`) was never closed.
    #[error("no closing quote at byte {offset}")]
    NoClosingQuote {
        /// Byte offset of the opening quote.
        offset: usize,
    },

    /// A value was not followed by one of `, ; \n # }`.
    #[error("no delimiter for value at byte {offset}")]
    NoDelimiter {
        /// Byte offset of the value that lacked a delimiter.
        offset: usize,
    },

    /// A `}` was seen with no matching open brace.
    #[error("unexpected closing brace at byte {offset}")]
    UnexpectedBrace {
        /// Byte offset of the stray `}`.
        offset: usize,
    },

    /// Input ended with one or more braces still open.
    #[error("missing closing brace")]
    NoClosingBrace,

    /// The node arena or character arena ran out of capacity.
    #[error("out of node or data capacity")]
    NoMem,

    /// A caller-supplied output buffer was too small.
    #[error("output buffer too small")]
    TooBig,

    /// Input text was too large, or a dotted key nested deeper than `DEPTH_MAX`.
    #[error("input or key depth out of range")]
    OutOfRange,

    /// `parse` was called while a [`crate::SharedConfig`] singleton already
    /// holds a parsed arena.
    #[error("a configuration is already parsed")]
    Busy,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Byte offset carried by this error, if any.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Parse { offset, .. }
            | Error::InvalidKey { offset }
            | Error::NoClosingQuote { offset }
            | Error::NoDelimiter { offset }
            | Error::UnexpectedBrace { offset } => Some(*offset),
            Error::NoClosingBrace
            | Error::NoMem
            | Error::TooBig
            | Error::OutOfRange
            | Error::Busy => None,
        }
    }

    /// Translate [`Error::offset`] into a 1-based `(line, column)` pair by
    /// scanning `text`, the same buffer that was passed to [`crate::parse`].
    ///
    /// Returns `None` if this error carries no offset, or the offset falls
    /// outside `text`.
    pub fn line_col(&self, text: &str) -> Option<(usize, usize)> {
        let offset = self.offset()?;
        if offset > text.len() {
            return None;
        }
        let mut line = 1;
        let mut col = 1;
        for ch in text[..offset].chars() {
            if ch == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        Some((line, col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_none_for_offsetless_variants() {
        assert_eq!(Error::NoClosingBrace.offset(), None);
        assert_eq!(Error::NoMem.offset(), None);
        assert_eq!(Error::Busy.offset(), None);
    }

    #[test]
    fn offset_is_some_for_offset_carrying_variants() {
        assert_eq!(Error::InvalidKey { offset: 7 }.offset(), Some(7));
    }

    #[test]
    fn line_col_counts_newlines() {
        let text = "a = 1;\nb = ;\nc = 3;";
        let err = Error::NoDelimiter { offset: 11 };
        assert_eq!(err.line_col(text), Some((2, 5)));
    }

    #[test]
    fn line_col_is_none_past_end_of_text() {
        let err = Error::InvalidKey { offset: 100 };
        assert_eq!(err.line_col("short"), None);
    }

    #[test]
    fn line_col_is_none_without_an_offset() {
        assert_eq!(Error::Busy.line_col("anything"), None);
    }
}
