//! Parser and query layer for the Linux kernel's Supplemental Kernel
//! Commandline (SKC): a compact, tree-structured key/value configuration
//! text used to extend the boot command line without a format that needs
//! its own shell-quoting rules.
//!
//! Parsing populates a fixed-capacity node arena in place over the input
//! text (no heap allocation per token, matching the original's early-boot
//! constraints); the [`query`] and [`iter`] modules then read that tree.
//!
//! # Example
//!
//! ```rust
//! use skc::{parse, query};
//!
//! let mut text = "foo.bar = \"baz\"; list = 1, 2, 3;".to_string();
//! let arena = parse(&mut text).unwrap();
//!
//! let (value, _) = query::find_value(&arena, None, "foo.bar").unwrap();
//! assert_eq!(value, "baz");
//! ```

pub mod arena;
pub mod dump;
mod error;
pub mod iter;
pub mod pack;
pub mod parser;
pub mod query;
pub mod shared;

pub use arena::{Arena, NodeId, NodeKind, DATA_MAX, DEPTH_MAX, KEYLEN_MAX, NODE_MAX};
pub use error::{Error, Result};
pub use iter::PrefixIter;
pub use parser::parse;
pub use shared::SharedConfig;
