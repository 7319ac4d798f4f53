//! An optional process-wide singleton, for callers that want the kernel's
//! single global arena instead of passing one around explicitly.
//!
//! The kernel keeps one global `skc_nodes`/`skc_data` pair and a `busy` flag
//! that rejects a second `skc_init()` before `skc_destroy_tree()` runs.
//! spec.md's design notes ask a reimplementation to make the arena an
//! explicit object instead — [`crate::parser::parse`] does that — but keep
//! `Busy` available for callers that want the singleton's ergonomics. This
//! type is that opt-in wrapper.

use crate::arena::Arena;
use crate::error::{Error, Result};
use std::sync::OnceLock;

/// Holds at most one parsed [`Arena`] for the life of the process.
///
/// Not a `static` itself — construct one (typically behind a `static` of
/// your own, e.g. via `std::sync::OnceLock<SharedConfig>` or simply
/// `static CONFIG: SharedConfig = SharedConfig::new();`) and call
/// [`SharedConfig::parse`].
pub struct SharedConfig {
    inner: OnceLock<Arena<'static>>,
}

impl SharedConfig {
    /// An empty, unparsed singleton.
    pub const fn new() -> Self {
        SharedConfig { inner: OnceLock::new() }
    }

    /// Parse `text` and store the result, as long as nothing has been
    /// parsed into this singleton yet.
    ///
    /// `text` must be `'static` since the returned arena borrows it for the
    /// life of the singleton; callers without naturally `'static` text can
    /// `Box::leak` it, mirroring the boot-time lifetime of the kernel's own
    /// global command line buffer.
    ///
    /// Like the kernel's `busy` flag, this check is not atomic with the
    /// parse itself — this type targets the same single-threaded,
    /// cooperative setting as the rest of this crate, not concurrent
    /// callers racing to initialize it.
    pub fn parse(&self, text: &'static mut str) -> Result<&Arena<'static>> {
        if self.inner.get().is_some() {
            return Err(Error::Busy);
        }
        let arena = crate::parser::parse(text)?;
        self.inner.set(arena).map_err(|_| Error::Busy)?;
        Ok(self.inner.get().expect("just inserted"))
    }

    /// The parsed arena, if [`SharedConfig::parse`] has succeeded.
    pub fn get(&self) -> Option<&Arena<'static>> {
        self.inner.get()
    }
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_parse_is_busy() {
        let config = SharedConfig::new();
        let text: &'static mut str = Box::leak("a = 1;".to_string().into_boxed_str());
        assert!(config.parse(text).is_ok());

        let text2: &'static mut str = Box::leak("b = 2;".to_string().into_boxed_str());
        assert!(matches!(config.parse(text2), Err(Error::Busy)));
    }

    #[test]
    fn get_before_parse_is_none() {
        let config = SharedConfig::new();
        assert!(config.get().is_none());
    }
}
