//! String interning.
//!
//! Identifier names are interned so that scope tables and rename maps can
//! compare and hash names as integers. The renamer mints new names at run
//! time, so the interner accepts insertions through a shared handle.

use lasso::{Spur, ThreadedRodeo};
use std::fmt;
use std::sync::Arc;

/// An interned string handle. Comparing two handles is an O(1) integer
/// comparison; the text is recovered through the owning [`StringInterner`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct InternedString(Spur);

impl InternedString {
    #[inline]
    pub fn from_spur(spur: Spur) -> Self {
        Self(spur)
    }

    #[inline]
    pub fn as_spur(self) -> Spur {
        self.0
    }
}

impl fmt::Debug for InternedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InternedString({:?})", self.0)
    }
}

/// Shared string interner. Cloning is cheap (the store is behind an `Arc`),
/// so the AST, the scope arena, and the passes can all hold a handle.
#[derive(Clone)]
pub struct StringInterner {
    rodeo: Arc<ThreadedRodeo>,
}

impl StringInterner {
    pub fn new() -> Self {
        Self {
            rodeo: Arc::new(ThreadedRodeo::new()),
        }
    }

    /// Intern a string, returning the existing handle if already present.
    #[inline]
    pub fn intern(&self, s: &str) -> InternedString {
        InternedString::from_spur(self.rodeo.get_or_intern(s))
    }

    /// Intern a static string without copying it.
    #[inline]
    pub fn intern_static(&self, s: &'static str) -> InternedString {
        InternedString::from_spur(self.rodeo.get_or_intern_static(s))
    }

    /// Look up an already-interned string without inserting.
    #[inline]
    pub fn get(&self, s: &str) -> Option<InternedString> {
        self.rodeo.get(s).map(InternedString::from_spur)
    }

    /// Resolve a handle back to its text.
    #[inline]
    pub fn resolve(&self, key: InternedString) -> &str {
        self.rodeo.resolve(&key.as_spur())
    }

    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringInterner")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_and_resolve() {
        let interner = StringInterner::new();
        let a = interner.intern("foo");
        let b = interner.intern("foo");
        let c = interner.intern("foo$jscomp$1");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.resolve(a), "foo");
        assert_eq!(interner.resolve(c), "foo$jscomp$1");
    }

    #[test]
    fn test_get_without_insert() {
        let interner = StringInterner::new();
        assert!(interner.get("bar").is_none());
        let a = interner.intern("bar");
        assert_eq!(interner.get("bar"), Some(a));
    }

    #[test]
    fn test_shared_handles_see_each_other() {
        let interner = StringInterner::new();
        let clone = interner.clone();
        let a = interner.intern("shared");
        assert_eq!(clone.get("shared"), Some(a));
    }
}
