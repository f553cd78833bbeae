//! Interned names for instances, wires and ports.
//!
//! Netlists repeat the same wire and instance names in every connection, so
//! names are interned once and compared as `u32` handles afterwards.

use lasso::ThreadedRodeo;
use serde::{Deserialize, Serialize};

/// An interned name.
///
/// Equality and hashing are O(1); resolve back to text through the
/// [`Interner`] that produced it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Ident(u32);

impl Ident {
    /// Creates an `Ident` from a raw `u32` index.
    ///
    /// Intended for deserialization and tests; normal code interns through
    /// [`Interner::get_or_intern`].
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw `u32` index of this identifier.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

// SAFETY: `Ident` wraps a `u32`; `try_from_usize` rejects values that do not
// fit, so every key handed out by the rodeo round-trips.
unsafe impl lasso::Key for Ident {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(Ident)
    }
}

/// Thread-safe string interner backed by [`lasso::ThreadedRodeo`].
///
/// One interner is created per analysis run and shared by the netlist
/// parser, the analyzer and the report formatter.
pub struct Interner {
    rodeo: ThreadedRodeo<Ident>,
}

impl Interner {
    /// Creates a new empty interner.
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Interns `s`, returning the existing handle if it was seen before.
    pub fn get_or_intern(&self, s: &str) -> Ident {
        self.rodeo.get_or_intern(s)
    }

    /// Looks up `s` without interning it.
    ///
    /// Used for constraint maps keyed by names that may not exist in the
    /// design.
    pub fn get(&self, s: &str) -> Option<Ident> {
        self.rodeo.get(s)
    }

    /// Resolves an [`Ident`] back to its text.
    ///
    /// # Panics
    ///
    /// Panics if the `Ident` was not created by this interner.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.rodeo.resolve(&ident)
    }

    /// Returns the number of distinct interned strings.
    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    /// Returns `true` if nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_resolve_roundtrip() {
        let interner = Interner::new();
        let id = interner.get_or_intern("x[3]");
        assert_eq!(interner.resolve(id), "x[3]");
    }

    #[test]
    fn same_name_same_ident() {
        let interner = Interner::new();
        let a = interner.get_or_intern("___input_clk");
        let b = interner.get_or_intern("___input_clk");
        assert_eq!(a, b);
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn get_does_not_intern() {
        let interner = Interner::new();
        assert!(interner.get("n42").is_none());
        assert!(interner.is_empty());
        let id = interner.get_or_intern("n42");
        assert_eq!(interner.get("n42"), Some(id));
    }

    #[test]
    fn serde_roundtrip() {
        let id = Ident(42);
        let json = serde_json::to_string(&id).unwrap();
        let back: Ident = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
