//! Symbol handles and interning tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Handle type stored in a [`SymbolTable`].
///
/// Handles are dense indices allocated in intern order, so ordering by
/// handle is ordering by first sighting.
pub trait SymbolHandle: Copy + Ord + fmt::Debug {
    /// Build a handle from its table index.
    fn from_index(index: u32) -> Self;

    /// Index of this handle in its table.
    fn index(self) -> usize;
}

/// Handle of a source symbol (an element of the alphabet being encoded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceId(u32);

/// Handle of a target symbol (an element of the output alphabet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TargetId(u32);

impl SymbolHandle for SourceId {
    fn from_index(index: u32) -> Self {
        Self(index)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl SymbolHandle for TargetId {
    fn from_index(index: u32) -> Self {
        Self(index)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Interning table mapping symbol text to stable handles.
///
/// Equal text always yields the same handle within one table. Symbols are
/// never removed, so a handle stays valid for the lifetime of the table.
#[derive(Debug, Clone)]
pub struct SymbolTable<H: SymbolHandle> {
    /// Text -> handle lookup.
    by_text: BTreeMap<String, H>,
    /// Handle index -> text.
    texts: Vec<String>,
}

impl<H: SymbolHandle> Default for SymbolTable<H> {
    fn default() -> Self {
        Self {
            by_text: BTreeMap::new(),
            texts: Vec::new(),
        }
    }
}

impl<H: SymbolHandle> SymbolTable<H> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a symbol without interning it.
    pub fn find(&self, text: &str) -> Option<H> {
        self.by_text.get(text).copied()
    }

    /// Look up a single-character symbol without interning it.
    pub fn find_char(&self, c: char) -> Option<H> {
        let mut buf = [0u8; 4];
        self.find(c.encode_utf8(&mut buf))
    }

    /// Intern a symbol, returning the existing handle if already present.
    pub fn add(&mut self, text: &str) -> H {
        if let Some(handle) = self.find(text) {
            return handle;
        }
        let handle = H::from_index(self.texts.len() as u32);
        self.texts.push(text.to_string());
        self.by_text.insert(text.to_string(), handle);
        handle
    }

    /// Intern a single-character symbol.
    pub fn add_char(&mut self, c: char) -> H {
        let mut buf = [0u8; 4];
        self.add(c.encode_utf8(&mut buf))
    }

    /// Text of an interned symbol.
    ///
    /// Returns an empty string for handles that did not come from this table.
    pub fn text(&self, handle: H) -> &str {
        self.texts.get(handle.index()).map(String::as_str).unwrap_or("")
    }

    /// Number of interned symbols.
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Iterate over `(handle, text)` in intern order.
    pub fn iter(&self) -> impl Iterator<Item = (H, &str)> + '_ {
        self.texts
            .iter()
            .enumerate()
            .map(|(i, text)| (H::from_index(i as u32), text.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut table: SymbolTable<SourceId> = SymbolTable::new();
        let a = table.add("1");
        let b = table.add("1");
        assert_eq!(a, b);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_find_has_no_side_effect() {
        let mut table: SymbolTable<TargetId> = SymbolTable::new();
        assert!(table.find("a").is_none());
        assert!(table.is_empty());

        let a = table.add("a");
        assert_eq!(table.find("a"), Some(a));
        assert_eq!(table.find_char('a'), Some(a));
    }

    #[test]
    fn test_handles_follow_intern_order() {
        let mut table: SymbolTable<TargetId> = SymbolTable::new();
        let z = table.add_char('z');
        let a = table.add_char('a');
        assert!(z < a);

        let texts: Vec<_> = table.iter().map(|(_, t)| t.to_string()).collect();
        assert_eq!(texts, vec!["z", "a"]);
    }

    #[test]
    fn test_non_latin_symbols() {
        let mut table: SymbolTable<TargetId> = SymbolTable::new();
        let zhe = table.add_char('ж');
        assert_eq!(table.text(zhe), "ж");
        assert_eq!(table.find("ж"), Some(zhe));
    }
}
