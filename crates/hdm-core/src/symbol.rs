//! String interning for names, file paths and literal values.
//!
//! A [`SymbolTable`] maps strings to dense [`SymbolId`]s. Id 0 is always
//! the bad symbol; unknown ids resolve to [`BAD_SYMBOL`] instead of failing.
//! A table may be layered on top of a frozen parent so a shared vocabulary
//! can be extended without copying it: ids below the layer offset resolve
//! in the parent.
//!
//! Interned text is stored as `Box<str>`, so the bytes behind a resolved
//! `&str` never move when the table grows.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexSet;

/// Text of the reserved bad symbol (id 0).
pub const BAD_SYMBOL: &str = "@@BAD_SYMBOL@@";

/// Dense identifier of an interned string.
///
/// Only meaningful together with the table that produced it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

impl SymbolId {
    /// The bad symbol, also the default for unset symbol fields.
    pub const BAD: SymbolId = SymbolId(0);

    /// Whether this is the bad symbol.
    pub fn is_bad(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SymbolId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Interning table with optional parent layer.
#[derive(Debug)]
pub struct SymbolTable {
    parent: Option<Arc<SymbolTable>>,
    /// First id owned by this layer (the parent's length).
    offset: u32,
    own: IndexSet<Box<str>>,
}

impl SymbolTable {
    /// Create a root table containing only the bad symbol.
    pub fn new() -> Self {
        let mut own = IndexSet::new();
        own.insert(Box::from(BAD_SYMBOL));
        Self {
            parent: None,
            offset: 0,
            own,
        }
    }

    /// Create a child layer on top of a frozen parent.
    ///
    /// Every id the parent has handed out stays valid and resolves through
    /// the parent; new strings get ids starting at `parent.len()`.
    pub fn layered(parent: Arc<SymbolTable>) -> Self {
        let offset = Self::checked_id(parent.len());
        Self {
            parent: Some(parent),
            offset,
            own: IndexSet::new(),
        }
    }

    /// Freeze this table so it can serve as the parent of new layers.
    pub fn freeze(self) -> Arc<SymbolTable> {
        Arc::new(self)
    }

    /// Total number of symbols visible through this table, parents included.
    pub fn len(&self) -> usize {
        self.offset as usize + self.own.len()
    }

    /// Always `false`: the bad symbol is present in every root table.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The parent layer, if any.
    pub fn parent(&self) -> Option<&Arc<SymbolTable>> {
        self.parent.as_ref()
    }

    /// Register `text` and return its id; repeated calls return the same id.
    ///
    /// # Panics
    ///
    /// Panics if the table grows beyond `u32::MAX` symbols.
    pub fn intern(&mut self, text: &str) -> SymbolId {
        if let Some(parent) = &self.parent {
            let id = parent.find(text);
            if !id.is_bad() || text == BAD_SYMBOL {
                return id;
            }
        }
        if let Some(index) = self.own.get_index_of(text) {
            return SymbolId(self.offset + index as u32);
        }
        let (index, _) = self.own.insert_full(Box::from(text));
        SymbolId(Self::checked_id(self.offset as usize + index))
    }

    /// Look up `text` without inserting it. Returns [`SymbolId::BAD`] if absent.
    pub fn find(&self, text: &str) -> SymbolId {
        if let Some(parent) = &self.parent {
            let id = parent.find(text);
            if !id.is_bad() {
                return id;
            }
        }
        self.own
            .get_index_of(text)
            .map(|index| SymbolId(self.offset + index as u32))
            .unwrap_or(SymbolId::BAD)
    }

    /// Resolve an id to its text. Unknown ids resolve to [`BAD_SYMBOL`].
    pub fn resolve(&self, id: SymbolId) -> &str {
        if id.0 < self.offset {
            return match &self.parent {
                Some(parent) => parent.resolve(id),
                None => BAD_SYMBOL,
            };
        }
        self.own
            .get_index((id.0 - self.offset) as usize)
            .map(|s| &**s)
            .unwrap_or(BAD_SYMBOL)
    }

    /// Intern a name, mapping the empty string (and the bad-symbol text)
    /// to [`SymbolId::BAD`] instead of creating an entry.
    pub fn make_name(&mut self, text: &str) -> SymbolId {
        if text.is_empty() || text == BAD_SYMBOL {
            SymbolId::BAD
        } else {
            self.intern(text)
        }
    }

    /// Resolve a name, returning the empty string for [`SymbolId::BAD`].
    pub fn name(&self, id: SymbolId) -> &str {
        if id.is_bad() {
            ""
        } else {
            self.resolve(id)
        }
    }

    /// Look up a name without inserting; empty text maps to the bad id.
    pub fn find_name(&self, text: &str) -> SymbolId {
        if text.is_empty() || text == BAD_SYMBOL {
            SymbolId::BAD
        } else {
            self.find(text)
        }
    }

    /// Re-intern a symbol produced by another table into this one.
    pub fn copy_from(&mut self, id: SymbolId, other: &SymbolTable) -> SymbolId {
        if id.is_bad() {
            return SymbolId::BAD;
        }
        let text = other.resolve(id).to_owned();
        self.intern(&text)
    }

    /// Every visible symbol in id order; the index of an entry is its id.
    pub fn symbols(&self) -> Vec<&str> {
        let mut out = Vec::with_capacity(self.len());
        self.append_symbols(&mut out);
        out
    }

    fn append_symbols<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(parent) = &self.parent {
            parent.append_symbols(out);
        }
        out.extend(self.own.iter().map(|s| &**s));
    }

    /// Drop every symbol owned by this layer.
    ///
    /// A root table keeps the bad symbol at id 0; a layered table keeps its
    /// parent untouched.
    pub fn purge(&mut self) {
        self.own.clear();
        if self.parent.is_none() {
            self.own.insert(Box::from(BAD_SYMBOL));
        }
    }

    fn checked_id(value: usize) -> u32 {
        assert!(
            value <= u32::MAX as usize,
            "symbol table overflow: {value} entries"
        );
        value as u32
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn bad_symbol_is_id_zero() {
        let table = SymbolTable::new();
        assert_eq!(table.find(BAD_SYMBOL), SymbolId::BAD);
        assert_eq!(table.resolve(SymbolId::BAD), BAD_SYMBOL);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn intern_is_idempotent() {
        let mut table = SymbolTable::new();
        let foo = table.intern("foo");
        let bar = table.intern("bar");
        assert_ne!(foo, SymbolId::BAD);
        assert_ne!(foo, bar);
        assert_eq!(table.intern("foo"), foo);
        assert_eq!(table.intern("bar"), bar);
    }

    #[test]
    fn lookup_matches_by_content() {
        let mut table = SymbolTable::new();
        let foo = table.intern("foo");
        let bar = table.intern("bar");
        let source = String::from("foobar");
        assert_eq!(table.find(&source[0..3]), foo);
        assert_eq!(table.find(&source[3..6]), bar);
        assert_eq!(table.find("baz"), SymbolId::BAD);
    }

    #[test]
    fn unknown_id_resolves_to_bad_symbol() {
        let table = SymbolTable::new();
        assert_eq!(table.resolve(SymbolId(42)), BAD_SYMBOL);
    }

    #[test]
    fn names_treat_empty_as_bad() {
        let mut table = SymbolTable::new();
        assert_eq!(table.make_name(""), SymbolId::BAD);
        assert_eq!(table.make_name(BAD_SYMBOL), SymbolId::BAD);
        assert_eq!(table.name(SymbolId::BAD), "");
        let top = table.make_name("top");
        assert_eq!(table.name(top), "top");
        assert_eq!(table.find_name(""), SymbolId::BAD);
    }

    #[test]
    fn resolved_text_is_stable_across_growth() {
        let mut table = SymbolTable::new();
        let foo = table.intern("foo");
        let before = table.resolve(foo).as_ptr();
        for i in 0..100_000 {
            table.intern(&format!("bar{i}"));
        }
        let after = table.resolve(foo).as_ptr();
        assert_eq!(before, after);
        assert_eq!(table.resolve(foo), "foo");
    }

    #[test]
    fn layered_table_delegates_to_parent() {
        let mut base = SymbolTable::new();
        let clk = base.intern("clk");
        let parent = base.freeze();

        let mut child = SymbolTable::layered(Arc::clone(&parent));
        assert_eq!(child.intern("clk"), clk);
        assert_eq!(child.resolve(clk), "clk");

        let rst = child.intern("rst");
        assert_eq!(rst.0 as usize, parent.len());
        assert_eq!(child.resolve(rst), "rst");
        assert_eq!(parent.find("rst"), SymbolId::BAD);
        assert_eq!(child.symbols(), vec![BAD_SYMBOL, "clk", "rst"]);
    }

    #[test]
    fn layered_parent_storage_is_shared() {
        let mut base = SymbolTable::new();
        let clk = base.intern("clk");
        let parent = base.freeze();
        let child = SymbolTable::layered(Arc::clone(&parent));
        assert_eq!(child.resolve(clk).as_ptr(), parent.resolve(clk).as_ptr());
    }

    #[test]
    fn copy_from_reinterns() {
        let mut a = SymbolTable::new();
        let mut b = SymbolTable::new();
        b.intern("padding");
        let x = a.intern("x");
        let copied = b.copy_from(x, &a);
        assert_eq!(b.resolve(copied), "x");
        assert_eq!(b.copy_from(SymbolId::BAD, &a), SymbolId::BAD);
    }

    #[test]
    fn purge_resets_to_bad_symbol() {
        let mut table = SymbolTable::new();
        table.intern("a");
        table.intern("b");
        table.purge();
        assert_eq!(table.len(), 1);
        assert_eq!(table.find("a"), SymbolId::BAD);
        assert_eq!(table.intern("c"), SymbolId(1));
    }

    proptest! {
        #[test]
        fn symbols_index_is_id(words in proptest::collection::vec("[a-z]{1,8}", 1..64)) {
            let mut table = SymbolTable::new();
            let ids: Vec<SymbolId> = words.iter().map(|w| table.intern(w)).collect();
            let all = table.symbols();
            for (word, id) in words.iter().zip(&ids) {
                prop_assert_eq!(all[id.0 as usize], word.as_str());
                prop_assert_eq!(table.find(word), *id);
            }
        }
    }
}
