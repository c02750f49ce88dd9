//! Identifier and literal text of one syntax tree.
//!
//! Each tree owns its interner, so a `SymbolId` only means something inside the
//! tree that produced it. Scoped reanalysis builds a fresh tree (and interner)
//! for the re-parsed body; ids are never carried across.
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

#[derive(Debug, Default, Clone)]
pub struct StringInterner {
    ids: HashMap<Arc<str>, SymbolId>,
    texts: Vec<Arc<str>>,
    bytes: usize,
}

impl StringInterner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, text: &str) -> SymbolId {
        if let Some(id) = self.ids.get(text) {
            return *id;
        }
        let id = SymbolId(self.texts.len() as u32);
        let shared: Arc<str> = Arc::from(text);
        self.bytes += shared.len();
        self.texts.push(Arc::clone(&shared));
        self.ids.insert(shared, id);
        id
    }

    pub fn resolve(&self, sym: SymbolId) -> &str {
        &self.texts[sym.0 as usize]
    }

    /// Id of already interned text; never allocates.
    pub fn lookup(&self, text: &str) -> Option<SymbolId> {
        self.ids.get(text).copied()
    }

    pub fn len(&self) -> usize { self.texts.len() }
    pub fn is_empty(&self) -> bool { self.texts.is_empty() }
    /// Total size of the distinct texts.
    pub fn bytes(&self) -> usize { self.bytes }
}
