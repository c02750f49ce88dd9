//! Lexical scopes and the symbols they declare.
//!
//! A scope is immutable once built and links to its parent through `Arc`, so a
//! scope captured during one analysis can be handed to a later, scoped analysis
//! unchanged.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::core::position::PackedSpan;

use super::types::SimpleType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Function,
    Property,
    Class,
    Param,
    Local,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SymbolKind::Function => "function",
            SymbolKind::Property => "property",
            SymbolKind::Class => "class",
            SymbolKind::Param => "parameter",
            SymbolKind::Local => "local",
        };
        f.write_str(s)
    }
}

/// Declared entity a reference can resolve to.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Document the declaration comes from.
    pub origin: PathBuf,
    /// Span of the declared name in the origin document.
    pub span: PackedSpan,
    /// Variable type, or the return type for functions.
    pub declared_type: SimpleType,
    /// Member scope of a class symbol.
    pub members: Option<Arc<LexicalScope>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Top-level declarations of the other visible documents.
    Imports,
    File,
    Class,
    /// Parameters of one function; the scope a body is analyzed in.
    Function,
}

#[derive(Debug)]
pub struct LexicalScope {
    kind: ScopeKind,
    symbols: HashMap<String, Arc<Symbol>>,
    parent: Option<Arc<LexicalScope>>,
}

impl LexicalScope {
    pub fn root(kind: ScopeKind, symbols: impl IntoIterator<Item = Symbol>) -> Arc<Self> {
        Arc::new(Self { kind, symbols: collect_symbols(symbols), parent: None })
    }

    pub fn nested(parent: &Arc<Self>, kind: ScopeKind, symbols: impl IntoIterator<Item = Symbol>) -> Arc<Self> {
        Arc::new(Self { kind, symbols: collect_symbols(symbols), parent: Some(Arc::clone(parent)) })
    }

    pub fn kind(&self) -> ScopeKind { self.kind }
    pub fn parent(&self) -> Option<&Arc<LexicalScope>> { self.parent.as_ref() }

    /// Symbol declared directly in this scope.
    pub fn lookup_local(&self, name: &str) -> Option<&Arc<Symbol>> {
        self.symbols.get(name)
    }

    /// Innermost declaration of `name` along the parent chain.
    pub fn resolve(&self, name: &str) -> Option<&Arc<Symbol>> {
        self.chain().find_map(|scope| scope.lookup_local(name))
    }

    /// This scope, then each parent outwards.
    pub fn chain(&self) -> impl Iterator<Item = &LexicalScope> {
        std::iter::successors(Some(self), |s| s.parent.as_deref())
    }

    pub fn depth(&self) -> usize { self.chain().count() }

    /// Names declared directly in this scope, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.symbols.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

// Повторное объявление не перекрывает первое.
fn collect_symbols(symbols: impl IntoIterator<Item = Symbol>) -> HashMap<String, Arc<Symbol>> {
    let mut map = HashMap::new();
    for symbol in symbols {
        map.entry(symbol.name.clone()).or_insert_with(|| Arc::new(symbol));
    }
    map
}
