/*!
# Semantic analysis

Binder for the arena tree: resolves names through a chain of lexical scopes,
records expression types and reference targets, and remembers the scope each
function body was analyzed in so the body can later be re-analyzed alone.
*/

pub mod analyzer;
pub mod scope;
pub mod types;

pub use analyzer::{analyze_document, analyze_in_scope};
pub use scope::{LexicalScope, ScopeKind, Symbol, SymbolKind};
pub use types::SimpleType;

use std::collections::HashMap;
use std::sync::Arc;

use crate::ast_core::{NodeId, SpanKey};
use crate::diagnostics::Diagnostic;
use crate::parser::SyntaxTree;

/// Result of binding one tree. Node ids refer to the tree that was analyzed.
#[derive(Debug, Default, Clone)]
pub struct BindingTable {
    expr_types: HashMap<NodeId, SimpleType>,
    references: HashMap<NodeId, Arc<Symbol>>,
    /// Scope of every function body, keyed by the body's span and kind.
    lexical_scopes: HashMap<SpanKey, Arc<LexicalScope>>,
    diagnostics: Vec<Diagnostic>,
}

impl BindingTable {
    pub fn expr_type(&self, id: NodeId) -> Option<&SimpleType> { self.expr_types.get(&id) }
    pub fn reference(&self, id: NodeId) -> Option<&Arc<Symbol>> { self.references.get(&id) }
    pub fn diagnostics(&self) -> &[Diagnostic] { &self.diagnostics }
    pub fn reference_count(&self) -> usize { self.references.len() }
    pub fn lexical_scope_count(&self) -> usize { self.lexical_scopes.len() }

    /// Scope recorded for `body` of `tree` (looked up by span + kind, not node identity).
    pub fn lexical_scope(&self, tree: &SyntaxTree, body: NodeId) -> Option<&Arc<LexicalScope>> {
        self.scope_for_key(&tree.ast().span_key(body))
    }

    pub fn scope_for_key(&self, key: &SpanKey) -> Option<&Arc<LexicalScope>> {
        self.lexical_scopes.get(key)
    }

    fn record_type(&mut self, id: NodeId, ty: SimpleType) {
        self.expr_types.insert(id, ty);
    }

    fn record_reference(&mut self, id: NodeId, symbol: Arc<Symbol>) {
        self.references.insert(id, symbol);
    }

    fn record_scope(&mut self, key: SpanKey, scope: Arc<LexicalScope>) {
        self.lexical_scopes.insert(key, scope);
    }

    fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
