/*!
# Compiler collaborator

The incremental core never parses or binds by itself: it asks a `Compiler`.
Every call is a pure function of its inputs and returns fresh, immutable
values, so the core can share them through `Arc` without locking.
*/

use std::path::Path;
use std::sync::Arc;

use crate::parser::{self, SyntaxTree};
use crate::semantic::{self, BindingTable, LexicalScope};

pub trait Compiler: Send + Sync {
    /// Parse a complete document.
    fn parse_document(&self, path: &Path, text: &str) -> SyntaxTree;

    /// Parse a standalone function body (block or expression) taken from `context_path`.
    fn parse_body(&self, text: &str, context_path: &Path) -> SyntaxTree;

    /// Bind a complete document against the other `visible` documents.
    fn analyze_document(&self, tree: &SyntaxTree, visible: &[Arc<SyntaxTree>]) -> BindingTable;

    /// Bind a standalone body inside a scope captured by an earlier analysis.
    fn analyze_in_scope(&self, tree: &SyntaxTree, scope: &Arc<LexicalScope>, visible: &[Arc<SyntaxTree>]) -> BindingTable;
}

/// Arena parser + binder of this crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArenaCompiler;

impl ArenaCompiler {
    pub fn new() -> Self { Self }
}

impl Compiler for ArenaCompiler {
    fn parse_document(&self, path: &Path, text: &str) -> SyntaxTree {
        parser::parse_document(path, text)
    }

    fn parse_body(&self, text: &str, context_path: &Path) -> SyntaxTree {
        parser::parse_body(text, context_path)
    }

    fn analyze_document(&self, tree: &SyntaxTree, visible: &[Arc<SyntaxTree>]) -> BindingTable {
        semantic::analyze_document(tree, visible)
    }

    fn analyze_in_scope(&self, tree: &SyntaxTree, scope: &Arc<LexicalScope>, visible: &[Arc<SyntaxTree>]) -> BindingTable {
        semantic::analyze_in_scope(tree, scope, visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiler_is_usable_as_shared_trait_object() {
        let compiler: Arc<dyn Compiler> = Arc::new(ArenaCompiler::new());
        let tree = compiler.parse_document(Path::new("a.kt"), "fun f(): Int = 1");
        let table = compiler.analyze_document(&tree, &[]);
        assert_eq!(table.lexical_scope_count(), 1);

        let handle = std::thread::spawn(move || compiler.parse_body("{ 1 }", Path::new("a.kt")).root_text().to_string());
        assert_eq!(handle.join().expect("thread"), "{ 1 }");
    }
}
