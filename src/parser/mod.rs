/*!
# Parser

Front end of the edited language: logos lexer plus a recovering recursive
descent grammar that writes straight into the arena tree.

## Usage

```rust
use scoped_reanalysis::parser::{parse_body, parse_document};
use std::path::Path;

let tree = parse_document(Path::new("demo.kt"), "fun g() { 1 }");
assert!(tree.diagnostics().is_empty());

let body = parse_body("{ 2 }", Path::new("demo.kt"));
assert_eq!(body.root_text(), "{ 2 }");
```
*/

pub mod grammar;
pub mod lexer;

pub use lexer::{tokenize, Token, TokenKind};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::ast_core::{BuiltAst, NodeId};
use crate::core::position::{LineIndex, PackedSpan};
use crate::diagnostics::{Diagnostic, Location};

/// Parsed text of one document (or of one standalone body). Immutable.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    path: PathBuf,
    text: Arc<str>,
    ast: BuiltAst,
    line_index: LineIndex,
    diagnostics: Vec<Diagnostic>,
}

impl SyntaxTree {
    fn from_output(path: &Path, text: &str, output: grammar::ParseOutput) -> Self {
        let line_index = LineIndex::new(text);
        let file = file_name(path);
        let diagnostics = output
            .errors
            .into_iter()
            .map(|e| Diagnostic::error(Location::from_span(file.clone(), &line_index, e.span), e.code, e.message))
            .collect();
        Self { path: path.to_path_buf(), text: Arc::from(text), ast: output.ast, line_index, diagnostics }
    }

    pub fn path(&self) -> &Path { &self.path }
    pub fn file_name(&self) -> String { file_name(&self.path) }
    pub fn text(&self) -> &str { &self.text }
    pub fn shared_text(&self) -> Arc<str> { Arc::clone(&self.text) }
    pub fn ast(&self) -> &BuiltAst { &self.ast }
    pub fn root(&self) -> NodeId { self.ast.root() }
    pub fn line_index(&self) -> &LineIndex { &self.line_index }
    pub fn diagnostics(&self) -> &[Diagnostic] { &self.diagnostics }

    /// Source text covered by `id`; empty if the span does not fit the text.
    pub fn node_text(&self, id: NodeId) -> &str {
        self.span_text(self.ast.span(id))
    }

    pub fn span_text(&self, span: PackedSpan) -> &str {
        self.text.get(span.start as usize..span.end() as usize).unwrap_or("")
    }

    pub fn root_text(&self) -> &str { self.node_text(self.ast.root()) }

    /// Smallest node whose span contains `offset` (half-open).
    pub fn find_element_at(&self, offset: usize) -> Option<NodeId> {
        u32::try_from(offset).ok().and_then(|o| self.ast.find_element_at(o))
    }
}

/// Last path component, as shown in log lines.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse a complete document.
pub fn parse_document(path: &Path, text: &str) -> SyntaxTree {
    SyntaxTree::from_output(path, text, grammar::parse_file(text))
}

/// Parse a standalone body (block or expression) extracted from `context_path`.
pub fn parse_body(text: &str, context_path: &Path) -> SyntaxTree {
    SyntaxTree::from_output(context_path, text, grammar::parse_body(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast_core::AstKind;
    use crate::diagnostics::codes;

    #[test]
    fn test_parse_document_root_covers_text() {
        let text = "fun g() { 1 }\n";
        let tree = parse_document(Path::new("/work/src/demo.kt"), text);
        assert_eq!(tree.root_text(), text);
        assert_eq!(tree.file_name(), "demo.kt");
        assert!(tree.diagnostics().is_empty());
        assert_eq!(tree.find_element_at(text.len()), None);
        let lit = tree.find_element_at(10).expect("literal");
        assert_eq!(tree.ast().kind(lit), AstKind::IntLiteral);
        assert_eq!(tree.node_text(lit), "1");
    }

    #[test]
    fn test_diagnostics_are_located() {
        let tree = parse_document(Path::new("demo.kt"), "fun g() {\n  val = 1\n}");
        let diag = tree.diagnostics().first().expect("syntax error");
        assert_eq!(diag.code, codes::SYNTAX_ERROR);
        assert_eq!((diag.location.line, diag.location.column), (1, 6));
        assert_eq!(diag.location.file, "demo.kt");
    }

    #[test]
    fn test_parse_body_root_is_the_expression() {
        let tree = parse_body("  x + 1  ", Path::new("demo.kt"));
        assert_eq!(tree.root_text(), "x + 1");
        assert_eq!(tree.ast().kind(tree.root()), AstKind::Binary);
        assert_eq!(tree.path(), Path::new("demo.kt"));
    }
}
