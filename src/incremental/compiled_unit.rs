//! Result of one (full or scoped) analysis, as handed to downstream queries.

use std::path::Path;
use std::sync::Arc;

use crate::ast_core::{AstKind, NodeId};
use crate::core::position::LineIndex;
use crate::parser::{file_name, SyntaxTree};
use crate::semantic::{BindingTable, SimpleType, Symbol};

/// Immutable analysis result plus the translation between the displayed text
/// and the coordinates of the analyzed tree.
///
/// For a full analysis `text_offset` is zero and `tree` covers the whole
/// document. For a scoped reanalysis `tree` is the re-parsed body alone and
/// `text_offset` is where that body starts in `content`.
#[derive(Debug, Clone)]
pub struct CompiledUnit {
    content: Arc<str>,
    line_index: LineIndex,
    tree: Arc<SyntaxTree>,
    root: NodeId,
    bindings: Arc<BindingTable>,
    cursor: usize,
    text_offset: usize,
    visible: Arc<[Arc<SyntaxTree>]>,
}

impl CompiledUnit {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        content: Arc<str>,
        line_index: LineIndex,
        tree: Arc<SyntaxTree>,
        root: NodeId,
        bindings: Arc<BindingTable>,
        cursor: usize,
        text_offset: usize,
        visible: Arc<[Arc<SyntaxTree>]>,
    ) -> Self {
        Self { content, line_index, tree, root, bindings, cursor, text_offset, visible }
    }

    /// Text the user sees (the full document, for scoped units too).
    pub fn content(&self) -> &str { &self.content }
    pub fn tree(&self) -> &Arc<SyntaxTree> { &self.tree }
    pub fn root(&self) -> NodeId { self.root }
    pub fn bindings(&self) -> &Arc<BindingTable> { &self.bindings }
    pub fn cursor(&self) -> usize { self.cursor }
    pub fn text_offset(&self) -> usize { self.text_offset }
    pub fn visible(&self) -> &[Arc<SyntaxTree>] { &self.visible }
    pub fn path(&self) -> &Path { self.tree.path() }

    pub fn is_scoped(&self) -> bool {
        self.text_offset != 0 || self.tree.ast().kind(self.root) != AstKind::File
    }

    /// Translate a displayed-text offset into tree coordinates.
    /// `None` for offsets before the analyzed text.
    pub fn offset(&self, cursor: usize) -> Option<usize> {
        cursor.checked_sub(self.text_offset)
    }

    /// Text of the analyzed root node.
    pub fn root_text(&self) -> &str {
        self.tree.node_text(self.root)
    }

    /// `file line:column` (0-based) of a displayed-text offset.
    pub fn describe_position(&self, offset: usize) -> String {
        let pos = self.line_index.position_of(offset);
        format!("{} {}", file_name(self.path()), pos)
    }

    /// Smallest node of the analyzed tree at a displayed-text offset.
    pub fn node_at(&self, cursor: usize) -> Option<NodeId> {
        self.tree.find_element_at(self.offset(cursor)?)
    }

    /// Type of the innermost typed expression around `cursor`.
    pub fn type_at(&self, cursor: usize) -> Option<&SimpleType> {
        let node = self.node_at(cursor)?;
        self.tree.ast().ancestors(node).find_map(|n| self.bindings.expr_type(n))
    }

    /// Declaration the reference under `cursor` resolves to. A member name
    /// resolves through its enclosing member access.
    pub fn reference_at(&self, cursor: usize) -> Option<&Arc<Symbol>> {
        let ast = self.tree.ast();
        let node = self.node_at(cursor)?;
        if let Some(symbol) = self.bindings.reference(node) {
            return Some(symbol);
        }
        ast.parent(node)
            .filter(|p| ast.kind(node) == AstKind::Name && ast.kind(*p) == AstKind::Member)
            .and_then(|p| self.bindings.reference(p))
    }
}
