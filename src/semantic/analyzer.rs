//! Name binding and type recording over the arena tree.
//!
//! Walks the tree with the `Visitor` API: scopes are opened on `enter` and
//! closed on `leave`, expression types are computed on `leave` once the
//! children are typed. Block locals live in plain frames on top of the
//! immutable scope chain, since only function-level scopes are captured.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::ast_core::{walk, Arena, AstKind, AstNode, AstPayload, BuiltAst, NodeId, VisitControl, Visitor};
use crate::core::position::PackedSpan;
use crate::diagnostics::{codes, Diagnostic, Location};
use crate::parser::SyntaxTree;

use super::scope::{LexicalScope, ScopeKind, Symbol, SymbolKind};
use super::types::{binary_result, negate_result, SimpleType};
use super::BindingTable;

/// Bind a whole document. Top-level declarations of the `visible` documents
/// other than this one form the outermost (import) scope.
pub fn analyze_document(tree: &SyntaxTree, visible: &[Arc<SyntaxTree>]) -> BindingTable {
    let imports = import_scope(tree.path(), visible);
    Binder::new(tree, imports, None).run()
}

/// Bind a standalone body against a previously captured scope. Names the
/// captured chain cannot resolve are looked up among the `visible` documents.
pub fn analyze_in_scope(tree: &SyntaxTree, scope: &Arc<LexicalScope>, visible: &[Arc<SyntaxTree>]) -> BindingTable {
    let fallback = import_scope(tree.path(), visible);
    Binder::new(tree, Arc::clone(scope), Some(fallback)).run()
}

fn import_scope(path: &Path, visible: &[Arc<SyntaxTree>]) -> Arc<LexicalScope> {
    let symbols = visible
        .iter()
        .filter(|doc| doc.path() != path)
        .flat_map(|doc| top_level_symbols(doc.ast(), doc.path()));
    LexicalScope::root(ScopeKind::Imports, symbols)
}

fn top_level_symbols(ast: &BuiltAst, origin: &Path) -> Vec<Symbol> {
    if ast.kind(ast.root()) != AstKind::File {
        return Vec::new();
    }
    ast.arena().children(ast.root()).filter_map(|c| declaration_symbol(ast, c, origin)).collect()
}

fn member_symbols(ast: &BuiltAst, class: NodeId, origin: &Path) -> Vec<Symbol> {
    ast.arena().children(class).filter_map(|c| declaration_symbol(ast, c, origin)).collect()
}

fn param_symbols(ast: &BuiltAst, function: NodeId, origin: &Path) -> Vec<Symbol> {
    ast.arena()
        .children(function)
        .filter(|c| ast.kind(*c) == AstKind::Param)
        .filter_map(|c| declaration_symbol(ast, c, origin))
        .collect()
}

fn declaration_symbol(ast: &BuiltAst, id: NodeId, origin: &Path) -> Option<Symbol> {
    let kind = match ast.kind(id) {
        AstKind::Function => SymbolKind::Function,
        AstKind::Property => SymbolKind::Property,
        AstKind::Class => SymbolKind::Class,
        AstKind::Param => SymbolKind::Param,
        AstKind::LocalVal => SymbolKind::Local,
        _ => return None,
    };
    let name = ast.node_ident_text(id)?.to_string();
    let span = match ast.arena().first_child_of_kind(id, AstKind::Name) {
        Some(name_node) => ast.span(name_node),
        // параметр сам несёт имя, оно стоит в начале узла
        None => PackedSpan::new(ast.span(id).start, name.len() as u32),
    };
    let members = (kind == SymbolKind::Class).then(|| LexicalScope::root(ScopeKind::Class, member_symbols(ast, id, origin)));
    Some(Symbol { declared_type: declared_type(ast, id, kind, &name), name, kind, origin: origin.to_path_buf(), span, members })
}

fn declared_type(ast: &BuiltAst, id: NodeId, kind: SymbolKind, name: &str) -> SimpleType {
    if let Some(type_ref) = ast.arena().first_child_of_kind(id, AstKind::TypeRef) {
        return ast.node_ident_text(type_ref).map(SimpleType::from_type_name).unwrap_or(SimpleType::Unknown);
    }
    match kind {
        SymbolKind::Class => SimpleType::Named(name.to_string()),
        SymbolKind::Function => match ast.function_body(id) {
            None => SimpleType::Unit,
            Some(body) if ast.kind(body) == AstKind::Block => SimpleType::Unit,
            Some(body) => SimpleType::of_literal(ast.kind(body)).unwrap_or(SimpleType::Unknown),
        },
        SymbolKind::Property | SymbolKind::Local => ast
            .arena()
            .children(id)
            .filter(|c| ast.kind(*c).is_expression())
            .last()
            .and_then(|init| SimpleType::of_literal(ast.kind(init)))
            .unwrap_or(SimpleType::Unknown),
        SymbolKind::Param => SimpleType::Unknown,
    }
}

struct Binder<'a> {
    tree: &'a SyntaxTree,
    ast: &'a BuiltAst,
    file: String,
    scopes: Vec<Arc<LexicalScope>>,
    /// Block-local declarations, innermost last.
    locals: Vec<HashMap<String, Arc<Symbol>>>,
    fallback: Option<Arc<LexicalScope>>,
    table: BindingTable,
}

impl<'a> Binder<'a> {
    fn new(tree: &'a SyntaxTree, base: Arc<LexicalScope>, fallback: Option<Arc<LexicalScope>>) -> Self {
        Self {
            tree,
            ast: tree.ast(),
            file: tree.file_name(),
            scopes: vec![base],
            locals: Vec::new(),
            fallback,
            table: BindingTable::default(),
        }
    }

    fn run(mut self) -> BindingTable {
        let ast = self.ast;
        walk(ast.arena(), ast.root(), &mut self);
        debug!(
            file = %self.file,
            references = self.table.reference_count(),
            scopes = self.table.lexical_scope_count(),
            diagnostics = self.table.diagnostics().len(),
            "bound tree"
        );
        self.table
    }

    fn current_scope(&self) -> Option<&Arc<LexicalScope>> {
        self.scopes.last()
    }

    fn push_scope(&mut self, kind: ScopeKind, symbols: Vec<Symbol>) -> Arc<LexicalScope> {
        let scope = match self.current_scope() {
            Some(parent) => LexicalScope::nested(parent, kind, symbols),
            None => LexicalScope::root(kind, symbols),
        };
        self.scopes.push(Arc::clone(&scope));
        scope
    }

    fn resolve(&self, name: &str) -> Option<Arc<Symbol>> {
        if let Some(local) = self.locals.iter().rev().find_map(|frame| frame.get(name)) {
            return Some(Arc::clone(local));
        }
        self.current_scope()
            .and_then(|scope| scope.resolve(name))
            .or_else(|| self.fallback.as_ref().and_then(|scope| scope.resolve(name)))
            .cloned()
    }

    fn type_of(&self, id: Option<NodeId>) -> SimpleType {
        id.and_then(|id| self.table.expr_type(id)).cloned().unwrap_or(SimpleType::Unknown)
    }

    fn location(&self, id: NodeId) -> Location {
        Location::from_span(self.file.clone(), self.tree.line_index(), self.ast.span(id))
    }

    fn bind_identifier(&mut self, id: NodeId) {
        let Some(name) = self.ast.node_ident_text(id) else { return };
        match self.resolve(name) {
            Some(symbol) => {
                self.table.record_type(id, symbol.declared_type.clone());
                self.table.record_reference(id, symbol);
            }
            None => {
                let diagnostic = Diagnostic::error(self.location(id), codes::UNRESOLVED_REFERENCE, format!("unresolved reference: {name}"))
                    .with_found(name);
                self.table.push_diagnostic(diagnostic);
                self.table.record_type(id, SimpleType::Unknown);
            }
        }
    }

    fn bind_call(&mut self, id: NodeId) {
        let callee = self.ast.arena().children(id).next();
        let ty = match callee.and_then(|c| self.table.reference(c)) {
            Some(symbol) if symbol.kind == SymbolKind::Function => symbol.declared_type.clone(),
            Some(symbol) if symbol.kind == SymbolKind::Class => SimpleType::Named(symbol.name.clone()),
            _ => SimpleType::Unknown,
        };
        self.table.record_type(id, ty);
    }

    fn bind_member(&mut self, id: NodeId) {
        let receiver = self.ast.arena().children(id).next();
        let receiver_type = self.type_of(receiver);
        let Some(member) = self.ast.node_ident_text(id) else {
            self.table.record_type(id, SimpleType::Unknown);
            return;
        };
        let class = match &receiver_type {
            SimpleType::Named(class_name) => self.resolve(class_name).filter(|s| s.kind == SymbolKind::Class),
            _ => None,
        };
        let target = class.as_ref().and_then(|c| c.members.as_ref()).and_then(|m| m.lookup_local(member)).cloned();
        match target {
            Some(symbol) => {
                self.table.record_type(id, symbol.declared_type.clone());
                self.table.record_reference(id, symbol);
            }
            None => {
                if let Some(class) = class {
                    let diagnostic = Diagnostic::error(self.location(id), codes::UNKNOWN_MEMBER, format!("class {} has no member {member}", class.name))
                        .with_found(member);
                    self.table.push_diagnostic(diagnostic);
                }
                self.table.record_type(id, SimpleType::Unknown);
            }
        }
    }

    fn declare_local(&mut self, id: NodeId) {
        let Some(mut symbol) = declaration_symbol(self.ast, id, self.tree.path()) else { return };
        if self.ast.arena().first_child_of_kind(id, AstKind::TypeRef).is_none() {
            let init = self.ast.arena().children(id).filter(|c| self.ast.kind(*c).is_expression()).last();
            symbol.declared_type = self.type_of(init);
        }
        if let Some(frame) = self.locals.last_mut() {
            frame.insert(symbol.name.clone(), Arc::new(symbol));
        }
    }
}

impl<'a> Visitor for Binder<'a> {
    fn enter(&mut self, id: NodeId, node: &AstNode, _arena: &Arena) -> VisitControl {
        let ast = self.ast;
        let tree = self.tree;
        let path = tree.path();
        match node.kind {
            AstKind::File => {
                self.push_scope(ScopeKind::File, top_level_symbols(ast, path));
            }
            AstKind::Class => {
                self.push_scope(ScopeKind::Class, member_symbols(ast, id, path));
            }
            AstKind::Function => {
                let scope = self.push_scope(ScopeKind::Function, param_symbols(ast, id, path));
                if let Some(body) = ast.function_body(id) {
                    self.table.record_scope(ast.span_key(body), scope);
                }
            }
            AstKind::Block => self.locals.push(HashMap::new()),
            // Типы и имена объявлений не разрешаются как выражения.
            AstKind::Param | AstKind::TypeRef | AstKind::Name => return VisitControl::SkipChildren,
            _ => {}
        }
        VisitControl::Continue
    }

    fn leave(&mut self, id: NodeId, node: &AstNode, arena: &Arena) {
        match node.kind {
            AstKind::File | AstKind::Class | AstKind::Function => {
                self.scopes.pop();
            }
            AstKind::Block => {
                self.locals.pop();
                self.table.record_type(id, SimpleType::Unit);
            }
            AstKind::IntLiteral | AstKind::StringLiteral | AstKind::BoolLiteral => {
                if let Some(ty) = SimpleType::of_literal(node.kind) {
                    self.table.record_type(id, ty);
                }
            }
            AstKind::Identifier => self.bind_identifier(id),
            AstKind::Binary => {
                let mut children = arena.children(id);
                let lhs = self.type_of(children.next());
                let rhs = self.type_of(children.next());
                let ty = match node.payload {
                    AstPayload::Op(op) => binary_result(&lhs, op, &rhs),
                    _ => SimpleType::Unknown,
                };
                self.table.record_type(id, ty);
            }
            AstKind::Unary => {
                let inner = self.type_of(arena.children(id).next());
                self.table.record_type(id, negate_result(&inner));
            }
            AstKind::Paren => {
                let inner = self.type_of(arena.children(id).next());
                self.table.record_type(id, inner);
            }
            AstKind::Call => self.bind_call(id),
            AstKind::Member => self.bind_member(id),
            AstKind::LocalVal => self.declare_local(id),
            _ => {}
        }
    }
}
