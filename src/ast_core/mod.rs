//! Arena syntax tree.
//!
//! Узлы хранятся в плоской арене и адресуются `NodeId`; дети связаны через
//! first_child / next_sibling, родители восстанавливаются из parent map,
//! построенной один раз при `build()`. Деревья неизменяемы после построения.

use crate::ast_core::interner::{StringInterner, SymbolId};
use crate::core::position::PackedSpan;

pub mod interner;

/// Устойчивый идентификатор узла внутри одной арены.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Вид узла.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AstKind {
    File,
    Class,
    Function,
    Property,
    Param,
    /// Declared name of a function / property / class / local.
    Name,
    TypeRef,
    Block,
    LocalVal,
    Return,
    Call,
    Member,
    Identifier,
    IntLiteral,
    StringLiteral,
    BoolLiteral,
    Binary,
    Unary,
    Paren,
    Error,
}

impl AstKind {
    pub fn is_expression(self) -> bool {
        matches!(
            self,
            AstKind::Block
                | AstKind::Call
                | AstKind::Member
                | AstKind::Identifier
                | AstKind::IntLiteral
                | AstKind::StringLiteral
                | AstKind::BoolLiteral
                | AstKind::Binary
                | AstKind::Unary
                | AstKind::Paren
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp { Add, Sub, Mul, Div }

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self { BinaryOp::Add => "+", BinaryOp::Sub => "-", BinaryOp::Mul => "*", BinaryOp::Div => "/" }
    }
}

/// Дополнительные данные для конкретных узлов.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AstPayload {
    #[default]
    None,
    /// Идентификатор (только интернированный символ).
    Ident { sym: SymbolId },
    /// Литерал (исходный текст литерала).
    Literal { sym: SymbolId },
    /// Ошибка хранит индекс сообщения в отдельной таблице.
    Error { msg: u32 },
    Op(BinaryOp),
}

#[derive(Debug, Clone)]
pub struct AstNode {
    pub kind: AstKind,
    pub first_child: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    pub span: PackedSpan,
    pub payload: AstPayload,
}

impl AstNode {
    fn new(kind: AstKind, span: PackedSpan, payload: AstPayload) -> Self {
        Self { kind, first_child: None, next_sibling: None, span, payload }
    }
}

/// Агрегатор всех узлов.
#[derive(Default, Debug, Clone)]
pub struct Arena {
    nodes: Vec<AstNode>,
}

impl Arena {
    pub fn new() -> Self { Self { nodes: Vec::new() } }
    fn alloc(&mut self, node: AstNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }
    pub fn node(&self, id: NodeId) -> &AstNode { &self.nodes[id.0 as usize] }
    fn node_mut(&mut self, id: NodeId) -> &mut AstNode { &mut self.nodes[id.0 as usize] }
    pub fn len(&self) -> usize { self.nodes.len() }
    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &AstNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i as u32), n))
    }

    pub fn children(&self, id: NodeId) -> NodeChildren<'_> {
        NodeChildren { arena: self, next: self.node(id).first_child }
    }
    pub fn first_child_of_kind(&self, id: NodeId, kind: AstKind) -> Option<NodeId> {
        self.children(id).find(|c| self.node(*c).kind == kind)
    }
}

/// Итератор детей конкретного узла.
pub struct NodeChildren<'a> {
    arena: &'a Arena,
    next: Option<NodeId>,
}

impl<'a> Iterator for NodeChildren<'a> {
    type Item = NodeId;
    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.next?;
        self.next = self.arena.node(cur).next_sibling;
        Some(cur)
    }
}

struct OpenNode {
    id: NodeId,
    last_child: Option<NodeId>,
}

/// Построитель дерева (nested push/pop стеком). Конец span узла известен только
/// при `finish_node`, поэтому `start_*` принимают лишь начальное смещение.
pub struct AstBuilder {
    arena: Arena,
    stack: Vec<OpenNode>,
    root: Option<NodeId>,
    interner: StringInterner,
    error_messages: Vec<String>,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self { arena: Arena::new(), stack: Vec::new(), root: None, interner: StringInterner::new(), error_messages: Vec::new() }
    }

    pub fn start_node(&mut self, kind: AstKind, start: u32) -> NodeId {
        self.start_node_with_payload(kind, start, AstPayload::None)
    }

    pub fn start_node_with_payload(&mut self, kind: AstKind, start: u32, payload: AstPayload) -> NodeId {
        let id = self.arena.alloc(AstNode::new(kind, PackedSpan::new(start, 0), payload));
        self.attach(id);
        self.stack.push(OpenNode { id, last_child: None });
        if self.root.is_none() { self.root = Some(id); }
        id
    }

    pub fn start_node_with_ident(&mut self, kind: AstKind, start: u32, name: &str) -> NodeId {
        let sym = self.interner.intern(name);
        self.start_node_with_payload(kind, start, AstPayload::Ident { sym })
    }

    /// Закрыть текущий узел; его span растягивается до `end`.
    pub fn finish_node(&mut self, end: u32) {
        if let Some(open) = self.stack.pop() {
            let node = self.arena.node_mut(open.id);
            node.span = PackedSpan::between(node.span.start, end);
        }
    }

    /// Имя узла становится известно только после его открытия (`fun` → NAME).
    pub fn set_ident(&mut self, id: NodeId, name: &str) {
        let sym = self.interner.intern(name);
        self.arena.node_mut(id).payload = AstPayload::Ident { sym };
    }

    pub fn leaf(&mut self, kind: AstKind, span: PackedSpan, payload: AstPayload) -> NodeId {
        let id = self.arena.alloc(AstNode::new(kind, span, payload));
        self.attach(id);
        if self.root.is_none() { self.root = Some(id); }
        id
    }

    pub fn leaf_ident(&mut self, kind: AstKind, span: PackedSpan, name: &str) -> NodeId {
        let sym = self.interner.intern(name);
        self.leaf(kind, span, AstPayload::Ident { sym })
    }

    pub fn leaf_literal(&mut self, kind: AstKind, span: PackedSpan, text: &str) -> NodeId {
        let sym = self.interner.intern(text);
        self.leaf(kind, span, AstPayload::Literal { sym })
    }

    /// Создать Error-узел (leaf) с сообщением.
    pub fn error(&mut self, span: PackedSpan, message: impl Into<String>) -> NodeId {
        let idx = self.error_messages.len();
        self.error_messages.push(message.into());
        self.leaf(AstKind::Error, span, AstPayload::Error { msg: idx as u32 })
    }

    /// Start offset of an already allocated node.
    pub fn node_start(&self, id: NodeId) -> u32 { self.arena.node(id).span.start }

    /// Re-parent the most recently attached child of the open node under a new node
    /// of `kind` (left-associative operators: `a + b` wraps `a` after it was parsed).
    pub fn wrap_last_child(&mut self, kind: AstKind, payload: AstPayload) -> Option<NodeId> {
        let target = match self.stack.last() {
            Some(open) => open.last_child?,
            None => self.root?,
        };
        let start = self.arena.node(target).span.start;
        let wrapper = self.arena.alloc(AstNode::new(kind, PackedSpan::new(start, 0), payload));
        match self.stack.last_mut() {
            Some(open) => {
                let parent = open.id;
                open.last_child = Some(wrapper);
                let mut prev = None;
                let mut cur = self.arena.node(parent).first_child;
                while let Some(c) = cur {
                    if c == target { break; }
                    prev = Some(c);
                    cur = self.arena.node(c).next_sibling;
                }
                match prev {
                    Some(p) => self.arena.node_mut(p).next_sibling = Some(wrapper),
                    None => self.arena.node_mut(parent).first_child = Some(wrapper),
                }
            }
            None => self.root = Some(wrapper),
        }
        self.arena.node_mut(target).next_sibling = None;
        self.arena.node_mut(wrapper).first_child = Some(target);
        self.stack.push(OpenNode { id: wrapper, last_child: Some(target) });
        Some(wrapper)
    }

    fn attach(&mut self, id: NodeId) {
        if let Some(open) = self.stack.last_mut() {
            match open.last_child {
                None => {
                    let parent = open.id;
                    open.last_child = Some(id);
                    self.arena.node_mut(parent).first_child = Some(id);
                }
                Some(last) => {
                    open.last_child = Some(id);
                    self.arena.node_mut(last).next_sibling = Some(id);
                }
            }
        }
    }

    pub fn build(mut self) -> BuiltAst {
        // Незакрытые узлы закрываем по концу последнего ребёнка.
        while let Some(open) = self.stack.last() {
            let end = self.arena.children(open.id).map(|c| self.arena.node(c).span.end()).max().unwrap_or(0);
            self.finish_node(end);
        }
        let root = match self.root {
            Some(root) => root,
            None => self.error(PackedSpan::empty(), "empty tree"),
        };
        let parents = build_parent_map(&self.arena);
        BuiltAst { arena: self.arena, root, parents, interner: self.interner, error_messages: self.error_messages }
    }
}

impl Default for AstBuilder {
    fn default() -> Self { Self::new() }
}

fn build_parent_map(arena: &Arena) -> Vec<Option<NodeId>> {
    let mut parents = vec![None; arena.len()];
    for (nid, _) in arena.iter() {
        for c in arena.children(nid) { parents[c.0 as usize] = Some(nid); }
    }
    parents
}

/// Stable identity of a syntactic unit across reconstructed trees: span plus kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanKey {
    pub start: u32,
    pub len: u32,
    pub kind: AstKind,
}

#[derive(Debug, Clone)]
pub struct BuiltAst {
    arena: Arena,
    root: NodeId,
    parents: Vec<Option<NodeId>>,
    interner: StringInterner,
    error_messages: Vec<String>,
}

impl BuiltAst {
    pub fn root(&self) -> NodeId { self.root }
    pub fn arena(&self) -> &Arena { &self.arena }
    pub fn node(&self, id: NodeId) -> &AstNode { self.arena.node(id) }
    pub fn kind(&self, id: NodeId) -> AstKind { self.arena.node(id).kind }
    pub fn span(&self, id: NodeId) -> PackedSpan { self.arena.node(id).span }
    pub fn resolve_symbol(&self, sym: SymbolId) -> &str { self.interner.resolve(sym) }
    pub fn interner(&self) -> &StringInterner { &self.interner }

    pub fn span_key(&self, id: NodeId) -> SpanKey {
        let node = self.arena.node(id);
        SpanKey { start: node.span.start, len: node.span.len, kind: node.kind }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> { self.parents[id.0 as usize] }

    /// The node itself, then each ancestor up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |n| self.parent(*n))
    }

    /// Текст идентификатора (Name/Identifier/Function/Param с payload Ident).
    pub fn node_ident_text(&self, id: NodeId) -> Option<&str> {
        match self.arena.node(id).payload { AstPayload::Ident { sym } => Some(self.resolve_symbol(sym)), _ => None }
    }

    pub fn node_literal_text(&self, id: NodeId) -> Option<&str> {
        match self.arena.node(id).payload { AstPayload::Literal { sym } => Some(self.resolve_symbol(sym)), _ => None }
    }

    pub fn node_error_message(&self, id: NodeId) -> Option<&str> {
        match self.arena.node(id).payload {
            AstPayload::Error { msg } => self.error_messages.get(msg as usize).map(|s| s.as_str()),
            _ => None,
        }
    }

    /// Smallest node whose half-open span contains `offset`.
    /// Zero-length nodes are never returned.
    pub fn find_element_at(&self, offset: u32) -> Option<NodeId> {
        if !self.span(self.root).contains_offset(offset) { return None; }
        let mut cur = self.root;
        'descend: loop {
            for c in self.arena.children(cur) {
                if self.span(c).contains_offset(offset) {
                    cur = c;
                    continue 'descend;
                }
            }
            return Some(cur);
        }
    }

    /// Nearest enclosing named function, the node itself included.
    pub fn enclosing_function(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id).find(|n| self.kind(*n) == AstKind::Function && self.node_ident_text(*n).is_some())
    }

    /// Body of a function: its block or expression child. Signature parts and
    /// recovery nodes are skipped; a function without a body yields `None`.
    pub fn function_body(&self, function: NodeId) -> Option<NodeId> {
        self.arena.children(function).find(|c| self.kind(*c).is_expression())
    }

    pub fn count_kind(&self, kind: AstKind) -> usize {
        preorder(&self.arena, self.root).filter(|nid| self.kind(*nid) == kind).count()
    }
}

/// Утилита обхода (предварительный проход).
pub fn preorder(arena: &Arena, root: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    let mut stack = vec![root];
    std::iter::from_fn(move || {
        let id = stack.pop()?;
        // push children в обратном порядке для сохранения слева-направо
        let children: Vec<NodeId> = arena.children(id).collect();
        stack.extend(children.into_iter().rev());
        Some(id)
    })
}

/// Контроль обхода.
pub enum VisitControl { Continue, SkipChildren, Stop }

/// Visitor API (enter/leave). Возвращаем VisitControl из enter.
pub trait Visitor {
    fn enter(&mut self, _id: NodeId, _node: &AstNode, _arena: &Arena) -> VisitControl { VisitControl::Continue }
    fn leave(&mut self, _id: NodeId, _node: &AstNode, _arena: &Arena) {}
}

/// Обход дерева с visitor (preorder + post события). Возвращает true если не прерван.
pub fn walk<V: Visitor>(arena: &Arena, root: NodeId, visitor: &mut V) -> bool {
    fn inner<V: Visitor>(arena: &Arena, id: NodeId, vis: &mut V) -> Option<()> {
        let node = arena.node(id);
        match vis.enter(id, node, arena) {
            VisitControl::Continue => {
                for c in arena.children(id) { inner(arena, c, vis)?; }
            }
            VisitControl::SkipChildren => {}
            VisitControl::Stop => return None,
        }
        vis.leave(id, node, arena);
        Some(())
    }
    inner(arena, root, visitor).is_some()
}
