//! One edit against a retained analysis: the old snapshot, the new text and
//! the documents visible to the binder.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::compiler::Compiler;
use crate::config::RecompileConfig;
use crate::core::errors::RecompileError;
use crate::core::position::{LineIndex, TextRange};
use crate::parser::{file_name, SyntaxTree};
use crate::semantic::BindingTable;

use super::change_region::{detect_change_region, ChangeRegion};
use super::compiled_unit::CompiledUnit;
use super::strategy::{RecompilePlan, RecompileStrategy};

/// Text, tree and bindings of the last full analysis of a document.
/// Never modified; a newer analysis produces a new snapshot.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    tree: Arc<SyntaxTree>,
    bindings: Arc<BindingTable>,
}

impl DocumentSnapshot {
    pub fn new(tree: Arc<SyntaxTree>, bindings: Arc<BindingTable>) -> Self {
        Self { tree, bindings }
    }

    /// Parse and bind `text` from scratch.
    pub fn analyze(compiler: &dyn Compiler, path: &Path, text: &str, visible: &[Arc<SyntaxTree>]) -> Self {
        let tree = compiler.parse_document(path, text);
        let bindings = compiler.analyze_document(&tree, visible);
        Self::new(Arc::new(tree), Arc::new(bindings))
    }

    pub fn tree(&self) -> &Arc<SyntaxTree> { &self.tree }
    pub fn bindings(&self) -> &Arc<BindingTable> { &self.bindings }
    pub fn path(&self) -> &Path { self.tree.path() }
    pub fn text(&self) -> &str { self.tree.text() }
}

/// What [`EditSession::recompute`] did to produce its unit.
#[derive(Debug, Clone)]
pub struct RecomputeOutcome {
    /// Strategy the selector chose.
    pub strategy: RecompileStrategy,
    pub unit: CompiledUnit,
    /// Scoped attempt that failed and was replaced by a full reanalysis.
    pub fallback: Option<RecompileError>,
    /// Snapshot of the new text when a full reanalysis ran.
    pub refreshed: Option<DocumentSnapshot>,
}

pub struct EditSession {
    compiler: Arc<dyn Compiler>,
    config: RecompileConfig,
    snapshot: DocumentSnapshot,
    new_text: Arc<str>,
    new_line_index: LineIndex,
    visible: Arc<[Arc<SyntaxTree>]>,
    region: Option<ChangeRegion>,
}

impl EditSession {
    pub fn new(
        compiler: Arc<dyn Compiler>,
        snapshot: DocumentSnapshot,
        new_text: impl Into<Arc<str>>,
        visible: Vec<Arc<SyntaxTree>>,
    ) -> Self {
        let new_text: Arc<str> = new_text.into();
        let region = detect_change_region(snapshot.text(), &new_text);
        Self {
            compiler,
            config: RecompileConfig::default(),
            new_line_index: LineIndex::new(&new_text),
            snapshot,
            new_text,
            visible: visible.into(),
            region,
        }
    }

    pub fn with_config(mut self, config: RecompileConfig) -> Self {
        self.config = config;
        self
    }

    pub fn compiler(&self) -> &dyn Compiler { self.compiler.as_ref() }
    pub fn config(&self) -> &RecompileConfig { &self.config }
    pub fn snapshot(&self) -> &DocumentSnapshot { &self.snapshot }
    pub fn new_text(&self) -> &str { &self.new_text }
    pub fn shared_new_text(&self) -> Arc<str> { Arc::clone(&self.new_text) }
    pub fn new_line_index(&self) -> &LineIndex { &self.new_line_index }
    pub fn visible(&self) -> &[Arc<SyntaxTree>] { &self.visible }
    pub fn shared_visible(&self) -> Arc<[Arc<SyntaxTree>]> { Arc::clone(&self.visible) }
    pub fn file_name(&self) -> String { file_name(self.snapshot.path()) }

    /// Changed region between the snapshot text and the new text.
    pub fn region(&self) -> Option<ChangeRegion> { self.region }

    /// New-text offset mapped into the snapshot text (identity when unchanged).
    pub fn old_cursor(&self, cursor: usize) -> usize {
        match self.region {
            Some(region) => region.to_old_offset(cursor),
            None => cursor,
        }
    }

    /// `file line:column` of a new-text offset.
    pub fn describe_position(&self, offset: usize) -> String {
        let pos = self.new_line_index.position_of(offset);
        format!("{} {}", self.file_name(), pos)
    }

    /// `file line:column-line:column` of a new-text range.
    pub fn describe_range(&self, range: TextRange) -> String {
        let (start, end) = self.new_line_index.range_positions(range);
        format!("{} {}-{}", self.file_name(), start, end)
    }

    /// Unit over the retained snapshot, offset zero. Valid as is when the
    /// text has not changed.
    pub fn compiled_unit(&self, cursor: usize) -> CompiledUnit {
        let tree = Arc::clone(self.snapshot.tree());
        CompiledUnit::new(
            tree.shared_text(),
            tree.line_index().clone(),
            Arc::clone(&tree),
            tree.root(),
            Arc::clone(self.snapshot.bindings()),
            cursor,
            0,
            self.shared_visible(),
        )
    }

    /// Parse and bind the whole new text. Returns the unit and the snapshot it came from.
    pub fn full_reanalysis(&self, cursor: usize) -> (CompiledUnit, DocumentSnapshot) {
        let snapshot = DocumentSnapshot::analyze(self.compiler(), self.snapshot.path(), &self.new_text, &self.visible);
        let tree = Arc::clone(snapshot.tree());
        let unit = CompiledUnit::new(
            Arc::clone(&self.new_text),
            self.new_line_index.clone(),
            Arc::clone(&tree),
            tree.root(),
            Arc::clone(snapshot.bindings()),
            cursor,
            0,
            self.shared_visible(),
        );
        (unit, snapshot)
    }

    /// Select a strategy and produce a unit for `cursor`: reuse the snapshot,
    /// reanalyze one body, or reanalyze the document. A failed scoped attempt
    /// falls back to a full reanalysis; the retained snapshot is never touched.
    pub fn recompute(&self, cursor: usize) -> RecomputeOutcome {
        let plan = self.plan(cursor);
        let strategy = plan.strategy();
        match plan {
            RecompilePlan::Unchanged => RecomputeOutcome { strategy, unit: self.compiled_unit(cursor), fallback: None, refreshed: None },
            RecompilePlan::FunctionScoped(target) => {
                let name = target.name().to_string();
                match target.recompile() {
                    Ok(unit) => RecomputeOutcome { strategy, unit, fallback: None, refreshed: None },
                    Err(err) => {
                        warn!(kind = err.kind(), "Scoped reanalysis of {name} failed ({err}), reanalyzing {}", self.file_name());
                        let (unit, snapshot) = self.full_reanalysis(cursor);
                        RecomputeOutcome { strategy, unit, fallback: Some(err), refreshed: Some(snapshot) }
                    }
                }
            }
            RecompilePlan::FullDocument | RecompilePlan::Unrecoverable => {
                info!("Reanalyzing {} ({strategy})", self.file_name());
                let (unit, snapshot) = self.full_reanalysis(cursor);
                RecomputeOutcome { strategy, unit, fallback: None, refreshed: Some(snapshot) }
            }
        }
    }
}

impl fmt::Debug for EditSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditSession")
            .field("path", &self.snapshot.path())
            .field("region", &self.region)
            .field("new_len", &self.new_text.len())
            .field("visible", &self.visible.len())
            .finish()
    }
}
