//! Recompile-strategy selection.
//!
//! The selector is a cascade of necessary conditions for reanalyzing one
//! function body in isolation. Every failed condition degrades to
//! `FullDocument`; only a cursor with no syntactic anchor outside the change
//! is `Unrecoverable`.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ast_core::NodeId;
use crate::core::position::TextRange;
use crate::semantic::LexicalScope;

use super::change_region::ChangeRegion;
use super::session::EditSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecompileStrategy {
    /// Texts are identical; the retained analysis can be reused.
    Unchanged,
    /// Only the enclosing function body needs reanalysis.
    FunctionScoped,
    FullDocument,
    /// The cursor maps to nothing in the old tree.
    Unrecoverable,
}

impl RecompileStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::FunctionScoped => "function_scoped",
            Self::FullDocument => "full_document",
            Self::Unrecoverable => "unrecoverable",
        }
    }
}

impl fmt::Display for RecompileStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategy together with what the chosen strategy needs. The only way to get
/// a `FunctionTarget`, and so the only way to run a scoped recompile, is a
/// plan whose preconditions all held.
#[derive(Debug)]
pub enum RecompilePlan<'s> {
    Unchanged,
    FunctionScoped(FunctionTarget<'s>),
    FullDocument,
    Unrecoverable,
}

impl<'s> RecompilePlan<'s> {
    pub fn strategy(&self) -> RecompileStrategy {
        match self {
            Self::Unchanged => RecompileStrategy::Unchanged,
            Self::FunctionScoped(_) => RecompileStrategy::FunctionScoped,
            Self::FullDocument => RecompileStrategy::FullDocument,
            Self::Unrecoverable => RecompileStrategy::Unrecoverable,
        }
    }

    pub fn into_target(self) -> Option<FunctionTarget<'s>> {
        match self {
            Self::FunctionScoped(target) => Some(target),
            _ => None,
        }
    }
}

/// Function whose body is going to be reanalyzed, resolved in the old tree.
pub struct FunctionTarget<'s> {
    pub(super) session: &'s EditSession,
    pub(super) region: ChangeRegion,
    pub(super) function: NodeId,
    pub(super) body: NodeId,
    pub(super) name: String,
    pub(super) scope: Arc<LexicalScope>,
    pub(super) cursor: usize,
}

impl<'s> FunctionTarget<'s> {
    pub fn name(&self) -> &str { &self.name }
    /// Function node in the retained (old) tree.
    pub fn function(&self) -> NodeId { self.function }
    /// Body node in the retained (old) tree.
    pub fn body(&self) -> NodeId { self.body }
    pub fn scope(&self) -> &Arc<LexicalScope> { &self.scope }
    pub fn cursor(&self) -> usize { self.cursor }
    pub fn region(&self) -> ChangeRegion { self.region }

    /// Body span in old-text coordinates.
    pub fn old_body_range(&self) -> TextRange {
        self.session.snapshot().tree().ast().span(self.body).into()
    }
}

impl fmt::Debug for FunctionTarget<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionTarget")
            .field("name", &self.name)
            .field("function", &self.function)
            .field("body", &self.body)
            .field("cursor", &self.cursor)
            .field("region", &self.region)
            .finish()
    }
}

impl EditSession {
    /// Decide how to bring the analysis up to date for a query at `cursor`
    /// (an offset in the new text).
    pub fn plan(&self, cursor: usize) -> RecompilePlan<'_> {
        let Some(region) = self.region() else {
            info!("{} has not changed", self.file_name());
            return RecompilePlan::Unchanged;
        };

        let old_cursor = region.to_old_offset(cursor);
        debug!(cursor, old_cursor, old = %region.old, new = %region.new, "translated cursor to old text");

        let tree = self.snapshot().tree();
        let ast = tree.ast();
        let Some(leaf) = tree.find_element_at(old_cursor) else {
            if region.old.contains_offset(old_cursor) {
                info!("No element at {}, inside changed region", self.describe_position(cursor));
                return RecompilePlan::FullDocument;
            }
            info!("No element at {}", self.describe_position(cursor));
            return RecompilePlan::Unrecoverable;
        };

        let Some((function, name)) = ast.enclosing_function(leaf).and_then(|f| Some((f, ast.node_ident_text(f)?))) else {
            info!("No surrounding function at {}", self.describe_position(cursor));
            return RecompilePlan::FullDocument;
        };

        let Some(body) = ast.function_body(function) else {
            info!("{name} has no body");
            return RecompilePlan::FullDocument;
        };
        let body_range = TextRange::from(ast.span(body));
        if !body_range.contains_range(region.old) {
            info!("Changed region {} is outside {name} {body_range}", self.describe_range(region.new));
            return RecompilePlan::FullDocument;
        }

        let Some(scope) = self.snapshot().bindings().lexical_scope(tree, body) else {
            info!("{name} has no scope");
            return RecompilePlan::FullDocument;
        };

        let config = self.config();
        if !config.function_scoped {
            info!("Function-scoped reanalysis is disabled, {name} will be reanalyzed with the document");
            return RecompilePlan::FullDocument;
        }
        if let Some(limit) = config.max_body_len.filter(|limit| body_range.len() > *limit) {
            info!("Body of {name} is {} bytes, over the limit of {limit}", body_range.len());
            return RecompilePlan::FullDocument;
        }

        info!("Successfully recovered at {} using {name}", self.describe_position(cursor));
        RecompilePlan::FunctionScoped(FunctionTarget {
            session: self,
            region,
            function,
            body,
            name: name.to_string(),
            scope: Arc::clone(scope),
            cursor,
        })
    }

    /// Strategy tag only; see [`EditSession::plan`].
    pub fn select_strategy(&self, cursor: usize) -> RecompileStrategy {
        self.plan(cursor).strategy()
    }
}
