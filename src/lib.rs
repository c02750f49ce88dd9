/*!
# Scoped Reanalysis

Incremental reanalysis core for an interactive code-intelligence service.
Given the last full analysis of a document (text, syntax tree, binding table)
and the newly edited text, it decides the cheapest correct way to bring the
analysis up to date and, when the edit stays inside one function body,
re-parses and re-binds only that body in the scope recorded for it.

## Architecture

```text
scoped-reanalysis
├── core          - positions, spans, line index, error taxonomy
├── ast_core      - arena syntax tree, parent map, visitor
├── parser        - logos lexer + recovering grammar → SyntaxTree
├── semantic      - scopes, symbols, binder → BindingTable
├── compiler      - Compiler collaborator trait (+ arena implementation)
├── incremental   - change region, strategy selector, scoped recompiler,
│                   compiled unit, edit session
├── config        - TOML / YAML configuration
└── logging       - tracing-subscriber setup
```

## Usage

```rust
use scoped_reanalysis::{ArenaCompiler, Compiler, DocumentSnapshot, EditSession, RecompileStrategy};
use std::path::Path;
use std::sync::Arc;

let compiler: Arc<dyn Compiler> = Arc::new(ArenaCompiler::new());
let snapshot = DocumentSnapshot::analyze(compiler.as_ref(), Path::new("demo.kt"), "fun g() { 1 }", &[]);

let session = EditSession::new(compiler, snapshot, "fun g() { 2 }", Vec::new());
assert_eq!(session.select_strategy(10), RecompileStrategy::FunctionScoped);

let outcome = session.recompute(10);
assert_eq!(outcome.unit.text_offset(), 8);
assert_eq!(outcome.unit.type_at(10).map(|t| t.to_string()).as_deref(), Some("Int"));
```
*/

pub mod ast_core;
pub mod compiler;
pub mod config;
pub mod core;
pub mod diagnostics;
pub mod incremental;
pub mod logging;
pub mod parser;
pub mod semantic;

pub use compiler::{ArenaCompiler, Compiler};
pub use config::RecompileConfig;
pub use crate::core::{LineIndex, PackedSpan, Position, RecompileError, TextRange};
pub use incremental::{
    detect_change_region, ChangeRegion, CompiledUnit, DocumentSnapshot, EditSession, FunctionTarget,
    RecompilePlan, RecompileStrategy, RecomputeOutcome,
};
pub use parser::SyntaxTree;
pub use semantic::{BindingTable, LexicalScope, SimpleType, Symbol, SymbolKind};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
