use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::Arc;

use scoped_reanalysis::ast_core::AstKind;
use scoped_reanalysis::parser::{parse_body, parse_document};
use scoped_reanalysis::{
    ArenaCompiler, Compiler, DocumentSnapshot, EditSession, RecompileConfig, RecompileError, RecompileStrategy,
    SimpleType, SymbolKind,
};

fn compiler() -> Arc<dyn Compiler> {
    Arc::new(ArenaCompiler::new())
}

fn session(old: &str, new: &str) -> EditSession {
    let compiler = compiler();
    let snapshot = DocumentSnapshot::analyze(compiler.as_ref(), Path::new("/project/src/main.kt"), old, &[]);
    EditSession::new(compiler, snapshot, new, Vec::new())
}

#[test]
fn scenario_a_unchanged_text() {
    let s = session("fun g() { 1 }", "fun g() { 1 }");
    assert!(s.region().is_none());
    // selection is idempotent on an unedited snapshot
    assert_eq!(s.select_strategy(10), RecompileStrategy::Unchanged);
    assert_eq!(s.select_strategy(10), RecompileStrategy::Unchanged);

    let outcome = s.recompute(10);
    assert_eq!(outcome.strategy, RecompileStrategy::Unchanged);
    assert_eq!(outcome.unit.text_offset(), 0);
    assert_eq!(outcome.unit.type_at(10), Some(&SimpleType::Int));
}

#[test]
fn scenario_b_edit_inside_body() {
    let s = session("fun g() { 1 }", "fun g() { 2 }");
    assert_eq!(s.select_strategy(10), RecompileStrategy::FunctionScoped);

    let outcome = s.recompute(10);
    assert_eq!(outcome.strategy, RecompileStrategy::FunctionScoped);
    assert!(outcome.fallback.is_none());
    assert!(outcome.refreshed.is_none());

    let unit = outcome.unit;
    assert_eq!(unit.root_text(), "{ 2 }");
    assert_eq!(unit.text_offset(), 8);
    assert_eq!(unit.offset(10), Some(2));
    assert_eq!(unit.offset(3), None);
    assert_eq!(unit.type_at(10), Some(&SimpleType::Int));
    assert_eq!(unit.describe_position(10), "main.kt 0:10");
    assert_eq!(unit.tree().ast().kind(unit.root()), AstKind::Block);
}

#[test]
fn scenario_c_declaration_inserted_before_function() {
    let old = "fun g() { 1 }";
    let new = "fun a() {}\nfun g() { 1 }";
    let s = session(old, new);
    let cursor = new.rfind('1').expect("literal");

    // the constant end-offset translation lands on g's unchanged body
    let old_cursor = s.old_cursor(cursor);
    assert_eq!(old_cursor, old.find('1').expect("literal"));
    let tree = s.snapshot().tree();
    let leaf = tree.find_element_at(old_cursor).expect("literal");
    let function = tree.ast().enclosing_function(leaf).expect("g");
    assert_eq!(tree.ast().node_ident_text(function), Some("g"));

    // but the change lies outside g's body, so the document is reanalyzed
    assert_eq!(s.select_strategy(cursor), RecompileStrategy::FullDocument);
    let outcome = s.recompute(cursor);
    assert_eq!(outcome.unit.text_offset(), 0);
    assert_eq!(outcome.unit.type_at(cursor), Some(&SimpleType::Int));
    let refreshed = outcome.refreshed.expect("new snapshot");
    assert_eq!(refreshed.text(), new);
    assert_eq!(refreshed.bindings().lexical_scope_count(), 2);
}

#[test]
fn scenario_d_closing_brace_removed() {
    let old = "fun f() { 1 }";
    let new = "fun f() { 1 \n\n";
    let s = session(old, new);
    let region = s.region().expect("changed");
    assert_eq!((region.old.start, region.old.end), (12, 13));

    let cursor = new.len();
    assert_eq!(s.old_cursor(cursor), old.len());
    assert_eq!(s.select_strategy(cursor), RecompileStrategy::FullDocument);
}

#[test]
fn scenario_e_cursor_beyond_both_texts() {
    let s = session("fun f() { 1 }", "fun f() { 1 \n\n");
    assert_eq!(s.select_strategy(1_000), RecompileStrategy::Unrecoverable);

    let outcome = s.recompute(1_000);
    assert_eq!(outcome.strategy, RecompileStrategy::Unrecoverable);
    assert_eq!(outcome.unit.text_offset(), 0);
    assert_eq!(outcome.unit.node_at(1_000), None);

    // offsets near usize::MAX saturate instead of overflowing
    assert_eq!(s.select_strategy(usize::MAX), RecompileStrategy::Unrecoverable);
    let grown = session("fun f() { 1 }", "fun f() { 12 }");
    assert_eq!(grown.select_strategy(usize::MAX), RecompileStrategy::Unrecoverable);
    let outcome = grown.recompute(usize::MAX);
    assert_eq!(outcome.strategy, RecompileStrategy::Unrecoverable);
    assert_eq!(outcome.unit.node_at(usize::MAX), None);
    assert_eq!(outcome.unit.describe_position(usize::MAX), "main.kt 0:14");
}

#[test]
fn edited_reference_resolves_through_captured_scope() {
    let old = "fun intFunction(): Int = 1\nfun test() {\n    val x = 0\n}\n";
    let new = "fun intFunction(): Int = 1\nfun test() {\n    val x = intFunction()\n}\n";
    let s = session(old, new);
    let cursor = new.rfind("intFunction").expect("reference") + 3;

    let outcome = s.recompute(cursor);
    assert_eq!(outcome.strategy, RecompileStrategy::FunctionScoped);
    let unit = outcome.unit;
    assert_eq!(unit.text_offset(), old.find('{').expect("body"));

    let target = unit.reference_at(cursor).expect("resolved");
    assert_eq!(target.name, "intFunction");
    assert_eq!(target.kind, SymbolKind::Function);
    assert_eq!(target.declared_type, SimpleType::Int);
    assert_eq!(target.origin, Path::new("/project/src/main.kt"));
    assert_eq!(unit.type_at(cursor), Some(&SimpleType::Int));
    assert!(unit.bindings().diagnostics().is_empty());
}

#[test]
fn scoped_body_matches_independent_parse() {
    let old = "fun g(n: Int): Int {\n  val a = n * 2\n  return a\n}";
    let new = "fun g(n: Int): Int {\n  val a = n * 2 + 40\n  return a\n}";
    let s = session(old, new);
    let cursor = new.find("40").expect("edit");

    let unit = s.plan(cursor).into_target().expect("function scoped").recompile().expect("recompiled");
    let start = unit.text_offset();
    let extracted = &new[start..start + unit.root_text().len()];
    let independent = parse_body(extracted, Path::new("main.kt"));
    assert_eq!(unit.root_text(), independent.root_text());
    assert_eq!(unit.tree().ast().arena().len(), independent.ast().arena().len());
}

#[test]
fn member_function_sees_class_properties() {
    let old = "class Counter {\n  val step = 1\n  fun next() { 0 }\n}";
    let new = "class Counter {\n  val step = 1\n  fun next() { step }\n}";
    let s = session(old, new);
    let cursor = new.rfind("step").expect("reference");

    let outcome = s.recompute(cursor);
    assert_eq!(outcome.strategy, RecompileStrategy::FunctionScoped);
    let target = outcome.unit.reference_at(cursor).expect("resolved");
    assert_eq!(target.kind, SymbolKind::Property);
    assert_eq!(outcome.unit.type_at(cursor), Some(&SimpleType::Int));
}

#[test]
fn imports_from_visible_documents_survive_scoped_reanalysis() {
    let compiler = compiler();
    let lib = Arc::new(parse_document(Path::new("/project/src/lib.kt"), "fun greeting(): String = \"hi\""));
    let visible = vec![Arc::clone(&lib)];

    let old = "fun main() { 1 }";
    let new = "fun main() { greeting() }";
    let snapshot = DocumentSnapshot::analyze(compiler.as_ref(), Path::new("/project/src/main.kt"), old, &visible);
    let s = EditSession::new(compiler, snapshot, new, visible);
    let cursor = new.find("greeting").expect("call");

    let outcome = s.recompute(cursor);
    assert_eq!(outcome.strategy, RecompileStrategy::FunctionScoped);
    let target = outcome.unit.reference_at(cursor).expect("imported");
    assert_eq!(target.origin, Path::new("/project/src/lib.kt"));
    assert_eq!(outcome.unit.visible().len(), 1);
    let call = outcome.unit.tree().ast().parent(outcome.unit.node_at(cursor).expect("identifier")).expect("call");
    assert_eq!(outcome.unit.bindings().expr_type(call), Some(&SimpleType::String));
}

#[test]
fn failed_postcondition_falls_back_without_touching_snapshot() {
    let old = "fun g() { 1 }";
    let new = "fun g() { 1 } }";
    let s = session(old, new);

    let outcome = s.recompute(10);
    assert_eq!(outcome.strategy, RecompileStrategy::FunctionScoped);
    match outcome.fallback {
        Some(RecompileError::ExtractedTextMismatch { extracted, parsed }) => {
            assert_eq!(extracted, "{ 1 } }");
            assert_eq!(parsed, "{ 1 }");
        }
        other => panic!("expected an extracted text mismatch, got {other:?}"),
    }
    assert_eq!(outcome.unit.text_offset(), 0);
    assert!(outcome.refreshed.is_some());
    assert_eq!(s.snapshot().text(), old);
}

#[test]
fn extracted_text_check_survives_disabled_suffix_check() {
    let config = RecompileConfig { verify_suffix: false, ..RecompileConfig::default() };
    let s = session("fun g() { 1 }", "fun g() { 1 } }").with_config(config);

    let outcome = s.recompute(10);
    assert_eq!(outcome.strategy, RecompileStrategy::FunctionScoped);
    assert!(
        matches!(outcome.fallback, Some(RecompileError::ExtractedTextMismatch { .. })),
        "stray brace must not be dropped: {:?}",
        outcome.fallback
    );
    assert_eq!(outcome.unit.text_offset(), 0);
    assert_eq!(outcome.unit.root_text(), "fun g() { 1 } }");

    let target = s.plan(10).into_target().expect("function scoped");
    assert!(matches!(target.recompile(), Err(RecompileError::ExtractedTextMismatch { .. })));
}
