//! Function-scoped reanalysis: re-parse and re-bind one body of the new text
//! inside the lexical scope the old analysis recorded for it.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::core::errors::RecompileError;
use crate::core::position::TextRange;

use super::compiled_unit::CompiledUnit;
use super::strategy::FunctionTarget;

impl FunctionTarget<'_> {
    /// Reanalyze the target body in the new text.
    ///
    /// The old body span keeps its start (the change lies inside the body, so
    /// everything before it is unchanged) and its end moves by the document's
    /// growth. An `Err` means offset arithmetic went wrong; the caller falls
    /// back to a full reanalysis.
    pub fn recompile(self) -> Result<CompiledUnit, RecompileError> {
        let session = self.session;
        let old_tree = session.snapshot().tree();
        let new_text = session.new_text();
        let body_span = old_tree.ast().span(self.body);

        let start = body_span.start as usize;
        let end = (body_span.end() as usize + self.region.new_len).checked_sub(self.region.old_len);
        let extracted = end
            .filter(|end| *end >= start)
            .and_then(|end| new_text.get(start..end))
            .ok_or_else(|| {
                let range = TextRange::new(start, end.unwrap_or(start).max(start));
                error!(%range, text_len = new_text.len(), "body span of {} does not fit the new text", self.name);
                RecompileError::BodySpanOutOfBounds { range, text_len: new_text.len() }
            })?;
        debug!(start, len = extracted.len(), "re-parsing body of {}", self.name);

        let compiler = session.compiler();
        let body_tree = Arc::new(compiler.parse_body(extracted, old_tree.path()));
        let bindings = Arc::new(compiler.analyze_in_scope(&body_tree, &self.scope, session.visible()));

        let unit = CompiledUnit::new(
            session.shared_new_text(),
            session.new_line_index().clone(),
            Arc::clone(&body_tree),
            body_tree.root(),
            bindings,
            self.cursor,
            start,
            session.shared_visible(),
        );

        verify_extracted_text(&unit, extracted)?;
        if session.config().verify_suffix {
            verify_cursor_suffix(&unit, new_text, self.cursor)?;
        }

        info!("Recompiled {} at {}", self.name, unit.describe_position(start));
        Ok(unit)
    }
}

/// The re-parsed root must cover exactly the extracted text.
fn verify_extracted_text(unit: &CompiledUnit, extracted: &str) -> Result<(), RecompileError> {
    let parsed = unit.root_text();
    if parsed != extracted {
        error!(extracted, parsed, "re-parsed body does not match the extracted text");
        return Err(RecompileError::ExtractedTextMismatch { extracted: extracted.to_string(), parsed: parsed.to_string() });
    }
    Ok(())
}

/// When the cursor lies inside the body, the body text after the cursor must
/// continue as the new document does.
fn verify_cursor_suffix(unit: &CompiledUnit, new_text: &str, cursor: usize) -> Result<(), RecompileError> {
    let parsed = unit.root_text();
    let Some(relative) = unit.offset(cursor).filter(|relative| *relative <= parsed.len()) else {
        return Ok(());
    };
    match (parsed.get(relative..), new_text.get(cursor..)) {
        (Some(body_rest), Some(text_rest)) if text_rest.starts_with(body_rest) => Ok(()),
        _ => {
            error!(cursor, relative, "text after the cursor does not continue the recompiled body");
            Err(RecompileError::SuffixMismatch { cursor, relative })
        }
    }
}
