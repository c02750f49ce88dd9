/*!
# Error System for scoped reanalysis

Strategy outcomes (`Unchanged`, `FullDocument`, ...) are ordinary values and never
appear here. `RecompileError` only describes a failed function-scoped attempt:
every variant is an offset-arithmetic defect, and the caller answers it with a
full reanalysis.
*/

use crate::core::position::TextRange;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecompileError {
    /// The body span translated into the new text does not fit the text
    /// (or splits a UTF-8 sequence).
    #[error("body span {range} is outside the new text (length {text_len})")]
    BodySpanOutOfBounds { range: TextRange, text_len: usize },

    /// The re-parsed body does not cover exactly the extracted text.
    #[error("re-parsed body text {parsed:?} differs from extracted text {extracted:?}")]
    ExtractedTextMismatch { extracted: String, parsed: String },

    /// Text after the cursor in the new document does not continue the re-parsed body.
    #[error("text after cursor {cursor} does not match the recompiled body at relative offset {relative}")]
    SuffixMismatch { cursor: usize, relative: usize },
}

impl RecompileError {
    /// Short tag for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BodySpanOutOfBounds { .. } => "body_span_out_of_bounds",
            Self::ExtractedTextMismatch { .. } => "extracted_text_mismatch",
            Self::SuffixMismatch { .. } => "suffix_mismatch",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_values() {
        let err = RecompileError::BodySpanOutOfBounds { range: TextRange::new(4, 40), text_len: 12 };
        assert_eq!(err.to_string(), "body span 4..40 is outside the new text (length 12)");
        assert_eq!(err.kind(), "body_span_out_of_bounds");
    }
}
