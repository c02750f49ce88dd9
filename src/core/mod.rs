/*!
# Core Module

Location primitives and the error taxonomy shared by every other module.
*/

pub mod errors;
pub mod position;

pub use errors::RecompileError;
pub use position::{LineIndex, PackedSpan, Position, TextRange};
