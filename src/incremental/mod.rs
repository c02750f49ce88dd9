/*!
# Incremental reanalysis

Brings the analysis of an edited document up to date as cheaply as is safe:

1. `change_region` finds the differing span of the old and new text and maps
   new-text offsets back to the old text;
2. `strategy` picks one of `Unchanged`, `FunctionScoped`, `FullDocument` or
   `Unrecoverable` for a cursor;
3. `scoped` reanalyzes a single function body inside its recorded scope;
4. `compiled_unit` carries the result and its coordinate offset;
5. `session` ties these together for one edit.
*/

pub mod change_region;
pub mod compiled_unit;
pub mod scoped;
pub mod session;
pub mod strategy;

pub use change_region::{detect_change_region, ChangeRegion};
pub use compiled_unit::CompiledUnit;
pub use session::{DocumentSnapshot, EditSession, RecomputeOutcome};
pub use strategy::{FunctionTarget, RecompilePlan, RecompileStrategy};
