//! Engine error taxonomy

use thiserror::Error;

use crate::core::CoreError;
use crate::types::Coord;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Swap between cells that are not orthogonal neighbours. The board is untouched.
    #[error("cells {a} and {b} are not adjacent")]
    NotAdjacent { a: Coord, b: Coord },

    /// Refill kept producing runs past the configured pass cap.
    #[error("cascade did not settle within {passes} passes")]
    CascadeLimitExceeded { passes: u32 },
}

impl EngineError {
    /// Out-of-bounds coordinates are local faults rejected at the boundary
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, EngineError::Core(CoreError::OutOfBounds { .. }))
    }
}
