//! Core error taxonomy

use thiserror::Error;

/// Errors raised by board storage, tile factories and settings.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Coordinate outside `[0, width) x [0, height)`. Never mutates the board.
    #[error("coordinate ({x}, {y}) is outside the {width}x{height} board")]
    OutOfBounds {
        x: i16,
        y: i16,
        width: u8,
        height: u8,
    },

    #[error("board dimensions must be positive (got {width}x{height})")]
    InvalidDimensions { width: u8, height: u8 },

    #[error("expected {expected} cells, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// No tile types to choose from; a playable board cannot be produced.
    #[error("tile palette is empty")]
    EmptyPalette,

    #[error("tile palette has {len} kinds, at most 256 are supported")]
    PaletteTooLarge { len: usize },

    /// Layout entry that is neither the random sentinel nor a palette index.
    /// Reported as a diagnostic; the cell falls back to a random tile.
    #[error(
        "layout value {value} at ({x}, {y}) is not a palette index (palette has {palette_len} kinds)"
    )]
    InvalidLayoutIndex {
        x: i16,
        y: i16,
        value: i32,
        palette_len: usize,
    },

    #[error("settings io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings parse error: {0}")]
    Json(#[from] serde_json::Error),
}
