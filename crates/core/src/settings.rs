//! Persisted session settings
//!
//! Settings are authored elsewhere (a level editor, a hand-written file) and
//! consumed read-only here. The on-disk form is JSON:
//!
//! ```json
//! {
//!   "width": 8,
//!   "height": 8,
//!   "palette": ["red", "green", "blue", "yellow", "purple"],
//!   "layout": [-1, -1, 2, ...],
//!   "seed": 42,
//!   "max_cascade_passes": 64,
//!   "settle_on_start": false
//! }
//! ```
//!
//! `layout` is a flat list indexed `x + y * width`; `-1` means "random".
//! Every field is optional and falls back to [`Settings::default`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CoreError;
use crate::factory::{LayoutTileFactory, Palette, RandomTileFactory};
use crate::types::{DEFAULT_HEIGHT, DEFAULT_WIDTH, LAYOUT_RANDOM};

/// Palette used when settings do not name one
pub const DEFAULT_PALETTE: [&str; 5] = ["red", "green", "blue", "yellow", "purple"];

/// Seed used when neither settings nor the environment provide one
pub const DEFAULT_SEED: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub width: u8,
    pub height: u8,
    pub palette: Vec<String>,
    pub layout: Vec<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cascade_passes: Option<u32>,
    pub settle_on_start: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            palette: DEFAULT_PALETTE.iter().map(|s| s.to_string()).collect(),
            layout: Vec::new(),
            seed: None,
            max_cascade_passes: None,
            settle_on_start: false,
        }
    }
}

impl Settings {
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&raw)?;
        debug!(
            path = %path.display(),
            width = settings.width,
            height = settings.height,
            palette = settings.palette.len(),
            "loaded settings"
        );
        Ok(settings)
    }

    pub fn to_json_string(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Reset the layout to all-random for the current dimensions
    pub fn init_layout(&mut self) {
        self.layout = vec![LAYOUT_RANDOM; self.area()];
    }

    /// True when the layout covers exactly `width * height` cells
    pub fn layout_matches(&self) -> bool {
        self.layout.len() == self.area()
    }

    fn layout_index(&self, x: u8, y: u8) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = x as usize + y as usize * self.width as usize;
        (idx < self.layout.len()).then_some(idx)
    }

    pub fn layout_value(&self, x: u8, y: u8) -> Option<i32> {
        self.layout_index(x, y).map(|idx| self.layout[idx])
    }

    /// Set one layout cell, initializing the layout first if its length is stale
    pub fn set_layout_value(&mut self, x: u8, y: u8, value: i32) -> Result<(), CoreError> {
        if x >= self.width || y >= self.height {
            return Err(CoreError::OutOfBounds {
                x: i16::from(x),
                y: i16::from(y),
                width: self.width,
                height: self.height,
            });
        }
        if !self.layout_matches() {
            self.init_layout();
        }
        if let Some(idx) = self.layout_index(x, y) {
            self.layout[idx] = value;
        }
        Ok(())
    }

    pub fn palette(&self) -> Result<Palette, CoreError> {
        Palette::new(self.palette.iter().cloned())
    }

    /// Dimensions and palette must describe a playable board
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.width == 0 || self.height == 0 {
            return Err(CoreError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        self.palette()?;
        Ok(())
    }

    /// Factory for initial population: layout overrides with a random fallback
    pub fn layout_factory(&self, seed: u32) -> Result<LayoutTileFactory, CoreError> {
        let fallback = RandomTileFactory::new(self.palette.len(), seed)?;
        Ok(LayoutTileFactory::new(
            self.width,
            self.height,
            &self.layout,
            fallback,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let s = Settings::from_json_str(r#"{"width":4}"#).unwrap();
        assert_eq!(s.width, 4);
        assert_eq!(s.height, DEFAULT_HEIGHT);
        assert_eq!(s.palette.len(), DEFAULT_PALETTE.len());
        assert!(s.layout.is_empty());
        assert!(!s.settle_on_start);
    }

    #[test]
    fn test_layout_values_are_row_major() {
        let mut s = Settings {
            width: 3,
            height: 2,
            ..Settings::default()
        };
        s.set_layout_value(2, 1, 4).unwrap();
        assert!(s.layout_matches());
        assert_eq!(s.layout[2 + 3], 4);
        assert_eq!(s.layout_value(2, 1), Some(4));
        assert_eq!(s.layout_value(0, 0), Some(LAYOUT_RANDOM));
        assert_eq!(s.layout_value(3, 0), None);
        assert!(s.set_layout_value(0, 2, 1).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_palette_and_zero_dims() {
        let s = Settings {
            palette: Vec::new(),
            ..Settings::default()
        };
        assert!(matches!(s.validate(), Err(CoreError::EmptyPalette)));

        let s = Settings {
            width: 0,
            ..Settings::default()
        };
        assert!(matches!(s.validate(), Err(CoreError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_json_roundtrip_keeps_layout() {
        let mut s = Settings {
            width: 2,
            height: 2,
            seed: Some(7),
            ..Settings::default()
        };
        s.init_layout();
        s.set_layout_value(1, 0, 3).unwrap();
        let json = s.to_json_string().unwrap();
        assert_eq!(Settings::from_json_str(&json).unwrap(), s);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            Settings::from_json_str("{not json"),
            Err(CoreError::Json(_))
        ));
    }
}
