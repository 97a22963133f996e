//! Pointer geometry → [`DropPosition`].
//!
//! Offsets are relative to the target's bounding box. The left band wins over
//! the vertical bands, so a drop near the left edge always promotes.

use crate::mutations::DropPosition;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DropZones {
    /// Fraction of the width, from the left edge, that means `outside`
    pub outside_band: f64,
    /// Fraction of the height at the top (`before`) and bottom (`after`)
    pub edge_band: f64,
}

impl Default for DropZones {
    fn default() -> Self {
        Self {
            outside_band: 0.10,
            edge_band: 0.25,
        }
    }
}

impl DropZones {
    pub fn infer(&self, offset_x: f64, offset_y: f64, width: f64, height: f64) -> DropPosition {
        if offset_x < width * self.outside_band {
            DropPosition::Outside
        } else if offset_y < height * self.edge_band {
            DropPosition::Before
        } else if offset_y > height * (1.0 - self.edge_band) {
            DropPosition::After
        } else {
            DropPosition::Inside
        }
    }
}
