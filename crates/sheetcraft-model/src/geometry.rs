//! Placement primitives shared by drawings: extent, anchor and mirroring.

use serde::{Deserialize, Serialize};

use crate::merge::{apply_field, merge_field, ApplyOptions, Combine, Defaultable};

/// Drawing extent in EMUs (914400 per inch). Zero means "unsized"; negative
/// sizes are unrepresentable by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Size {
    pub width_emu: u64,
    pub height_emu: u64,
}

impl Size {
    pub const EMU_PER_INCH: u64 = 914_400;

    pub const fn new(width_emu: u64, height_emu: u64) -> Self {
        Self {
            width_emu,
            height_emu,
        }
    }
}

impl Defaultable for Size {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl Combine for Size {
    fn combine(&mut self, reference: &Self) {
        let d = Self::default();
        merge_field(&mut self.width_emu, &d.width_emu, &reference.width_emu);
        merge_field(&mut self.height_emu, &d.height_emu, &reference.height_emu);
    }
}

/// Sparse patch for [`Size`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SizeOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width_emu: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_emu: Option<u64>,
}

impl Defaultable for SizeOptions {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl ApplyOptions for Size {
    type Options = SizeOptions;

    fn apply_options(&mut self, patch: &SizeOptions) {
        apply_field(&mut self.width_emu, &patch.width_emu);
        apply_field(&mut self.height_emu, &patch.height_emu);
    }
}

/// Where a drawing is anchored.
///
/// A closed variant set decided at construction time: an unrecognized anchor
/// mode is unrepresentable, so there is no "invalid location" runtime state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "mode")]
pub enum Location {
    /// Anchored to a cell (zero-based row/column).
    Cell { row: u32, col: u32 },
    /// Absolute placement on the sheet canvas, in EMUs.
    Absolute { x_emu: i64, y_emu: i64 },
}

impl Default for Location {
    fn default() -> Self {
        Location::Cell { row: 0, col: 0 }
    }
}

impl Defaultable for Location {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl Combine for Location {
    /// Locations merge as a whole value: field-wise merging across anchor
    /// modes is meaningless, so a still-default location adopts the reference.
    fn combine(&mut self, reference: &Self) {
        if self.is_default() {
            *self = *reference;
        }
    }
}

/// Mirroring flags for shapes and pictures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Flip {
    pub horizontal: bool,
    pub vertical: bool,
}

impl Defaultable for Flip {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl Combine for Flip {
    fn combine(&mut self, reference: &Self) {
        let d = Self::default();
        merge_field(&mut self.horizontal, &d.horizontal, &reference.horizontal);
        merge_field(&mut self.vertical, &d.vertical, &reference.vertical);
    }
}

/// Sparse patch for [`Flip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlipOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical: Option<bool>,
}

impl Defaultable for FlipOptions {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl ApplyOptions for Flip {
    type Options = FlipOptions;

    fn apply_options(&mut self, patch: &FlipOptions) {
        apply_field(&mut self.horizontal, &patch.horizontal);
        apply_field(&mut self.vertical, &patch.vertical);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_location_adopts_reference() {
        let mut loc = Location::default();
        let reference = Location::Absolute {
            x_emu: 100,
            y_emu: 200,
        };
        loc.combine(&reference);
        assert_eq!(loc, reference);
    }

    #[test]
    fn explicit_location_survives_combine() {
        let mut loc = Location::Cell { row: 3, col: 1 };
        loc.combine(&Location::Absolute { x_emu: 1, y_emu: 1 });
        assert_eq!(loc, Location::Cell { row: 3, col: 1 });
    }

    #[test]
    fn location_serializes_with_mode_tag() {
        let json = serde_json::to_string(&Location::Cell { row: 2, col: 5 }).unwrap();
        assert_eq!(json, r#"{"mode":"cell","row":2,"col":5}"#);
    }
}
