//! Per-sheet display settings, keyed by sheet name.

use serde::{Deserialize, Deserializer, Serialize};

use crate::collection::KeyedList;
use crate::color::Color;
use crate::error::StyleError;
use crate::merge::{apply_field, merge_field, ApplyOptions, Combine, Defaultable, Keyed};

pub const MIN_ZOOM_PCT: u16 = 10;
pub const MAX_ZOOM_PCT: u16 = 400;
pub const DEFAULT_ZOOM_PCT: u16 = 100;

/// Display settings for one worksheet.
///
/// `sheet_name` is the merge key within a [`SheetSettingsList`]. Zoom is
/// range-checked at assignment (Excel accepts 10..=400).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SheetSettings {
    pub sheet_name: String,
    #[serde(deserialize_with = "deserialize_zoom")]
    zoom_pct: u16,
    pub show_gridlines: bool,
    pub show_headings: bool,
    pub frozen_rows: u32,
    pub frozen_cols: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_color: Option<Color>,
}

impl Default for SheetSettings {
    fn default() -> Self {
        Self {
            sheet_name: String::new(),
            zoom_pct: DEFAULT_ZOOM_PCT,
            show_gridlines: true,
            show_headings: true,
            frozen_rows: 0,
            frozen_cols: 0,
            tab_color: None,
        }
    }
}

impl SheetSettings {
    pub fn for_sheet(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            ..Self::default()
        }
    }

    pub fn zoom_pct(&self) -> u16 {
        self.zoom_pct
    }

    /// Set the zoom percentage. Values outside 10..=400 are rejected.
    pub fn set_zoom_pct(&mut self, pct: u16) -> Result<(), StyleError> {
        validate_zoom(pct)?;
        self.zoom_pct = pct;
        Ok(())
    }
}

fn validate_zoom(pct: u16) -> Result<(), StyleError> {
    if !(MIN_ZOOM_PCT..=MAX_ZOOM_PCT).contains(&pct) {
        return Err(StyleError::InvalidValue {
            field: "zoom_pct",
            reason: format!("{pct} is outside {MIN_ZOOM_PCT}..={MAX_ZOOM_PCT}"),
        });
    }
    Ok(())
}

fn deserialize_zoom<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;
    let pct = u16::deserialize(deserializer)?;
    validate_zoom(pct).map_err(D::Error::custom)?;
    Ok(pct)
}

impl Keyed for SheetSettings {
    fn key(&self) -> &str {
        &self.sheet_name
    }
}

impl Defaultable for SheetSettings {
    fn is_default(&self) -> bool {
        let d = Self::default();
        self.zoom_pct == d.zoom_pct
            && self.show_gridlines == d.show_gridlines
            && self.show_headings == d.show_headings
            && self.frozen_rows == 0
            && self.frozen_cols == 0
            && self.tab_color.is_none()
    }
}

impl Combine for SheetSettings {
    fn combine(&mut self, reference: &Self) {
        let d = Self::default();
        merge_field(&mut self.zoom_pct, &d.zoom_pct, &reference.zoom_pct);
        merge_field(
            &mut self.show_gridlines,
            &d.show_gridlines,
            &reference.show_gridlines,
        );
        merge_field(
            &mut self.show_headings,
            &d.show_headings,
            &reference.show_headings,
        );
        merge_field(&mut self.frozen_rows, &d.frozen_rows, &reference.frozen_rows);
        merge_field(&mut self.frozen_cols, &d.frozen_cols, &reference.frozen_cols);
        merge_field(&mut self.tab_color, &d.tab_color, &reference.tab_color);
    }
}

fn deserialize_zoom_opt<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;
    let pct = Option::<u16>::deserialize(deserializer)?;
    if let Some(pct) = pct {
        validate_zoom(pct).map_err(D::Error::custom)?;
    }
    Ok(pct)
}

/// Sparse patch for [`SheetSettings`]. A present `zoom_pct` is range-checked
/// on deserialization, the same as direct assignment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SheetSettingsOptions {
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_zoom_opt"
    )]
    pub zoom_pct: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_gridlines: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_headings: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frozen_rows: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frozen_cols: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_color: Option<Color>,
}

impl Defaultable for SheetSettingsOptions {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl ApplyOptions for SheetSettings {
    type Options = SheetSettingsOptions;

    fn apply_options(&mut self, patch: &SheetSettingsOptions) {
        apply_field(&mut self.zoom_pct, &patch.zoom_pct);
        apply_field(&mut self.show_gridlines, &patch.show_gridlines);
        apply_field(&mut self.show_headings, &patch.show_headings);
        apply_field(&mut self.frozen_rows, &patch.frozen_rows);
        apply_field(&mut self.frozen_cols, &patch.frozen_cols);
        if let Some(color) = patch.tab_color {
            self.tab_color = Some(color);
        }
    }
}

/// Ordered sheet settings collection, keyed by sheet name.
pub type SheetSettingsList = KeyedList<SheetSettings>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_is_range_checked() {
        let mut s = SheetSettings::for_sheet("Data");
        assert!(s.set_zoom_pct(150).is_ok());
        assert!(s.set_zoom_pct(5).is_err());
        assert!(s.set_zoom_pct(500).is_err());
        assert_eq!(s.zoom_pct(), 150);
    }

    #[test]
    fn settings_merge_by_sheet_name() {
        let mut target: SheetSettingsList =
            [SheetSettings::for_sheet("Data")].into_iter().collect();
        let mut reference_data = SheetSettings::for_sheet("Data");
        reference_data.show_gridlines = false;
        let mut reference_other = SheetSettings::for_sheet("Summary");
        reference_other.frozen_rows = 1;
        let reference: SheetSettingsList =
            [reference_data, reference_other].into_iter().collect();

        target.combine(&reference);
        assert!(!target.get("Data").unwrap().show_gridlines);
        assert_eq!(target.get("Summary").unwrap().frozen_rows, 1);
        assert_eq!(target.len(), 2);
    }

    #[test]
    fn zoom_patches_are_validated_like_direct_assignment() {
        assert!(serde_json::from_str::<SheetSettingsOptions>(r#"{"zoomPct": 999}"#).is_err());

        let patch: SheetSettingsOptions = serde_json::from_str(r#"{"zoomPct": 200}"#).unwrap();
        let mut s = SheetSettings::for_sheet("Data");
        s.apply_options(&patch);
        assert_eq!(s.zoom_pct(), 200);
    }

    #[test]
    fn fresh_settings_are_default() {
        assert!(SheetSettings::for_sheet("X").is_default());
    }
}
