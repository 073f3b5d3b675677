use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::merge::{apply_field, merge_field, ApplyOptions, Combine, Defaultable};

/// Font formatting for a cell style or text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Font {
    pub name: String,
    /// Font size in 1/100 points (e.g. 1100 = 11pt).
    pub size_100pt: u32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub color: Color,
}

impl Font {
    pub const DEFAULT_NAME: &'static str = "Calibri";
    pub const DEFAULT_SIZE_100PT: u32 = 1100;
}

impl Default for Font {
    fn default() -> Self {
        Self {
            name: Self::DEFAULT_NAME.to_owned(),
            size_100pt: Self::DEFAULT_SIZE_100PT,
            bold: false,
            italic: false,
            underline: false,
            strikethrough: false,
            color: Color::black(),
        }
    }
}

impl Defaultable for Font {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl Combine for Font {
    fn combine(&mut self, reference: &Self) {
        let d = Self::default();
        merge_field(&mut self.name, &d.name, &reference.name);
        merge_field(&mut self.size_100pt, &d.size_100pt, &reference.size_100pt);
        merge_field(&mut self.bold, &d.bold, &reference.bold);
        merge_field(&mut self.italic, &d.italic, &reference.italic);
        merge_field(&mut self.underline, &d.underline, &reference.underline);
        merge_field(
            &mut self.strikethrough,
            &d.strikethrough,
            &reference.strikethrough,
        );
        merge_field(&mut self.color, &d.color, &reference.color);
    }
}

/// Sparse patch for [`Font`]; `None` means "no instruction".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FontOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_100pt: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl Defaultable for FontOptions {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl ApplyOptions for Font {
    type Options = FontOptions;

    fn apply_options(&mut self, patch: &FontOptions) {
        apply_field(&mut self.name, &patch.name);
        apply_field(&mut self.size_100pt, &patch.size_100pt);
        apply_field(&mut self.bold, &patch.bold);
        apply_field(&mut self.italic, &patch.italic);
        apply_field(&mut self.underline, &patch.underline);
        apply_field(&mut self.strikethrough, &patch.strikethrough);
        apply_field(&mut self.color, &patch.color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_font_is_default() {
        assert!(Font::default().is_default());
    }

    #[test]
    fn setting_a_field_to_its_own_default_keeps_default() {
        let mut f = Font::default();
        f.size_100pt = Font::DEFAULT_SIZE_100PT;
        assert!(f.is_default());
    }

    #[test]
    fn combine_keeps_non_default_fields() {
        let mut f = Font {
            bold: true,
            ..Font::default()
        };
        let reference = Font {
            bold: false,
            italic: true,
            name: "Arial".into(),
            ..Font::default()
        };
        f.combine(&reference);
        assert!(f.bold);
        assert!(f.italic);
        assert_eq!(f.name, "Arial");
    }

    #[test]
    fn options_overwrite_unconditionally() {
        let mut f = Font {
            name: "Georgia".into(),
            size_100pt: 2400,
            ..Font::default()
        };
        let patch = FontOptions {
            size_100pt: Some(900),
            ..FontOptions::default()
        };
        f.apply_options(&patch);
        assert_eq!(f.size_100pt, 900);
        assert_eq!(f.name, "Georgia");
    }
}
