use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::merge::{apply_field, merge_field, ApplyOptions, Combine, Defaultable};

/// Fill pattern kind (subset of the SpreadsheetML `patternType` values).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FillPattern {
    #[default]
    None,
    Solid,
    Gray125,
    LightGray,
    DarkGray,
    LightHorizontal,
    LightVertical,
    LightUp,
    LightDown,
}

/// Cell or shape background fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Fill {
    pub pattern: FillPattern,
    pub foreground: Color,
    pub background: Color,
}

impl Default for Fill {
    fn default() -> Self {
        Self {
            pattern: FillPattern::None,
            foreground: Color::black(),
            background: Color::white(),
        }
    }
}

impl Defaultable for Fill {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl Combine for Fill {
    fn combine(&mut self, reference: &Self) {
        let d = Self::default();
        merge_field(&mut self.pattern, &d.pattern, &reference.pattern);
        merge_field(&mut self.foreground, &d.foreground, &reference.foreground);
        merge_field(&mut self.background, &d.background, &reference.background);
    }
}

/// Sparse patch for [`Fill`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FillOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<FillPattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
}

impl Defaultable for FillOptions {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl ApplyOptions for Fill {
    type Options = FillOptions;

    fn apply_options(&mut self, patch: &FillOptions) {
        apply_field(&mut self.pattern, &patch.pattern);
        apply_field(&mut self.foreground, &patch.foreground);
        apply_field(&mut self.background, &patch.background);
    }
}
