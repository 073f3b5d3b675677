use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::merge::{apply_field, merge_field, ApplyOptions, Combine, Defaultable};

/// Drop shadow formatting for shapes and pictures.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Shadow {
    pub visible: bool,
    /// Horizontal offset in 1/100 points; negative shifts left.
    pub offset_x_100pt: i32,
    /// Vertical offset in 1/100 points; negative shifts up.
    pub offset_y_100pt: i32,
    /// Blur radius in 1/100 points.
    pub blur_100pt: u32,
    pub color: Color,
}

impl Defaultable for Shadow {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl Combine for Shadow {
    fn combine(&mut self, reference: &Self) {
        let d = Self::default();
        merge_field(&mut self.visible, &d.visible, &reference.visible);
        merge_field(
            &mut self.offset_x_100pt,
            &d.offset_x_100pt,
            &reference.offset_x_100pt,
        );
        merge_field(
            &mut self.offset_y_100pt,
            &d.offset_y_100pt,
            &reference.offset_y_100pt,
        );
        merge_field(&mut self.blur_100pt, &d.blur_100pt, &reference.blur_100pt);
        merge_field(&mut self.color, &d.color, &reference.color);
    }
}

/// Sparse patch for [`Shadow`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShadowOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_x_100pt: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_y_100pt: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blur_100pt: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl Defaultable for ShadowOptions {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl ApplyOptions for Shadow {
    type Options = ShadowOptions;

    fn apply_options(&mut self, patch: &ShadowOptions) {
        apply_field(&mut self.visible, &patch.visible);
        apply_field(&mut self.offset_x_100pt, &patch.offset_x_100pt);
        apply_field(&mut self.offset_y_100pt, &patch.offset_y_100pt);
        apply_field(&mut self.blur_100pt, &patch.blur_100pt);
        apply_field(&mut self.color, &patch.color);
    }
}
