//! Shape and picture composites.

use serde::{Deserialize, Serialize};

use crate::border::{Border, BorderOptions};
use crate::effects::Effects;
use crate::fill::{Fill, FillOptions};
use crate::font::{Font, FontOptions};
use crate::geometry::{Flip, FlipOptions, Location, Size, SizeOptions};
use crate::merge::{apply_field, merge_field, ApplyOptions, Combine, Defaultable, Keyed};

/// Shape geometry kind, fixed at construction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    RoundedRectangle,
    Ellipse,
    Line,
    Arrow,
    TextBox,
}

/// A drawing shape anchored on a worksheet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Shape {
    pub name: String,
    pub kind: ShapeKind,
    pub text: String,
    pub font: Font,
    pub fill: Fill,
    pub outline: Border,
    pub size: Size,
    pub location: Location,
    pub flip: Flip,
    pub effects: Effects,
}

impl Shape {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Keyed for Shape {
    fn key(&self) -> &str {
        &self.name
    }
}

impl Defaultable for Shape {
    fn is_default(&self) -> bool {
        self.kind == ShapeKind::default()
            && self.text.is_empty()
            && self.font.is_default()
            && self.fill.is_default()
            && self.outline.is_default()
            && self.size.is_default()
            && self.location.is_default()
            && self.flip.is_default()
            && self.effects.is_empty()
    }
}

impl Combine for Shape {
    fn combine(&mut self, reference: &Self) {
        let d = Self::default();
        merge_field(&mut self.kind, &d.kind, &reference.kind);
        merge_field(&mut self.text, &d.text, &reference.text);
        self.font.combine(&reference.font);
        self.fill.combine(&reference.fill);
        self.outline.combine(&reference.outline);
        self.size.combine(&reference.size);
        self.location.combine(&reference.location);
        self.flip.combine(&reference.flip);
        self.effects.combine(&reference.effects);
    }
}

/// Sparse patch for [`Shape`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShapeOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ShapeKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<FontOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<FillOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline: Option<BorderOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flip: Option<FlipOptions>,
}

impl Defaultable for ShapeOptions {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl ApplyOptions for Shape {
    type Options = ShapeOptions;

    fn apply_options(&mut self, patch: &ShapeOptions) {
        apply_field(&mut self.kind, &patch.kind);
        apply_field(&mut self.text, &patch.text);
        if let Some(font) = &patch.font {
            self.font.apply_options(font);
        }
        if let Some(fill) = &patch.fill {
            self.fill.apply_options(fill);
        }
        if let Some(outline) = &patch.outline {
            self.outline.apply_options(outline);
        }
        if let Some(size) = &patch.size {
            self.size.apply_options(size);
        }
        apply_field(&mut self.location, &patch.location);
        if let Some(flip) = &patch.flip {
            self.flip.apply_options(flip);
        }
    }
}

/// An embedded picture anchored on a worksheet.
///
/// `source` names the image content (a package part name or file name); the
/// bytes themselves live with the package, not the style model.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Picture {
    pub name: String,
    pub source: String,
    pub size: Size,
    pub location: Location,
    pub flip: Flip,
    pub effects: Effects,
}

impl Picture {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Keyed for Picture {
    fn key(&self) -> &str {
        &self.name
    }
}

impl Defaultable for Picture {
    fn is_default(&self) -> bool {
        self.source.is_empty()
            && self.size.is_default()
            && self.location.is_default()
            && self.flip.is_default()
            && self.effects.is_empty()
    }
}

impl Combine for Picture {
    fn combine(&mut self, reference: &Self) {
        let d = Self::default();
        merge_field(&mut self.source, &d.source, &reference.source);
        self.size.combine(&reference.size);
        self.location.combine(&reference.location);
        self.flip.combine(&reference.flip);
        self.effects.combine(&reference.effects);
    }
}

/// Sparse patch for [`Picture`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PictureOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flip: Option<FlipOptions>,
}

impl Defaultable for PictureOptions {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl ApplyOptions for Picture {
    type Options = PictureOptions;

    fn apply_options(&mut self, patch: &PictureOptions) {
        apply_field(&mut self.source, &patch.source);
        if let Some(size) = &patch.size {
            self.size.apply_options(size);
        }
        apply_field(&mut self.location, &patch.location);
        if let Some(flip) = &patch.flip {
            self.flip.apply_options(flip);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Effect;

    #[test]
    fn shape_clone_is_fully_disjoint() {
        let mut shape = Shape::named("Callout");
        shape.effects.push(Effect::named("drop"));
        let mut copy = shape.clone();
        copy.effects.push(Effect::named("glow"));
        copy.effects.get_mut("drop").unwrap().glow_100pt = 9;
        assert_eq!(shape.effects.len(), 1);
        assert_eq!(shape.effects.get("drop").unwrap().glow_100pt, 0);
    }

    #[test]
    fn picture_options_touch_only_patched_fields() {
        let mut picture = Picture::named("Logo");
        picture.source = "logo.png".into();
        picture.size = Size::new(100, 200);
        let patch = PictureOptions {
            size: Some(SizeOptions {
                width_emu: Some(500),
                height_emu: None,
            }),
            ..PictureOptions::default()
        };
        picture.apply_options(&patch);
        assert_eq!(picture.size, Size::new(500, 200));
        assert_eq!(picture.source, "logo.png");
    }
}
