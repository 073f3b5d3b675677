//! Named cell styles and the style collection with inheritance resolution.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::alignment::{Alignment, AlignmentOptions};
use crate::border::{BorderOptions, Borders};
use crate::collection::KeyedList;
use crate::error::StyleError;
use crate::fill::{Fill, FillOptions};
use crate::font::{Font, FontOptions};
use crate::merge::{apply_field, merge_field, ApplyOptions, Combine, Defaultable, Keyed};

/// A named, inheritable cell style.
///
/// `inherits` names another style in the owning collection; an empty string
/// means the style stands alone. The name itself is identity, not style data:
/// combine never rewrites it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CellStyle {
    pub name: String,
    pub inherits: String,
    pub font: Font,
    pub fill: Fill,
    pub borders: Borders,
    pub alignment: Alignment,
    pub number_format: String,
}

impl CellStyle {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Default-wins merge guarded by the configuration contract: a style must
    /// be named before it takes part in a combine.
    pub fn combine_with(&mut self, reference: &Self) -> Result<(), StyleError> {
        if self.name.is_empty() {
            return Err(StyleError::UnnamedStyle);
        }
        self.combine(reference);
        Ok(())
    }
}

impl Keyed for CellStyle {
    fn key(&self) -> &str {
        &self.name
    }
}

impl Defaultable for CellStyle {
    fn is_default(&self) -> bool {
        self.inherits.is_empty()
            && self.number_format.is_empty()
            && self.font.is_default()
            && self.fill.is_default()
            && self.borders.is_default()
            && self.alignment.is_default()
    }
}

impl Combine for CellStyle {
    fn combine(&mut self, reference: &Self) {
        let d = Self::default();
        merge_field(&mut self.inherits, &d.inherits, &reference.inherits);
        merge_field(
            &mut self.number_format,
            &d.number_format,
            &reference.number_format,
        );
        self.font.combine(&reference.font);
        self.fill.combine(&reference.fill);
        self.borders.combine(&reference.borders);
        self.alignment.combine(&reference.alignment);
    }
}

/// Sparse patch for [`CellStyle`]. Identity (`name`) is not patchable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CellStyleOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherits: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<FontOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<FillOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<AlignmentOptions>,
    /// Positional border patches, matched by index like border combine.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub borders: Vec<Option<BorderOptions>>,
}

impl Defaultable for CellStyleOptions {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl ApplyOptions for CellStyle {
    type Options = CellStyleOptions;

    fn apply_options(&mut self, patch: &CellStyleOptions) {
        apply_field(&mut self.inherits, &patch.inherits);
        apply_field(&mut self.number_format, &patch.number_format);
        if let Some(font) = &patch.font {
            self.font.apply_options(font);
        }
        if let Some(fill) = &patch.fill {
            self.fill.apply_options(fill);
        }
        if let Some(alignment) = &patch.alignment {
            self.alignment.apply_options(alignment);
        }
        for (index, border_patch) in patch.borders.iter().enumerate() {
            if let (Some(border_patch), Some(border)) =
                (border_patch, self.borders.get_mut(index))
            {
                border.apply_options(border_patch);
            }
        }
    }
}

/// Ordered style collection, keyed by style name.
pub type Styles = KeyedList<CellStyle>;

impl KeyedList<CellStyle> {
    /// The parent a style inherits from, if it names one and it exists here.
    pub fn inherit_of(&self, style: &CellStyle) -> Option<&CellStyle> {
        if style.inherits.is_empty() {
            None
        } else {
            self.get(&style.inherits)
        }
    }

    /// Flatten a style's inheritance chain into a standalone style.
    ///
    /// An empty name resolves to the built-in default style sentinel. Chains
    /// are followed transitively (A inherits B inherits C) regardless of
    /// declaration order; revisiting a style yields
    /// [`StyleError::CyclicInheritance`] rather than recursing forever.
    pub fn resolve(&self, name: &str) -> Result<CellStyle, StyleError> {
        if name.is_empty() {
            return Ok(CellStyle::default());
        }
        let style = self.get(name).ok_or_else(|| StyleError::UnknownStyle {
            name: name.to_owned(),
        })?;
        let mut resolved = style.clone();
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(name.to_owned());
        let mut next = resolved.inherits.clone();
        while !next.is_empty() {
            if !visited.insert(next.clone()) {
                return Err(StyleError::CyclicInheritance { name: next });
            }
            let parent = self.get(&next).ok_or_else(|| StyleError::UnknownStyle {
                name: next.clone(),
            })?;
            resolved.combine_with(parent)?;
            next = parent.inherits.clone();
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::fill::FillPattern;
    use pretty_assertions::assert_eq;

    fn corporate_styles() -> Styles {
        let mut corporate = CellStyle::named("Corporate");
        corporate.fill.pattern = FillPattern::Solid;
        corporate.fill.foreground = Color::new_argb(0xFF0000FF);
        let mut default = CellStyle::named("Default");
        default.inherits = "Corporate".into();
        [default, corporate].into_iter().collect()
    }

    #[test]
    fn unnamed_style_cannot_combine() {
        let mut style = CellStyle::default();
        let reference = CellStyle::named("Base");
        assert_eq!(
            style.combine_with(&reference),
            Err(StyleError::UnnamedStyle)
        );
    }

    #[test]
    fn inheritance_flattens_through_the_collection() {
        let styles = corporate_styles();
        let resolved = styles.resolve("Default").unwrap();
        assert_eq!(resolved.fill.pattern, FillPattern::Solid);
        assert_eq!(resolved.fill.foreground, Color::new_argb(0xFF0000FF));
    }

    #[test]
    fn three_level_chain_resolves_regardless_of_order() {
        let mut a = CellStyle::named("A");
        a.inherits = "B".into();
        let mut b = CellStyle::named("B");
        b.inherits = "C".into();
        b.font.bold = true;
        let mut c = CellStyle::named("C");
        c.font.name = "Consolas".into();
        c.number_format = "0.00".into();
        let styles: Styles = [c, a, b].into_iter().collect();
        let resolved = styles.resolve("A").unwrap();
        assert!(resolved.font.bold);
        assert_eq!(resolved.font.name, "Consolas");
        assert_eq!(resolved.number_format, "0.00");
    }

    #[test]
    fn cyclic_inheritance_is_detected() {
        let mut a = CellStyle::named("A");
        a.inherits = "B".into();
        let mut b = CellStyle::named("B");
        b.inherits = "A".into();
        let styles: Styles = [a, b].into_iter().collect();
        assert_eq!(
            styles.resolve("A"),
            Err(StyleError::CyclicInheritance { name: "A".into() })
        );
    }

    #[test]
    fn empty_name_resolves_to_default_sentinel() {
        let styles = corporate_styles();
        assert_eq!(styles.resolve("").unwrap(), CellStyle::default());
    }

    #[test]
    fn unknown_style_is_an_error() {
        let styles = corporate_styles();
        assert_eq!(
            styles.resolve("Nope"),
            Err(StyleError::UnknownStyle { name: "Nope".into() })
        );
    }

    #[test]
    fn inherit_of_walks_one_step() {
        let styles = corporate_styles();
        let default = styles.get("Default").unwrap();
        let parent = styles.inherit_of(default).unwrap();
        assert_eq!(parent.name, "Corporate");
        assert!(styles.inherit_of(parent).is_none());
    }
}
