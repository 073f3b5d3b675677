use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::merge::{apply_field, merge_field, ApplyOptions, Combine, Defaultable};

/// Border line style.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderStyle {
    #[default]
    None,
    Hair,
    Thin,
    Medium,
    Thick,
    Dashed,
    Dotted,
    Double,
}

/// A single border line (one edge, or a chart/shape outline).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Border {
    pub style: BorderStyle,
    pub color: Color,
    /// Line width in 1/100 points; 0 lets the style pick its own weight.
    pub width_100pt: u32,
}

impl Defaultable for Border {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl Combine for Border {
    fn combine(&mut self, reference: &Self) {
        let d = Self::default();
        merge_field(&mut self.style, &d.style, &reference.style);
        merge_field(&mut self.color, &d.color, &reference.color);
        merge_field(&mut self.width_100pt, &d.width_100pt, &reference.width_100pt);
    }
}

/// Sparse patch for [`Border`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BorderOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<BorderStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width_100pt: Option<u32>,
}

impl Defaultable for BorderOptions {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl ApplyOptions for Border {
    type Options = BorderOptions;

    fn apply_options(&mut self, patch: &BorderOptions) {
        apply_field(&mut self.style, &patch.style);
        apply_field(&mut self.color, &patch.color);
        apply_field(&mut self.width_100pt, &patch.width_100pt);
    }
}

/// An ordered, position-based border collection (left/right/top/bottom and
/// friends by convention of the caller).
///
/// Borders have no name key, so collection combine matches elements **by
/// index**. Reordering or unequal-length collections therefore merge
/// positionally, not semantically; this is a documented limitation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Borders {
    items: Vec<Border>,
}

impl Borders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, border: Border) {
        self.items.push(border);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Border> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Border> {
        self.items.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Border> {
        self.items.iter()
    }
}

impl Defaultable for Borders {
    fn is_default(&self) -> bool {
        self.items.iter().all(Defaultable::is_default)
    }
}

impl Combine for Borders {
    /// Positional merge: existing entries combine with the same-index
    /// reference entry; trailing reference entries are cloned and appended.
    fn combine(&mut self, reference: &Self) {
        if self.items.is_empty() {
            self.items = reference.items.clone();
            return;
        }
        for (index, item) in self.items.iter_mut().enumerate() {
            if let Some(r) = reference.items.get(index) {
                item.combine(r);
            }
        }
        if reference.items.len() > self.items.len() {
            self.items
                .extend(reference.items[self.items.len()..].iter().cloned());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn thin_red() -> Border {
        Border {
            style: BorderStyle::Thin,
            color: Color::new_argb(0xFFFF0000),
            width_100pt: 0,
        }
    }

    #[test]
    fn empty_collection_clones_reference_in_order() {
        let mut target = Borders::new();
        let mut reference = Borders::new();
        reference.push(thin_red());
        reference.push(Border {
            style: BorderStyle::Thick,
            ..Border::default()
        });
        target.combine(&reference);
        assert_eq!(target, reference);
    }

    #[test]
    fn positional_merge_matches_by_index_not_value() {
        let mut target = Borders::new();
        target.push(Border::default()); // default slot, overridable
        target.push(thin_red()); // explicit slot, wins
        let mut reference = Borders::new();
        reference.push(thin_red());
        reference.push(Border {
            style: BorderStyle::Double,
            ..Border::default()
        });
        reference.push(Border {
            style: BorderStyle::Dotted,
            ..Border::default()
        });
        target.combine(&reference);
        assert_eq!(target.get(0).unwrap().style, BorderStyle::Thin);
        assert_eq!(target.get(1).unwrap().style, BorderStyle::Thin);
        // Trailing reference entry appended.
        assert_eq!(target.len(), 3);
        assert_eq!(target.get(2).unwrap().style, BorderStyle::Dotted);
    }
}
