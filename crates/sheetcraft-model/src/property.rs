use serde::{Deserialize, Serialize};

use crate::collection::KeyedList;
use crate::merge::{merge_field, Combine, Defaultable, Keyed};

/// A document property: a name/value pair (title, creator, category, ...).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Property {
    pub name: String,
    pub value: String,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl Keyed for Property {
    fn key(&self) -> &str {
        &self.name
    }
}

impl Defaultable for Property {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl Combine for Property {
    fn combine(&mut self, reference: &Self) {
        let d = Self::default();
        merge_field(&mut self.value, &d.value, &reference.value);
    }
}

/// Ordered document property collection, keyed by property name.
pub type Properties = KeyedList<Property>;
