//! Table header composites: named tables with keyed column headers.

use serde::{Deserialize, Serialize};

use crate::collection::KeyedList;
use crate::merge::{apply_field, merge_field, ApplyOptions, Combine, Defaultable, Keyed};

/// A table column header, keyed by header text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnHeader {
    pub name: String,
    /// Column width in 1/256 character units; 0 means auto.
    pub width_256: u32,
    /// Name of the cell style applied to body cells of this column.
    pub style_name: String,
    /// Name of the cell style applied to the header cell.
    pub header_style_name: String,
    pub number_format: String,
}

impl ColumnHeader {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Keyed for ColumnHeader {
    fn key(&self) -> &str {
        &self.name
    }
}

impl Defaultable for ColumnHeader {
    fn is_default(&self) -> bool {
        self.width_256 == 0
            && self.style_name.is_empty()
            && self.header_style_name.is_empty()
            && self.number_format.is_empty()
    }
}

impl Combine for ColumnHeader {
    fn combine(&mut self, reference: &Self) {
        let d = Self::default();
        merge_field(&mut self.width_256, &d.width_256, &reference.width_256);
        merge_field(&mut self.style_name, &d.style_name, &reference.style_name);
        merge_field(
            &mut self.header_style_name,
            &d.header_style_name,
            &reference.header_style_name,
        );
        merge_field(
            &mut self.number_format,
            &d.number_format,
            &reference.number_format,
        );
    }
}

/// Sparse patch for [`ColumnHeader`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnHeaderOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width_256: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_style_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_format: Option<String>,
}

impl Defaultable for ColumnHeaderOptions {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl ApplyOptions for ColumnHeader {
    type Options = ColumnHeaderOptions;

    fn apply_options(&mut self, patch: &ColumnHeaderOptions) {
        apply_field(&mut self.width_256, &patch.width_256);
        apply_field(&mut self.style_name, &patch.style_name);
        apply_field(&mut self.header_style_name, &patch.header_style_name);
        apply_field(&mut self.number_format, &patch.number_format);
    }
}

/// Ordered column header collection, keyed by header name.
pub type ColumnHeaders = KeyedList<ColumnHeader>;

/// A named table definition: header row plus presentation flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Table {
    pub name: String,
    pub columns: ColumnHeaders,
    pub style_name: String,
    pub banded_rows: bool,
    pub banded_columns: bool,
    pub totals_row: bool,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            name: String::new(),
            columns: ColumnHeaders::new(),
            style_name: String::new(),
            banded_rows: true,
            banded_columns: false,
            totals_row: false,
        }
    }
}

impl Table {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Keyed for Table {
    fn key(&self) -> &str {
        &self.name
    }
}

impl Defaultable for Table {
    fn is_default(&self) -> bool {
        let d = Self::default();
        self.columns.is_empty()
            && self.style_name.is_empty()
            && self.banded_rows == d.banded_rows
            && self.banded_columns == d.banded_columns
            && self.totals_row == d.totals_row
    }
}

impl Combine for Table {
    fn combine(&mut self, reference: &Self) {
        let d = Self::default();
        merge_field(&mut self.style_name, &d.style_name, &reference.style_name);
        merge_field(&mut self.banded_rows, &d.banded_rows, &reference.banded_rows);
        merge_field(
            &mut self.banded_columns,
            &d.banded_columns,
            &reference.banded_columns,
        );
        merge_field(&mut self.totals_row, &d.totals_row, &reference.totals_row);
        self.columns.combine(&reference.columns);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn column_headers_merge_by_name() {
        let mut table = Table::named("Orders");
        let mut id = ColumnHeader::named("Id");
        id.width_256 = 2048;
        table.columns.push(id);

        let mut reference = Table::named("Template");
        let mut ref_id = ColumnHeader::named("Id");
        ref_id.width_256 = 999;
        ref_id.style_name = "Mono".into();
        reference.columns.push(ref_id);
        reference.columns.push(ColumnHeader::named("Amount"));

        table.combine(&reference);
        let id = table.columns.get("Id").unwrap();
        assert_eq!(id.width_256, 2048); // explicit width wins
        assert_eq!(id.style_name, "Mono"); // default filled from reference
        assert!(table.columns.contains("Amount"));
        assert_eq!(table.columns.len(), 2);
    }

    #[test]
    fn clone_independence_for_columns() {
        let mut table = Table::named("Orders");
        table.columns.push(ColumnHeader::named("Id"));
        let mut copy = table.clone();
        copy.columns.push(ColumnHeader::named("Extra"));
        assert_eq!(table.columns.len(), 1);
        assert_eq!(copy.columns.len(), 2);
    }
}
