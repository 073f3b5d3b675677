//! Top-level document settings composite.

use serde::{Deserialize, Serialize};

use crate::error::StyleError;
use crate::merge::{Combine, Defaultable};
use crate::property::Properties;
use crate::sheet::SheetSettingsList;
use crate::style::Styles;

/// Everything a composed document carries besides its data: styles, per-sheet
/// settings and document properties.
///
/// Combining document settings with a reference (a corporate template, say)
/// delegates to each member collection's merge-by-key combine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentSettings {
    pub styles: Styles,
    pub sheets: SheetSettingsList,
    pub properties: Properties,
}

impl DocumentSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a reference settings object into this one, member-wise.
    ///
    /// Style entries are validated the same way element-level combine is:
    /// every style on either side must carry a name (unnamed styles cannot be
    /// keyed, so they cannot be merged).
    pub fn combine(&mut self, reference: &Self) -> Result<(), StyleError> {
        if self
            .styles
            .iter()
            .chain(reference.styles.iter())
            .any(|style| style.name.is_empty())
        {
            return Err(StyleError::UnnamedStyle);
        }
        self.styles.combine(&reference.styles);
        self.sheets.combine(&reference.sheets);
        self.properties.combine(&reference.properties);
        Ok(())
    }
}

impl Defaultable for DocumentSettings {
    fn is_default(&self) -> bool {
        self.styles.is_empty() && self.sheets.is_empty() && self.properties.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::Property;
    use crate::sheet::SheetSettings;
    use crate::style::CellStyle;
    use pretty_assertions::assert_eq;

    #[test]
    fn document_combine_delegates_to_members() {
        let mut doc = DocumentSettings::new();
        doc.styles.push(CellStyle::named("Default"));

        let mut template = DocumentSettings::new();
        let mut corporate = CellStyle::named("Corporate");
        corporate.font.bold = true;
        template.styles.push(corporate);
        template.sheets.push(SheetSettings::for_sheet("Data"));
        template.properties.push(Property::new("creator", "ops"));

        doc.combine(&template).unwrap();
        assert_eq!(doc.styles.len(), 2);
        assert!(doc.styles.contains("Corporate"));
        assert!(doc.sheets.contains("Data"));
        assert_eq!(doc.properties.get("creator").unwrap().value, "ops");
    }

    #[test]
    fn unnamed_style_fails_document_combine() {
        let mut doc = DocumentSettings::new();
        doc.styles.push(CellStyle::default());
        let template = DocumentSettings::new();
        assert_eq!(doc.combine(&template), Err(StyleError::UnnamedStyle));
    }
}
