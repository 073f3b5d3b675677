//! Style definitions round-trip through both persisted formats: JSON
//! (`serde_json`) and XML (`quick-xml` serde support).

use pretty_assertions::assert_eq;
use sheetcraft_model::{
    CellStyle, Color, DocumentSettings, Fill, FillPattern, Font, Property, SheetSettings, Styles,
};

#[test]
fn json_round_trip_document_settings() {
    let mut doc = DocumentSettings::new();
    let mut corporate = CellStyle::named("Corporate");
    corporate.font = Font {
        name: "Arial".into(),
        bold: true,
        ..Font::default()
    };
    corporate.fill = Fill {
        pattern: FillPattern::Solid,
        foreground: Color::new_argb(0xFF336699),
        ..Fill::default()
    };
    doc.styles.push(corporate);
    let mut default = CellStyle::named("Default");
    default.inherits = "Corporate".into();
    doc.styles.push(default);
    doc.sheets.push(SheetSettings::for_sheet("Data"));
    doc.properties.push(Property::new("title", "Report"));

    let json = serde_json::to_string_pretty(&doc).unwrap();
    let back: DocumentSettings = serde_json::from_str(&json).unwrap();
    assert_eq!(back, doc);
}

#[test]
fn json_field_names_are_camel_case() {
    let mut font = Font::default();
    font.size_100pt = 1200;
    let json = serde_json::to_value(&font).unwrap();
    assert!(json.get("size100pt").is_some());
    assert!(json.get("wrapText").is_none());
}

#[test]
fn json_styles_deserialize_from_plain_array() {
    let json = r##"[
        {"name": "Corporate", "fill": {"pattern": "solid", "foreground": "#FF0000FF"}},
        {"name": "Default", "inherits": "Corporate"}
    ]"##;
    let styles: Styles = serde_json::from_str(json).unwrap();
    let resolved = styles.resolve("Default").unwrap();
    assert_eq!(resolved.fill.pattern, FillPattern::Solid);
    assert_eq!(resolved.fill.foreground, Color::new_argb(0xFF0000FF));
}

#[test]
fn xml_round_trip_font() {
    let font = Font {
        name: "Consolas".into(),
        size_100pt: 1000,
        italic: true,
        color: Color::new_argb(0xFF222222),
        ..Font::default()
    };
    let xml = quick_xml::se::to_string(&font).unwrap();
    let back: Font = quick_xml::de::from_str(&xml).unwrap();
    assert_eq!(back, font);
}

#[test]
fn xml_round_trip_sheet_settings() {
    let mut settings = SheetSettings::for_sheet("Data");
    settings.set_zoom_pct(120).unwrap();
    settings.show_gridlines = false;
    settings.frozen_rows = 2;
    let xml = quick_xml::se::to_string(&settings).unwrap();
    let back: SheetSettings = quick_xml::de::from_str(&xml).unwrap();
    assert_eq!(back, settings);
}
