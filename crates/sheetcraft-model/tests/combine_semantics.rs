//! Cross-type checks of the default/combine/clone/options contracts.

use pretty_assertions::assert_eq;
use sheetcraft_model::{
    ApplyOptions, Border, BorderStyle, CellStyle, Chart, ColumnHeader, Combine, Defaultable,
    DocumentSettings, Effect, Fill, FillPattern, Flip, Font, FontOptions, Location, MiniChart,
    Picture, Property, Shadow, Shape, SheetSettings, Size, Styles, Table,
};

#[test]
fn every_element_starts_default() {
    assert!(Font::default().is_default());
    assert!(Border::default().is_default());
    assert!(Fill::default().is_default());
    assert!(Shadow::default().is_default());
    assert!(Size::default().is_default());
    assert!(Flip::default().is_default());
    assert!(Location::default().is_default());
    assert!(Effect::default().is_default());
    assert!(Property::default().is_default());
    assert!(CellStyle::default().is_default());
    assert!(Chart::default().is_default());
    assert!(MiniChart::default().is_default());
    assert!(Table::default().is_default());
    assert!(Shape::default().is_default());
    assert!(Picture::default().is_default());
    assert!(SheetSettings::default().is_default());
    assert!(DocumentSettings::default().is_default());
}

#[test]
fn combine_is_idempotent_for_composites() {
    let mut style = CellStyle::named("Report");
    style.font.bold = true;

    let mut reference = CellStyle::named("Base");
    reference.font.name = "Arial".into();
    reference.fill.pattern = FillPattern::Solid;
    reference.number_format = "#,##0".into();
    let mut border = Border::default();
    border.style = BorderStyle::Thin;
    reference.borders.push(border);

    style.combine_with(&reference).unwrap();
    let once = style.clone();
    style.combine_with(&reference).unwrap();
    assert_eq!(style, once);
}

#[test]
fn combine_precedence_explicit_value_survives() {
    let mut font = Font {
        name: "Georgia".into(),
        ..Font::default()
    };
    let reference = Font {
        name: "Arial".into(),
        bold: true,
        ..Font::default()
    };
    font.combine(&reference);
    assert_eq!(font.name, "Georgia");
    assert!(font.bold);
}

#[test]
fn clone_independence_for_nested_collections() {
    let mut doc = DocumentSettings::new();
    let mut style = CellStyle::named("Default");
    style.borders.push(Border {
        style: BorderStyle::Thin,
        ..Border::default()
    });
    doc.styles.push(style);

    let mut copy = doc.clone();
    copy.styles.push(CellStyle::named("Extra"));
    copy.styles
        .get_mut("Default")
        .unwrap()
        .borders
        .push(Border::default());

    assert_eq!(doc.styles.len(), 1);
    assert_eq!(doc.styles.get("Default").unwrap().borders.len(), 1);
}

#[test]
fn collection_merge_into_empty_preserves_reference_order() {
    let mut target = Styles::new();
    let reference: Styles = [
        CellStyle::named("Header"),
        CellStyle::named("Body"),
        CellStyle::named("Footer"),
    ]
    .into_iter()
    .collect();
    target.combine(&reference);
    let names: Vec<&str> = target.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Header", "Body", "Footer"]);
    assert_eq!(target, reference);
}

#[test]
fn options_patch_changes_exactly_one_field() {
    let mut font = Font {
        name: "Georgia".into(),
        size_100pt: 1400,
        bold: true,
        ..Font::default()
    };
    let before = font.clone();
    let patch = FontOptions {
        italic: Some(true),
        ..FontOptions::default()
    };
    font.apply_options(&patch);
    assert!(font.italic);
    assert_eq!(font.name, before.name);
    assert_eq!(font.size_100pt, before.size_100pt);
    assert_eq!(font.bold, before.bold);
    assert_eq!(font.underline, before.underline);
    assert_eq!(font.color, before.color);
}

#[test]
fn default_patch_is_a_noop() {
    let mut font = Font {
        bold: true,
        ..Font::default()
    };
    let before = font.clone();
    font.apply_options(&FontOptions::default());
    assert_eq!(font, before);
}

#[test]
fn inheritance_scenario_from_collection() {
    // "Default" inherits "Corporate"; Corporate carries a blue solid fill.
    let mut corporate = CellStyle::named("Corporate");
    corporate.fill.pattern = FillPattern::Solid;
    corporate.fill.foreground = sheetcraft_model::Color::new_argb(0xFF0000FF);
    let mut default = CellStyle::named("Default");
    default.inherits = "Corporate".into();
    let styles: Styles = [default, corporate].into_iter().collect();

    // Resolving through the collection flattens the chain.
    let resolved = styles.resolve("Default").unwrap();
    assert_eq!(
        resolved.fill.foreground,
        sheetcraft_model::Color::new_argb(0xFF0000FF)
    );

    // The single-step lookup + element combine path agrees with resolve().
    let mut by_hand = styles.get("Default").unwrap().clone();
    let parent = styles.inherit_of(&by_hand).unwrap().clone();
    by_hand.combine_with(&parent).unwrap();
    assert_eq!(by_hand.fill, resolved.fill);
}

#[test]
fn column_header_merge_keeps_explicit_width() {
    let mut table = Table::named("Orders");
    let mut col = ColumnHeader::named("Total");
    col.width_256 = 4096;
    table.columns.push(col);

    let mut template = Table::named("Orders");
    let mut template_col = ColumnHeader::named("Total");
    template_col.width_256 = 1024;
    template_col.number_format = "#,##0.00".into();
    template.columns.push(template_col);

    table.combine(&template);
    let merged = table.columns.get("Total").unwrap();
    assert_eq!(merged.width_256, 4096);
    assert_eq!(merged.number_format, "#,##0.00");
}
