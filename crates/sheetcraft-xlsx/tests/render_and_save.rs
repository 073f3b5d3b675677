//! End-to-end pipeline tests: queue operations, render, persist.

use std::collections::HashMap;

use sheetcraft_model::{Property, SheetSettings};
use sheetcraft_xlsx::fixture::{fixture_xlsx, FixtureSheet};
use sheetcraft_xlsx::{
    save_to_file, CancelToken, CellRef, CellValue, InsertTable, OpKind, Output, RenderQueue,
    ReplaceValues, SaveOptions, SetSettings, TableData, XlsxPackage,
};

fn people() -> TableData {
    let mut data = TableData::new(vec!["name".into(), "age".into()]);
    data.push_row(vec![CellValue::text("Ada"), CellValue::Number(36.0)]);
    data.push_row(vec![CellValue::text("Grace"), CellValue::Number(85.0)]);
    data
}

#[test]
fn consecutive_inserts_stack_below_each_other() {
    let input = fixture_xlsx(&[FixtureSheet::named("Data")]).unwrap();

    // Three render steps, one insert each; every step grows the output.
    let mut bytes = input;
    for _ in 0..3 {
        let mut queue = RenderQueue::new();
        queue.enqueue(InsertTable::new("Data", CellRef::new(0, 0), people()));
        let result = queue.render(OpKind::Insert, &bytes);
        assert!(result.success, "errors: {:?}", result.errors);
        let output = result.output.unwrap();
        assert!(output.len() > bytes.len());
        bytes = output;
    }

    let pkg = XlsxPackage::from_bytes(&bytes).unwrap();
    let xml = pkg.part_string("xl/worksheets/sheet1.xml").unwrap();
    // Blocks of header + two data rows land on rows 1-3, 4-6, and 7-9.
    assert!(xml.contains(r#"<row r="1">"#));
    assert!(xml.contains(r#"<row r="3">"#));
    assert!(xml.contains(r#"<row r="4"><c r="A4" t="inlineStr"><is><t>name</t></is></c>"#));
    assert!(xml.contains(r#"<row r="7"><c r="A7" t="inlineStr"><is><t>name</t></is></c>"#));
    assert!(xml.contains(r#"<row r="9">"#));
}

#[test]
fn two_inserts_in_one_render_pass_stack_as_well() {
    let input = fixture_xlsx(&[FixtureSheet::named("Data")]).unwrap();

    let mut queue = RenderQueue::new();
    queue.enqueue(InsertTable::new("Data", CellRef::new(0, 0), people()));
    queue.enqueue(InsertTable::new("Data", CellRef::new(0, 0), people()));

    let result = queue.render(OpKind::Insert, &input);
    assert!(result.success, "errors: {:?}", result.errors);

    let pkg = XlsxPackage::from_bytes(&result.output.unwrap()).unwrap();
    let xml = pkg.part_string("xl/worksheets/sheet1.xml").unwrap();
    assert!(xml.contains(r#"<row r="4"><c r="A4" t="inlineStr"><is><t>name</t></is></c>"#));
    assert!(xml.contains(r#"<row r="6">"#));
}

#[test]
fn a_failing_operation_halts_the_chain_and_yields_no_output() {
    let input = fixture_xlsx(&[FixtureSheet::named("Data")]).unwrap();

    let mut queue = RenderQueue::new();
    queue.enqueue(InsertTable::new("Data", CellRef::new(0, 0), people()));
    queue.enqueue(InsertTable::new("Missing", CellRef::new(0, 0), people()));
    queue.enqueue(InsertTable::new("Data", CellRef::new(0, 0), people()));

    let result = queue.render(OpKind::Insert, &input);
    assert!(!result.success);
    assert!(result.output.is_none());
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("Missing"));
    // The failed pass still consumed all queued inserts.
    assert_eq!(queue.pending_count(OpKind::Insert), 0);
}

#[test]
fn insert_then_replace_render_passes_compose() {
    let input = fixture_xlsx(&[FixtureSheet::with_rows(
        "Letter",
        vec![vec![CellValue::text("To: {{recipient}}")]],
    )])
    .unwrap();

    let mut queue = RenderQueue::new();
    queue.enqueue(InsertTable::new("Letter", CellRef::new(2, 0), people()));
    queue.enqueue(ReplaceValues::new(
        "Letter",
        HashMap::from([("recipient".to_string(), "Accounting".to_string())]),
    ));

    let inserted = queue.render(OpKind::Insert, &input);
    assert!(inserted.success);
    let replaced = queue.render(OpKind::Replace, &inserted.output.unwrap());
    assert!(replaced.success);

    let pkg = XlsxPackage::from_bytes(&replaced.output.unwrap()).unwrap();
    let xml = pkg.part_string("xl/worksheets/sheet1.xml").unwrap();
    assert!(xml.contains("To: Accounting"));
    assert!(xml.contains("Ada"));
}

#[test]
fn set_against_a_missing_sheet_renders_successfully() {
    let input = fixture_xlsx(&[FixtureSheet::named("Data")]).unwrap();

    let mut queue = RenderQueue::new();
    queue.enqueue(SetSettings::sheet(SheetSettings::for_sheet("NotHere")));
    let properties = [Property::new("title", "Report")].into_iter().collect();
    queue.enqueue(SetSettings::document(properties));

    let result = queue.render(OpKind::Set, &input);
    assert!(result.success, "errors: {:?}", result.errors);

    // The workbook itself is untouched apart from (absent) core properties.
    let pkg = XlsxPackage::from_bytes(&result.output.unwrap()).unwrap();
    assert!(pkg.has_sheet("Data").unwrap());
}

#[test]
fn rendered_output_survives_a_save_round_trip() {
    let input = fixture_xlsx(&[FixtureSheet::named("Data")]).unwrap();

    let mut queue = RenderQueue::new();
    queue.enqueue(InsertTable::new("Data", CellRef::new(0, 0), people()));
    let result = queue.render(OpKind::Insert, &input);
    assert!(result.success);

    let dir = tempfile::tempdir().unwrap();
    let path = save_to_file(
        Output::new("report", result.output.unwrap()),
        dir.path(),
        &SaveOptions::default(),
        &CancelToken::new(),
    )
    .unwrap();
    assert!(path.ends_with("report.xlsx"));

    let bytes = std::fs::read(&path).unwrap();
    let pkg = XlsxPackage::from_bytes(&bytes).unwrap();
    let xml = pkg.part_string("xl/worksheets/sheet1.xml").unwrap();
    assert!(xml.contains("Grace"));
}
