//! A targeted workbook serializer for building small test inputs in-process.
//!
//! This writes just enough of a package (content types, relationships,
//! workbook, worksheets with inline-string cells) for the operation pipeline
//! to open, edit and re-save it. Not a general-purpose XLSX writer.

use std::fmt::Write as _;
use std::io::{Cursor, Write};

use zip::write::FileOptions;

use crate::data::CellValue;
use crate::openxml::CellRef;
use crate::package::XlsxError;

/// One worksheet in a fixture workbook.
#[derive(Debug, Clone, Default)]
pub struct FixtureSheet {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

impl FixtureSheet {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    pub fn with_rows(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

/// Serialize a minimal workbook with the given sheets.
pub fn fixture_xlsx(sheets: &[FixtureSheet]) -> Result<Vec<u8>, XlsxError> {
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut buffer);
        let options =
            FileOptions::<()>::default().compression_method(zip::CompressionMethod::Deflated);

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(content_types_xml(sheets.len()).as_bytes())?;

        zip.start_file("_rels/.rels", options)?;
        zip.write_all(ROOT_RELS.as_bytes())?;

        zip.start_file("xl/workbook.xml", options)?;
        zip.write_all(workbook_xml(sheets).as_bytes())?;

        zip.start_file("xl/_rels/workbook.xml.rels", options)?;
        zip.write_all(workbook_rels_xml(sheets.len()).as_bytes())?;

        for (index, sheet) in sheets.iter().enumerate() {
            zip.start_file(format!("xl/worksheets/sheet{}.xml", index + 1), options)?;
            zip.write_all(worksheet_xml(sheet).as_bytes())?;
        }

        zip.finish()?;
    }
    Ok(buffer.into_inner())
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>
"#;

fn content_types_xml(sheet_count: usize) -> String {
    let mut out = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
"#,
    );
    for index in 1..=sheet_count {
        let _ = writeln!(
            out,
            r#"  <Override PartName="/xl/worksheets/sheet{index}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
        );
    }
    out.push_str("</Types>\n");
    out
}

fn workbook_xml(sheets: &[FixtureSheet]) -> String {
    let mut out = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"
          xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets>
"#,
    );
    for (index, sheet) in sheets.iter().enumerate() {
        let _ = writeln!(
            out,
            r#"    <sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape_xml(&sheet.name),
            index + 1,
            index + 1
        );
    }
    out.push_str("  </sheets>\n</workbook>\n");
    out
}

fn workbook_rels_xml(sheet_count: usize) -> String {
    let mut out = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
"#,
    );
    for index in 1..=sheet_count {
        let _ = writeln!(
            out,
            r#"  <Relationship Id="rId{index}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{index}.xml"/>"#,
        );
    }
    out.push_str("</Relationships>\n");
    out
}

fn worksheet_xml(sheet: &FixtureSheet) -> String {
    let mut out = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetViews><sheetView workbookViewId="0"/></sheetViews>
  <sheetData>
"#,
    );
    for (row_index, row) in sheet.rows.iter().enumerate() {
        let _ = write!(out, r#"    <row r="{}">"#, row_index + 1);
        for (col_index, value) in row.iter().enumerate() {
            let a1 = CellRef::new(row_index as u32, col_index as u32).to_a1();
            match value {
                CellValue::Empty => {}
                CellValue::Bool(b) => {
                    let _ = write!(out, r#"<c r="{a1}" t="b"><v>{}</v></c>"#, *b as u8);
                }
                CellValue::Number(n) => {
                    let _ = write!(out, r#"<c r="{a1}"><v>{n}</v></c>"#);
                }
                CellValue::Text(s) => {
                    let _ = write!(
                        out,
                        r#"<c r="{a1}" t="inlineStr"><is><t>{}</t></is></c>"#,
                        escape_xml(s)
                    );
                }
            }
        }
        out.push_str("</row>\n");
    }
    out.push_str("  </sheetData>\n</worksheet>\n");
    out
}

pub(crate) fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::XlsxPackage;

    #[test]
    fn fixture_opens_as_a_package() {
        let bytes = fixture_xlsx(&[FixtureSheet::with_rows(
            "Data",
            vec![vec![CellValue::text("hello"), CellValue::Number(2.0)]],
        )])
        .unwrap();
        let pkg = XlsxPackage::from_bytes(&bytes).unwrap();
        let sheet_xml = pkg.part_string("xl/worksheets/sheet1.xml").unwrap();
        assert!(sheet_xml.contains("hello"));
        assert!(sheet_xml.contains(r#"<c r="B1"><v>2</v></c>"#));
    }
}
