//! In-memory Open Packaging Convention (OPC) handling: part name -> bytes.
//!
//! The package inflates the full ZIP into memory so operations can rewrite
//! individual worksheet parts while preserving every unrelated part
//! byte-for-byte. Writing re-packs the ZIP container.

use std::io::{Cursor, Read, Write};

use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;
use zip::write::FileOptions;

/// Maximum allowed *inflated* bytes for a single ZIP entry.
///
/// Guardrail against ZIP bombs when materializing a package into memory.
pub const MAX_PACKAGE_PART_BYTES: u64 = 256 * 1024 * 1024; // 256 MiB

/// Maximum allowed *inflated* bytes across all ZIP entries.
pub const MAX_PACKAGE_TOTAL_BYTES: u64 = 512 * 1024 * 1024; // 512 MiB

#[derive(Debug, Error)]
pub enum XlsxError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("xml attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),
    #[error("utf-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("missing required attribute: {0}")]
    MissingAttr(&'static str),
    #[error("missing xlsx part: {0}")]
    MissingPart(String),
    #[error("worksheet not found: {0}")]
    MissingSheet(String),
    #[error("invalid xlsx: {0}")]
    Invalid(String),
    #[error(transparent)]
    Style(#[from] sheetcraft_model::StyleError),
    #[error(
        "xlsx package part is too large to load safely: {part} is {size} bytes (max {max} bytes)"
    )]
    PartTooLarge { part: String, size: u64, max: u64 },
    #[error("xlsx package is too large to load safely: {total} bytes uncompressed (max {max})")]
    PackageTooLarge { total: u64, max: u64 },
    #[error("save cancelled")]
    Cancelled,
    #[error("data adapter error: {0}")]
    Adapter(String),
}

/// A sheet entry from `xl/workbook.xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbookSheetInfo {
    pub name: String,
    pub sheet_id: u32,
    pub rel_id: String,
}

/// One package part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XlsxPart {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// An XLSX package inflated into memory, preserving part order.
#[derive(Debug, Clone, Default)]
pub struct XlsxPackage {
    parts: Vec<XlsxPart>,
}

fn normalize_part_name(name: &str) -> &str {
    name.strip_prefix('/').unwrap_or(name)
}

impl XlsxPackage {
    /// Inflate a package from XLSX bytes, enforcing the size guardrails.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, XlsxError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
        let mut parts = Vec::with_capacity(archive.len());
        let mut total: u64 = 0;
        for index in 0..archive.len() {
            let mut file = archive.by_index(index)?;
            if file.name().ends_with('/') {
                continue; // directory entry
            }
            let size = file.size();
            if size > MAX_PACKAGE_PART_BYTES {
                return Err(XlsxError::PartTooLarge {
                    part: file.name().to_owned(),
                    size,
                    max: MAX_PACKAGE_PART_BYTES,
                });
            }
            total = total.saturating_add(size);
            if total > MAX_PACKAGE_TOTAL_BYTES {
                return Err(XlsxError::PackageTooLarge {
                    total,
                    max: MAX_PACKAGE_TOTAL_BYTES,
                });
            }
            let name = normalize_part_name(file.name()).to_owned();
            let mut buf = Vec::with_capacity(size as usize);
            file.read_to_end(&mut buf)?;
            parts.push(XlsxPart { name, bytes: buf });
        }
        Ok(Self { parts })
    }

    /// Re-pack the package into XLSX bytes. Part order is preserved.
    pub fn to_bytes(&self) -> Result<Vec<u8>, XlsxError> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            let options =
                FileOptions::<()>::default().compression_method(zip::CompressionMethod::Deflated);
            for part in &self.parts {
                writer.start_file(part.name.clone(), options)?;
                writer.write_all(&part.bytes)?;
            }
            writer.finish()?;
        }
        Ok(buffer.into_inner())
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|part| part.name.as_str())
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        let name = normalize_part_name(name);
        self.parts
            .iter()
            .find(|part| part.name == name)
            .map(|part| part.bytes.as_slice())
    }

    pub fn part_string(&self, name: &str) -> Result<String, XlsxError> {
        let bytes = self
            .part(name)
            .ok_or_else(|| XlsxError::MissingPart(name.to_owned()))?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    /// Replace a part's payload, or append the part if it does not exist.
    pub fn set_part(&mut self, name: &str, bytes: Vec<u8>) {
        let name = normalize_part_name(name);
        if let Some(part) = self.parts.iter_mut().find(|part| part.name == name) {
            part.bytes = bytes;
        } else {
            self.parts.push(XlsxPart {
                name: name.to_owned(),
                bytes,
            });
        }
    }

    pub fn remove_part(&mut self, name: &str) -> Option<XlsxPart> {
        let name = normalize_part_name(name);
        let index = self.parts.iter().position(|part| part.name == name)?;
        Some(self.parts.remove(index))
    }

    /// Sheet entries declared in `xl/workbook.xml`, in workbook tab order.
    pub fn sheets(&self) -> Result<Vec<WorkbookSheetInfo>, XlsxError> {
        let workbook = self.part_string("xl/workbook.xml")?;
        parse_workbook_sheets(&workbook)
    }

    pub fn has_sheet(&self, name: &str) -> Result<bool, XlsxError> {
        Ok(self.sheets()?.iter().any(|sheet| sheet.name == name))
    }

    /// Resolve a sheet name to its worksheet part name via the workbook
    /// relationships part.
    pub fn worksheet_part(&self, sheet_name: &str) -> Result<String, XlsxError> {
        let sheet = self
            .sheets()?
            .into_iter()
            .find(|sheet| sheet.name == sheet_name)
            .ok_or_else(|| XlsxError::MissingSheet(sheet_name.to_owned()))?;
        let rels = self.part_string("xl/_rels/workbook.xml.rels")?;
        let target = relationship_target(&rels, &sheet.rel_id)?.ok_or_else(|| {
            XlsxError::Invalid(format!(
                "workbook relationship {} has no target",
                sheet.rel_id
            ))
        })?;
        Ok(resolve_workbook_target(&target))
    }
}

fn resolve_workbook_target(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_owned()
    } else {
        format!("xl/{target}")
    }
}

pub(crate) fn parse_workbook_sheets(
    workbook_xml: &str,
) -> Result<Vec<WorkbookSheetInfo>, XlsxError> {
    let mut reader = Reader::from_str(workbook_xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut sheets = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Empty(e) | Event::Start(e) => {
                if e.local_name().as_ref() == b"sheet" {
                    sheets.push(parse_sheet_element(&e)?);
                }
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(sheets)
}

fn parse_sheet_element(e: &BytesStart<'_>) -> Result<WorkbookSheetInfo, XlsxError> {
    let mut name: Option<String> = None;
    let mut sheet_id: Option<u32> = None;
    let mut rel_id: Option<String> = None;

    for attr in e.attributes() {
        let attr = attr?;
        let key = attr.key.as_ref();
        match key {
            b"name" => name = Some(attr.unescape_value()?.to_string()),
            b"sheetId" => {
                let v = attr.unescape_value()?;
                sheet_id = Some(
                    v.parse::<u32>()
                        .map_err(|_| XlsxError::Invalid("invalid sheetId value".to_owned()))?,
                );
            }
            _ if local_name(key) == b"id" => rel_id = Some(attr.unescape_value()?.to_string()),
            _ => {}
        }
    }

    Ok(WorkbookSheetInfo {
        name: name.ok_or(XlsxError::MissingAttr("name"))?,
        sheet_id: sheet_id.ok_or(XlsxError::MissingAttr("sheetId"))?,
        rel_id: rel_id.ok_or(XlsxError::MissingAttr("r:id"))?,
    })
}

/// Strip an XML namespace prefix from a qualified attribute/element name.
pub(crate) fn local_name(qname: &[u8]) -> &[u8] {
    match qname.iter().rposition(|&b| b == b':') {
        Some(pos) => &qname[pos + 1..],
        None => qname,
    }
}

/// Look up a relationship target by `Id` in a `.rels` part.
pub(crate) fn relationship_target(
    rels_xml: &str,
    rel_id: &str,
) -> Result<Option<String>, XlsxError> {
    let mut reader = Reader::from_str(rels_xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Empty(e) | Event::Start(e) => {
                if e.local_name().as_ref() == b"Relationship" {
                    let mut id: Option<String> = None;
                    let mut target: Option<String> = None;
                    for attr in e.attributes() {
                        let attr = attr?;
                        match attr.key.as_ref() {
                            b"Id" => id = Some(attr.unescape_value()?.to_string()),
                            b"Target" => target = Some(attr.unescape_value()?.to_string()),
                            _ => {}
                        }
                    }
                    if id.as_deref() == Some(rel_id) {
                        return Ok(target);
                    }
                }
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{fixture_xlsx, FixtureSheet};

    #[test]
    fn package_round_trip_preserves_parts() {
        let bytes = fixture_xlsx(&[FixtureSheet::named("Sheet1")]).unwrap();
        let mut pkg = XlsxPackage::from_bytes(&bytes).unwrap();
        pkg.set_part("docProps/custom.xml", b"<x/>".to_vec());
        let repacked = pkg.to_bytes().unwrap();
        let reopened = XlsxPackage::from_bytes(&repacked).unwrap();
        assert_eq!(reopened.part("docProps/custom.xml"), Some(&b"<x/>"[..]));
        assert!(reopened.part("xl/workbook.xml").is_some());
    }

    #[test]
    fn sheets_are_parsed_in_tab_order() {
        let bytes =
            fixture_xlsx(&[FixtureSheet::named("Data"), FixtureSheet::named("Summary")]).unwrap();
        let pkg = XlsxPackage::from_bytes(&bytes).unwrap();
        let sheets = pkg.sheets().unwrap();
        let names: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Data", "Summary"]);
    }

    #[test]
    fn worksheet_part_resolves_through_relationships() {
        let bytes =
            fixture_xlsx(&[FixtureSheet::named("Data"), FixtureSheet::named("Summary")]).unwrap();
        let pkg = XlsxPackage::from_bytes(&bytes).unwrap();
        assert_eq!(
            pkg.worksheet_part("Summary").unwrap(),
            "xl/worksheets/sheet2.xml"
        );
        assert!(matches!(
            pkg.worksheet_part("Nope"),
            Err(XlsxError::MissingSheet(_))
        ));
    }

    #[test]
    fn relationship_lookup_misses_cleanly() {
        let rels = r#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="t" Target="worksheets/sheet1.xml"/>
</Relationships>"#;
        assert_eq!(
            relationship_target(rels, "rId1").unwrap().as_deref(),
            Some("worksheets/sheet1.xml")
        );
        assert_eq!(relationship_target(rels, "rId9").unwrap(), None);
    }
}
