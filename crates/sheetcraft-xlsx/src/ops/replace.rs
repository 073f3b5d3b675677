//! Replace operation: substitute `{{token}}` placeholders in worksheet text.

use std::collections::HashMap;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::ops::{OpKind, Operation, RenderContext};
use crate::package::{XlsxError, XlsxPackage};

const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// Replace `{{token}}` placeholders in a worksheet's text cells.
///
/// Both inline strings and shared-string cells are covered. A shared string
/// that contains a placeholder is rewritten as an inline string in the cell
/// itself, so other cells referencing the same shared entry keep their
/// original text and the shared-string table is never edited.
#[derive(Debug, Clone)]
pub struct ReplaceValues {
    pub sheet: String,
    pub values: HashMap<String, String>,
}

impl ReplaceValues {
    pub fn new(sheet: impl Into<String>, values: HashMap<String, String>) -> Self {
        Self {
            sheet: sheet.into(),
            values,
        }
    }

    fn rewrite_worksheet(&self, xml: &str, shared: &[String]) -> Result<String, XlsxError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut writer = Writer::new(Vec::new());
        let mut buf = Vec::new();

        loop {
            let event = reader.read_event_into(&mut buf)?;
            match event {
                Event::Eof => break,
                Event::Start(ref e) if e.local_name().as_ref() == b"c" => {
                    let start = e.to_owned();
                    let body = read_cell_body(&mut reader)?;
                    self.write_cell(&mut writer, &start, &body, shared)?;
                }
                other => writer.write_event(other.into_owned())?,
            }
            buf.clear();
        }

        Ok(String::from_utf8(writer.into_inner())?)
    }

    fn write_cell(
        &self,
        writer: &mut Writer<Vec<u8>>,
        start: &BytesStart<'static>,
        body: &CellBody,
        shared: &[String],
    ) -> Result<(), XlsxError> {
        let cell_type = attribute_value(start, b"t")?;
        match cell_type.as_deref() {
            Some("s") => {
                if let Ok(index) = body.v_text.trim().parse::<usize>() {
                    if let Some(original) = shared.get(index) {
                        let replaced = replace_tokens(original, &self.values);
                        if replaced != *original {
                            return write_inline_cell(writer, start, &replaced);
                        }
                    }
                }
            }
            Some("inlineStr") => {
                let replaced = replace_tokens(&body.is_text, &self.values);
                if replaced != body.is_text {
                    return write_inline_cell(writer, start, &replaced);
                }
            }
            _ => {}
        }

        // Untouched cell: re-emit exactly what was read.
        writer.write_event(Event::Start(start.clone()))?;
        for event in &body.events {
            writer.write_event(event.clone())?;
        }
        writer.write_event(Event::End(BytesEnd::new("c")))?;
        Ok(())
    }
}

/// Inner events and extracted text of one `<c>` element.
struct CellBody {
    events: Vec<Event<'static>>,
    /// Concatenated `<v>` text (shared-string index or raw value).
    v_text: String,
    /// Concatenated inline-string text across `<is>` runs.
    is_text: String,
}

fn read_cell_body(reader: &mut Reader<&[u8]>) -> Result<CellBody, XlsxError> {
    let mut buf = Vec::new();
    let mut events = Vec::new();
    let mut depth = 0u32;
    let mut v_text = String::new();
    let mut is_text = String::new();
    let mut in_v = false;
    let mut in_t = false;

    loop {
        let event = reader.read_event_into(&mut buf)?;
        match &event {
            Event::Eof => {
                return Err(XlsxError::Invalid("unterminated cell element".into()));
            }
            Event::Start(e) => {
                match e.local_name().as_ref() {
                    b"v" => in_v = true,
                    b"t" => in_t = true,
                    _ => {}
                }
                depth += 1;
            }
            Event::End(e) => {
                if depth == 0 {
                    if e.local_name().as_ref() != b"c" {
                        return Err(XlsxError::Invalid("malformed cell element".into()));
                    }
                    return Ok(CellBody {
                        events,
                        v_text,
                        is_text,
                    });
                }
                match e.local_name().as_ref() {
                    b"v" => in_v = false,
                    b"t" => in_t = false,
                    _ => {}
                }
                depth -= 1;
            }
            Event::Text(t) => {
                if in_v {
                    v_text.push_str(&t.unescape()?);
                } else if in_t {
                    is_text.push_str(&t.unescape()?);
                }
            }
            _ => {}
        }
        events.push(event.into_owned());
        buf.clear();
    }
}

fn write_inline_cell(
    writer: &mut Writer<Vec<u8>>,
    original: &BytesStart<'static>,
    text: &str,
) -> Result<(), XlsxError> {
    let mut cell = BytesStart::new("c");
    for attr in original.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"t" {
            continue;
        }
        cell.push_attribute(attr);
    }
    cell.push_attribute(("t", "inlineStr"));
    writer.write_event(Event::Start(cell))?;
    writer.write_event(Event::Start(BytesStart::new("is")))?;
    writer.write_event(Event::Start(BytesStart::new("t")))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new("t")))?;
    writer.write_event(Event::End(BytesEnd::new("is")))?;
    writer.write_event(Event::End(BytesEnd::new("c")))?;
    Ok(())
}

fn attribute_value(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, XlsxError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn replace_tokens(text: &str, values: &HashMap<String, String>) -> String {
    if !text.contains("{{") {
        return text.to_owned();
    }
    let mut out = text.to_owned();
    for (key, value) in values {
        let token = format!("{{{{{key}}}}}");
        if out.contains(&token) {
            out = out.replace(&token, value);
        }
    }
    out
}

/// Load the shared-string table, tolerating workbooks that have none.
fn shared_strings(pkg: &XlsxPackage) -> Result<Vec<String>, XlsxError> {
    match pkg.part(SHARED_STRINGS_PART) {
        Some(_) => {
            let xml = pkg.part_string(SHARED_STRINGS_PART)?;
            parse_shared_strings(&xml)
        }
        None => Ok(Vec::new()),
    }
}

fn parse_shared_strings(xml: &str) -> Result<Vec<String>, XlsxError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_si = false;
    let mut in_t = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(ref e) if e.local_name().as_ref() == b"si" => {
                in_si = true;
                current.clear();
            }
            Event::End(ref e) if e.local_name().as_ref() == b"si" => {
                in_si = false;
                strings.push(std::mem::take(&mut current));
            }
            Event::Empty(ref e) if e.local_name().as_ref() == b"si" => {
                strings.push(String::new());
            }
            Event::Start(ref e) if in_si && e.local_name().as_ref() == b"t" => {
                in_t = true;
            }
            Event::End(ref e) if e.local_name().as_ref() == b"t" => {
                in_t = false;
            }
            Event::Text(ref t) if in_t => {
                current.push_str(&t.unescape()?);
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

impl Operation for ReplaceValues {
    fn kind(&self) -> OpKind {
        OpKind::Replace
    }

    fn sheet_name(&self) -> Option<&str> {
        Some(&self.sheet)
    }

    fn execute(&self, _ctx: &mut RenderContext, pkg: &mut XlsxPackage) -> Result<(), XlsxError> {
        let shared = shared_strings(pkg)?;
        let part = pkg.worksheet_part(&self.sheet)?;
        let xml = pkg.part_string(&part)?;
        let rewritten = self.rewrite_worksheet(&xml, &shared)?;
        pkg.set_part(&part, rewritten.into_bytes());
        Ok(())
    }
}
