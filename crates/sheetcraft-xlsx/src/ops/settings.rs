//! Set operation: apply sheet view settings and document properties.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use sheetcraft_model::{Properties, SheetSettings};

use crate::openxml::CellRef;
use crate::ops::{OpKind, Operation, RenderContext};
use crate::package::{XlsxError, XlsxPackage};

const CORE_PROPERTIES_PART: &str = "docProps/core.xml";

/// Apply [`SheetSettings`] to a worksheet and document [`Properties`] to
/// `docProps/core.xml`.
///
/// Unlike Insert and Replace, a Set against a sheet that does not exist in
/// the document is not an error; the settings are simply skipped. Documents
/// are routinely rendered from templates with differing sheet lists, and a
/// stale view tweak should not sink the render.
#[derive(Debug, Clone, Default)]
pub struct SetSettings {
    pub settings: Option<SheetSettings>,
    pub properties: Option<Properties>,
}

impl SetSettings {
    pub fn sheet(settings: SheetSettings) -> Self {
        Self {
            settings: Some(settings),
            properties: None,
        }
    }

    pub fn document(properties: Properties) -> Self {
        Self {
            settings: None,
            properties: Some(properties),
        }
    }

    fn apply_sheet_settings(&self, pkg: &mut XlsxPackage) -> Result<(), XlsxError> {
        let Some(settings) = &self.settings else {
            return Ok(());
        };
        let part = match pkg.worksheet_part(&settings.sheet_name) {
            Ok(part) => part,
            Err(XlsxError::MissingSheet(name)) => {
                log::debug!("set settings: sheet {name:?} not in document, skipping");
                return Ok(());
            }
            Err(err) => return Err(err),
        };
        let xml = pkg.part_string(&part)?;
        let rewritten = rewrite_worksheet(&xml, settings)?;
        pkg.set_part(&part, rewritten.into_bytes());
        Ok(())
    }

    fn apply_document_properties(&self, pkg: &mut XlsxPackage) -> Result<(), XlsxError> {
        let Some(properties) = &self.properties else {
            return Ok(());
        };
        let xml = match pkg.part_string(CORE_PROPERTIES_PART) {
            Ok(xml) => xml,
            Err(XlsxError::MissingPart(_)) => {
                log::warn!("set settings: document has no {CORE_PROPERTIES_PART}, skipping properties");
                return Ok(());
            }
            Err(err) => return Err(err),
        };
        let rewritten = rewrite_core_properties(&xml, properties)?;
        pkg.set_part(CORE_PROPERTIES_PART, rewritten.into_bytes());
        Ok(())
    }
}

impl Operation for SetSettings {
    fn kind(&self) -> OpKind {
        OpKind::Set
    }

    fn sheet_name(&self) -> Option<&str> {
        self.settings.as_ref().map(|s| s.sheet_name.as_str())
    }

    fn execute(&self, _ctx: &mut RenderContext, pkg: &mut XlsxPackage) -> Result<(), XlsxError> {
        self.apply_sheet_settings(pkg)?;
        self.apply_document_properties(pkg)
    }
}

fn rewrite_worksheet(xml: &str, settings: &SheetSettings) -> Result<String, XlsxError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut writer = Writer::new(Vec::new());
    let mut buf = Vec::new();
    let mut in_sheet_pr = false;
    let mut tab_color_written = settings.tab_color.is_none();

    loop {
        let event = reader.read_event_into(&mut buf)?;
        match event {
            Event::Eof => break,
            Event::Start(ref e) if e.local_name().as_ref() == b"sheetPr" => {
                in_sheet_pr = true;
                writer.write_event(Event::Start(e.to_owned()))?;
                if !tab_color_written {
                    write_tab_color(&mut writer, settings)?;
                    tab_color_written = true;
                }
            }
            Event::End(ref e) if e.local_name().as_ref() == b"sheetPr" => {
                in_sheet_pr = false;
                writer.write_event(Event::End(e.to_owned()))?;
            }
            Event::Empty(ref e) if e.local_name().as_ref() == b"sheetPr" => {
                if tab_color_written {
                    writer.write_event(Event::Empty(e.to_owned()))?;
                } else {
                    writer.write_event(Event::Start(e.to_owned()))?;
                    write_tab_color(&mut writer, settings)?;
                    tab_color_written = true;
                    writer.write_event(Event::End(BytesEnd::new("sheetPr")))?;
                }
            }
            // A requested color was already written at the top of sheetPr;
            // without one, the existing tabColor is copied through untouched.
            Event::Empty(ref e)
                if in_sheet_pr
                    && settings.tab_color.is_some()
                    && e.local_name().as_ref() == b"tabColor" => {}
            Event::Start(ref e) if e.local_name().as_ref() == b"sheetViews" => {
                // sheetPr precedes sheetViews in the worksheet schema.
                if !tab_color_written {
                    writer.write_event(Event::Start(BytesStart::new("sheetPr")))?;
                    write_tab_color(&mut writer, settings)?;
                    writer.write_event(Event::End(BytesEnd::new("sheetPr")))?;
                    tab_color_written = true;
                }
                writer.write_event(Event::Start(e.to_owned()))?;
            }
            Event::Start(ref e) if e.local_name().as_ref() == b"sheetView" => {
                let view = rebuild_sheet_view(e, settings)?;
                writer.write_event(Event::Start(view))?;
                if wants_freeze(settings) {
                    write_pane(&mut writer, settings)?;
                }
            }
            Event::Empty(ref e) if e.local_name().as_ref() == b"sheetView" => {
                let view = rebuild_sheet_view(e, settings)?;
                if wants_freeze(settings) {
                    writer.write_event(Event::Start(view))?;
                    write_pane(&mut writer, settings)?;
                    writer.write_event(Event::End(BytesEnd::new("sheetView")))?;
                } else {
                    writer.write_event(Event::Empty(view))?;
                }
            }
            // Superseded by the pane written right after the view opens. An
            // existing pane survives a Set that requests no freeze.
            Event::Empty(ref e)
                if wants_freeze(settings) && e.local_name().as_ref() == b"pane" => {}
            other => writer.write_event(other.into_owned())?,
        }
        buf.clear();
    }

    Ok(String::from_utf8(writer.into_inner())?)
}

/// Copy the view element minus the attributes this operation owns, then
/// re-add those that differ from the file-format defaults.
fn rebuild_sheet_view(
    original: &BytesStart<'_>,
    settings: &SheetSettings,
) -> Result<BytesStart<'static>, XlsxError> {
    let mut view = BytesStart::new("sheetView");
    for attr in original.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"showGridLines" | b"showRowColHeaders" | b"zoomScale" => {}
            _ => view.push_attribute(attr),
        }
    }
    if !settings.show_gridlines {
        view.push_attribute(("showGridLines", "0"));
    }
    if !settings.show_headings {
        view.push_attribute(("showRowColHeaders", "0"));
    }
    if settings.zoom_pct() != 100 {
        let zoom = settings.zoom_pct().to_string();
        view.push_attribute(("zoomScale", zoom.as_str()));
    }
    Ok(view)
}

fn wants_freeze(settings: &SheetSettings) -> bool {
    settings.frozen_rows > 0 || settings.frozen_cols > 0
}

fn write_pane(writer: &mut Writer<Vec<u8>>, settings: &SheetSettings) -> Result<(), XlsxError> {
    let x_split = settings.frozen_cols.to_string();
    let y_split = settings.frozen_rows.to_string();
    let top_left = CellRef::new(settings.frozen_rows, settings.frozen_cols).to_a1();
    let active = match (settings.frozen_rows > 0, settings.frozen_cols > 0) {
        (true, true) => "bottomRight",
        (true, false) => "bottomLeft",
        _ => "topRight",
    };
    let mut pane = BytesStart::new("pane");
    if settings.frozen_cols > 0 {
        pane.push_attribute(("xSplit", x_split.as_str()));
    }
    if settings.frozen_rows > 0 {
        pane.push_attribute(("ySplit", y_split.as_str()));
    }
    pane.push_attribute(("topLeftCell", top_left.as_str()));
    pane.push_attribute(("activePane", active));
    pane.push_attribute(("state", "frozen"));
    writer.write_event(Event::Empty(pane))?;
    Ok(())
}

fn write_tab_color(writer: &mut Writer<Vec<u8>>, settings: &SheetSettings) -> Result<(), XlsxError> {
    if let Some(color) = settings.tab_color {
        let rgb = color.to_rgb_attr();
        let mut tab = BytesStart::new("tabColor");
        tab.push_attribute(("rgb", rgb.as_str()));
        writer.write_event(Event::Empty(tab))?;
    }
    Ok(())
}

/// Qualified core-property element for a property name, if it maps to one.
fn core_tag(name: &str) -> Option<&'static str> {
    Some(match name {
        "title" => "dc:title",
        "subject" => "dc:subject",
        "creator" => "dc:creator",
        "description" => "dc:description",
        "keywords" => "cp:keywords",
        "category" => "cp:category",
        "lastModifiedBy" => "cp:lastModifiedBy",
        _ => return None,
    })
}

fn rewrite_core_properties(xml: &str, properties: &Properties) -> Result<String, XlsxError> {
    let mut pending: Vec<(&'static str, String)> = Vec::new();
    for property in properties.iter() {
        match core_tag(&property.name) {
            Some(tag) => pending.push((tag, property.value.clone())),
            None => log::warn!(
                "set settings: unsupported document property {:?}, skipping",
                property.name
            ),
        }
    }

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut writer = Writer::new(Vec::new());
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf)?;
        match event {
            Event::Eof => break,
            Event::Start(ref e)
                if pending.iter().any(|(tag, _)| e.name().as_ref() == tag.as_bytes()) =>
            {
                let index = pending
                    .iter()
                    .position(|(tag, _)| e.name().as_ref() == tag.as_bytes())
                    .unwrap_or(0);
                let (_, value) = pending.remove(index);
                writer.write_event(Event::Start(e.to_owned()))?;
                writer.write_event(Event::Text(BytesText::new(&value)))?;
                writer.write_event(Event::End(BytesEnd::new(
                    String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                )))?;
                skip_element(&mut reader)?;
            }
            Event::Empty(ref e)
                if pending.iter().any(|(tag, _)| e.name().as_ref() == tag.as_bytes()) =>
            {
                let index = pending
                    .iter()
                    .position(|(tag, _)| e.name().as_ref() == tag.as_bytes())
                    .unwrap_or(0);
                let (tag, value) = pending.remove(index);
                writer.write_event(Event::Start(BytesStart::new(tag)))?;
                writer.write_event(Event::Text(BytesText::new(&value)))?;
                writer.write_event(Event::End(BytesEnd::new(tag)))?;
            }
            Event::End(ref e) if e.local_name().as_ref() == b"coreProperties" => {
                // Properties absent from the document are appended.
                for (tag, value) in pending.drain(..) {
                    writer.write_event(Event::Start(BytesStart::new(tag)))?;
                    writer.write_event(Event::Text(BytesText::new(&value)))?;
                    writer.write_event(Event::End(BytesEnd::new(tag)))?;
                }
                writer.write_event(Event::End(e.to_owned()))?;
            }
            other => writer.write_event(other.into_owned())?,
        }
        buf.clear();
    }

    Ok(String::from_utf8(writer.into_inner())?)
}

/// Consume the remaining events of the element whose start was just read.
fn skip_element(reader: &mut Reader<&[u8]>) -> Result<(), XlsxError> {
    let mut buf = Vec::new();
    let mut depth = 0u32;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => {
                return Err(XlsxError::Invalid("unterminated element".into()));
            }
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                if depth == 0 {
                    return Ok(());
                }
                depth -= 1;
            }
            _ => {}
        }
        buf.clear();
    }
}
