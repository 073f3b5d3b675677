//! `xl/styles.xml` handling: turn resolved [`CellStyle`]s into `cellXfs`
//! indices that worksheet cells can reference via their `s` attribute.
//!
//! New definitions (fonts, fills, borders, numFmts, xfs) are appended only,
//! so indices already referenced by the document remain stable.

use std::collections::HashMap;
use std::fmt::Write as _;

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use sheetcraft_model::{
    Border, BorderStyle, CellStyle, Defaultable, Fill, FillPattern, Font, HorizontalAlignment,
    VerticalAlignment,
};

use crate::fixture::escape_xml;
use crate::package::{XlsxError, XlsxPackage};

pub(crate) const STYLES_PART: &str = "xl/styles.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Baseline stylesheet for packages that omit the part, matching what Excel
/// writes for a blank workbook.
const DEFAULT_STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <fonts count="1">
    <font><sz val="11"/><color rgb="FF000000"/><name val="Calibri"/></font>
  </fonts>
  <fills count="2">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
  </fills>
  <borders count="1">
    <border><left/><right/><top/><bottom/><diagonal/></border>
  </borders>
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>
  <cellXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
  </cellXfs>
</styleSheet>
"#;

/// Append-only editor over a package's stylesheet.
pub struct StyleRegistry {
    xml: String,
    /// The package had no styles part; saving must also wire up the
    /// content-type override and workbook relationship.
    created: bool,
    counts: SectionCounts,
    next_num_fmt_id: u16,
    new_num_fmts: String,
    new_fonts: String,
    new_fills: String,
    new_borders: String,
    new_xfs: String,
    added: SectionCounts,
    by_name: HashMap<String, u32>,
}

#[derive(Debug, Default, Clone, Copy)]
struct SectionCounts {
    num_fmts: u32,
    fonts: u32,
    fills: u32,
    borders: u32,
    cell_xfs: u32,
}

impl StyleRegistry {
    pub fn load(pkg: &XlsxPackage) -> Result<Self, XlsxError> {
        let (xml, created) = match pkg.part(STYLES_PART) {
            Some(_) => (pkg.part_string(STYLES_PART)?, false),
            None => (DEFAULT_STYLES_XML.to_owned(), true),
        };
        let (counts, max_num_fmt_id) = scan_stylesheet(&xml)?;
        Ok(Self {
            xml,
            created,
            counts,
            next_num_fmt_id: max_num_fmt_id.saturating_add(1).max(164),
            new_num_fmts: String::new(),
            new_fonts: String::new(),
            new_fills: String::new(),
            new_borders: String::new(),
            new_xfs: String::new(),
            added: SectionCounts::default(),
            by_name: HashMap::new(),
        })
    }

    /// Intern a resolved style, returning the `cellXfs` index for it.
    ///
    /// Styles are cached by name, so registering the same name twice in one
    /// registry yields one xf record.
    pub fn register(&mut self, style: &CellStyle) -> u32 {
        if let Some(existing) = self.by_name.get(&style.name) {
            return *existing;
        }

        let font_id = if style.font.is_default() {
            0
        } else {
            self.append_font(&style.font)
        };
        let fill_id = if style.fill.is_default() {
            0
        } else {
            self.append_fill(&style.fill)
        };
        let border_id = if style.borders.is_default() {
            0
        } else {
            let edges: Vec<Option<&Border>> = (0..4).map(|i| style.borders.get(i)).collect();
            self.append_border(&edges)
        };
        let num_fmt_id = if style.number_format.is_empty() {
            0
        } else {
            self.append_num_fmt(&style.number_format)
        };

        let mut xf = String::new();
        let _ = write!(
            xf,
            r#"<xf numFmtId="{num_fmt_id}" fontId="{font_id}" fillId="{fill_id}" borderId="{border_id}" xfId="0""#
        );
        if num_fmt_id != 0 {
            xf.push_str(r#" applyNumberFormat="1""#);
        }
        if font_id != 0 {
            xf.push_str(r#" applyFont="1""#);
        }
        if fill_id != 0 {
            xf.push_str(r#" applyFill="1""#);
        }
        if border_id != 0 {
            xf.push_str(r#" applyBorder="1""#);
        }
        if style.alignment.is_default() {
            xf.push_str("/>");
        } else {
            xf.push_str(r#" applyAlignment="1">"#);
            xf.push_str(&alignment_xml(&style.alignment));
            xf.push_str("</xf>");
        }
        self.new_xfs.push_str(&xf);

        let index = self.counts.cell_xfs + self.added.cell_xfs;
        self.added.cell_xfs += 1;
        self.by_name.insert(style.name.clone(), index);
        index
    }

    fn append_font(&mut self, font: &Font) -> u32 {
        let mut out = String::from("<font>");
        if font.bold {
            out.push_str("<b/>");
        }
        if font.italic {
            out.push_str("<i/>");
        }
        if font.underline {
            out.push_str("<u/>");
        }
        if font.strikethrough {
            out.push_str("<strike/>");
        }
        let _ = write!(
            out,
            r#"<sz val="{}"/><color rgb="{}"/><name val="{}"/></font>"#,
            format_size(font.size_100pt),
            font.color.to_rgb_attr(),
            escape_xml(&font.name)
        );
        self.new_fonts.push_str(&out);
        let id = self.counts.fonts + self.added.fonts;
        self.added.fonts += 1;
        id
    }

    fn append_fill(&mut self, fill: &Fill) -> u32 {
        let pattern = pattern_attr(fill.pattern);
        let mut out = String::new();
        if fill.pattern == FillPattern::None {
            let _ = write!(out, r#"<fill><patternFill patternType="none"/></fill>"#);
        } else {
            let _ = write!(
                out,
                r#"<fill><patternFill patternType="{pattern}"><fgColor rgb="{}"/><bgColor rgb="{}"/></patternFill></fill>"#,
                fill.foreground.to_rgb_attr(),
                fill.background.to_rgb_attr()
            );
        }
        self.new_fills.push_str(&out);
        let id = self.counts.fills + self.added.fills;
        self.added.fills += 1;
        id
    }

    /// Edges are positional: left, right, top, bottom.
    fn append_border(&mut self, edges: &[Option<&Border>]) -> u32 {
        let mut out = String::from("<border>");
        for (tag, edge) in ["left", "right", "top", "bottom"].iter().zip(edges) {
            match edge.and_then(|b| border_style_attr(b.style).map(|s| (b, s))) {
                Some((border, style)) => {
                    let _ = write!(
                        out,
                        r#"<{tag} style="{style}"><color rgb="{}"/></{tag}>"#,
                        border.color.to_rgb_attr()
                    );
                }
                None => {
                    let _ = write!(out, "<{tag}/>");
                }
            }
        }
        out.push_str("<diagonal/></border>");
        self.new_borders.push_str(&out);
        let id = self.counts.borders + self.added.borders;
        self.added.borders += 1;
        id
    }

    fn append_num_fmt(&mut self, code: &str) -> u32 {
        let id = self.next_num_fmt_id;
        self.next_num_fmt_id += 1;
        let _ = write!(
            self.new_num_fmts,
            r#"<numFmt numFmtId="{id}" formatCode="{}"/>"#,
            escape_xml(code)
        );
        self.added.num_fmts += 1;
        u32::from(id)
    }

    /// Write the edited stylesheet back, wiring up the part if it was absent.
    pub fn save(self, pkg: &mut XlsxPackage) -> Result<(), XlsxError> {
        let rewritten = splice_stylesheet(
            &self.xml,
            &self.counts,
            &self.added,
            &self.new_num_fmts,
            &self.new_fonts,
            &self.new_fills,
            &self.new_borders,
            &self.new_xfs,
        )?;
        pkg.set_part(STYLES_PART, rewritten.into_bytes());
        if self.created {
            register_styles_part(pkg)?;
        }
        Ok(())
    }
}

/// Count section children and the highest custom number-format id.
fn scan_stylesheet(xml: &str) -> Result<(SectionCounts, u16), XlsxError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut counts = SectionCounts::default();
    let mut max_num_fmt_id = 163u16;
    let mut section: Option<&'static [u8]> = None;
    let mut depth = 0u32;

    loop {
        let event = reader.read_event_into(&mut buf)?;
        match &event {
            Event::Eof => break,
            Event::Start(e) | Event::Empty(e) => {
                let empty = matches!(event, Event::Empty(_));
                let local = e.local_name();
                let local = local.as_ref();
                if depth == 1 {
                    section = match local {
                        b"numFmts" => Some(b"numFmts".as_slice()),
                        b"fonts" => Some(b"fonts".as_slice()),
                        b"fills" => Some(b"fills".as_slice()),
                        b"borders" => Some(b"borders".as_slice()),
                        b"cellXfs" => Some(b"cellXfs".as_slice()),
                        _ => None,
                    };
                    if empty {
                        section = None;
                    }
                } else if let Some(kind) = section {
                    if depth == 2 {
                        match kind {
                            b"numFmts" => {
                                counts.num_fmts += 1;
                                if let Some(id) = attribute_u16(e, b"numFmtId")? {
                                    max_num_fmt_id = max_num_fmt_id.max(id);
                                }
                            }
                            b"fonts" => counts.fonts += 1,
                            b"fills" => counts.fills += 1,
                            b"borders" => counts.borders += 1,
                            _ => counts.cell_xfs += 1,
                        }
                    }
                }
                if !empty {
                    depth += 1;
                }
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                if depth == 1 && section.map_or(false, |s| s == e.local_name().as_ref()) {
                    section = None;
                }
            }
            _ => {}
        }
        buf.clear();
    }
    Ok((counts, max_num_fmt_id))
}

#[allow(clippy::too_many_arguments)]
fn splice_stylesheet(
    xml: &str,
    counts: &SectionCounts,
    added: &SectionCounts,
    new_num_fmts: &str,
    new_fonts: &str,
    new_fills: &str,
    new_borders: &str,
    new_xfs: &str,
) -> Result<String, XlsxError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    let mut writer = Writer::new(Vec::new());
    let mut buf = Vec::new();
    let has_num_fmts_section = xml.contains("<numFmts");

    loop {
        let event = reader.read_event_into(&mut buf)?;
        match event {
            Event::Eof => break,
            Event::Start(ref e) => {
                let local = e.local_name();
                match local.as_ref() {
                    b"fonts" => {
                        // numFmts must precede fonts in the schema; create the
                        // section here when the document lacks one.
                        if added.num_fmts > 0 && !has_num_fmts_section {
                            write_raw(
                                &mut writer,
                                &format!(
                                    r#"<numFmts count="{}">{new_num_fmts}</numFmts>"#,
                                    added.num_fmts
                                ),
                            )?;
                        }
                        writer.write_event(Event::Start(bump_count(e, counts.fonts + added.fonts)?))?;
                    }
                    b"numFmts" => {
                        writer.write_event(Event::Start(bump_count(
                            e,
                            counts.num_fmts + added.num_fmts,
                        )?))?;
                    }
                    b"fills" => {
                        writer.write_event(Event::Start(bump_count(e, counts.fills + added.fills)?))?;
                    }
                    b"borders" => {
                        writer.write_event(Event::Start(bump_count(
                            e,
                            counts.borders + added.borders,
                        )?))?;
                    }
                    b"cellXfs" => {
                        writer.write_event(Event::Start(bump_count(
                            e,
                            counts.cell_xfs + added.cell_xfs,
                        )?))?;
                    }
                    _ => writer.write_event(Event::Start(e.to_owned()))?,
                }
            }
            Event::End(ref e) => {
                let local = e.local_name();
                match local.as_ref() {
                    b"numFmts" if !new_num_fmts.is_empty() => write_raw(&mut writer, new_num_fmts)?,
                    b"fonts" if !new_fonts.is_empty() => write_raw(&mut writer, new_fonts)?,
                    b"fills" if !new_fills.is_empty() => write_raw(&mut writer, new_fills)?,
                    b"borders" if !new_borders.is_empty() => write_raw(&mut writer, new_borders)?,
                    b"cellXfs" if !new_xfs.is_empty() => write_raw(&mut writer, new_xfs)?,
                    _ => {}
                }
                writer.write_event(Event::End(e.to_owned()))?;
            }
            other => writer.write_event(other.into_owned())?,
        }
        buf.clear();
    }

    Ok(String::from_utf8(writer.into_inner())?)
}

/// Emit pre-built markup verbatim.
fn write_raw(writer: &mut Writer<Vec<u8>>, markup: &str) -> Result<(), XlsxError> {
    writer.write_event(Event::Text(BytesText::from_escaped(markup)))?;
    Ok(())
}

fn bump_count(e: &BytesStart<'_>, count: u32) -> Result<BytesStart<'static>, XlsxError> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut out = BytesStart::new(name);
    let value = count.to_string();
    let mut wrote = false;
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"count" {
            out.push_attribute(("count", value.as_str()));
            wrote = true;
        } else {
            out.push_attribute(attr);
        }
    }
    if !wrote {
        out.push_attribute(("count", value.as_str()));
    }
    Ok(out)
}

fn attribute_u16(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<u16>, XlsxError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(attr.unescape_value()?.parse::<u16>().ok());
        }
    }
    Ok(None)
}

/// Wire a freshly created styles part into the package metadata.
fn register_styles_part(pkg: &mut XlsxPackage) -> Result<(), XlsxError> {
    let types = pkg.part_string(CONTENT_TYPES_PART)?;
    if !types.contains("/xl/styles.xml") {
        let override_entry = r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#;
        let updated = types.replacen("</Types>", override_entry, 1);
        pkg.set_part(CONTENT_TYPES_PART, updated.into_bytes());
    }

    let rels = pkg.part_string(WORKBOOK_RELS_PART)?;
    if !rels.contains("styles.xml") {
        let next_id = next_relationship_id(&rels)?;
        let relationship = format!(
            r#"<Relationship Id="rId{next_id}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#
        );
        let updated = rels.replacen("</Relationships>", &relationship, 1);
        pkg.set_part(WORKBOOK_RELS_PART, updated.into_bytes());
    }
    Ok(())
}

fn next_relationship_id(rels_xml: &str) -> Result<u32, XlsxError> {
    let mut reader = Reader::from_str(rels_xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut max = 0u32;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(ref e) | Event::Empty(ref e)
                if e.local_name().as_ref() == b"Relationship" =>
            {
                for attr in e.attributes() {
                    let attr = attr?;
                    if attr.key.as_ref() == b"Id" {
                        let value = attr.unescape_value()?;
                        if let Some(n) = value.strip_prefix("rId").and_then(|n| n.parse().ok()) {
                            max = max.max(n);
                        }
                    }
                }
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(max + 1)
}

fn format_size(size_100pt: u32) -> String {
    if size_100pt % 100 == 0 {
        (size_100pt / 100).to_string()
    } else {
        format!("{}", size_100pt as f64 / 100.0)
    }
}

fn alignment_xml(alignment: &sheetcraft_model::Alignment) -> String {
    let mut out = String::from("<alignment");
    if let Some(h) = horizontal_attr(alignment.horizontal) {
        let _ = write!(out, r#" horizontal="{h}""#);
    }
    if let Some(v) = vertical_attr(alignment.vertical) {
        let _ = write!(out, r#" vertical="{v}""#);
    }
    if alignment.wrap_text {
        out.push_str(r#" wrapText="1""#);
    }
    if alignment.shrink_to_fit {
        out.push_str(r#" shrinkToFit="1""#);
    }
    if alignment.indent > 0 {
        let _ = write!(out, r#" indent="{}""#, alignment.indent);
    }
    let rotation = alignment.rotation();
    if rotation != 0 {
        // SpreadsheetML encodes downward rotation as 90 + |degrees|.
        let encoded = if rotation >= 0 {
            rotation
        } else {
            90 - rotation
        };
        let _ = write!(out, r#" textRotation="{encoded}""#);
    }
    out.push_str("/>");
    out
}

fn pattern_attr(pattern: FillPattern) -> &'static str {
    match pattern {
        FillPattern::None => "none",
        FillPattern::Solid => "solid",
        FillPattern::Gray125 => "gray125",
        FillPattern::LightGray => "lightGray",
        FillPattern::DarkGray => "darkGray",
        FillPattern::LightHorizontal => "lightHorizontal",
        FillPattern::LightVertical => "lightVertical",
        FillPattern::LightUp => "lightUp",
        FillPattern::LightDown => "lightDown",
    }
}

fn border_style_attr(style: BorderStyle) -> Option<&'static str> {
    match style {
        BorderStyle::None => None,
        BorderStyle::Hair => Some("hair"),
        BorderStyle::Thin => Some("thin"),
        BorderStyle::Medium => Some("medium"),
        BorderStyle::Thick => Some("thick"),
        BorderStyle::Dashed => Some("dashed"),
        BorderStyle::Dotted => Some("dotted"),
        BorderStyle::Double => Some("double"),
    }
}

fn horizontal_attr(alignment: HorizontalAlignment) -> Option<&'static str> {
    match alignment {
        HorizontalAlignment::General => None,
        HorizontalAlignment::Left => Some("left"),
        HorizontalAlignment::Center => Some("center"),
        HorizontalAlignment::Right => Some("right"),
        HorizontalAlignment::Fill => Some("fill"),
        HorizontalAlignment::Justify => Some("justify"),
    }
}

fn vertical_attr(alignment: VerticalAlignment) -> Option<&'static str> {
    match alignment {
        VerticalAlignment::Bottom => None,
        VerticalAlignment::Top => Some("top"),
        VerticalAlignment::Center => Some("center"),
        VerticalAlignment::Justify => Some("justify"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetcraft_model::Color;

    use crate::fixture::{fixture_xlsx, FixtureSheet};

    fn bold_blue() -> CellStyle {
        let mut style = CellStyle::named("Header");
        style.font.bold = true;
        style.fill.pattern = FillPattern::Solid;
        style.fill.foreground = Color::new_argb(0xFF0000FF);
        style
    }

    #[test]
    fn registering_a_style_appends_to_the_default_stylesheet() {
        let input = fixture_xlsx(&[FixtureSheet::named("S")]).unwrap();
        let mut pkg = XlsxPackage::from_bytes(&input).unwrap();

        let mut registry = StyleRegistry::load(&pkg).unwrap();
        let xf = registry.register(&bold_blue());
        assert_eq!(xf, 1);
        // Same name, same index.
        assert_eq!(registry.register(&bold_blue()), 1);
        registry.save(&mut pkg).unwrap();

        let xml = pkg.part_string(STYLES_PART).unwrap();
        assert!(xml.contains("<b/>"));
        assert!(xml.contains(r#"<fgColor rgb="FF0000FF"/>"#));
        assert!(xml.contains(r#"<cellXfs count="2">"#));
        assert!(xml.contains(r#"fontId="1" fillId="2""#));

        // Part wiring for a package that had no stylesheet.
        let types = pkg.part_string(CONTENT_TYPES_PART).unwrap();
        assert!(types.contains("/xl/styles.xml"));
        let rels = pkg.part_string("xl/_rels/workbook.xml.rels").unwrap();
        assert!(rels.contains(r#"Target="styles.xml""#));
    }

    #[test]
    fn number_formats_get_custom_ids() {
        let input = fixture_xlsx(&[FixtureSheet::named("S")]).unwrap();
        let pkg = XlsxPackage::from_bytes(&input).unwrap();

        let mut registry = StyleRegistry::load(&pkg).unwrap();
        let mut style = CellStyle::named("Money");
        style.number_format = "#,##0.00".into();
        registry.register(&style);

        let mut pkg = pkg;
        registry.save(&mut pkg).unwrap();
        let xml = pkg.part_string(STYLES_PART).unwrap();
        assert!(xml.contains(
            r##"<numFmts count="1"><numFmt numFmtId="164" formatCode="#,##0.00"/></numFmts>"##
        ));
        assert!(xml.contains(r#"applyNumberFormat="1""#));
    }

    #[test]
    fn existing_stylesheet_indices_stay_stable() {
        let input = fixture_xlsx(&[FixtureSheet::named("S")]).unwrap();
        let mut pkg = XlsxPackage::from_bytes(&input).unwrap();
        pkg.set_part(STYLES_PART, DEFAULT_STYLES_XML.as_bytes().to_vec());

        // Grow the sheet to two xfs first.
        let mut registry = StyleRegistry::load(&pkg).unwrap();
        registry.register(&bold_blue());
        registry.save(&mut pkg).unwrap();

        // A second pass sees the appended records and keeps counting upward.
        let mut registry = StyleRegistry::load(&pkg).unwrap();
        let mut other = CellStyle::named("Other");
        other.font.italic = true;
        assert_eq!(registry.register(&other), 2);
    }
}
