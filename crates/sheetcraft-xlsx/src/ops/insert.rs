//! Insert operation: write a tabular block into a worksheet's `sheetData`.

use std::collections::HashMap;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use sheetcraft_model::Styles;

use crate::data::{CellValue, TableData};
use crate::openxml::{parse_row_number, CellRef};
use crate::ops::{OpKind, Operation, RenderContext};
use crate::package::{XlsxError, XlsxPackage};
use crate::stylesheet::StyleRegistry;

/// Insert a [`TableData`] block into a worksheet.
///
/// Rows are placed at the anchor row, or below any existing content and any
/// rows written by earlier inserts on the same sheet in this render pass,
/// whichever is lower on the sheet. Text cells are written as inline strings
/// so no shared-string bookkeeping is required.
///
/// Cells can carry named styles: `header_style` covers the header row and
/// `column_styles` maps column names to style names. Names are resolved
/// (inheritance flattened) against `styles` and registered in the package
/// stylesheet on execute.
#[derive(Debug, Clone)]
pub struct InsertTable {
    pub sheet: String,
    pub anchor: CellRef,
    pub data: TableData,
    pub include_header: bool,
    /// Style definitions the names below are resolved against.
    pub styles: Styles,
    pub header_style: Option<String>,
    /// Column name to style name, for body cells.
    pub column_styles: HashMap<String, String>,
}

/// Stylesheet xf indices resolved for one execute call.
struct ResolvedStyles {
    header: Option<u32>,
    columns: Vec<Option<u32>>,
}

impl InsertTable {
    pub fn new(sheet: impl Into<String>, anchor: CellRef, data: TableData) -> Self {
        Self {
            sheet: sheet.into(),
            anchor,
            data,
            include_header: true,
            styles: Styles::default(),
            header_style: None,
            column_styles: HashMap::new(),
        }
    }

    fn resolve_styles(&self, pkg: &mut XlsxPackage) -> Result<ResolvedStyles, XlsxError> {
        if self.header_style.is_none() && self.column_styles.is_empty() {
            return Ok(ResolvedStyles {
                header: None,
                columns: vec![None; self.data.columns.len()],
            });
        }
        let mut registry = StyleRegistry::load(pkg)?;
        let header = match &self.header_style {
            Some(name) => Some(registry.register(&self.styles.resolve(name)?)),
            None => None,
        };
        let mut columns = Vec::with_capacity(self.data.columns.len());
        for column in &self.data.columns {
            match self.column_styles.get(column) {
                Some(name) => columns.push(Some(registry.register(&self.styles.resolve(name)?))),
                None => columns.push(None),
            }
        }
        registry.save(pkg)?;
        Ok(ResolvedStyles { header, columns })
    }

    fn rewrite_worksheet(
        &self,
        xml: &str,
        ctx: &mut RenderContext,
        styles: &ResolvedStyles,
    ) -> Result<String, XlsxError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut writer = Writer::new(Vec::new());
        let mut buf = Vec::new();
        let mut in_sheet_data = false;
        // Highest 1-based row index seen in the existing sheetData.
        let mut max_row: u32 = 0;
        let mut seen_rows: u32 = 0;

        loop {
            let event = reader.read_event_into(&mut buf)?;
            match event {
                Event::Eof => break,
                Event::Start(ref e) if e.local_name().as_ref() == b"sheetData" => {
                    in_sheet_data = true;
                    writer.write_event(Event::Start(e.to_owned()))?;
                }
                Event::Empty(ref e) if e.local_name().as_ref() == b"sheetData" => {
                    // Expand the self-closing element so rows can be added.
                    writer.write_event(Event::Start(e.to_owned()))?;
                    self.write_rows(&mut writer, self.start_row(ctx, 0), ctx, styles)?;
                    writer.write_event(Event::End(BytesEnd::new("sheetData")))?;
                }
                Event::Start(ref e)
                    if in_sheet_data && e.local_name().as_ref() == b"row" =>
                {
                    seen_rows += 1;
                    max_row = max_row.max(row_index_of(e)?.unwrap_or(seen_rows));
                    writer.write_event(Event::Start(e.to_owned()))?;
                }
                Event::Empty(ref e)
                    if in_sheet_data && e.local_name().as_ref() == b"row" =>
                {
                    seen_rows += 1;
                    max_row = max_row.max(row_index_of(e)?.unwrap_or(seen_rows));
                    writer.write_event(Event::Empty(e.to_owned()))?;
                }
                Event::End(ref e) if e.local_name().as_ref() == b"sheetData" => {
                    self.write_rows(&mut writer, self.start_row(ctx, max_row), ctx, styles)?;
                    in_sheet_data = false;
                    writer.write_event(Event::End(e.to_owned()))?;
                }
                other => writer.write_event(other.into_owned())?,
            }
            buf.clear();
        }

        Ok(String::from_utf8(writer.into_inner())?)
    }

    /// First 1-based row for the new block: the anchor, pushed down past
    /// existing content and past rows written earlier in this render pass.
    fn start_row(&self, ctx: &RenderContext, max_existing: u32) -> u32 {
        let mut start = self.anchor.row + 1;
        start = start.max(max_existing + 1);
        if let Some(next) = ctx.next_row(&self.sheet) {
            start = start.max(next);
        }
        start
    }

    fn write_rows(
        &self,
        writer: &mut Writer<Vec<u8>>,
        start_row: u32,
        ctx: &mut RenderContext,
        styles: &ResolvedStyles,
    ) -> Result<(), XlsxError> {
        let mut row_num = start_row;
        if self.include_header && !self.data.columns.is_empty() {
            let header: Vec<CellValue> = self
                .data
                .columns
                .iter()
                .map(|name| CellValue::Text(name.clone()))
                .collect();
            write_row(writer, row_num, self.anchor.col, &header, styles.header)?;
            row_num += 1;
        }
        for row in &self.data.rows {
            self.write_body_row(writer, row_num, row, ctx, styles)?;
            row_num += 1;
        }
        ctx.current_field = None;
        ctx.advance(&self.sheet, row_num);
        Ok(())
    }

    fn write_body_row(
        &self,
        writer: &mut Writer<Vec<u8>>,
        row_num: u32,
        values: &[CellValue],
        ctx: &mut RenderContext,
        styles: &ResolvedStyles,
    ) -> Result<(), XlsxError> {
        let row_attr = row_num.to_string();
        let mut row = BytesStart::new("row");
        row.push_attribute(("r", row_attr.as_str()));
        writer.write_event(Event::Start(row))?;
        for (offset, value) in values.iter().enumerate() {
            ctx.current_field = self.data.columns.get(offset).cloned();
            write_cell(
                writer,
                row_num,
                self.anchor.col + offset as u32,
                value,
                styles.columns.get(offset).copied().flatten(),
            )?;
        }
        writer.write_event(Event::End(BytesEnd::new("row")))?;
        Ok(())
    }
}

fn row_index_of(e: &BytesStart<'_>) -> Result<Option<u32>, XlsxError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"r" {
            return Ok(Some(parse_row_number(&attr.unescape_value()?)?));
        }
    }
    Ok(None)
}

fn write_row(
    writer: &mut Writer<Vec<u8>>,
    row_num: u32,
    start_col: u32,
    values: &[CellValue],
    style_index: Option<u32>,
) -> Result<(), XlsxError> {
    let row_attr = row_num.to_string();
    let mut row = BytesStart::new("row");
    row.push_attribute(("r", row_attr.as_str()));
    writer.write_event(Event::Start(row))?;

    for (offset, value) in values.iter().enumerate() {
        write_cell(writer, row_num, start_col + offset as u32, value, style_index)?;
    }

    writer.write_event(Event::End(BytesEnd::new("row")))?;
    Ok(())
}

fn write_cell(
    writer: &mut Writer<Vec<u8>>,
    row_num: u32,
    col: u32,
    value: &CellValue,
    style_index: Option<u32>,
) -> Result<(), XlsxError> {
    if matches!(value, CellValue::Empty) && style_index.is_none() {
        return Ok(());
    }
    let a1 = CellRef::new(row_num - 1, col).to_a1();
    let mut cell = BytesStart::new("c");
    cell.push_attribute(("r", a1.as_str()));
    let style_attr;
    if let Some(style) = style_index {
        style_attr = style.to_string();
        cell.push_attribute(("s", style_attr.as_str()));
    }
    match value {
        CellValue::Empty => {
            writer.write_event(Event::Empty(cell))?;
        }
        CellValue::Number(n) => {
            writer.write_event(Event::Start(cell))?;
            write_text_element(writer, "v", &n.to_string())?;
            writer.write_event(Event::End(BytesEnd::new("c")))?;
        }
        CellValue::Bool(b) => {
            cell.push_attribute(("t", "b"));
            writer.write_event(Event::Start(cell))?;
            write_text_element(writer, "v", if *b { "1" } else { "0" })?;
            writer.write_event(Event::End(BytesEnd::new("c")))?;
        }
        CellValue::Text(text) => {
            cell.push_attribute(("t", "inlineStr"));
            writer.write_event(Event::Start(cell))?;
            writer.write_event(Event::Start(BytesStart::new("is")))?;
            write_text_element(writer, "t", text)?;
            writer.write_event(Event::End(BytesEnd::new("is")))?;
            writer.write_event(Event::End(BytesEnd::new("c")))?;
        }
    }
    Ok(())
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    tag: &str,
    text: &str,
) -> Result<(), XlsxError> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

impl Operation for InsertTable {
    fn kind(&self) -> OpKind {
        OpKind::Insert
    }

    fn sheet_name(&self) -> Option<&str> {
        Some(&self.sheet)
    }

    fn execute(&self, ctx: &mut RenderContext, pkg: &mut XlsxPackage) -> Result<(), XlsxError> {
        let part = pkg.worksheet_part(&self.sheet)?;
        let styles = self.resolve_styles(pkg)?;
        let xml = pkg.part_string(&part)?;
        let rewritten = self.rewrite_worksheet(&xml, ctx, &styles)?;
        pkg.set_part(&part, rewritten.into_bytes());
        Ok(())
    }
}
