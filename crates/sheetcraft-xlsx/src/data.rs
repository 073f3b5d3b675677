//! Tabular input adapters: JSON, CSV and XML sources are converted into a
//! uniform row/column representation before insertion.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

use crate::package::XlsxError;

/// A single cell value in the internal tabular representation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Best-effort typed parse used by the text-based adapters (CSV, XML).
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }
        match trimmed {
            "true" | "TRUE" => return CellValue::Bool(true),
            "false" | "FALSE" => return CellValue::Bool(false),
            _ => {}
        }
        if let Ok(number) = trimmed.parse::<f64>() {
            if number.is_finite() {
                return CellValue::Number(number);
            }
        }
        CellValue::Text(raw.to_owned())
    }

    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_owned())
    }
}

/// A rectangular block of data: column names plus value rows.
///
/// Rows may be ragged; short rows read as [`CellValue::Empty`] in the
/// missing trailing columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl TableData {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Build from a JSON document: either an array of uniform objects, or an
    /// array of arrays whose first row is taken as the header.
    pub fn from_json(json: &str) -> Result<Self, XlsxError> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|err| XlsxError::Adapter(format!("invalid json: {err}")))?;
        let serde_json::Value::Array(items) = value else {
            return Err(XlsxError::Adapter(
                "expected a top-level json array".to_owned(),
            ));
        };
        if items.is_empty() {
            return Ok(Self::default());
        }
        match &items[0] {
            serde_json::Value::Object(first) => {
                // Column order follows the first object's key order.
                let columns: Vec<String> = first.keys().cloned().collect();
                let mut data = Self::new(columns);
                for item in &items {
                    let serde_json::Value::Object(map) = item else {
                        return Err(XlsxError::Adapter(
                            "mixed array/object rows in json input".to_owned(),
                        ));
                    };
                    let row = data
                        .columns
                        .iter()
                        .map(|column| match map.get(column) {
                            None => Ok(CellValue::Empty),
                            Some(value) => json_cell(value),
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    data.push_row(row);
                }
                Ok(data)
            }
            serde_json::Value::Array(header) => {
                let columns = header
                    .iter()
                    .map(|value| match value {
                        serde_json::Value::String(s) => Ok(s.clone()),
                        other => Err(XlsxError::Adapter(format!(
                            "header row must be strings, got {other}"
                        ))),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let mut data = Self::new(columns);
                for item in &items[1..] {
                    let serde_json::Value::Array(cells) = item else {
                        return Err(XlsxError::Adapter(
                            "mixed array/object rows in json input".to_owned(),
                        ));
                    };
                    let row = cells.iter().map(json_cell).collect::<Result<Vec<_>, _>>()?;
                    data.push_row(row);
                }
                Ok(data)
            }
            other => Err(XlsxError::Adapter(format!(
                "unsupported json row type: {other}"
            ))),
        }
    }

    /// Build from CSV input with a header row. Values are type-inferred.
    pub fn from_csv(bytes: &[u8]) -> Result<Self, XlsxError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);
        let columns = reader
            .headers()
            .map_err(|err| XlsxError::Adapter(format!("invalid csv header: {err}")))?
            .iter()
            .map(str::to_owned)
            .collect();
        let mut data = Self::new(columns);
        for record in reader.records() {
            let record =
                record.map_err(|err| XlsxError::Adapter(format!("invalid csv record: {err}")))?;
            data.push_row(record.iter().map(CellValue::infer).collect());
        }
        Ok(data)
    }

    /// Build from a flat record-oriented XML document: each child of the root
    /// is a record, each child of a record is a field named by its tag.
    pub fn from_xml(xml: &str) -> Result<Self, XlsxError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut data = Self::default();
        let mut buf = Vec::new();
        let mut depth: usize = 0;
        let mut row: Vec<CellValue> = Vec::new();
        let mut field: Option<String> = None;
        let mut text = String::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Eof => break,
                Event::Start(e) => {
                    depth += 1;
                    match depth {
                        2 => row = vec![CellValue::Empty; data.columns.len()],
                        3 => {
                            field = Some(
                                String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                            );
                            text.clear();
                        }
                        _ => {}
                    }
                }
                Event::Empty(e) => {
                    if depth == 2 {
                        let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                        set_xml_field(&mut data, &mut row, &name, CellValue::Empty);
                    }
                }
                Event::Text(t) => {
                    if field.is_some() {
                        text.push_str(&t.unescape()?);
                    }
                }
                Event::End(_) => {
                    match depth {
                        3 => {
                            if let Some(name) = field.take() {
                                set_xml_field(
                                    &mut data,
                                    &mut row,
                                    &name,
                                    CellValue::infer(&text),
                                );
                            }
                        }
                        2 => data.rows.push(std::mem::take(&mut row)),
                        _ => {}
                    }
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            }
            buf.clear();
        }
        Ok(data)
    }
}

fn json_cell(value: &serde_json::Value) -> Result<CellValue, XlsxError> {
    match value {
        serde_json::Value::Null => Ok(CellValue::Empty),
        serde_json::Value::Bool(b) => Ok(CellValue::Bool(*b)),
        serde_json::Value::Number(n) => n
            .as_f64()
            .map(CellValue::Number)
            .ok_or_else(|| XlsxError::Adapter(format!("non-finite number: {n}"))),
        serde_json::Value::String(s) => Ok(CellValue::Text(s.clone())),
        other => Err(XlsxError::Adapter(format!(
            "unsupported json cell value: {other}"
        ))),
    }
}

/// Record a field value, registering the column on first sight so column
/// order follows first appearance in the document.
fn set_xml_field(data: &mut TableData, row: &mut Vec<CellValue>, name: &str, value: CellValue) {
    let index = match data.columns.iter().position(|c| c == name) {
        Some(index) => index,
        None => {
            data.columns.push(name.to_owned());
            data.columns.len() - 1
        }
    };
    if row.len() <= index {
        row.resize(index + 1, CellValue::Empty);
    }
    row[index] = value;
}
