//! `sheetcraft-xlsx` opens XLSX packages, runs the insert/replace/set
//! operation pipeline over them, and persists the result.
//!
//! The crate treats a workbook as an ordered bag of zip parts
//! ([`XlsxPackage`]); operations rewrite individual worksheet parts with
//! streaming XML passes rather than loading a full document model.

pub mod data;
pub mod fixture;
pub mod openxml;
pub mod ops;
pub mod output;
pub mod package;
pub mod stylesheet;

pub use data::{CellValue, TableData};
pub use openxml::CellRef;
pub use ops::{
    InsertTable, OpKind, Operation, RenderContext, RenderQueue, RenderResult, ReplaceValues,
    SetSettings,
};
pub use output::{CancelToken, Output, SaveOptions};
#[cfg(not(target_arch = "wasm32"))]
pub use output::{save_to_file, save_to_file_async};
pub use package::{WorkbookSheetInfo, XlsxError, XlsxPackage, XlsxPart};
pub use stylesheet::StyleRegistry;
