//! `sheetcraft-model` defines the style and settings model for composed
//! Excel documents.
//!
//! Every model type follows the same three-part contract:
//! - defaults are fixed at compile time and [`merge::Defaultable::is_default`]
//!   detects a pristine value;
//! - [`merge::Combine`] merges a reference in, letting explicit values win;
//! - [`merge::ApplyOptions`] applies a sparse all-optional patch.
//!
//! The crate is self-contained (no I/O) so it can be reused by the package
//! layer, serialized style definitions (JSON via `serde_json`, XML via
//! `quick-xml`), and tests.

mod alignment;
mod border;
mod chart;
mod collection;
mod color;
mod document;
mod drawing;
mod effects;
mod error;
mod fill;
mod font;
mod geometry;
pub mod merge;
mod property;
mod shadow;
mod sheet;
mod style;
mod table;

pub use alignment::{
    Alignment, AlignmentOptions, HorizontalAlignment, VerticalAlignment, MAX_TEXT_ROTATION,
    MIN_TEXT_ROTATION,
};
pub use border::{Border, BorderOptions, BorderStyle, Borders};
pub use chart::{
    Chart, ChartKind, ChartOptions, Legend, LegendPosition, MarkerShape, MiniChart, MiniChartKind,
    MiniChartOptions, Series,
};
pub use collection::KeyedList;
pub use color::Color;
pub use document::DocumentSettings;
pub use drawing::{Picture, PictureOptions, Shape, ShapeKind, ShapeOptions};
pub use effects::{Effect, EffectOptions, Effects, MAX_TRANSPARENCY_PCT};
pub use error::StyleError;
pub use fill::{Fill, FillOptions, FillPattern};
pub use font::{Font, FontOptions};
pub use geometry::{Flip, FlipOptions, Location, Size, SizeOptions};
pub use merge::{ApplyOptions, Combine, Defaultable, Keyed};
pub use property::{Properties, Property};
pub use shadow::{Shadow, ShadowOptions};
pub use sheet::{
    SheetSettings, SheetSettingsList, SheetSettingsOptions, DEFAULT_ZOOM_PCT, MAX_ZOOM_PCT,
    MIN_ZOOM_PCT,
};
pub use style::{CellStyle, CellStyleOptions, Styles};
pub use table::{ColumnHeader, ColumnHeaderOptions, ColumnHeaders, Table};
