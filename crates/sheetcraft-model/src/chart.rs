//! Chart and mini-chart (sparkline) composites.

use serde::{Deserialize, Serialize};

use crate::border::{Border, BorderOptions};
use crate::collection::KeyedList;
use crate::color::Color;
use crate::fill::{Fill, FillOptions};
use crate::font::{Font, FontOptions};
use crate::geometry::{Location, Size, SizeOptions};
use crate::merge::{apply_field, merge_field, ApplyOptions, Combine, Defaultable, Keyed};

/// Chart kind, decided at construction time.
///
/// A closed variant set: there is no runtime type-name dispatch and no
/// "unknown chart" state to defend against.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    #[default]
    Column,
    Bar,
    Line,
    Pie,
    Doughnut,
    Area,
    Scatter,
    Radar,
}

/// Marker symbol for line/scatter series.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerShape {
    #[default]
    Auto,
    None,
    Circle,
    Square,
    Diamond,
    Triangle,
    X,
}

/// Legend placement.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LegendPosition {
    #[default]
    Right,
    Left,
    Top,
    Bottom,
}

/// Per-series formatting, keyed by series name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Series {
    pub name: String,
    pub fill: Fill,
    pub line: Border,
    pub marker: MarkerShape,
    pub smooth: bool,
}

impl Keyed for Series {
    fn key(&self) -> &str {
        &self.name
    }
}

impl Defaultable for Series {
    fn is_default(&self) -> bool {
        self.fill.is_default()
            && self.line.is_default()
            && self.marker == MarkerShape::default()
            && !self.smooth
    }
}

impl Combine for Series {
    fn combine(&mut self, reference: &Self) {
        let d = Self::default();
        self.fill.combine(&reference.fill);
        self.line.combine(&reference.line);
        merge_field(&mut self.marker, &d.marker, &reference.marker);
        merge_field(&mut self.smooth, &d.smooth, &reference.smooth);
    }
}

/// Chart legend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Legend {
    pub visible: bool,
    pub position: LegendPosition,
}

impl Default for Legend {
    fn default() -> Self {
        Self {
            visible: true,
            position: LegendPosition::default(),
        }
    }
}

impl Defaultable for Legend {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl Combine for Legend {
    fn combine(&mut self, reference: &Self) {
        let d = Self::default();
        merge_field(&mut self.visible, &d.visible, &reference.visible);
        merge_field(&mut self.position, &d.position, &reference.position);
    }
}

/// A chart definition anchored on a worksheet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Chart {
    pub name: String,
    pub kind: ChartKind,
    pub title: String,
    pub title_font: Font,
    pub legend: Legend,
    pub series: KeyedList<Series>,
    pub size: Size,
    pub location: Location,
}

impl Chart {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Keyed for Chart {
    fn key(&self) -> &str {
        &self.name
    }
}

impl Defaultable for Chart {
    fn is_default(&self) -> bool {
        self.kind == ChartKind::default()
            && self.title.is_empty()
            && self.title_font.is_default()
            && self.legend.is_default()
            && self.series.is_empty()
            && self.size.is_default()
            && self.location.is_default()
    }
}

impl Combine for Chart {
    fn combine(&mut self, reference: &Self) {
        let d = Self::default();
        merge_field(&mut self.kind, &d.kind, &reference.kind);
        merge_field(&mut self.title, &d.title, &reference.title);
        self.title_font.combine(&reference.title_font);
        self.legend.combine(&reference.legend);
        self.series.combine(&reference.series);
        self.size.combine(&reference.size);
        self.location.combine(&reference.location);
    }
}

/// Sparse patch for [`Chart`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ChartKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_font: Option<FontOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_position: Option<LegendPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Defaultable for ChartOptions {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl ApplyOptions for Chart {
    type Options = ChartOptions;

    fn apply_options(&mut self, patch: &ChartOptions) {
        apply_field(&mut self.kind, &patch.kind);
        apply_field(&mut self.title, &patch.title);
        if let Some(font) = &patch.title_font {
            self.title_font.apply_options(font);
        }
        apply_field(&mut self.legend.visible, &patch.legend_visible);
        apply_field(&mut self.legend.position, &patch.legend_position);
        if let Some(size) = &patch.size {
            self.size.apply_options(size);
        }
        apply_field(&mut self.location, &patch.location);
    }
}

/// Mini-chart (sparkline) kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MiniChartKind {
    #[default]
    Line,
    Column,
    WinLoss,
}

/// An in-cell mini chart (sparkline).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MiniChart {
    pub name: String,
    pub kind: MiniChartKind,
    pub color: Color,
    pub high_point_color: Color,
    pub location: Location,
}

impl Keyed for MiniChart {
    fn key(&self) -> &str {
        &self.name
    }
}

impl Defaultable for MiniChart {
    fn is_default(&self) -> bool {
        self.kind == MiniChartKind::default()
            && self.color == Color::default()
            && self.high_point_color == Color::default()
            && self.location.is_default()
    }
}

impl Combine for MiniChart {
    fn combine(&mut self, reference: &Self) {
        let d = Self::default();
        merge_field(&mut self.kind, &d.kind, &reference.kind);
        merge_field(&mut self.color, &d.color, &reference.color);
        merge_field(
            &mut self.high_point_color,
            &d.high_point_color,
            &reference.high_point_color,
        );
        self.location.combine(&reference.location);
    }
}

/// Sparse patch for [`MiniChart`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MiniChartOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<MiniChartKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_point_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Defaultable for MiniChartOptions {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl ApplyOptions for MiniChart {
    type Options = MiniChartOptions;

    fn apply_options(&mut self, patch: &MiniChartOptions) {
        apply_field(&mut self.kind, &patch.kind);
        apply_field(&mut self.color, &patch.color);
        apply_field(&mut self.high_point_color, &patch.high_point_color);
        apply_field(&mut self.location, &patch.location);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::border::BorderStyle;

    #[test]
    fn chart_combine_delegates_to_members() {
        let mut chart = Chart::named("Sales");
        chart.kind = ChartKind::Line;
        let mut reference = Chart::named("Template");
        reference.kind = ChartKind::Pie;
        reference.title = "Quarterly".into();
        reference.legend.position = LegendPosition::Bottom;
        let mut series = Series {
            name: "S1".into(),
            marker: MarkerShape::Circle,
            ..Series::default()
        };
        series.line.style = BorderStyle::Thin;
        reference.series.push(series);

        chart.combine(&reference);
        assert_eq!(chart.kind, ChartKind::Line); // explicit kind wins
        assert_eq!(chart.title, "Quarterly");
        assert_eq!(chart.legend.position, LegendPosition::Bottom);
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series.get("S1").unwrap().marker, MarkerShape::Circle);
    }

    #[test]
    fn chart_options_patch_is_sparse() {
        let mut chart = Chart::named("Sales");
        chart.title = "Existing".into();
        chart.kind = ChartKind::Bar;
        let patch = ChartOptions {
            legend_visible: Some(false),
            ..ChartOptions::default()
        };
        chart.apply_options(&patch);
        assert!(!chart.legend.visible);
        assert_eq!(chart.title, "Existing");
        assert_eq!(chart.kind, ChartKind::Bar);
    }
}
