//! Chart descriptions: declarative, renderer-independent specifications of
//! the five dashboard views.
//!
//! The desktop front end draws them with `egui_plot`; the HTTP front end
//! serializes them to JSON for the browser page.

mod builder;

pub use builder::{build_dashboard, SCATTER_SIZE_MAX};

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// One chart: title, axis labels and the data to plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDescription {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub data: ChartData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartData {
    /// Grouped bars; each group's `values` is aligned with `categories`.
    Bar {
        categories: Vec<String>,
        groups: Vec<BarGroup>,
    },
    Line {
        series: Vec<LineSeries>,
    },
    /// Categorical x axis; `categories` gives the axis order.
    Scatter {
        categories: Vec<String>,
        series: Vec<ScatterSeries>,
    },
    Pie {
        slices: Vec<PieSlice>,
    },
    /// Shared bins; each series' `counts` is aligned with `bins`.
    Histogram {
        bins: Vec<HistogramBin>,
        series: Vec<HistogramSeries>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarGroup {
    pub name: String,
    pub color: Rgb,
    /// `None` where the group has no rows for that category.
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSeries {
    pub name: String,
    pub color: Rgb,
    /// Sorted by year.
    pub points: Vec<LinePoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    pub year: i32,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterSeries {
    pub name: String,
    pub color: Rgb,
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub x: String,
    pub y: f64,
    /// Marker diameter in pixels, `0..=SCATTER_SIZE_MAX`.
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub label: String,
    pub color: Rgb,
    pub value: f64,
    /// Fraction of the total, `0.0..=1.0`.
    pub share: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSeries {
    pub name: String,
    pub color: Rgb,
    pub counts: Vec<u64>,
}

impl ChartDescription {
    /// Number of plotted marks (bars, points, slices, binned observations).
    pub fn point_count(&self) -> usize {
        match &self.data {
            ChartData::Bar { groups, .. } => groups
                .iter()
                .map(|g| g.values.iter().flatten().count())
                .sum(),
            ChartData::Line { series } => series.iter().map(|s| s.points.len()).sum(),
            ChartData::Scatter { series, .. } => series.iter().map(|s| s.points.len()).sum(),
            ChartData::Pie { slices } => slices.len(),
            ChartData::Histogram { series, .. } => series
                .iter()
                .flat_map(|s| s.counts.iter())
                .map(|&c| c as usize)
                .sum(),
        }
    }
}

/// The five views produced for one selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    /// Size of the filtered view the charts were built from.
    pub row_count: usize,
    pub bar: ChartDescription,
    pub line: ChartDescription,
    pub scatter: ChartDescription,
    pub pie: ChartDescription,
    pub histogram: ChartDescription,
}

impl Dashboard {
    /// Charts in display order.
    pub fn charts(&self) -> [&ChartDescription; 5] {
        [
            &self.bar,
            &self.line,
            &self.scatter,
            &self.pie,
            &self.histogram,
        ]
    }
}
