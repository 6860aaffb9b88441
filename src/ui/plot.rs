use std::collections::HashMap;
use std::f64::consts::TAU;

use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, Points, Polygon};

use crate::charts::{
    BarGroup, ChartData, ChartDescription, HistogramBin, HistogramSeries, LineSeries, PieSlice,
    ScatterSeries, SCATTER_SIZE_MAX,
};
use crate::color::Rgb;

const PLOT_HEIGHT: f32 = 260.0;

/// Width of one category slot on a categorical axis.
const GROUP_WIDTH: f64 = 0.8;

pub fn to_color32(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}

// ---------------------------------------------------------------------------
// Chart dispatch (central panel)
// ---------------------------------------------------------------------------

/// Render one chart description with its title.
pub fn chart(ui: &mut Ui, id: &str, chart: &ChartDescription) {
    ui.strong(chart.title.as_str());
    if chart.point_count() == 0 {
        ui.weak("No data for the current selection");
    }

    let plot = Plot::new(id)
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(chart.x_label.as_str())
        .y_axis_label(chart.y_label.as_str())
        .allow_scroll(false);

    match &chart.data {
        ChartData::Bar { categories, groups } => bar_plot(ui, plot, categories, groups),
        ChartData::Line { series } => line_plot(ui, plot, series),
        ChartData::Scatter { categories, series } => scatter_plot(ui, plot, categories, series),
        ChartData::Pie { slices } => pie_plot(ui, plot, slices),
        ChartData::Histogram { bins, series } => histogram_plot(ui, plot, bins, series),
    }
    ui.add_space(12.0);
}

/// Axis label for integer positions on a categorical axis.
fn category_label(labels: &[String], value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

fn categorical<'a>(plot: Plot<'a>, categories: &[String]) -> Plot<'a> {
    let labels = categories.to_vec();
    plot.x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
}

// ---------------------------------------------------------------------------
// Per-kind renderers
// ---------------------------------------------------------------------------

fn bar_plot(ui: &mut Ui, plot: Plot<'_>, categories: &[String], groups: &[BarGroup]) {
    let n = groups.len().max(1) as f64;
    let width = GROUP_WIDTH / n;

    categorical(plot, categories).show(ui, |plot_ui| {
        for (g, group) in groups.iter().enumerate() {
            let offset = (g as f64 - (n - 1.0) / 2.0) * width;
            let bars: Vec<Bar> = group
                .values
                .iter()
                .enumerate()
                .filter_map(|(i, v)| v.map(|v| Bar::new(i as f64 + offset, v).width(width)))
                .collect();
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .name(&group.name)
                    .color(to_color32(group.color)),
            );
        }
    });
}

fn line_plot(ui: &mut Ui, plot: Plot<'_>, series: &[LineSeries]) {
    plot.show(ui, |plot_ui| {
        for s in series {
            let points: Vec<[f64; 2]> = s
                .points
                .iter()
                .map(|p| [f64::from(p.year), p.value])
                .collect();
            plot_ui.line(
                Line::new(points)
                    .name(&s.name)
                    .color(to_color32(s.color))
                    .width(1.5),
            );
        }
    });
}

fn scatter_plot(ui: &mut Ui, plot: Plot<'_>, categories: &[String], series: &[ScatterSeries]) {
    let position: HashMap<&str, f64> = categories
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i as f64))
        .collect();

    categorical(plot, categories).show(ui, |plot_ui| {
        for s in series {
            let color = to_color32(s.color);
            for p in &s.points {
                let Some(&x) = position.get(p.x.as_str()) else {
                    continue;
                };
                let radius = (p.size / 2.0).clamp(1.0, SCATTER_SIZE_MAX / 2.0) as f32;
                plot_ui.points(
                    Points::new(vec![[x, p.y]])
                        .radius(radius)
                        .color(color)
                        .name(&s.name),
                );
            }
        }
    });
}

fn pie_plot(ui: &mut Ui, plot: Plot<'_>, slices: &[PieSlice]) {
    plot.data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .show(ui, |plot_ui| {
            let mut angle = 0.0;
            for slice in slices {
                let sweep = slice.share * TAU;
                plot_ui.polygon(
                    Polygon::new(wedge(angle, sweep))
                        .fill_color(to_color32(slice.color))
                        .stroke(Stroke::new(1.0, Color32::WHITE))
                        .name(format!("{} ({:.1}%)", slice.label, slice.share * 100.0)),
                );
                angle += sweep;
            }
        });
}

/// Unit-circle wedge from `start` sweeping `sweep` radians.
fn wedge(start: f64, sweep: f64) -> Vec<[f64; 2]> {
    let steps = ((sweep / TAU) * 90.0).ceil().max(1.0) as usize;
    let mut points = Vec::with_capacity(steps + 2);
    points.push([0.0, 0.0]);
    for i in 0..=steps {
        let a = start + sweep * i as f64 / steps as f64;
        points.push([a.cos(), a.sin()]);
    }
    points
}

fn histogram_plot(ui: &mut Ui, plot: Plot<'_>, bins: &[HistogramBin], series: &[HistogramSeries]) {
    plot.show(ui, |plot_ui| {
        let mut stacked: Vec<BarChart> = Vec::with_capacity(series.len());
        for s in series {
            let bars: Vec<Bar> = bins
                .iter()
                .zip(&s.counts)
                .map(|(bin, &count)| {
                    Bar::new((bin.start + bin.end) / 2.0, count as f64).width(bin.end - bin.start)
                })
                .collect();
            let below: Vec<&BarChart> = stacked.iter().collect();
            let chart = BarChart::new(bars)
                .name(&s.name)
                .color(to_color32(s.color))
                .stack_on(&below);
            stacked.push(chart);
        }
        for chart in stacked {
            plot_ui.bar_chart(chart);
        }
    });
}
