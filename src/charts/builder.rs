use std::collections::{BTreeMap, HashMap};

use super::{
    BarGroup, ChartData, ChartDescription, Dashboard, HistogramBin, HistogramSeries, LinePoint,
    LineSeries, PieSlice, ScatterPoint, ScatterSeries,
};
use crate::color::{ColorMap, SeriesColors};
use crate::data::filter::FilteredView;
use crate::data::model::{distinct_in_order, Record};

/// Number of equal-width histogram bins.
pub const HISTOGRAM_BINS: usize = 20;

/// Largest scatter marker diameter, given to the largest value in the view.
pub const SCATTER_SIZE_MAX: f64 = 20.0;

/// Build all five charts from one filtered view.
pub fn build_dashboard(view: &FilteredView<'_>, colors: &SeriesColors) -> Dashboard {
    let rows: Vec<&Record> = view.iter().collect();
    Dashboard {
        row_count: rows.len(),
        bar: bar_chart(&rows, &colors.region),
        line: line_chart(&rows, &colors.powertrain),
        scatter: scatter_chart(&rows, &colors.mode),
        pie: pie_chart(&rows, &colors.region),
        histogram: histogram(&rows, &colors.category),
    }
}

/// Rows grouped by a label column, groups in first-appearance order.
fn group_by<'a>(rows: &[&'a Record], key: fn(&Record) -> &str) -> Vec<(&'a str, Vec<&'a Record>)> {
    let mut groups: Vec<(&'a str, Vec<&'a Record>)> = Vec::new();
    let mut slot: HashMap<&'a str, usize> = HashMap::new();
    for &row in rows {
        let label = key(row);
        let idx = *slot.entry(label).or_insert_with(|| {
            groups.push((label, Vec::new()));
            groups.len() - 1
        });
        groups[idx].1.push(row);
    }
    groups
}

fn describe(title: &str, x_label: &str, y_label: &str, data: ChartData) -> ChartDescription {
    ChartDescription {
        title: title.to_string(),
        x_label: x_label.to_string(),
        y_label: y_label.to_string(),
        data,
    }
}

// ---------------------------------------------------------------------------
// Bar: value by category, grouped by region
// ---------------------------------------------------------------------------

fn bar_chart(rows: &[&Record], colors: &ColorMap) -> ChartDescription {
    let categories = distinct_in_order(rows.iter().map(|r| r.category.as_str()));

    let groups = group_by(rows, |r| r.region.as_str())
        .into_iter()
        .map(|(region, members)| {
            let mut sums: HashMap<&str, f64> = HashMap::new();
            for r in members {
                *sums.entry(r.category.as_str()).or_insert(0.0) += r.value;
            }
            BarGroup {
                name: region.to_string(),
                color: colors.color_for(region),
                values: categories.iter().map(|c| sums.get(c).copied()).collect(),
            }
        })
        .collect();

    describe(
        "Value by Category and Region",
        "category",
        "value",
        ChartData::Bar {
            categories: categories.into_iter().map(str::to_string).collect(),
            groups,
        },
    )
}

// ---------------------------------------------------------------------------
// Line: yearly totals per powertrain
// ---------------------------------------------------------------------------

fn line_chart(rows: &[&Record], colors: &ColorMap) -> ChartDescription {
    let series = group_by(rows, |r| r.powertrain.as_str())
        .into_iter()
        .map(|(powertrain, members)| {
            let mut by_year: BTreeMap<i32, f64> = BTreeMap::new();
            for r in members {
                *by_year.entry(r.year).or_insert(0.0) += r.value;
            }
            LineSeries {
                name: powertrain.to_string(),
                color: colors.color_for(powertrain),
                points: by_year
                    .into_iter()
                    .map(|(year, value)| LinePoint { year, value })
                    .collect(),
            }
        })
        .collect();

    describe(
        "Trends Over Years by Powertrain",
        "year",
        "value",
        ChartData::Line { series },
    )
}

// ---------------------------------------------------------------------------
// Scatter: parameter vs value, coloured by mode, sized by value
// ---------------------------------------------------------------------------

fn scatter_chart(rows: &[&Record], colors: &ColorMap) -> ChartDescription {
    let categories = distinct_in_order(rows.iter().map(|r| r.parameter.as_str()));
    let max = rows
        .iter()
        .map(|r| r.value)
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);

    let series = group_by(rows, |r| r.mode.as_str())
        .into_iter()
        .map(|(mode, members)| ScatterSeries {
            name: mode.to_string(),
            color: colors.color_for(mode),
            points: members
                .into_iter()
                .map(|r| ScatterPoint {
                    x: r.parameter.clone(),
                    y: r.value,
                    size: marker_size(r.value, max),
                })
                .collect(),
        })
        .collect();

    describe(
        "Parameter vs Value",
        "parameter",
        "value",
        ChartData::Scatter {
            categories: categories.into_iter().map(str::to_string).collect(),
            series,
        },
    )
}

/// Area-proportional marker diameter.
fn marker_size(value: f64, max: f64) -> f64 {
    if value.is_finite() && value > 0.0 && max > 0.0 {
        SCATTER_SIZE_MAX * (value / max).sqrt()
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Pie: value share by region
// ---------------------------------------------------------------------------

fn pie_chart(rows: &[&Record], colors: &ColorMap) -> ChartDescription {
    let counted: Vec<&Record> = rows
        .iter()
        .copied()
        .filter(|r| r.value.is_finite() && r.value >= 0.0)
        .collect();

    let totals: Vec<(&str, f64)> = group_by(&counted, |r| r.region.as_str())
        .into_iter()
        .map(|(region, members)| (region, members.iter().map(|r| r.value).sum()))
        .collect();
    let total: f64 = totals.iter().map(|(_, v)| v).sum();

    let slices = totals
        .into_iter()
        .map(|(region, value)| PieSlice {
            label: region.to_string(),
            color: colors.color_for(region),
            value,
            share: if total > 0.0 { value / total } else { 0.0 },
        })
        .collect();

    describe(
        "Distribution by Region",
        "region",
        "value",
        ChartData::Pie { slices },
    )
}

// ---------------------------------------------------------------------------
// Histogram: value distribution by category
// ---------------------------------------------------------------------------

fn histogram(rows: &[&Record], colors: &ColorMap) -> ChartDescription {
    let finite: Vec<&Record> = rows
        .iter()
        .copied()
        .filter(|r| r.value.is_finite())
        .collect();
    let bins = histogram_bins(finite.iter().map(|r| r.value));

    let series = group_by(&finite, |r| r.category.as_str())
        .into_iter()
        .map(|(category, members)| {
            let mut counts = vec![0_u64; bins.len()];
            for r in members {
                if let Some(i) = bin_index(&bins, r.value) {
                    counts[i] += 1;
                }
            }
            HistogramSeries {
                name: category.to_string(),
                color: colors.color_for(category),
                counts,
            }
        })
        .collect();

    describe(
        "Value Distribution by Category",
        "value",
        "count",
        ChartData::Histogram { bins, series },
    )
}

/// Equal-width bins over `[min, max]`; a single distinct value gets one bin
/// of width 1 centred on it.
fn histogram_bins(values: impl Iterator<Item = f64>) -> Vec<HistogramBin> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if min > max {
        return Vec::new();
    }
    if min == max {
        return vec![HistogramBin {
            start: min - 0.5,
            end: min + 0.5,
        }];
    }
    // Divide before subtracting so the span cannot overflow to infinity.
    let n = HISTOGRAM_BINS as f64;
    let width = max / n - min / n;
    (0..HISTOGRAM_BINS)
        .map(|i| HistogramBin {
            start: min + i as f64 * width,
            end: if i + 1 == HISTOGRAM_BINS {
                max
            } else {
                min + (i + 1) as f64 * width
            },
        })
        .collect()
}

/// Bins are half-open except the last, which also takes its upper edge.
fn bin_index(bins: &[HistogramBin], value: f64) -> Option<usize> {
    let (first, last) = (bins.first()?, bins.last()?);
    if value < first.start || value > last.end {
        return None;
    }
    if bins.len() == 1 {
        return Some(0);
    }
    let width = first.end - first.start;
    let idx = (value / width - first.start / width).floor() as usize;
    Some(idx.min(bins.len() - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter, Selection, YearRange};
    use crate::data::model::fixtures::{north_south, record};
    use crate::data::model::RecordSet;

    fn colors(set: &RecordSet) -> SeriesColors {
        SeriesColors {
            region: ColorMap::new(set.regions()),
            powertrain: ColorMap::new(set.powertrains()),
            mode: ColorMap::new(set.modes()),
            category: ColorMap::new(set.categories()),
        }
    }

    fn dashboard_for(set: &RecordSet, regions: &[&str], start: i32, end: i32) -> Dashboard {
        let selection = Selection::new(
            regions.iter().copied(),
            YearRange::new(start, end).unwrap(),
        );
        build_dashboard(&filter(set, &selection), &colors(set))
    }

    #[test]
    fn charts_come_in_display_order() {
        let set = north_south();
        let dash = dashboard_for(&set, &[], 2020, 2022);
        let titles: Vec<&str> = dash.charts().iter().map(|c| c.title.as_str()).collect();
        assert_eq!(
            titles,
            [
                "Value by Category and Region",
                "Trends Over Years by Powertrain",
                "Parameter vs Value",
                "Distribution by Region",
                "Value Distribution by Category"
            ]
        );
        assert!(matches!(dash.bar.data, ChartData::Bar { .. }));
        assert!(matches!(dash.histogram.data, ChartData::Histogram { .. }));
        assert_eq!(dash.row_count, 6);
    }

    #[test]
    fn single_region_pie_has_full_share() {
        let set = north_south();
        let dash = dashboard_for(&set, &["North"], 2021, 2022);
        assert_eq!(dash.row_count, 2);

        let ChartData::Pie { slices } = &dash.pie.data else {
            panic!("pie chart expected");
        };
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].label, "North");
        assert_eq!(slices[0].share, 1.0);
        assert_eq!(slices[0].value, 20.0 + 30.0);
    }

    #[test]
    fn empty_view_yields_empty_charts() {
        let set = RecordSet::from_records(vec![
            record("North", 2021, 1.0),
            record("South", 2022, 2.0),
        ])
        .unwrap();
        let dash = dashboard_for(&set, &[], 2020, 2020);
        assert_eq!(dash.row_count, 0);
        for chart in dash.charts() {
            assert_eq!(chart.point_count(), 0, "{}", chart.title);
        }
    }

    #[test]
    fn same_selection_gives_same_dashboard() {
        let set = north_south();
        let first = dashboard_for(&set, &["South"], 2020, 2021);
        let second = dashboard_for(&set, &["South"], 2020, 2021);
        assert_eq!(first, second);
    }

    #[test]
    fn pie_shares_sum_to_one() {
        let set = north_south();
        let dash = dashboard_for(&set, &[], 2020, 2022);
        let ChartData::Pie { slices } = &dash.pie.data else {
            panic!("pie chart expected");
        };
        let total: f64 = slices.iter().map(|s| s.share).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn bar_sums_rows_per_category_and_region() {
        let mut north_projection = record("North", 2021, 7.0);
        north_projection.category = "Projection".to_string();
        let set = RecordSet::from_records(vec![
            record("North", 2020, 1.0),
            record("North", 2021, 2.0),
            north_projection,
            record("South", 2020, 4.0),
        ])
        .unwrap();
        let dash = dashboard_for(&set, &[], 2020, 2021);
        let ChartData::Bar { categories, groups } = &dash.bar.data else {
            panic!("bar chart expected");
        };
        assert_eq!(categories, &["Historical", "Projection"]);
        assert_eq!(groups[0].name, "North");
        assert_eq!(groups[0].values, [Some(3.0), Some(7.0)]);
        assert_eq!(groups[1].name, "South");
        assert_eq!(groups[1].values, [Some(4.0), None]);
        assert_eq!(dash.bar.point_count(), 3);
    }

    #[test]
    fn line_points_are_yearly_totals_in_order() {
        let set = RecordSet::from_records(vec![
            record("North", 2022, 1.0),
            record("South", 2020, 2.0),
            record("North", 2020, 3.0),
        ])
        .unwrap();
        let dash = dashboard_for(&set, &[], 2020, 2022);
        let ChartData::Line { series } = &dash.line.data else {
            panic!("line chart expected");
        };
        assert_eq!(series.len(), 1);
        assert_eq!(
            series[0].points,
            [
                LinePoint { year: 2020, value: 5.0 },
                LinePoint { year: 2022, value: 1.0 }
            ]
        );
    }

    #[test]
    fn scatter_sizes_scale_with_sqrt_of_value() {
        let set = RecordSet::from_records(vec![
            record("North", 2020, 100.0),
            record("North", 2021, 25.0),
            record("North", 2022, -5.0),
        ])
        .unwrap();
        let dash = dashboard_for(&set, &[], 2020, 2022);
        let ChartData::Scatter { series, categories } = &dash.scatter.data else {
            panic!("scatter chart expected");
        };
        assert_eq!(categories, &["EV sales"]);
        let sizes: Vec<f64> = series[0].points.iter().map(|p| p.size).collect();
        assert_eq!(sizes, [SCATTER_SIZE_MAX, SCATTER_SIZE_MAX / 2.0, 0.0]);
    }

    #[test]
    fn histogram_counts_cover_every_row() {
        let records = (0..50)
            .map(|i| record("North", 2020, f64::from(i)))
            .collect();
        let set = RecordSet::from_records(records).unwrap();
        let dash = dashboard_for(&set, &[], 2020, 2020);
        let ChartData::Histogram { bins, series } = &dash.histogram.data else {
            panic!("histogram expected");
        };
        assert_eq!(bins.len(), HISTOGRAM_BINS);
        assert_eq!(bins[0].start, 0.0);
        assert_eq!(bins[HISTOGRAM_BINS - 1].end, 49.0);
        assert_eq!(series[0].counts.iter().sum::<u64>(), 50);
        assert_eq!(dash.histogram.point_count(), 50);
    }

    #[test]
    fn single_value_histogram_uses_one_bin() {
        let bins = histogram_bins([3.0, 3.0].into_iter());
        assert_eq!(bins, [HistogramBin { start: 2.5, end: 3.5 }]);
        assert_eq!(bin_index(&bins, 3.0), Some(0));
        assert!(histogram_bins(std::iter::empty()).is_empty());
    }

    #[test]
    fn histogram_bins_stay_finite_across_the_whole_f64_range() {
        let bins = histogram_bins([-1e308, 1e308].into_iter());
        assert_eq!(bins.len(), HISTOGRAM_BINS);
        assert!(bins.iter().all(|b| b.start.is_finite() && b.end.is_finite()));
        assert!(bins.iter().all(|b| b.start < b.end));
        assert_eq!(bins[0].start, -1e308);
        assert_eq!(bins[HISTOGRAM_BINS - 1].end, 1e308);

        assert_eq!(bin_index(&bins, -1e308), Some(0));
        assert_eq!(bin_index(&bins, 5e306), Some(HISTOGRAM_BINS / 2));
        assert_eq!(bin_index(&bins, 1e308), Some(HISTOGRAM_BINS - 1));
    }

    #[test]
    fn colours_do_not_depend_on_selection() {
        let set = north_south();
        let all = dashboard_for(&set, &[], 2020, 2022);
        let south = dashboard_for(&set, &["South"], 2020, 2022);
        let (ChartData::Pie { slices: a }, ChartData::Pie { slices: b }) =
            (&all.pie.data, &south.pie.data)
        else {
            panic!("pie charts expected");
        };
        let south_in_all = a.iter().find(|s| s.label == "South").unwrap();
        assert_eq!(south_in_all.color, b[0].color);
    }
}
