use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::charts::{build_dashboard, Dashboard};
use crate::color::{ColorMap, SeriesColors};
use crate::data::filter::{filter, FilteredView, Selection, YearRange};
use crate::data::model::RecordSet;

// ---------------------------------------------------------------------------
// DashboardService – the loaded record set plus the filter-and-render handler
// ---------------------------------------------------------------------------

/// Option lists and bounds for the filter controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Region labels in first-appearance order.
    pub regions: Vec<String>,
    /// Slider bounds (and default value).
    pub years: YearRange,
    /// Distinct years, sorted, used as slider marks.
    pub year_marks: Vec<i32>,
}

/// Immutable data service shared by both front ends.
///
/// Cloning is cheap: the record set sits behind an `Arc`.
#[derive(Debug, Clone)]
pub struct DashboardService {
    records: Arc<RecordSet>,
    colors: Arc<SeriesColors>,
}

impl DashboardService {
    pub fn new(records: RecordSet) -> Self {
        let colors = SeriesColors {
            region: ColorMap::new(records.regions()),
            powertrain: ColorMap::new(records.powertrains()),
            mode: ColorMap::new(records.modes()),
            category: ColorMap::new(records.categories()),
        };
        Self {
            records: Arc::new(records),
            colors: Arc::new(colors),
        }
    }

    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    /// Per-label series colours, fixed for the lifetime of the service.
    pub fn colors(&self) -> &SeriesColors {
        &self.colors
    }

    pub fn options(&self) -> FilterOptions {
        FilterOptions {
            regions: self.records.regions().to_vec(),
            years: self.records.year_bounds(),
            year_marks: self.records.years().iter().copied().collect(),
        }
    }

    /// No region restriction, full year span.
    pub fn default_selection(&self) -> Selection {
        Selection::all_regions(self.records.year_bounds())
    }

    pub fn view(&self, selection: &Selection) -> FilteredView<'_> {
        filter(&self.records, selection)
    }

    /// Filter the record set and rebuild all five charts.
    pub fn update(&self, selection: &Selection) -> Dashboard {
        self.render(&self.view(selection))
    }

    /// Build the charts for a view already computed by [`Self::view`].
    pub fn render(&self, view: &FilteredView<'_>) -> Dashboard {
        if view.is_empty() {
            log::debug!("Selection matches no records");
        } else {
            log::debug!(
                "Rendering dashboard: {} of {} records visible",
                view.len(),
                self.records.len()
            );
        }
        build_dashboard(view, &self.colors)
    }
}
