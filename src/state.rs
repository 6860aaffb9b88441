use std::path::PathBuf;

use crate::charts::Dashboard;
use crate::data::filter::{Selection, YearRange};
use crate::service::DashboardService;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded record set and chart handler.
    pub service: DashboardService,

    /// Where the record set was loaded from (shown in the top bar).
    pub data_path: PathBuf,

    /// Current filter selections.
    pub selection: Selection,

    /// Charts for `selection`, rebuilt on every change.
    pub dashboard: Dashboard,

    /// Indices of records passing the current filters.
    pub visible_indices: Vec<usize>,
}

impl AppState {
    pub fn new(service: DashboardService, data_path: PathBuf) -> Self {
        let selection = service.default_selection();
        let view = service.view(&selection);
        let visible_indices = view.indices().to_vec();
        let dashboard = service.render(&view);
        Self {
            service,
            data_path,
            selection,
            dashboard,
            visible_indices,
        }
    }

    /// Recompute the filtered view and all charts after a control change.
    pub fn refresh(&mut self) {
        let view = self.service.view(&self.selection);
        self.visible_indices = view.indices().to_vec();
        self.dashboard = self.service.render(&view);
    }

    /// Tick or untick a single region.
    pub fn toggle_region(&mut self, region: &str) {
        if !self.selection.regions.remove(region) {
            self.selection.regions.insert(region.to_string());
        }
        self.refresh();
    }

    /// Tick every region.
    pub fn select_all_regions(&mut self) {
        self.selection.regions = self
            .service
            .records()
            .regions()
            .iter()
            .cloned()
            .collect();
        self.refresh();
    }

    /// Untick every region, which shows all of them.
    pub fn clear_regions(&mut self) {
        self.selection.regions.clear();
        self.refresh();
    }

    /// Move the lower year handle, dragging the upper one along if needed.
    pub fn set_year_start(&mut self, year: i32) {
        let bounds = self.service.records().year_bounds();
        let start = year.clamp(bounds.start(), bounds.end());
        let end = self.selection.years.end().max(start);
        self.set_years(YearRange::spanning(start, end));
    }

    /// Move the upper year handle, dragging the lower one along if needed.
    pub fn set_year_end(&mut self, year: i32) {
        let bounds = self.service.records().year_bounds();
        let end = year.clamp(bounds.start(), bounds.end());
        let start = self.selection.years.start().min(end);
        self.set_years(YearRange::spanning(start, end));
    }

    fn set_years(&mut self, years: YearRange) {
        if years != self.selection.years {
            self.selection.years = years;
            self.refresh();
        }
    }

    /// Back to all regions over the full year span.
    pub fn reset(&mut self) {
        self.selection = self.service.default_selection();
        self.refresh();
    }
}
