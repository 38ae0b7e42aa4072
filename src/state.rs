use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};

use rusty_dash::chart::ChartConfig;
use rusty_dash::data::filter::{FilterState, filtered_indices, init_filter_state};
use rusty_dash::data::library::{DatasetId, DatasetLibrary};
use rusty_dash::data::model::{CellValue, Dataset, Row};
use rusty_dash::error::{LibraryError, ReportError};
use rusty_dash::export;
use rusty_dash::report::{ReportBook, ReportDraft, ReportId};
use rusty_dash::settings::Settings;
use rusty_dash::stats::distribution::{Bucket, histogram};
use rusty_dash::stats::{AnalysisReport, analyze};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which page the central panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Data,
    Charts,
    Analysis,
    Reports,
}

/// Title and description typed into a report form.
#[derive(Debug, Clone, Default)]
pub struct ReportForm {
    pub title: String,
    pub description: String,
}

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    pub settings: Settings,

    /// Every dataset loaded this session.
    pub library: DatasetLibrary,

    /// The dataset the views work on (None until user loads a file).
    pub current: Option<DatasetId>,

    /// Edit buffer for renaming the current dataset.
    pub rename_buffer: String,

    /// Per-column filter selections.
    pub filters: FilterState,

    /// Indices of rows passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    pub view: View,

    /// Which column is used for colouring rows and filter entries.
    pub color_column: Option<String>,

    /// Active colour map.
    pub color_map: Option<ColorMap>,

    pub chart: ChartConfig,

    /// Numeric columns offered for analysis, in source order.
    pub numeric_columns: Vec<String>,

    /// Columns chosen for analysis, in selection order.
    pub selected_columns: Vec<String>,

    /// Result of the last analysis; replaced as a whole.
    pub analysis: Option<AnalysisReport>,

    /// Distribution of the first analysed column.
    pub distribution: Vec<Bucket>,

    /// Saved reports.
    pub reports: ReportBook,

    /// Form for the next report to save.
    pub report_form: ReportForm,

    /// Report being edited and its pending title / description.
    pub report_edit: Option<(ReportId, ReportForm)>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// The dataset the views currently show.
    pub fn dataset(&self) -> Option<&Dataset> {
        self.current.and_then(|id| self.library.get(id))
    }

    /// Add a newly loaded dataset to the library and switch to it.
    pub fn set_dataset(&mut self, dataset: Dataset) -> DatasetId {
        let id = self.library.add(dataset);
        self.select_dataset(id);
        id
    }

    /// Switch the views to another library entry. Filters, colours, chart
    /// and column selection start over; the previous analysis is dropped.
    pub fn select_dataset(&mut self, id: DatasetId) {
        let Some(dataset) = self.library.get(id) else {
            return;
        };
        self.current = Some(id);

        self.filters = init_filter_state(dataset, self.settings.max_filter_values);
        self.visible_indices = (0..dataset.len()).collect();

        // Default colour column: first filterable column (if any).
        self.color_column = dataset
            .column_names
            .iter()
            .find(|c| self.filters.contains_key(*c))
            .cloned();
        self.color_map = color_map_for(dataset, self.color_column.as_deref());

        self.chart = ChartConfig::for_dataset(dataset);
        self.numeric_columns = dataset.numeric_columns();
        self.selected_columns = self
            .numeric_columns
            .iter()
            .take(self.settings.default_selected_columns)
            .cloned()
            .collect();
        self.rename_buffer = dataset.name.clone();
        self.analysis = None;
        self.distribution.clear();
        self.status_message = None;
    }

    /// Rename a library entry.
    pub fn rename_dataset(&mut self, id: DatasetId, name: &str) -> Result<(), LibraryError> {
        let new_name = self.library.rename(id, name)?.to_string();
        if self.current == Some(id) {
            self.rename_buffer = new_name;
        }
        Ok(())
    }

    /// Drop a dataset from the library. Removing the current one switches
    /// to the first remaining dataset, or to the empty view.
    pub fn remove_dataset(&mut self, id: DatasetId) -> Result<(), LibraryError> {
        let removed = self.library.remove(id)?;
        log::info!("Removed dataset '{}'", removed.name);
        if self.current == Some(id) {
            let next = self.library.iter().map(|(next, _)| next).next();
            match next {
                Some(next) => self.select_dataset(next),
                None => self.clear_view(),
            }
        }
        Ok(())
    }

    fn clear_view(&mut self) {
        *self = Self {
            settings: std::mem::take(&mut self.settings),
            library: std::mem::take(&mut self.library),
            reports: std::mem::take(&mut self.reports),
            view: self.view,
            ..Default::default()
        };
    }

    /// Load a file and make it the current dataset.
    pub fn open_path(&mut self, path: &Path) {
        match rusty_dash::data::loader::load_file(path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} rows with columns {:?}",
                    dataset.len(),
                    dataset.column_names
                );
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Rebuild the colour map from the current `color_column`.
    pub fn rebuild_color_map(&mut self) {
        self.color_map = self
            .dataset()
            .and_then(|ds| color_map_for(ds, self.color_column.as_deref()));
    }

    /// Recompute `visible_indices` after filter change.
    pub fn refilter(&mut self) {
        if let Some(visible) = self.dataset().map(|ds| filtered_indices(ds, &self.filters)) {
            self.visible_indices = visible;
        }
    }

    /// Rows passing the current filters, in dataset order.
    pub fn visible_rows(&self) -> impl Iterator<Item = &Row> + Clone + '_ {
        let rows: &[Row] = self.dataset().map(|d| d.rows.as_slice()).unwrap_or(&[]);
        self.visible_indices.iter().map(move |&i| &rows[i])
    }

    /// Set colour column and rebuild the map.
    pub fn set_color_column(&mut self, col: String) {
        self.color_column = Some(col);
        self.rebuild_color_map();
    }

    /// Toggle a single value in a column's filter.
    pub fn toggle_filter_value(&mut self, column: &str, value: &CellValue) {
        let selected = self.filters.entry(column.to_string()).or_default();
        if !selected.remove(value) {
            selected.insert(value.clone());
        }
        self.refilter();
    }

    /// Select all values in a column.
    pub fn select_all(&mut self, column: &str) {
        let all_vals = self
            .dataset()
            .and_then(|ds| ds.unique_values.get(column))
            .cloned();
        if let Some(all_vals) = all_vals {
            self.filters.insert(column.to_string(), all_vals);
            self.refilter();
        }
    }

    /// Deselect all values in a column.
    pub fn select_none(&mut self, column: &str) {
        self.filters.insert(column.to_string(), BTreeSet::new());
        self.refilter();
    }

    /// Add or remove a column from the analysis selection.
    pub fn toggle_selected_column(&mut self, column: &str) {
        if let Some(pos) = self.selected_columns.iter().position(|c| c == column) {
            self.selected_columns.remove(pos);
        } else {
            self.selected_columns.push(column.to_string());
        }
    }

    pub fn can_analyse(&self) -> bool {
        self.dataset().is_some() && !self.selected_columns.is_empty()
    }

    /// Run statistics over the visible rows and replace the previous result.
    pub fn run_analysis(&mut self) {
        let Some(ds) = self.dataset() else {
            return;
        };
        if self.selected_columns.is_empty() {
            return;
        }

        let report = analyze(&ds.name, self.visible_rows(), &self.selected_columns);
        let distribution = histogram(
            self.visible_rows(),
            &self.selected_columns[0],
            self.settings.histogram_buckets,
        );

        self.analysis = Some(report);
        self.distribution = distribution;
    }

    pub fn export_report(&self, path: &Path) -> Result<()> {
        let report = self.analysis.as_ref().context("no analysis to export")?;
        export::write_report_json(report, path)
            .with_context(|| format!("exporting report to {}", path.display()))
    }

    pub fn export_statistics(&self, path: &Path) -> Result<()> {
        let report = self.analysis.as_ref().context("no analysis to export")?;
        export::write_statistics_csv(report, path, self.settings.display_precision)
            .with_context(|| format!("exporting statistics to {}", path.display()))
    }

    // -- Saved reports --

    /// Save the current chart configuration and analysis under the title
    /// and description of `report_form`, then clear the form.
    pub fn save_report(&mut self) -> Result<ReportId, ReportError> {
        let dataset = self.dataset().map(|ds| ds.name.clone()).unwrap_or_default();
        let id = self.reports.create(ReportDraft {
            title: self.report_form.title.clone(),
            description: self.report_form.description.clone(),
            dataset,
            chart: self.chart.clone(),
            analysis: self.analysis.clone(),
        })?;
        self.report_form = ReportForm::default();
        Ok(id)
    }

    /// Start editing a saved report's title and description.
    pub fn begin_report_edit(&mut self, id: ReportId) {
        self.report_edit = self.reports.get(id).map(|r| {
            let form = ReportForm {
                title: r.title.clone(),
                description: r.description.clone(),
            };
            (id, form)
        });
    }

    /// Apply the pending edit. On error the edit stays open.
    pub fn commit_report_edit(&mut self) -> Result<(), ReportError> {
        if let Some((id, form)) = &self.report_edit {
            self.reports.edit(*id, &form.title, &form.description)?;
        }
        self.report_edit = None;
        Ok(())
    }

    pub fn remove_report(&mut self, id: ReportId) -> Result<(), ReportError> {
        self.reports.remove(id)?;
        if self.report_edit.as_ref().is_some_and(|(edit_id, _)| *edit_id == id) {
            self.report_edit = None;
        }
        Ok(())
    }

    /// Write a saved report to `path` as JSON and count the download.
    pub fn download_report(&mut self, id: ReportId, path: &Path) -> Result<()> {
        let report = self.reports.get(id).context("no such report")?;
        export::write_saved_report(report, path)
            .with_context(|| format!("downloading report to {}", path.display()))?;
        self.reports.record_download(id)?;
        Ok(())
    }
}

fn color_map_for(dataset: &Dataset, column: Option<&str>) -> Option<ColorMap> {
    let column = column?;
    dataset
        .unique_values
        .get(column)
        .map(|vals| ColorMap::new(column, vals))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        let rows = vec![
            Row::from_iter([
                ("region", CellValue::from("North")),
                ("a", CellValue::Integer(1)),
                ("b", CellValue::Integer(2)),
            ]),
            Row::from_iter([
                ("region", CellValue::from("South")),
                ("a", CellValue::Integer(2)),
                ("b", CellValue::Integer(4)),
            ]),
            Row::from_iter([
                ("region", CellValue::from("North")),
                ("a", CellValue::Integer(3)),
                ("b", CellValue::Integer(5)),
            ]),
        ];
        Dataset::new(
            "t.csv",
            vec!["region".into(), "a".into(), "b".into()],
            rows,
        )
    }

    #[test]
    fn loading_selects_leading_numeric_columns() {
        let mut state = AppState::new(Settings {
            default_selected_columns: 1,
            ..Settings::default()
        });
        state.set_dataset(dataset());

        assert_eq!(state.numeric_columns, vec!["a", "b"]);
        assert_eq!(state.selected_columns, vec!["a"]);
        assert_eq!(state.visible_indices, vec![0, 1, 2]);
        assert!(state.analysis.is_none());
    }

    #[test]
    fn analysis_runs_on_visible_rows_only() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        state.toggle_filter_value("region", &CellValue::from("South"));
        assert_eq!(state.visible_indices, vec![0, 2]);

        state.run_analysis();
        let report = state.analysis.as_ref().unwrap();
        assert_eq!(report.row_count, 2);
        assert_eq!(report.statistics.get("a").unwrap().count, 2);
        assert!(!state.distribution.is_empty());
    }

    #[test]
    fn new_dataset_clears_previous_analysis() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        state.run_analysis();
        assert!(state.analysis.is_some());

        state.set_dataset(dataset());
        assert!(state.analysis.is_none());
        assert!(state.distribution.is_empty());
    }

    #[test]
    fn nothing_selected_means_no_analysis() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        state.selected_columns.clear();
        assert!(!state.can_analyse());
        state.run_analysis();
        assert!(state.analysis.is_none());
    }

    #[test]
    fn export_without_analysis_fails() {
        let state = AppState::default();
        assert!(state.export_report(Path::new("r.json")).is_err());
    }

    fn other_dataset() -> Dataset {
        let rows = (1..=4)
            .map(|v| Row::from_iter([("x", CellValue::Integer(v))]))
            .collect();
        Dataset::from_rows("other.csv", rows)
    }

    #[test]
    fn loading_keeps_earlier_datasets_in_the_library() {
        let mut state = AppState::default();
        let first = state.set_dataset(dataset());
        let second = state.set_dataset(other_dataset());

        assert_eq!(state.library.len(), 2);
        assert_eq!(state.current, Some(second));
        assert_eq!(state.numeric_columns, vec!["x"]);

        state.select_dataset(first);
        assert_eq!(state.dataset().unwrap().name, "t.csv");
        assert_eq!(state.numeric_columns, vec!["a", "b"]);
        assert_eq!(state.visible_indices, vec![0, 1, 2]);
    }

    #[test]
    fn switching_datasets_resets_filters_and_analysis() {
        let mut state = AppState::default();
        let first = state.set_dataset(dataset());
        state.set_dataset(other_dataset());
        state.select_dataset(first);
        state.toggle_filter_value("region", &CellValue::from("South"));
        state.run_analysis();
        assert!(state.analysis.is_some());

        state.select_dataset(first);
        assert_eq!(state.visible_indices, vec![0, 1, 2]);
        assert!(state.analysis.is_none());
    }

    #[test]
    fn rename_updates_list_and_edit_buffer() {
        let mut state = AppState::default();
        let id = state.set_dataset(dataset());
        assert_eq!(state.rename_buffer, "t.csv");

        state.rename_dataset(id, " Sales 2024 ").unwrap();
        assert_eq!(state.dataset().unwrap().name, "Sales 2024");
        assert_eq!(state.rename_buffer, "Sales 2024");
        assert!(state.rename_dataset(id, "").is_err());
    }

    #[test]
    fn removing_the_current_dataset_falls_back() {
        let mut state = AppState::default();
        let first = state.set_dataset(dataset());
        let second = state.set_dataset(other_dataset());

        state.remove_dataset(second).unwrap();
        assert_eq!(state.current, Some(first));
        assert_eq!(state.numeric_columns, vec!["a", "b"]);

        state.view = View::Analysis;
        state.remove_dataset(first).unwrap();
        assert!(state.dataset().is_none());
        assert!(state.library.is_empty());
        assert!(state.visible_indices.is_empty());
        assert!(state.filters.is_empty());
        assert_eq!(state.view, View::Analysis);
        assert_eq!(state.visible_rows().count(), 0);

        assert!(state.remove_dataset(first).is_err());
    }

    #[test]
    fn removing_another_dataset_keeps_the_view() {
        let mut state = AppState::default();
        let first = state.set_dataset(dataset());
        let second = state.set_dataset(other_dataset());
        state.select_dataset(first);
        state.toggle_filter_value("region", &CellValue::from("South"));

        state.remove_dataset(second).unwrap();
        assert_eq!(state.current, Some(first));
        assert_eq!(state.visible_indices, vec![0, 2]);
    }

    #[test]
    fn saved_report_snapshots_chart_and_analysis() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        state.run_analysis();
        state.chart.title = "A vs B".into();
        state.report_form.title = "Weekly".into();

        let id = state.save_report().unwrap();
        assert!(state.report_form.title.is_empty());

        // Later changes to the live chart do not touch the saved one.
        state.chart.title = "changed".into();
        let report = state.reports.get(id).unwrap();
        assert_eq!(report.dataset, "t.csv");
        assert_eq!(report.chart.title, "A vs B");
        assert_eq!(report.analysis.as_ref().unwrap().row_count, 3);
    }

    #[test]
    fn report_without_title_is_rejected() {
        let mut state = AppState::default();
        assert!(state.save_report().is_err());
        assert!(state.reports.is_empty());
    }

    #[test]
    fn report_edit_duplicate_delete() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        state.report_form.title = "Weekly".into();
        let id = state.save_report().unwrap();

        state.begin_report_edit(id);
        if let Some((_, form)) = &mut state.report_edit {
            form.title = "Weekly (final)".into();
        }
        state.commit_report_edit().unwrap();
        assert!(state.report_edit.is_none());
        assert_eq!(state.reports.get(id).unwrap().title, "Weekly (final)");

        let copy = state.reports.duplicate(id).unwrap();
        state.begin_report_edit(copy);
        state.remove_report(copy).unwrap();
        assert!(state.report_edit.is_none());
        assert_eq!(state.reports.len(), 1);
    }

    #[test]
    fn download_writes_json_and_counts() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        state.report_form.title = "Weekly".into();
        let id = state.save_report().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weekly.json");
        state.download_report(id, &path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("\"Weekly\""));
        assert_eq!(state.reports.get(id).unwrap().downloads, 1);

        assert!(state.download_report(id + 1, &path).is_err());
    }
}
