//! Saved reports: a named snapshot of a chart configuration and the
//! analysis it was built next to. Reports live in memory for the session
//! and are downloaded as JSON through [`crate::export::write_json`].

use serde::{Deserialize, Serialize};

use crate::chart::ChartConfig;
use crate::error::ReportError;
use crate::stats::AnalysisReport;

pub type ReportId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub title: String,
    pub description: String,
    /// Name of the dataset the report was created from.
    pub dataset: String,
    pub chart: ChartConfig,
    pub analysis: Option<AnalysisReport>,
    /// How many times the report was downloaded. Duplicates start at zero.
    pub downloads: u32,
}

/// Everything needed to create a report; the id is assigned on creation.
#[derive(Debug, Clone, Default)]
pub struct ReportDraft {
    pub title: String,
    pub description: String,
    pub dataset: String,
    pub chart: ChartConfig,
    pub analysis: Option<AnalysisReport>,
}

/// The session's reports, in creation order.
#[derive(Debug, Default)]
pub struct ReportBook {
    reports: Vec<Report>,
    next_id: ReportId,
}

impl ReportBook {
    pub fn create(&mut self, draft: ReportDraft) -> Result<ReportId, ReportError> {
        let title = checked_title(&draft.title)?;
        let id = self.allocate_id();
        self.reports.push(Report {
            id,
            title,
            description: draft.description.trim().to_string(),
            dataset: draft.dataset,
            chart: draft.chart,
            analysis: draft.analysis,
            downloads: 0,
        });
        log::info!("created report #{id}");
        Ok(id)
    }

    /// Change the title and description; the snapshot itself is kept.
    pub fn edit(
        &mut self,
        id: ReportId,
        title: &str,
        description: &str,
    ) -> Result<(), ReportError> {
        let title = checked_title(title)?;
        let report = self.get_mut(id)?;
        report.title = title;
        report.description = description.trim().to_string();
        Ok(())
    }

    /// Copy a report under a new id, titled `Copy of <title>`.
    pub fn duplicate(&mut self, id: ReportId) -> Result<ReportId, ReportError> {
        let mut copy = self.get(id).cloned().ok_or(ReportError::UnknownReport(id))?;
        copy.id = self.allocate_id();
        copy.title = format!("Copy of {}", copy.title);
        copy.downloads = 0;
        let new_id = copy.id;
        self.reports.push(copy);
        Ok(new_id)
    }

    pub fn remove(&mut self, id: ReportId) -> Result<Report, ReportError> {
        let pos = self
            .reports
            .iter()
            .position(|r| r.id == id)
            .ok_or(ReportError::UnknownReport(id))?;
        Ok(self.reports.remove(pos))
    }

    /// Count one download of `id`.
    pub fn record_download(&mut self, id: ReportId) -> Result<(), ReportError> {
        self.get_mut(id)?.downloads += 1;
        Ok(())
    }

    pub fn get(&self, id: ReportId) -> Option<&Report> {
        self.reports.iter().find(|r| r.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Report> {
        self.reports.iter()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    fn get_mut(&mut self, id: ReportId) -> Result<&mut Report, ReportError> {
        self.reports
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(ReportError::UnknownReport(id))
    }

    fn allocate_id(&mut self) -> ReportId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

fn checked_title(title: &str) -> Result<String, ReportError> {
    match title.trim() {
        "" => Err(ReportError::EmptyTitle),
        t => Ok(t.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartKind;

    fn draft(title: &str) -> ReportDraft {
        ReportDraft {
            title: title.into(),
            description: "by region".into(),
            dataset: "sales.csv".into(),
            chart: ChartConfig {
                kind: ChartKind::Pie,
                x_column: Some("region".into()),
                y_columns: vec!["revenue".into()],
                ..ChartConfig::default()
            },
            analysis: None,
        }
    }

    #[test]
    fn create_trims_and_requires_a_title() {
        let mut book = ReportBook::default();
        let id = book.create(draft("  Q1 revenue ")).unwrap();
        let report = book.get(id).unwrap();
        assert_eq!(report.title, "Q1 revenue");
        assert_eq!(report.dataset, "sales.csv");
        assert_eq!(report.chart.kind, ChartKind::Pie);

        assert!(matches!(book.create(draft(" ")), Err(ReportError::EmptyTitle)));
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn edit_keeps_the_snapshot() {
        let mut book = ReportBook::default();
        let id = book.create(draft("Q1")).unwrap();
        book.edit(id, "Q1 final", " checked ").unwrap();

        let report = book.get(id).unwrap();
        assert_eq!(report.title, "Q1 final");
        assert_eq!(report.description, "checked");
        assert_eq!(report.chart.y_columns, vec!["revenue"]);
        assert!(matches!(book.edit(id, "", ""), Err(ReportError::EmptyTitle)));
        assert!(matches!(book.edit(99, "x", ""), Err(ReportError::UnknownReport(99))));
    }

    #[test]
    fn duplicate_gets_new_id_and_fresh_counter() {
        let mut book = ReportBook::default();
        let id = book.create(draft("Q1")).unwrap();
        book.record_download(id).unwrap();

        let copy_id = book.duplicate(id).unwrap();
        assert_ne!(copy_id, id);
        let copy = book.get(copy_id).unwrap();
        assert_eq!(copy.title, "Copy of Q1");
        assert_eq!(copy.downloads, 0);
        assert_eq!(copy.chart, book.get(id).unwrap().chart);
        assert_eq!(book.get(id).unwrap().downloads, 1);
    }

    #[test]
    fn remove_does_not_reuse_ids() {
        let mut book = ReportBook::default();
        let first = book.create(draft("a")).unwrap();
        let second = book.create(draft("b")).unwrap();
        assert_eq!(book.remove(first).unwrap().title, "a");
        assert!(book.remove(first).is_err());

        let third = book.create(draft("c")).unwrap();
        assert!(third != first && third != second);
        let titles: Vec<&str> = book.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "c"]);
    }
}
