use crate::error::LibraryError;

use super::model::Dataset;

/// Stable handle of a dataset inside a [`DatasetLibrary`]. Ids are never
/// reused, so a stale id simply stops resolving after removal.
pub type DatasetId = u64;

/// In-memory list of loaded datasets, in load order.
#[derive(Debug, Default)]
pub struct DatasetLibrary {
    entries: Vec<(DatasetId, Dataset)>,
    next_id: DatasetId,
}

impl DatasetLibrary {
    /// Add a dataset and return its id. A name already in the library gets
    /// a ` (2)`, ` (3)`, … suffix so list entries stay distinguishable.
    pub fn add(&mut self, mut dataset: Dataset) -> DatasetId {
        dataset.name = self.unique_name(&dataset.name, None);
        let id = self.next_id;
        self.next_id += 1;
        log::debug!("library: added '{}' as #{id}", dataset.name);
        self.entries.push((id, dataset));
        id
    }

    pub fn get(&self, id: DatasetId) -> Option<&Dataset> {
        self.entries
            .iter()
            .find(|(entry_id, _)| *entry_id == id)
            .map(|(_, ds)| ds)
    }

    pub fn contains(&self, id: DatasetId) -> bool {
        self.get(id).is_some()
    }

    /// Give a dataset a new display name. Surrounding whitespace is
    /// dropped; a name taken by another dataset gets a numeric suffix.
    pub fn rename(&mut self, id: DatasetId, name: &str) -> Result<&str, LibraryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LibraryError::EmptyName);
        }
        if !self.contains(id) {
            return Err(LibraryError::UnknownDataset(id));
        }
        let name = self.unique_name(name, Some(id));
        let (_, dataset) = self
            .entries
            .iter_mut()
            .find(|(entry_id, _)| *entry_id == id)
            .ok_or(LibraryError::UnknownDataset(id))?;
        log::debug!("library: renamed '{}' to '{name}'", dataset.name);
        dataset.name = name;
        Ok(dataset.name.as_str())
    }

    /// Take a dataset out of the library.
    pub fn remove(&mut self, id: DatasetId) -> Result<Dataset, LibraryError> {
        let pos = self
            .entries
            .iter()
            .position(|(entry_id, _)| *entry_id == id)
            .ok_or(LibraryError::UnknownDataset(id))?;
        let (_, dataset) = self.entries.remove(pos);
        log::debug!("library: removed '{}'", dataset.name);
        Ok(dataset)
    }

    /// Datasets in load order.
    pub fn iter(&self) -> impl Iterator<Item = (DatasetId, &Dataset)> {
        self.entries.iter().map(|(id, ds)| (*id, ds))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn unique_name(&self, wanted: &str, except: Option<DatasetId>) -> String {
        let taken = |candidate: &str| {
            self.entries
                .iter()
                .any(|(id, ds)| Some(*id) != except && ds.name == candidate)
        };
        if !taken(wanted) {
            return wanted.to_string();
        }
        (2..)
            .map(|n| format!("{wanted} ({n})"))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| wanted.to_string())
    }
}
