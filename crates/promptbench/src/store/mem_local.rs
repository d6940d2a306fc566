use super::local::ObjectStore;
use crate::error::{Result, WorkbenchError};
use crate::model::{Folder, Project, Version};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use uuid::Uuid;

/// The four keyed tables behind both object store implementations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Tables {
    #[serde(default)]
    pub projects: BTreeMap<Uuid, Project>,
    #[serde(default)]
    pub versions: BTreeMap<Uuid, Version>,
    #[serde(default)]
    pub folders: BTreeMap<Uuid, Folder>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Tables {
    pub fn versions_for(&self, project_id: &Uuid) -> Vec<Version> {
        let mut versions: Vec<Version> = self
            .versions
            .values()
            .filter(|v| v.project_id == *project_id)
            .cloned()
            .collect();
        versions.sort_by_key(|v| v.version_number);
        versions
    }

    pub fn clear_entities(&mut self) {
        self.projects.clear();
        self.versions.clear();
        self.folders.clear();
    }
}

/// Volatile object store, the default for tests and embedders.
///
/// Uses `RefCell` for interior mutability since the workbench is single-threaded.
#[derive(Default)]
pub struct MemObjectStore {
    tables: RefCell<Tables>,
    /// Tables as they were when the open batch began.
    before_batch: RefCell<Option<Tables>>,
    simulate_write_error: RefCell<bool>,
}

impl MemObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Wipe everything, metadata included, as a browser "clear site data" would.
    pub fn wipe(&self) {
        *self.tables.borrow_mut() = Tables::default();
    }

    fn check_writable(&self) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(WorkbenchError::Store("Simulated write error".to_string()));
        }
        Ok(())
    }
}

impl ObjectStore for MemObjectStore {
    fn all_projects(&self) -> Result<Vec<Project>> {
        Ok(self.tables.borrow().projects.values().cloned().collect())
    }

    fn get_project(&self, id: &Uuid) -> Result<Option<Project>> {
        Ok(self.tables.borrow().projects.get(id).cloned())
    }

    fn put_project(&self, project: &Project) -> Result<()> {
        self.check_writable()?;
        self.tables
            .borrow_mut()
            .projects
            .insert(project.id, project.clone());
        Ok(())
    }

    fn delete_project(&self, id: &Uuid) -> Result<bool> {
        self.check_writable()?;
        Ok(self.tables.borrow_mut().projects.remove(id).is_some())
    }

    fn all_versions(&self) -> Result<Vec<Version>> {
        Ok(self.tables.borrow().versions.values().cloned().collect())
    }

    fn versions_for(&self, project_id: &Uuid) -> Result<Vec<Version>> {
        Ok(self.tables.borrow().versions_for(project_id))
    }

    fn put_version(&self, version: &Version) -> Result<()> {
        self.check_writable()?;
        self.tables
            .borrow_mut()
            .versions
            .insert(version.id, version.clone());
        Ok(())
    }

    fn delete_version(&self, id: &Uuid) -> Result<bool> {
        self.check_writable()?;
        Ok(self.tables.borrow_mut().versions.remove(id).is_some())
    }

    fn all_folders(&self) -> Result<Vec<Folder>> {
        Ok(self.tables.borrow().folders.values().cloned().collect())
    }

    fn get_folder(&self, id: &Uuid) -> Result<Option<Folder>> {
        Ok(self.tables.borrow().folders.get(id).cloned())
    }

    fn put_folder(&self, folder: &Folder) -> Result<()> {
        self.check_writable()?;
        self.tables
            .borrow_mut()
            .folders
            .insert(folder.id, folder.clone());
        Ok(())
    }

    fn delete_folder(&self, id: &Uuid) -> Result<bool> {
        self.check_writable()?;
        Ok(self.tables.borrow_mut().folders.remove(id).is_some())
    }

    fn get_meta(&self, key: &str) -> Result<Option<String>> {
        Ok(self.tables.borrow().metadata.get(key).cloned())
    }

    fn put_meta(&self, key: &str, value: &str) -> Result<()> {
        self.check_writable()?;
        self.tables
            .borrow_mut()
            .metadata
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear_entities(&self) -> Result<()> {
        self.check_writable()?;
        self.tables.borrow_mut().clear_entities();
        Ok(())
    }

    fn begin_batch(&self) -> Result<()> {
        let mut before = self.before_batch.borrow_mut();
        if before.is_none() {
            *before = Some(self.tables.borrow().clone());
        }
        Ok(())
    }

    fn commit_batch(&self) -> Result<()> {
        if let Err(e) = self.check_writable() {
            self.abort_batch();
            return Err(e);
        }
        self.before_batch.borrow_mut().take();
        Ok(())
    }

    fn abort_batch(&self) {
        if let Some(before) = self.before_batch.borrow_mut().take() {
            *self.tables.borrow_mut() = before;
        }
    }
}
