//! # API Facade
//!
//! The single entry point for every workbench operation, whatever the UI.
//!
//! ## Role and Responsibilities
//!
//! - **Dispatches** to the command functions in [`crate::commands`]
//! - **Normalizes inputs**: projects and folders are addressed by selector strings,
//!   resolved here to ids
//! - **Owns the sync clock**: [`WorkbenchApi::tick`] and [`WorkbenchApi::flush`] run the
//!   debounced manifest sync
//!
//! It holds no business logic and does no I/O of its own.
//!
//! ## Selectors
//!
//! A selector is either an exact name or a UUID (as printed by `Display`). The exact
//! name is tried first, so a project literally named like a UUID still resolves to
//! itself.
//!
//! ## Generic Over Both Stores
//!
//! `WorkbenchApi<L: ObjectStore, F: FileStore>`:
//! - CLI: `WorkbenchApi<JsonObjectStore, FsFileStore>`
//! - Tests: `WorkbenchApi<MemObjectStore, MemFileStore>`

use crate::commands::{self, folders::FolderDeletePolicy, projects::ProjectUpdate, CmdResult};
use crate::config::WorkbenchConfig;
use crate::error::{Result, WorkbenchError};
use crate::reconcile::SyncReport;
use crate::store::{FileStore, ObjectStore};
use crate::workbench::Workbench;
use std::time::Instant;
use uuid::Uuid;

pub struct WorkbenchApi<L: ObjectStore, F: FileStore> {
    workbench: Workbench<L, F>,
}

impl<L: ObjectStore, F: FileStore> WorkbenchApi<L, F> {
    pub fn new(local: L, files: F, config: &WorkbenchConfig) -> Self {
        Self {
            workbench: Workbench::new(local, files, config),
        }
    }

    pub fn workbench(&self) -> &Workbench<L, F> {
        &self.workbench
    }

    // --- Startup and sync ---

    pub fn load(&mut self) -> Result<CmdResult> {
        commands::startup::load(&mut self.workbench)
    }

    pub fn sync_now(&mut self) -> Result<CmdResult> {
        let report = self.workbench.sync_now()?;
        let mut result = CmdResult::default();
        result.add_message(commands::CmdMessage::success(format!(
            "structure.json written ({} projects, {} folders)",
            report.projects_written, report.folders_written
        )));
        result.sync = Some(report);
        Ok(result)
    }

    pub fn tick(&mut self, now: Instant) -> Option<SyncReport> {
        self.workbench.tick(now)
    }

    pub fn flush(&mut self) -> Option<SyncReport> {
        self.workbench.flush()
    }

    // --- Projects ---

    pub fn list(&self) -> Result<CmdResult> {
        commands::projects::list(&self.workbench)
    }

    pub fn create_project(
        &mut self,
        name: &str,
        description: Option<String>,
        folder: Option<&str>,
    ) -> Result<CmdResult> {
        let folder_id = self.resolve_optional_folder(folder)?;
        commands::projects::create(&mut self.workbench, name, description, folder_id)
    }

    pub fn rename_project(&mut self, selector: &str, new_name: &str) -> Result<CmdResult> {
        let id = self.resolve_project(selector)?;
        commands::projects::rename(&mut self.workbench, id, new_name)
    }

    pub fn update_project(&mut self, selector: &str, changes: ProjectUpdate) -> Result<CmdResult> {
        let id = self.resolve_project(selector)?;
        commands::projects::update(&mut self.workbench, id, changes)
    }

    pub fn delete_project(&mut self, selector: &str) -> Result<CmdResult> {
        let id = self.resolve_project(selector)?;
        commands::projects::delete(&mut self.workbench, id)
    }

    /// `folder = None` moves the project to root.
    pub fn move_project(&mut self, selector: &str, folder: Option<&str>) -> Result<CmdResult> {
        let id = self.resolve_project(selector)?;
        let folder_id = self.resolve_optional_folder(folder)?;
        commands::projects::move_to(&mut self.workbench, id, folder_id)
    }

    pub fn select_project(&mut self, selector: &str) -> Result<CmdResult> {
        let id = self.resolve_project(selector)?;
        commands::projects::select(&mut self.workbench, id)
    }

    // --- Versions ---

    pub fn save_version(
        &mut self,
        selector: &str,
        content: &str,
        description: Option<String>,
    ) -> Result<CmdResult> {
        let id = self.resolve_project(selector)?;
        commands::versions::create_version(&mut self.workbench, id, content, description)
    }

    pub fn list_versions(&self, selector: &str) -> Result<CmdResult> {
        let id = self.resolve_project(selector)?;
        commands::versions::list(&self.workbench, id)
    }

    pub fn get_version(&self, selector: &str, number: Option<u32>) -> Result<CmdResult> {
        let id = self.resolve_project(selector)?;
        commands::versions::get(&self.workbench, id, number)
    }

    // --- Folders ---

    pub fn create_folder(&mut self, name: &str, parent: Option<&str>) -> Result<CmdResult> {
        let parent_id = self.resolve_optional_folder(parent)?;
        commands::folders::create(&mut self.workbench, name, parent_id)
    }

    pub fn rename_folder(&mut self, selector: &str, new_name: &str) -> Result<CmdResult> {
        let id = self.resolve_folder(selector)?;
        commands::folders::rename(&mut self.workbench, id, new_name)
    }

    pub fn toggle_folder(&mut self, selector: &str) -> Result<CmdResult> {
        let id = self.resolve_folder(selector)?;
        commands::folders::toggle_collapse(&mut self.workbench, id)
    }

    pub fn delete_folder(
        &mut self,
        selector: &str,
        policy: FolderDeletePolicy,
    ) -> Result<CmdResult> {
        let id = self.resolve_folder(selector)?;
        commands::folders::delete(&mut self.workbench, id, policy)
    }

    // --- Selector resolution ---

    fn resolve_project(&self, selector: &str) -> Result<Uuid> {
        let selector = selector.trim();
        if let Some(project) = self.workbench.project_by_name(selector) {
            return Ok(project.id);
        }
        match Uuid::parse_str(selector) {
            Ok(id) if self.workbench.project(&id).is_some() => Ok(id),
            Ok(id) => Err(WorkbenchError::ProjectNotFound(id)),
            Err(_) => Err(WorkbenchError::NameNotFound {
                kind: "project",
                name: selector.to_string(),
            }),
        }
    }

    fn resolve_folder(&self, selector: &str) -> Result<Uuid> {
        let selector = selector.trim();
        if let Some(folder) = self.workbench.folder_by_name(selector) {
            return Ok(folder.id);
        }
        match Uuid::parse_str(selector) {
            Ok(id) if self.workbench.folder(&id).is_some() => Ok(id),
            Ok(id) => Err(WorkbenchError::FolderNotFound(id)),
            Err(_) => Err(WorkbenchError::NameNotFound {
                kind: "folder",
                name: selector.to_string(),
            }),
        }
    }

    fn resolve_optional_folder(&self, selector: Option<&str>) -> Result<Option<Uuid>> {
        selector.map(|s| self.resolve_folder(s)).transpose()
    }
}
