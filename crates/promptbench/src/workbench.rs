use crate::config::{RebuildPolicy, WorkbenchConfig};
use crate::debounce::SyncScheduler;
use crate::error::{Result, WorkbenchError};
use crate::model::{Folder, Project};
use crate::reconcile::{sync_structure_to_local, SyncReport, SyncState};
use crate::store::{FileStore, ObjectStore};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// The single owner of all workbench state.
///
/// Holds both stores, the hydrated project and folder lists the commands work on,
/// and the pending-sync scheduler. Commands borrow it mutably; nothing is global.
pub struct Workbench<L: ObjectStore, F: FileStore> {
    local: L,
    files: F,
    projects: Vec<Project>,
    folders: Vec<Folder>,
    current_project: Option<Uuid>,
    detached: HashSet<Uuid>,
    scheduler: SyncScheduler,
    sync_debounce: Duration,
    restore_sync_delay: Duration,
    rebuild_policy: RebuildPolicy,
}

impl<L: ObjectStore, F: FileStore> Workbench<L, F> {
    pub fn new(local: L, files: F, config: &WorkbenchConfig) -> Self {
        Self {
            local,
            files,
            projects: Vec::new(),
            folders: Vec::new(),
            current_project: None,
            detached: HashSet::new(),
            scheduler: SyncScheduler::new(),
            sync_debounce: config.sync_debounce(),
            restore_sync_delay: config.restore_sync_delay(),
            rebuild_policy: config.rebuild_policy,
        }
    }

    pub fn local(&self) -> &L {
        &self.local
    }

    pub fn files(&self) -> &F {
        &self.files
    }

    pub fn rebuild_policy(&self) -> RebuildPolicy {
        self.rebuild_policy
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn project(&self, id: &Uuid) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == *id)
    }

    pub fn project_by_name(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.name == name)
    }

    pub fn folder(&self, id: &Uuid) -> Option<&Folder> {
        self.folders.iter().find(|f| f.id == *id)
    }

    pub fn folder_by_name(&self, name: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.name == name)
    }

    pub fn current_project(&self) -> Option<&Project> {
        self.current_project.and_then(|id| self.project(&id))
    }

    pub fn sync_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Reload the in-memory lists from the object store.
    ///
    /// Projects are ordered by creation and deduplicated by name, first one wins.
    pub fn hydrate(&mut self) -> Result<()> {
        let mut projects = self.local.all_projects()?;
        projects.sort_by(|a, b| {
            a.metadata
                .created_at
                .cmp(&b.metadata.created_at)
                .then(a.id.cmp(&b.id))
        });

        let mut seen: HashSet<String> = HashSet::new();
        projects.retain(|p| {
            let first = seen.insert(p.name.clone());
            if !first {
                tracing::warn!("Ignoring duplicate project \"{}\" ({})", p.name, p.id);
            }
            first
        });

        let mut folders = self.local.all_folders()?;
        folders.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

        self.projects = projects;
        self.folders = folders;
        if let Some(current) = self.current_project {
            if self.project(&current).is_none() {
                self.current_project = None;
            }
        }
        tracing::debug!(
            "Hydrated {} projects and {} folders",
            self.projects.len(),
            self.folders.len()
        );
        Ok(())
    }

    /// Debounced sync after a mutation.
    pub fn request_sync(&mut self) {
        self.scheduler.request(Instant::now(), self.sync_debounce);
    }

    /// Delayed sync after a rebuild.
    pub fn request_restore_sync(&mut self) {
        self.scheduler.request(Instant::now(), self.restore_sync_delay);
    }

    /// Run the pending sync if its deadline has passed.
    ///
    /// Sync failures are logged, not returned: the caller did not wait for the sync
    /// and has nothing to do about it.
    pub fn tick(&mut self, now: Instant) -> Option<SyncReport> {
        if self.scheduler.poll(now) {
            self.run_pending_sync()
        } else {
            None
        }
    }

    /// Run the pending sync now, if there is one.
    pub fn flush(&mut self) -> Option<SyncReport> {
        if self.scheduler.flush() {
            self.run_pending_sync()
        } else {
            None
        }
    }

    /// Sync immediately, cancelling any pending request, and report failures.
    pub fn sync_now(&mut self) -> Result<SyncReport> {
        self.scheduler.flush();
        self.sync_once()
    }

    fn run_pending_sync(&mut self) -> Option<SyncReport> {
        match self.sync_once() {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::error!("Manifest sync failed: {}", e);
                None
            }
        }
    }

    fn sync_once(&mut self) -> Result<SyncReport> {
        let report = sync_structure_to_local(
            &self.local,
            &self.files,
            SyncState {
                projects: &self.projects,
                folders: &self.folders,
                detached: &self.detached,
            },
        )?;
        self.detached.clear();
        Ok(report)
    }

    // --- Mutation plumbing for the command layer ---

    pub(crate) fn project_mut(&mut self, id: &Uuid) -> Result<&mut Project> {
        self.projects
            .iter_mut()
            .find(|p| p.id == *id)
            .ok_or(WorkbenchError::ProjectNotFound(*id))
    }

    pub(crate) fn folder_mut(&mut self, id: &Uuid) -> Result<&mut Folder> {
        self.folders
            .iter_mut()
            .find(|f| f.id == *id)
            .ok_or(WorkbenchError::FolderNotFound(*id))
    }

    pub(crate) fn insert_project(&mut self, project: Project) {
        self.projects.push(project);
    }

    pub(crate) fn remove_project(&mut self, id: &Uuid) {
        self.projects.retain(|p| p.id != *id);
        self.detached.remove(id);
        if self.current_project == Some(*id) {
            self.current_project = None;
        }
    }

    pub(crate) fn insert_folder(&mut self, folder: Folder) {
        self.folders.push(folder);
    }

    pub(crate) fn remove_folder(&mut self, id: &Uuid) {
        self.folders.retain(|f| f.id != *id);
    }

    pub(crate) fn set_current(&mut self, id: Option<Uuid>) {
        self.current_project = id;
    }

    /// Record an explicit move to root for the next sync.
    pub(crate) fn detach(&mut self, id: Uuid) {
        self.detached.insert(id);
    }

    pub(crate) fn attach(&mut self, id: &Uuid) {
        self.detached.remove(id);
    }
}
