use crate::error::Result;
use crate::model::{Folder, Project, Version};
use std::collections::HashMap;
use uuid::Uuid;

/// Metadata key recording when the last rebuild finished.
pub const META_LAST_RESTORE: &str = "lastRestore";
/// Metadata key recording when the manifest was last written.
pub const META_LAST_LOCAL_SYNC: &str = "lastLocalSync";

/// The Local Object Store: a fast keyed store for projects, versions, folders and
/// small metadata values.
///
/// It is volatile by contract. Callers must assume it can be wiped at any time and
/// rebuilt from the File Store.
pub trait ObjectStore {
    // --- Projects ---

    fn all_projects(&self) -> Result<Vec<Project>>;

    fn get_project(&self, id: &Uuid) -> Result<Option<Project>>;

    /// Insert or replace by id.
    fn put_project(&self, project: &Project) -> Result<()>;

    /// Returns true if a row was removed.
    fn delete_project(&self, id: &Uuid) -> Result<bool>;

    // --- Versions ---

    fn all_versions(&self) -> Result<Vec<Version>>;

    /// Versions of one project, sorted by `version_number`.
    fn versions_for(&self, project_id: &Uuid) -> Result<Vec<Version>>;

    fn put_version(&self, version: &Version) -> Result<()>;

    fn delete_version(&self, id: &Uuid) -> Result<bool>;

    // --- Folders ---

    fn all_folders(&self) -> Result<Vec<Folder>>;

    fn get_folder(&self, id: &Uuid) -> Result<Option<Folder>>;

    fn put_folder(&self, folder: &Folder) -> Result<()>;

    fn delete_folder(&self, id: &Uuid) -> Result<bool>;

    // --- Metadata ---

    fn get_meta(&self, key: &str) -> Result<Option<String>>;

    fn put_meta(&self, key: &str, value: &str) -> Result<()>;

    /// Remove every project, version and folder row in one step. Metadata survives.
    fn clear_entities(&self) -> Result<()>;

    // --- Batching ---

    /// Defer persistence of the following writes until [`ObjectStore::commit_batch`].
    /// Stores that do no I/O per write can ignore it.
    fn begin_batch(&self) -> Result<()> {
        Ok(())
    }

    /// Make every write since `begin_batch` durable at once. On failure the batch is
    /// dropped and the store keeps its state from before `begin_batch`.
    fn commit_batch(&self) -> Result<()> {
        Ok(())
    }

    /// Drop the writes made since `begin_batch`.
    fn abort_batch(&self) {}
}

/// Read-only copy of the store taken before a rebuild mutates it.
#[derive(Debug, Default)]
pub struct StoreSnapshot {
    pub by_name: HashMap<String, Project>,
    pub by_id: HashMap<Uuid, Project>,
    /// Versions grouped by owning project *name*, sorted by number.
    pub versions_by_project_name: HashMap<String, Vec<Version>>,
    pub folders_by_name: HashMap<String, Folder>,
}

impl StoreSnapshot {
    pub fn capture<S: ObjectStore + ?Sized>(store: &S) -> Result<Self> {
        let projects = store.all_projects()?;
        let versions = store.all_versions()?;
        let folders = store.all_folders()?;

        let mut snapshot = StoreSnapshot::default();
        for project in projects {
            snapshot.by_id.insert(project.id, project.clone());
            // First row for a name wins, matching how the store is hydrated.
            snapshot
                .by_name
                .entry(project.name.clone())
                .or_insert(project);
        }

        for version in versions {
            if let Some(owner) = snapshot.by_id.get(&version.project_id) {
                snapshot
                    .versions_by_project_name
                    .entry(owner.name.clone())
                    .or_default()
                    .push(version);
            }
        }
        for versions in snapshot.versions_by_project_name.values_mut() {
            versions.sort_by_key(|v| v.version_number);
        }

        for folder in folders {
            snapshot
                .folders_by_name
                .entry(folder.name.clone())
                .or_insert(folder);
        }

        Ok(snapshot)
    }

    /// The previous-generation project for a scanned directory name.
    ///
    /// Exact name first, then a project whose sanitized name is `fs_name`, so `a/b`
    /// is found again from its `a_b/` directory.
    pub fn project_for(&self, fs_name: &str) -> Option<&Project> {
        self.by_name.get(fs_name).or_else(|| {
            let mut matches: Vec<&Project> = self
                .by_id
                .values()
                .filter(|p| p.fs_name() == fs_name)
                .collect();
            matches.sort_by_key(|p| p.metadata.created_at);
            matches.into_iter().next()
        })
    }

    pub fn version(&self, project_name: &str, number: u32) -> Option<&Version> {
        self.versions_by_project_name
            .get(project_name)
            .and_then(|versions| versions.iter().find(|v| v.version_number == number))
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty() && self.folders_by_name.is_empty()
    }
}
