use super::resolve::{resolve_folder_assignment, FolderLookup, MatchStrategy};
use crate::error::Result;
use crate::manifest::{FolderEntry, Manifest};
use crate::model::{Folder, Project};
use crate::store::{FileStore, ObjectStore, META_LAST_LOCAL_SYNC};
use chrono::Utc;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

/// The in-memory state a sync writes out.
#[derive(Debug, Clone, Copy)]
pub struct SyncState<'a> {
    pub projects: &'a [Project],
    pub folders: &'a [Folder],
    /// Projects the user explicitly moved to root since the last sync. The manifest's
    /// previous assignment must not be restored for these.
    pub detached: &'a HashSet<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub projects_written: usize,
    pub folders_written: usize,
    pub descriptions_written: usize,
    /// Projects without an in-memory folder whose assignment was kept from the
    /// previous manifest.
    pub preserved: BTreeMap<String, MatchStrategy>,
    /// The previous manifest could not be read, so nothing could be preserved.
    pub previous_unreadable: bool,
}

/// Write the manifest from current in-memory state.
///
/// The manifest is rebuilt from scratch and replaces the previous one, so renamed or
/// deleted projects lose their old keys. The only thing taken from the previous file
/// is the folder of a project that has none in memory.
///
/// A failed manifest write is returned as an error. A failed version read for one
/// project only drops that project's descriptions.
pub fn sync_structure_to_local<L, F>(
    local: &L,
    files: &F,
    state: SyncState<'_>,
) -> Result<SyncReport>
where
    L: ObjectStore + ?Sized,
    F: FileStore + ?Sized,
{
    let mut report = SyncReport::default();
    let previous = match files.read_manifest() {
        Ok(previous) => previous,
        Err(e) => {
            tracing::warn!("Could not read manifest before sync: {}", e);
            report.previous_unreadable = true;
            None
        }
    };

    let known: HashSet<Uuid> = state.folders.iter().map(|f| f.id).collect();
    let canonical = |id: Uuid| known.contains(&id).then_some(id);

    let mut manifest = Manifest::empty();
    manifest.folders = state
        .folders
        .iter()
        .map(|f| FolderEntry {
            id: f.id,
            name: f.name.clone(),
            parent_id: f.parent_id.filter(|p| known.contains(p)),
        })
        .collect();
    report.folders_written = manifest.folders.len();

    for project in state.projects {
        let fs_name = project.fs_name();
        let folder_id = match project.folder_id.filter(|f| known.contains(f)) {
            Some(folder_id) => Some(folder_id),
            None if state.detached.contains(&project.id) => None,
            None => {
                let lookup = FolderLookup {
                    name: &project.name,
                    fs_name: &fs_name,
                    project_id: Some(project.id),
                };
                let preserved = previous
                    .as_ref()
                    .and_then(|m| resolve_folder_assignment(&lookup, m, canonical));
                if let Some(hit) = preserved {
                    tracing::debug!(
                        "Keeping folder of \"{}\" from previous manifest via {}",
                        project.name,
                        hit.strategy
                    );
                    report.preserved.insert(project.name.clone(), hit.strategy);
                }
                preserved.map(|hit| hit.folder_id)
            }
        };
        manifest.map_project(&project.name, &fs_name, project.id, folder_id);
        report.projects_written += 1;

        match local.versions_for(&project.id) {
            Ok(versions) => {
                for version in versions {
                    if version.description.as_deref().is_some_and(|d| !d.is_empty()) {
                        manifest.set_version_description(
                            &project.name,
                            version.version_number,
                            version.description.as_deref(),
                        );
                        report.descriptions_written += 1;
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Skipping descriptions of \"{}\": {}", project.name, e);
            }
        }
    }

    files.write_manifest(&manifest)?;

    if let Err(e) = local.put_meta(META_LAST_LOCAL_SYNC, &Utc::now().to_rfc3339()) {
        tracing::warn!("Failed to record {}: {}", META_LAST_LOCAL_SYNC, e);
    }

    tracing::debug!(
        "Manifest written: {} projects, {} folders, {} descriptions",
        report.projects_written,
        report.folders_written,
        report.descriptions_written
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Version;
    use crate::store::mem_files::MemFileStore;
    use crate::store::mem_local::MemObjectStore;

    fn sync(
        local: &MemObjectStore,
        files: &MemFileStore,
        projects: &[Project],
        folders: &[Folder],
        detached: &HashSet<Uuid>,
    ) -> SyncReport {
        sync_structure_to_local(
            local,
            files,
            SyncState {
                projects,
                folders,
                detached,
            },
        )
        .unwrap()
    }

    fn written(files: &MemFileStore) -> Manifest {
        files.read_manifest().unwrap().unwrap()
    }

    #[test]
    fn writes_every_mapping_for_every_project() {
        let local = MemObjectStore::new();
        let files = MemFileStore::new();
        let folder = Folder::new("Work".into(), None);
        let project = Project::new("a/b".into(), None, Some(folder.id));

        sync(&local, &files, &[project.clone()], &[folder.clone()], &HashSet::new());

        let manifest = written(&files);
        assert_eq!(manifest.project_mappings["a/b"], Some(folder.id));
        assert_eq!(manifest.project_id_mappings[&project.id].fs_name, "a_b");
        assert_eq!(
            manifest.project_id_mappings[&project.id].folder_id,
            Some(folder.id)
        );
        assert_eq!(manifest.fs_name_to_project_id["a_b"], project.id);
        assert_eq!(manifest.folders[0].name, "Work");
        assert!(manifest.last_updated.is_some());
        assert!(local.get_meta(META_LAST_LOCAL_SYNC).unwrap().is_some());
    }

    #[test]
    fn keeps_folder_from_previous_manifest() {
        let local = MemObjectStore::new();
        let files = MemFileStore::new();
        let folder = Folder::new("Work".into(), None);
        let mut project = Project::new("P".into(), None, Some(folder.id));
        sync(&local, &files, &[project.clone()], &[folder.clone()], &HashSet::new());

        project.folder_id = None;
        let report = sync(&local, &files, &[project], &[folder.clone()], &HashSet::new());

        assert_eq!(written(&files).project_mappings["P"], Some(folder.id));
        assert_eq!(report.preserved["P"], MatchStrategy::Direct);
    }

    #[test]
    fn detached_projects_go_to_root() {
        let local = MemObjectStore::new();
        let files = MemFileStore::new();
        let folder = Folder::new("Work".into(), None);
        let mut project = Project::new("P".into(), None, Some(folder.id));
        sync(&local, &files, &[project.clone()], &[folder.clone()], &HashSet::new());

        project.folder_id = None;
        let detached: HashSet<Uuid> = [project.id].into_iter().collect();
        let report = sync(&local, &files, &[project], &[folder], &detached);

        assert_eq!(written(&files).project_mappings["P"], None);
        assert!(report.preserved.is_empty());
    }

    #[test]
    fn mappings_to_deleted_folders_are_not_preserved() {
        let local = MemObjectStore::new();
        let files = MemFileStore::new();
        let folder = Folder::new("Work".into(), None);
        let mut project = Project::new("P".into(), None, Some(folder.id));
        sync(&local, &files, &[project.clone()], &[folder], &HashSet::new());

        project.folder_id = None;
        sync(&local, &files, &[project], &[], &HashSet::new());

        let manifest = written(&files);
        assert_eq!(manifest.project_mappings["P"], None);
        assert!(manifest.folders.is_empty());
    }

    #[test]
    fn renamed_project_loses_old_keys() {
        let local = MemObjectStore::new();
        let files = MemFileStore::new();
        let mut project = Project::new("Demo".into(), None, None);
        sync(&local, &files, &[project.clone()], &[], &HashSet::new());

        project.name = "Demo2".into();
        sync(&local, &files, &[project.clone()], &[], &HashSet::new());

        let manifest = written(&files);
        assert!(!manifest.project_mappings.contains_key("Demo"));
        assert!(manifest.project_mappings.contains_key("Demo2"));
        assert!(!manifest.fs_name_to_project_id.contains_key("Demo"));
        assert_eq!(manifest.fs_name_to_project_id["Demo2"], project.id);
    }

    #[test]
    fn emits_non_empty_version_descriptions() {
        let local = MemObjectStore::new();
        let files = MemFileStore::new();
        let project = Project::new("Demo".into(), None, None);
        local
            .put_version(&Version::new(project.id, 1, "a".into(), Some("fix typo".into())))
            .unwrap();
        local
            .put_version(&Version::new(project.id, 2, "b".into(), None))
            .unwrap();

        let report = sync(&local, &files, &[project], &[], &HashSet::new());

        let manifest = written(&files);
        assert_eq!(manifest.version_description("Demo", 1), Some("fix typo"));
        assert_eq!(manifest.version_description("Demo", 2), None);
        assert_eq!(report.descriptions_written, 1);
    }

    #[test]
    fn unreadable_previous_manifest_is_replaced() {
        let local = MemObjectStore::new();
        let files = MemFileStore::new();
        files.put_raw_manifest("{ nope");
        let project = Project::new("Demo".into(), None, None);

        let report = sync(&local, &files, &[project], &[], &HashSet::new());

        assert!(report.previous_unreadable);
        assert!(written(&files).project_mappings.contains_key("Demo"));
    }

    #[test]
    fn write_failure_is_returned() {
        let local = MemObjectStore::new();
        let files = MemFileStore::new();
        files.set_simulate_write_error(true);
        let projects = vec![Project::new("Demo".into(), None, None)];
        let detached = HashSet::new();

        let result = sync_structure_to_local(
            &local,
            &files,
            SyncState {
                projects: &projects,
                folders: &[],
                detached: &detached,
            },
        );
        assert!(result.is_err());
        assert!(local.get_meta(META_LAST_LOCAL_SYNC).unwrap().is_none());
    }
}
