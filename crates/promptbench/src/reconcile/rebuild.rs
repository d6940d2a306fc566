use super::resolve::{resolve_folder_assignment, FolderLookup, MatchStrategy};
use crate::config::RebuildPolicy;
use crate::error::Result;
use crate::manifest::Manifest;
use crate::model::{Folder, Project, Version, VersionMetadata, RESTORED_TAG};
use crate::store::{FileStore, ObjectStore, ScannedProject, StoreSnapshot, META_LAST_RESTORE};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

/// What a rebuild did, for logging and for callers that want to show it.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebuildReport {
    /// The scan found nothing and the object store was left as it was.
    pub skipped: bool,
    /// Projects that kept the id of a previous-generation row.
    pub projects_reused: usize,
    /// Projects seen for the first time.
    pub projects_restored: usize,
    pub versions_restored: usize,
    pub folders_restored: usize,
    /// Names that appeared more than once in the scan; only the first group was used.
    pub duplicates_skipped: Vec<String>,
    /// Per-project folder assignment and the lookup that found it.
    pub folder_matches: BTreeMap<String, MatchStrategy>,
    /// The manifest could not be read or parsed and an empty one was used instead.
    pub manifest_recovered: bool,
    /// Entities that could not be written. The rebuild carries on without them.
    pub failures: Vec<String>,
}

impl RebuildReport {
    pub fn projects_total(&self) -> usize {
        self.projects_reused + self.projects_restored
    }

    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Default::default()
        }
    }
}

/// Re-derive the object store from the File Store and its manifest.
///
/// Ids, timestamps, descriptions and settings of projects and versions that existed
/// before are carried over by name; file content always wins over cached content.
///
/// The store is rewritten in a single batch. A failed scan, snapshot, clear or commit
/// aborts the rebuild and leaves the store untouched. Failures on single entities are
/// logged, recorded in the report and skipped.
///
/// The caller is responsible for scheduling the manifest sync that follows.
pub fn rebuild_from_file_store<L, F>(local: &L, files: &F) -> Result<RebuildReport>
where
    L: ObjectStore + ?Sized,
    F: FileStore + ?Sized,
{
    let scanned = files.list_projects_with_versions()?;
    if scanned.is_empty() {
        tracing::info!("No version files found, keeping local store as is");
        return Ok(RebuildReport::skipped());
    }

    let mut report = RebuildReport::default();
    let manifest = match files.read_manifest() {
        Ok(Some(manifest)) => manifest,
        Ok(None) => Manifest::empty(),
        Err(e) => {
            tracing::warn!("Unreadable manifest, rebuilding without it: {}", e);
            report.manifest_recovered = true;
            Manifest::empty()
        }
    };

    let snapshot = StoreSnapshot::capture(local)?;
    if snapshot.is_empty() {
        tracing::info!("Local store is empty, every project will be restored as new");
    }
    let projects = dedupe_by_name(scanned, &mut report);

    // Everything from the clear on is one batch: either the whole rebuild lands or
    // the store keeps its previous contents.
    local.begin_batch()?;
    if let Err(e) = local.clear_entities() {
        local.abort_batch();
        return Err(e);
    }

    let folder_ids = restore_folders(local, &manifest, &snapshot, &mut report);

    for scanned in &projects {
        restore_project(local, scanned, &manifest, &snapshot, &folder_ids, &mut report);
    }

    if let Err(e) = local.put_meta(META_LAST_RESTORE, &Utc::now().to_rfc3339()) {
        tracing::warn!("Failed to record {}: {}", META_LAST_RESTORE, e);
    }

    if let Err(e) = local.commit_batch() {
        local.abort_batch();
        return Err(e);
    }

    tracing::info!(
        "Rebuilt local store: {} projects ({} reused, {} restored), {} versions, {} folders",
        report.projects_total(),
        report.projects_reused,
        report.projects_restored,
        report.versions_restored,
        report.folders_restored
    );
    if !report.failures.is_empty() {
        tracing::warn!("{} entities failed during rebuild", report.failures.len());
    }

    Ok(report)
}

/// Whether startup should rebuild under `policy`.
///
/// `WhenStale` compares the File Store root's mtime to `lastRestore`. A root mtime
/// only moves when entries directly under it change, so edits inside an existing
/// project directory are not noticed until something else triggers a rebuild.
pub fn needs_rebuild<L, F>(local: &L, files: &F, policy: RebuildPolicy) -> Result<bool>
where
    L: ObjectStore + ?Sized,
    F: FileStore + ?Sized,
{
    if policy == RebuildPolicy::Always {
        return Ok(true);
    }

    if local.all_projects()?.is_empty() {
        tracing::debug!("Local store is empty, rebuilding");
        return Ok(true);
    }

    let last_restore = local
        .get_meta(META_LAST_RESTORE)?
        .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
        .map(|at| at.with_timezone(&Utc));
    let Some(last_restore) = last_restore else {
        tracing::debug!("No previous rebuild recorded, rebuilding");
        return Ok(true);
    };

    match files.last_modified()? {
        Some(modified) if modified > last_restore => {
            tracing::debug!("File Store changed since {}, rebuilding", last_restore);
            Ok(true)
        }
        _ => Ok(false),
    }
}

fn dedupe_by_name(
    scanned: Vec<ScannedProject>,
    report: &mut RebuildReport,
) -> Vec<ScannedProject> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique = Vec::with_capacity(scanned.len());
    for project in scanned {
        if seen.insert(project.name.clone()) {
            unique.push(project);
        } else {
            tracing::warn!("Duplicate project \"{}\" in scan, keeping the first", project.name);
            report.duplicates_skipped.push(project.name);
        }
    }
    unique
}

/// Recreate manifest folders. Returns manifest folder id → live folder id.
fn restore_folders<L>(
    local: &L,
    manifest: &Manifest,
    snapshot: &StoreSnapshot,
    report: &mut RebuildReport,
) -> HashMap<Uuid, Uuid>
where
    L: ObjectStore + ?Sized,
{
    let mut ids: HashMap<Uuid, Uuid> = HashMap::new();
    let mut by_name: HashMap<&str, Uuid> = HashMap::new();

    for entry in &manifest.folders {
        let id = match by_name.get(entry.name.as_str()) {
            Some(id) => *id,
            None => snapshot
                .folders_by_name
                .get(&entry.name)
                .map(|f| f.id)
                .unwrap_or(entry.id),
        };
        by_name.entry(entry.name.as_str()).or_insert(id);
        ids.insert(entry.id, id);
    }

    let mut written: HashSet<Uuid> = HashSet::new();
    for entry in &manifest.folders {
        let Some(id) = ids.get(&entry.id).copied() else {
            continue;
        };
        if written.contains(&id) {
            continue;
        }

        let previous = snapshot.folders_by_name.get(&entry.name);
        let mut folder = Folder::new(entry.name.clone(), None);
        folder.id = id;
        folder.parent_id = entry
            .parent_id
            .and_then(|parent| ids.get(&parent).copied())
            .filter(|parent| *parent != id);
        if let Some(previous) = previous {
            folder.collapsed = previous.collapsed;
            folder.created_at = previous.created_at;
            folder.updated_at = previous.updated_at;
        }

        match local.put_folder(&folder) {
            Ok(()) => {
                written.insert(id);
                report.folders_restored += 1;
            }
            Err(e) => {
                tracing::warn!("Failed to restore folder \"{}\": {}", folder.name, e);
                report.failures.push(format!("folder {}", folder.name));
            }
        }
    }

    ids.retain(|_, live| written.contains(live));
    ids
}

fn restore_project<L>(
    local: &L,
    scanned: &ScannedProject,
    manifest: &Manifest,
    snapshot: &StoreSnapshot,
    folder_ids: &HashMap<Uuid, Uuid>,
    report: &mut RebuildReport,
) where
    L: ObjectStore + ?Sized,
{
    let previous = snapshot.project_for(&scanned.name);
    let name = previous
        .map(|p| p.name.clone())
        .unwrap_or_else(|| scanned.name.clone());

    let lookup = FolderLookup {
        name: &name,
        fs_name: &scanned.name,
        project_id: previous.map(|p| p.id),
    };
    let resolution =
        resolve_folder_assignment(&lookup, manifest, |id| folder_ids.get(&id).copied());
    match resolution {
        Some(hit) => {
            tracing::debug!("Project \"{}\" matched folder via {}", name, hit.strategy);
            report.folder_matches.insert(name.clone(), hit.strategy);
        }
        None => tracing::debug!("Project \"{}\" has no folder, placing at root", name),
    }
    let folder_id = resolution.map(|hit| hit.folder_id);

    let highest = scanned
        .versions
        .iter()
        .map(|v| v.version_number)
        .max()
        .unwrap_or(0);

    let project = match previous {
        Some(previous) => {
            let mut project = previous.clone();
            project.name = name.clone();
            project.folder_id = folder_id;
            let still_exists = scanned
                .versions
                .iter()
                .any(|v| v.version_number == previous.current_version);
            if !still_exists {
                project.current_version = highest;
            }
            project
        }
        None => {
            let mut project = Project::new(
                name.clone(),
                Some(format!(
                    "Restored from local files ({} versions)",
                    scanned.versions.len()
                )),
                folder_id,
            );
            project.current_version = highest;
            project.metadata.tags = vec![RESTORED_TAG.to_string()];
            project
        }
    };

    if let Err(e) = local.put_project(&project) {
        tracing::warn!("Failed to restore project \"{}\": {}", name, e);
        report.failures.push(format!("project {}", name));
        return;
    }
    if previous.is_some() {
        report.projects_reused += 1;
    } else {
        report.projects_restored += 1;
    }

    for file in &scanned.versions {
        let previous_version = previous.and_then(|p| snapshot.version(&p.name, file.version_number));
        let description = manifest
            .version_description(&name, file.version_number)
            .map(str::to_string)
            .or_else(|| previous_version.and_then(|v| v.description.clone()));

        let mut version = Version::new(
            project.id,
            file.version_number,
            file.content.clone(),
            description,
        );
        if let Some(previous_version) = previous_version {
            version.id = previous_version.id;
            version.timestamp = previous_version.timestamp;
            version.auto_generated = previous_version.auto_generated;
            version.metadata = VersionMetadata::from_content(
                &version.content,
                previous_version.metadata.change_type,
            );
        }

        match local.put_version(&version) {
            Ok(()) => report.versions_restored += 1,
            Err(e) => {
                tracing::warn!(
                    "Failed to restore version {} of \"{}\": {}",
                    file.version_number,
                    name,
                    e
                );
                report
                    .failures
                    .push(format!("version {} v{}", name, file.version_number));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkbenchError;
    use crate::manifest::FolderEntry;
    use crate::store::mem_files::MemFileStore;
    use crate::store::mem_local::MemObjectStore;
    use crate::store::ScannedVersion;
    use std::cell::Cell;

    /// Delegates to a `MemObjectStore`, counting commits and writes made outside a
    /// batch. `fail_commit` makes every commit fail.
    #[derive(Default)]
    struct CountingStore {
        inner: MemObjectStore,
        in_batch: Cell<bool>,
        unbatched_writes: Cell<usize>,
        commits: Cell<usize>,
        fail_commit: Cell<bool>,
    }

    impl CountingStore {
        fn wrote(&self) {
            if !self.in_batch.get() {
                self.unbatched_writes.set(self.unbatched_writes.get() + 1);
            }
        }
    }

    impl ObjectStore for CountingStore {
        fn all_projects(&self) -> Result<Vec<Project>> {
            self.inner.all_projects()
        }
        fn get_project(&self, id: &Uuid) -> Result<Option<Project>> {
            self.inner.get_project(id)
        }
        fn put_project(&self, project: &Project) -> Result<()> {
            self.wrote();
            self.inner.put_project(project)
        }
        fn delete_project(&self, id: &Uuid) -> Result<bool> {
            self.wrote();
            self.inner.delete_project(id)
        }
        fn all_versions(&self) -> Result<Vec<Version>> {
            self.inner.all_versions()
        }
        fn versions_for(&self, project_id: &Uuid) -> Result<Vec<Version>> {
            self.inner.versions_for(project_id)
        }
        fn put_version(&self, version: &Version) -> Result<()> {
            self.wrote();
            self.inner.put_version(version)
        }
        fn delete_version(&self, id: &Uuid) -> Result<bool> {
            self.wrote();
            self.inner.delete_version(id)
        }
        fn all_folders(&self) -> Result<Vec<Folder>> {
            self.inner.all_folders()
        }
        fn get_folder(&self, id: &Uuid) -> Result<Option<Folder>> {
            self.inner.get_folder(id)
        }
        fn put_folder(&self, folder: &Folder) -> Result<()> {
            self.wrote();
            self.inner.put_folder(folder)
        }
        fn delete_folder(&self, id: &Uuid) -> Result<bool> {
            self.wrote();
            self.inner.delete_folder(id)
        }
        fn get_meta(&self, key: &str) -> Result<Option<String>> {
            self.inner.get_meta(key)
        }
        fn put_meta(&self, key: &str, value: &str) -> Result<()> {
            self.wrote();
            self.inner.put_meta(key, value)
        }
        fn clear_entities(&self) -> Result<()> {
            self.wrote();
            self.inner.clear_entities()
        }
        fn begin_batch(&self) -> Result<()> {
            self.in_batch.set(true);
            self.inner.begin_batch()
        }
        fn commit_batch(&self) -> Result<()> {
            self.in_batch.set(false);
            self.commits.set(self.commits.get() + 1);
            if self.fail_commit.get() {
                return Err(WorkbenchError::Store("disk full".into()));
            }
            self.inner.commit_batch()
        }
        fn abort_batch(&self) {
            self.in_batch.set(false);
            self.inner.abort_batch()
        }
    }

    fn ids(local: &MemObjectStore) -> (Vec<Uuid>, Vec<Uuid>) {
        let mut projects: Vec<Uuid> = local.all_projects().unwrap().iter().map(|p| p.id).collect();
        let mut versions: Vec<Uuid> = local.all_versions().unwrap().iter().map(|v| v.id).collect();
        projects.sort();
        versions.sort();
        (projects, versions)
    }

    fn project_named(local: &MemObjectStore, name: &str) -> Project {
        local
            .all_projects()
            .unwrap()
            .into_iter()
            .find(|p| p.name == name)
            .unwrap()
    }

    #[test]
    fn rebuild_is_idempotent() {
        let local = MemObjectStore::new();
        let files = MemFileStore::new();
        files.put_file("Demo", "Demo_v1.md", "# Hello");
        files.put_file("Demo", "Demo_v2.md", "# World");
        files.put_file("Other", "Other_v1.md", "x");

        rebuild_from_file_store(&local, &files).unwrap();
        let first = ids(&local);
        let report = rebuild_from_file_store(&local, &files).unwrap();
        let second = ids(&local);

        assert_eq!(first, second);
        assert_eq!(first.0.len(), 2);
        assert_eq!(first.1.len(), 3);
        assert_eq!(report.projects_reused, 2);
        assert_eq!(report.projects_restored, 0);
    }

    #[test]
    fn rebuild_preserves_identity_and_description() {
        let local = MemObjectStore::new();
        let files = MemFileStore::new();
        files.put_file("Demo", "Demo_v1.md", "one");
        rebuild_from_file_store(&local, &files).unwrap();

        let mut project = project_named(&local, "Demo");
        project.description = Some("my prompt".into());
        local.put_project(&project).unwrap();

        files.put_file("Demo", "Demo_v2.md", "two");
        rebuild_from_file_store(&local, &files).unwrap();

        let rebuilt = project_named(&local, "Demo");
        assert_eq!(rebuilt.id, project.id);
        assert_eq!(rebuilt.description.as_deref(), Some("my prompt"));
        assert_eq!(rebuilt.metadata.created_at, project.metadata.created_at);
        assert_eq!(local.versions_for(&rebuilt.id).unwrap().len(), 2);
    }

    #[test]
    fn version_gaps_are_kept() {
        let local = MemObjectStore::new();
        let files = MemFileStore::new();
        files.put_file("Demo", "Demo_v1.md", "a");
        files.put_file("Demo", "Demo_v2.md", "b");
        files.put_file("Demo", "Demo_v4.md", "d");

        rebuild_from_file_store(&local, &files).unwrap();

        let project = project_named(&local, "Demo");
        let numbers: Vec<u32> = local
            .versions_for(&project.id)
            .unwrap()
            .iter()
            .map(|v| v.version_number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 4]);
        assert_eq!(project.current_version, 4);
    }

    #[test]
    fn duplicate_scan_groups_create_one_project() {
        let local = MemObjectStore::new();
        let files = MemFileStore::new();
        files.put_file("Demo", "Demo_v1.md", "real");
        files.add_shadow_group(ScannedProject {
            name: "Demo".into(),
            versions: vec![ScannedVersion {
                version_number: 1,
                content: "copy".into(),
                file_name: "Demo_v1.md".into(),
            }],
        });

        let report = rebuild_from_file_store(&local, &files).unwrap();

        let projects = local.all_projects().unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(report.duplicates_skipped, vec!["Demo".to_string()]);
        let versions = local.versions_for(&projects[0].id).unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].content, "real");
    }

    #[test]
    fn file_content_wins_over_cached_content() {
        let local = MemObjectStore::new();
        let files = MemFileStore::new();
        files.put_file("Demo", "Demo_v1.md", "original");
        rebuild_from_file_store(&local, &files).unwrap();
        let before = local.all_versions().unwrap().remove(0);

        files.put_file("Demo", "Demo_v1.md", "edited outside");
        rebuild_from_file_store(&local, &files).unwrap();
        let after = local.all_versions().unwrap().remove(0);

        assert_eq!(after.id, before.id);
        assert_eq!(after.timestamp, before.timestamp);
        assert_eq!(after.content, "edited outside");
        assert_eq!(after.metadata.characters, "edited outside".len());
    }

    #[test]
    fn new_projects_are_tagged_restored() {
        let local = MemObjectStore::new();
        let files = MemFileStore::new();
        files.put_file("Demo", "Demo_v1.md", "a");
        files.put_file("Demo", "Demo_v2.md", "b");

        rebuild_from_file_store(&local, &files).unwrap();

        let project = project_named(&local, "Demo");
        assert_eq!(project.metadata.tags, vec![RESTORED_TAG.to_string()]);
        assert_eq!(
            project.description.as_deref(),
            Some("Restored from local files (2 versions)")
        );
        assert!(local.get_meta(META_LAST_RESTORE).unwrap().is_some());
    }

    #[test]
    fn empty_scan_leaves_store_untouched() {
        let local = MemObjectStore::new();
        let files = MemFileStore::new();
        let project = Project::new("Draft".into(), None, None);
        local.put_project(&project).unwrap();

        let report = rebuild_from_file_store(&local, &files).unwrap();

        assert!(report.skipped);
        assert_eq!(local.all_projects().unwrap(), vec![project]);
        assert!(local.get_meta(META_LAST_RESTORE).unwrap().is_none());
    }

    #[test]
    fn descriptions_come_from_manifest_first() {
        let local = MemObjectStore::new();
        let files = MemFileStore::new();
        files.put_file("Demo", "Demo_v1.md", "a");
        let mut manifest = Manifest::empty();
        manifest.set_version_description("Demo", 1, Some("fix typo"));
        files.write_manifest(&manifest).unwrap();

        rebuild_from_file_store(&local, &files).unwrap();

        let version = local.all_versions().unwrap().remove(0);
        assert_eq!(version.description.as_deref(), Some("fix typo"));
    }

    #[test]
    fn snapshot_description_is_the_fallback() {
        let local = MemObjectStore::new();
        let files = MemFileStore::new();
        files.put_file("Demo", "Demo_v1.md", "a");
        rebuild_from_file_store(&local, &files).unwrap();

        let mut version = local.all_versions().unwrap().remove(0);
        version.description = Some("kept locally".into());
        local.put_version(&version).unwrap();

        rebuild_from_file_store(&local, &files).unwrap();
        let rebuilt = local.all_versions().unwrap().remove(0);
        assert_eq!(rebuilt.description.as_deref(), Some("kept locally"));
    }

    #[test]
    fn folders_are_restored_with_previous_ids_and_state() {
        let local = MemObjectStore::new();
        let files = MemFileStore::new();
        files.put_file("Demo", "Demo_v1.md", "a");

        let mut existing = Folder::new("Work".into(), None);
        existing.collapsed = true;
        local.put_folder(&existing).unwrap();

        let recorded = Uuid::new_v4();
        let mut manifest = Manifest::empty();
        manifest.folders.push(FolderEntry {
            id: recorded,
            name: "Work".into(),
            parent_id: None,
        });
        manifest.project_mappings.insert("Demo".into(), Some(recorded));
        files.write_manifest(&manifest).unwrap();

        let report = rebuild_from_file_store(&local, &files).unwrap();

        let folders = local.all_folders().unwrap();
        assert_eq!(folders.len(), 1);
        assert_eq!(folders[0].id, existing.id);
        assert!(folders[0].collapsed);
        assert_eq!(project_named(&local, "Demo").folder_id, Some(existing.id));
        assert_eq!(report.folder_matches["Demo"], MatchStrategy::Direct);
    }

    #[test]
    fn manifest_folder_ids_are_kept_after_a_wipe() {
        let local = MemObjectStore::new();
        let files = MemFileStore::new();
        files.put_file("Demo", "Demo_v1.md", "a");

        let parent = Uuid::new_v4();
        let child = Uuid::new_v4();
        let mut manifest = Manifest::empty();
        manifest.folders.push(FolderEntry {
            id: parent,
            name: "Work".into(),
            parent_id: None,
        });
        manifest.folders.push(FolderEntry {
            id: child,
            name: "Drafts".into(),
            parent_id: Some(parent),
        });
        manifest.project_mappings.insert("Demo".into(), Some(child));
        files.write_manifest(&manifest).unwrap();

        rebuild_from_file_store(&local, &files).unwrap();

        let drafts = local.get_folder(&child).unwrap().unwrap();
        assert_eq!(drafts.parent_id, Some(parent));
        assert!(!drafts.collapsed);
        assert_eq!(project_named(&local, "Demo").folder_id, Some(child));
    }

    #[test]
    fn corrupt_manifest_is_recovered() {
        let local = MemObjectStore::new();
        let files = MemFileStore::new();
        files.put_file("Demo", "Demo_v1.md", "a");
        files.put_raw_manifest("{ not json");

        let report = rebuild_from_file_store(&local, &files).unwrap();

        assert!(report.manifest_recovered);
        assert_eq!(report.projects_restored, 1);
        assert!(local.all_folders().unwrap().is_empty());
    }

    #[test]
    fn failed_clear_aborts_before_recreating() {
        let local = MemObjectStore::new();
        let files = MemFileStore::new();
        files.put_file("Demo", "Demo_v1.md", "a");
        rebuild_from_file_store(&local, &files).unwrap();
        let before = ids(&local);

        local.set_simulate_write_error(true);
        assert!(rebuild_from_file_store(&local, &files).is_err());
        assert_eq!(ids(&local), before);

        local.set_simulate_write_error(false);
        let report = rebuild_from_file_store(&local, &files).unwrap();
        assert!(report.failures.is_empty());
        assert_eq!(ids(&local), before);
    }

    #[test]
    fn rebuild_writes_the_store_in_one_batch() {
        let local = CountingStore::default();
        let files = MemFileStore::new();
        files.put_file("Demo", "Demo_v1.md", "a");
        files.put_file("Demo", "Demo_v2.md", "b");
        files.put_file("Other", "Other_v1.md", "c");
        let mut manifest = Manifest::empty();
        manifest.folders.push(FolderEntry {
            id: Uuid::new_v4(),
            name: "Work".into(),
            parent_id: None,
        });
        files.write_manifest(&manifest).unwrap();

        let report = rebuild_from_file_store(&local, &files).unwrap();

        assert_eq!(report.versions_restored, 3);
        assert_eq!(report.folders_restored, 1);
        assert_eq!(local.commits.get(), 1);
        assert_eq!(local.unbatched_writes.get(), 0);
    }

    #[test]
    fn failed_commit_keeps_previous_rows() {
        let local = CountingStore::default();
        let files = MemFileStore::new();
        files.put_file("Demo", "Demo_v1.md", "a");
        rebuild_from_file_store(&local, &files).unwrap();
        let before = ids(&local.inner);

        files.put_file("Other", "Other_v1.md", "b");
        local.fail_commit.set(true);
        assert!(rebuild_from_file_store(&local, &files).is_err());

        assert_eq!(ids(&local.inner), before);
        let names: Vec<String> = local
            .inner
            .all_projects()
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Demo".to_string()]);
    }

    #[test]
    fn sanitized_names_find_their_previous_project() {
        let local = MemObjectStore::new();
        let files = MemFileStore::new();
        let project = Project::new("a/b".into(), Some("slashes".into()), None);
        local.put_project(&project).unwrap();
        files.put_file("a_b", "a_b_v1.md", "body");

        rebuild_from_file_store(&local, &files).unwrap();

        let rebuilt = local.get_project(&project.id).unwrap().unwrap();
        assert_eq!(rebuilt.name, "a/b");
        assert_eq!(rebuilt.description.as_deref(), Some("slashes"));
    }

    #[test]
    fn always_policy_always_rebuilds() {
        let local = MemObjectStore::new();
        let files = MemFileStore::new();
        assert!(needs_rebuild(&local, &files, RebuildPolicy::Always).unwrap());
    }

    #[test]
    fn when_stale_policy_compares_root_mtime() {
        let local = MemObjectStore::new();
        let files = MemFileStore::new();
        files.put_file("Demo", "Demo_v1.md", "a");
        assert!(needs_rebuild(&local, &files, RebuildPolicy::WhenStale).unwrap());

        files.set_last_modified(Utc::now() - chrono::Duration::hours(1));
        rebuild_from_file_store(&local, &files).unwrap();
        assert!(!needs_rebuild(&local, &files, RebuildPolicy::WhenStale).unwrap());

        files.set_last_modified(Utc::now() + chrono::Duration::hours(1));
        assert!(needs_rebuild(&local, &files, RebuildPolicy::WhenStale).unwrap());
    }
}
