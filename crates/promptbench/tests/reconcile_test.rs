//! End-to-end reconciliation against a real directory tree and a persisted cache.

use promptbench::api::WorkbenchApi;
use promptbench::commands::folders::FolderDeletePolicy;
use promptbench::config::WorkbenchConfig;
use promptbench::manifest::Manifest;
use promptbench::model::RESTORED_TAG;
use promptbench::store::fs_files::FsFileStore;
use promptbench::store::json_local::JsonObjectStore;
use promptbench::store::{FileStore, ObjectStore};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Env {
    _dir: TempDir,
    root: PathBuf,
    cache: PathBuf,
}

impl Env {
    fn new() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("prompts");
        let cache = dir.path().join(".promptbench").join("cache.json");
        Self {
            _dir: dir,
            root,
            cache,
        }
    }

    /// A fresh "process": new store handles over the same paths, already loaded.
    fn open(&self) -> WorkbenchApi<JsonObjectStore, FsFileStore> {
        let mut api = WorkbenchApi::new(
            JsonObjectStore::new(self.cache.clone()),
            FsFileStore::new(self.root.clone()),
            &WorkbenchConfig::default(),
        );
        api.load().unwrap();
        api
    }

    fn manifest(&self) -> Manifest {
        FsFileStore::new(self.root.clone())
            .read_manifest()
            .unwrap()
            .unwrap()
    }

    fn file(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_saved_versions_survive_cache_deletion() {
    let env = Env::new();
    {
        let mut api = env.open();
        api.create_project("Demo", Some("greeting".into()), None)
            .unwrap();
        api.save_version("Demo", "# Hello", None).unwrap();
        api.save_version("Demo", "# World", Some("fix typo".into()))
            .unwrap();
        api.flush();
    }
    assert_eq!(read(&env.file("Demo/Demo_v1.md")), "# Hello");
    assert_eq!(read(&env.file("Demo/Demo_v2.md")), "# World");

    fs::remove_file(&env.cache).unwrap();
    let api = env.open();

    let versions = api.list_versions("Demo").unwrap().versions;
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[1].description.as_deref(), Some("fix typo"));
    let current = api.get_version("Demo", None).unwrap();
    assert_eq!(current.versions[0].content, "# World");
}

#[test]
fn test_ids_are_stable_across_runs() {
    let env = Env::new();
    let first_id = {
        let mut api = env.open();
        let id = api.create_project("Demo", None, None).unwrap().affected_projects[0].id;
        api.save_version("Demo", "a", None).unwrap();
        api.flush();
        id
    };

    fs::write(env.file("Demo/Demo_v2.md"), "added by hand").unwrap();
    let api = env.open();

    let project = api.workbench().project_by_name("Demo").unwrap();
    assert_eq!(project.id, first_id);
    assert!(!project.metadata.tags.contains(&RESTORED_TAG.to_string()));
    assert_eq!(api.list_versions("Demo").unwrap().versions.len(), 2);
}

#[test]
fn test_files_dropped_in_by_hand_are_restored() {
    let env = Env::new();
    fs::create_dir_all(env.file("Imported")).unwrap();
    fs::write(env.file("Imported/Imported_v1.md"), "one").unwrap();
    fs::write(env.file("Imported/Imported_v3.md"), "three").unwrap();

    let mut api = env.open();

    let project = api.workbench().project_by_name("Imported").unwrap().clone();
    assert_eq!(project.metadata.tags, vec![RESTORED_TAG.to_string()]);
    assert_eq!(project.current_version, 3);

    let saved = api.save_version("Imported", "four", None).unwrap();
    assert_eq!(saved.versions[0].version_number, 4);
}

#[test]
fn test_rename_updates_disk_and_manifest() {
    let env = Env::new();
    let mut api = env.open();
    api.create_project("Demo", None, None).unwrap();
    api.save_version("Demo", "a", None).unwrap();
    api.save_version("Demo", "b", None).unwrap();
    api.flush();

    api.rename_project("Demo", "Demo2").unwrap();
    api.flush();

    assert!(!env.file("Demo").exists());
    assert_eq!(read(&env.file("Demo2/Demo2_v1.md")), "a");
    assert_eq!(read(&env.file("Demo2/Demo2_v2.md")), "b");
    let manifest = env.manifest();
    assert!(!manifest.project_mappings.contains_key("Demo"));
    assert!(manifest.project_mappings.contains_key("Demo2"));
}

#[test]
fn test_folders_survive_cache_deletion() {
    let env = Env::new();
    let folder_id = {
        let mut api = env.open();
        let folder = api.create_folder("Work", None).unwrap().folders[0].id;
        api.toggle_folder("Work").unwrap();
        api.create_project("Demo", None, Some("Work")).unwrap();
        api.save_version("Demo", "x", None).unwrap();
        api.flush();
        folder
    };

    fs::remove_file(&env.cache).unwrap();
    let api = env.open();

    let project = api.workbench().project_by_name("Demo").unwrap();
    assert_eq!(project.folder_id, Some(folder_id));
    // Collapse state lives only in the cache.
    assert!(!api.workbench().folder(&folder_id).unwrap().collapsed);
}

#[test]
fn test_cascade_folder_delete_removes_directories() {
    let env = Env::new();
    let mut api = env.open();
    api.create_folder("Old", None).unwrap();
    api.create_project("Inside", None, Some("Old")).unwrap();
    api.save_version("Inside", "x", None).unwrap();

    api.delete_folder("Old", FolderDeletePolicy::CascadeProjects)
        .unwrap();
    api.flush();

    assert!(!env.file("Inside").exists());
    let manifest = env.manifest();
    assert!(manifest.folders.is_empty());
    assert!(manifest.project_mappings.is_empty());
}

#[test]
fn test_corrupt_manifest_does_not_block_startup() {
    let env = Env::new();
    fs::create_dir_all(env.file("Demo")).unwrap();
    fs::write(env.file("Demo/Demo_v1.md"), "x").unwrap();
    fs::write(env.file("structure.json"), "{ broken").unwrap();

    let mut api = env.open();
    assert_eq!(api.list().unwrap().listed_projects.len(), 1);

    api.flush();
    assert!(env.manifest().project_mappings.contains_key("Demo"));
}

#[test]
fn test_unwritable_cache_keeps_serving_cached_rows() {
    let env = Env::new();
    let mut api = env.open();
    api.create_project("Demo", None, None).unwrap();
    api.save_version("Demo", "# Hello", None).unwrap();
    api.flush();

    fs::create_dir_all(env.file("Other")).unwrap();
    fs::write(env.file("Other/Other_v1.md"), "dropped in by hand").unwrap();

    // A non-empty directory in place of the cache file makes every write fail.
    fs::remove_file(&env.cache).unwrap();
    fs::create_dir(&env.cache).unwrap();
    fs::write(env.cache.join("keep"), "x").unwrap();

    let loaded = api.load().unwrap();
    assert!(loaded
        .messages
        .iter()
        .any(|m| m.content.starts_with("Rebuild failed, using cached data")));

    let names: Vec<String> = api
        .list()
        .unwrap()
        .listed_projects
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Demo".to_string()]);

    assert!(api.create_project("Third", None, None).is_err());
    let local = api.workbench().local();
    let projects = local.all_projects().unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(local.versions_for(&projects[0].id).unwrap().len(), 1);
}
