use super::files::{FileStore, ScannedProject, ScannedVersion};
use crate::error::{Result, WorkbenchError};
use crate::manifest::Manifest;
use crate::model::{parse_version_file_name, version_file_name};
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// In-memory File Store for testing.
///
/// Directories are keyed by name and hold `file name -> content`. Uses `RefCell`
/// for interior mutability so the `FileStore` trait can take `&self`.
#[derive(Default)]
pub struct MemFileStore {
    dirs: RefCell<BTreeMap<String, BTreeMap<String, String>>>,
    manifest: RefCell<Option<String>>,
    /// Extra scan results appended after the real ones (duplicate groups).
    shadow_groups: RefCell<Vec<ScannedProject>>,
    modified: RefCell<Option<DateTime<Utc>>>,
    simulate_write_error: RefCell<bool>,
}

impl MemFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Drop a raw file into `<dir>/`, as an external editor would.
    pub fn put_file(&self, dir: &str, file_name: &str, content: &str) {
        self.dirs
            .borrow_mut()
            .entry(dir.to_string())
            .or_default()
            .insert(file_name.to_string(), content.to_string());
        self.touch();
    }

    pub fn remove_file(&self, dir: &str, file_name: &str) -> bool {
        let removed = self
            .dirs
            .borrow_mut()
            .get_mut(dir)
            .and_then(|files| files.remove(file_name))
            .is_some();
        self.touch();
        removed
    }

    pub fn read_file(&self, dir: &str, file_name: &str) -> Option<String> {
        self.dirs
            .borrow()
            .get(dir)
            .and_then(|files| files.get(file_name).cloned())
    }

    pub fn has_dir(&self, dir: &str) -> bool {
        self.dirs.borrow().contains_key(dir)
    }

    pub fn file_names(&self, dir: &str) -> Vec<String> {
        self.dirs
            .borrow()
            .get(dir)
            .map(|files| files.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Store raw manifest text, bypassing serialization (for corruption tests).
    pub fn put_raw_manifest(&self, raw: &str) {
        *self.manifest.borrow_mut() = Some(raw.to_string());
    }

    /// Make the next scans report an additional group, as a symlinked copy would.
    pub fn add_shadow_group(&self, project: ScannedProject) {
        self.shadow_groups.borrow_mut().push(project);
    }

    pub fn set_last_modified(&self, at: DateTime<Utc>) {
        *self.modified.borrow_mut() = Some(at);
    }

    fn touch(&self) {
        *self.modified.borrow_mut() = Some(Utc::now());
    }

    fn check_writable(&self) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(WorkbenchError::Store("Simulated write error".to_string()));
        }
        Ok(())
    }
}

impl FileStore for MemFileStore {
    fn list_projects_with_versions(&self) -> Result<Vec<ScannedProject>> {
        let dirs = self.dirs.borrow();
        let mut projects: Vec<ScannedProject> = Vec::new();

        for files in dirs.values() {
            let mut groups: BTreeMap<String, Vec<ScannedVersion>> = BTreeMap::new();
            for (file_name, content) in files {
                if let Some((name, version_number)) = parse_version_file_name(file_name) {
                    groups.entry(name).or_default().push(ScannedVersion {
                        version_number,
                        content: content.clone(),
                        file_name: file_name.clone(),
                    });
                }
            }
            for (name, mut versions) in groups {
                versions.sort_by_key(|v| v.version_number);
                projects.push(ScannedProject { name, versions });
            }
        }

        projects.extend(self.shadow_groups.borrow().iter().cloned());
        Ok(projects)
    }

    fn read_manifest(&self) -> Result<Option<Manifest>> {
        match self.manifest.borrow().as_deref() {
            Some(raw) => Manifest::from_json(raw).map(Some),
            None => Ok(None),
        }
    }

    fn write_manifest(&self, manifest: &Manifest) -> Result<()> {
        self.check_writable()?;
        let mut stamped = manifest.clone();
        stamped.last_updated = Some(Utc::now());
        *self.manifest.borrow_mut() = Some(stamped.to_json_pretty()?);
        Ok(())
    }

    fn rename_project_directory(&self, old_name: &str, new_name: &str) -> Result<()> {
        self.check_writable()?;
        let mut dirs = self.dirs.borrow_mut();
        if dirs.contains_key(new_name) {
            return Err(WorkbenchError::NameConflict(new_name.to_string()));
        }
        let files = dirs
            .remove(old_name)
            .ok_or_else(|| WorkbenchError::ProjectDirNotFound(old_name.to_string()))?;

        let renamed = files
            .into_iter()
            .map(|(file_name, content)| match parse_version_file_name(&file_name) {
                Some((prefix, number)) if prefix == old_name => {
                    (version_file_name(new_name, number), content)
                }
                _ => (file_name, content),
            })
            .collect();
        dirs.insert(new_name.to_string(), renamed);
        drop(dirs);
        self.touch();
        Ok(())
    }

    fn delete_project_directory(&self, name: &str) -> Result<()> {
        self.check_writable()?;
        if self.dirs.borrow_mut().remove(name).is_some() {
            self.touch();
        }
        Ok(())
    }

    fn write_version_file(
        &self,
        name: &str,
        version_number: u32,
        content: &str,
    ) -> Result<PathBuf> {
        self.check_writable()?;
        let file_name = version_file_name(name, version_number);
        if self.read_file(name, &file_name).is_some() {
            return Err(WorkbenchError::VersionExists {
                name: name.to_string(),
                number: version_number,
            });
        }
        self.put_file(name, &file_name, content);
        Ok(PathBuf::from(format!("memory://{}/{}", name, file_name)))
    }

    fn last_modified(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(*self.modified.borrow())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_groups_by_directory_and_prefix() {
        let store = MemFileStore::new();
        store.put_file("Demo", "Demo_v2.md", "two");
        store.put_file("Demo", "Demo_v1.md", "one");
        store.put_file("Demo", "notes.txt", "ignored");

        let scanned = store.list_projects_with_versions().unwrap();
        assert_eq!(scanned.len(), 1);
        let numbers: Vec<u32> = scanned[0].versions.iter().map(|v| v.version_number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn rename_renames_prefixed_files_only() {
        let store = MemFileStore::new();
        store.write_version_file("Demo", 1, "a").unwrap();
        store.put_file("Demo", "notes.txt", "kept");

        store.rename_project_directory("Demo", "Demo2").unwrap();

        assert!(!store.has_dir("Demo"));
        assert_eq!(
            store.file_names("Demo2"),
            vec!["Demo2_v1.md".to_string(), "notes.txt".to_string()]
        );
    }

    #[test]
    fn simulated_write_errors_leave_state_alone() {
        let store = MemFileStore::new();
        store.set_simulate_write_error(true);

        assert!(store.write_version_file("Demo", 1, "a").is_err());
        assert!(store.write_manifest(&Manifest::empty()).is_err());
        assert!(!store.has_dir("Demo"));
        assert!(store.read_manifest().unwrap().is_none());
    }

    #[test]
    fn raw_manifest_corruption_surfaces_on_read() {
        let store = MemFileStore::new();
        store.put_raw_manifest("{ nope");
        assert!(matches!(
            store.read_manifest(),
            Err(WorkbenchError::Serialization(_))
        ));
    }
}
