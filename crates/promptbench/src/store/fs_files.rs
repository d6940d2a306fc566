use super::files::{FileStore, ScannedProject, ScannedVersion};
use crate::error::{Result, WorkbenchError};
use crate::manifest::{Manifest, MANIFEST_FILE_NAME};
use crate::model::{parse_version_file_name, version_file_name};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;
use walkdir::{DirEntry, WalkDir};

pub const DEFAULT_SCAN_DEPTH: usize = 3;

pub struct FsFileStore {
    root: PathBuf,
    scan_depth: usize,
}

impl FsFileStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            scan_depth: DEFAULT_SCAN_DEPTH,
        }
    }

    pub fn with_scan_depth(mut self, depth: usize) -> Self {
        self.scan_depth = depth.max(1);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn project_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE_NAME)
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Write to a temp file in the same directory, then rename over the target.
    fn atomic_write(&self, dir: &Path, target: &Path, content: &str) -> Result<()> {
        let tmp = dir.join(format!(".promptbench-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, content)?;
        if let Err(e) = fs::rename(&tmp, target) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

fn is_skipped(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    entry.depth() > 0 && (name.starts_with('.') || name == MANIFEST_FILE_NAME)
}

impl FileStore for FsFileStore {
    fn list_projects_with_versions(&self) -> Result<Vec<ScannedProject>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut projects: Vec<ScannedProject> = Vec::new();
        // (containing dir, name) -> index into `projects`
        let mut groups: HashMap<(PathBuf, String), usize> = HashMap::new();

        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(self.scan_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_skipped(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry during scan: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().to_string();
            let Some((name, version_number)) = parse_version_file_name(&file_name) else {
                continue;
            };

            let content = match fs::read_to_string(entry.path()) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!("Skipping unreadable version file {:?}: {}", entry.path(), e);
                    continue;
                }
            };

            let parent = entry
                .path()
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.root.clone());
            let idx = *groups.entry((parent, name.clone())).or_insert_with(|| {
                projects.push(ScannedProject {
                    name,
                    versions: Vec::new(),
                });
                projects.len() - 1
            });
            projects[idx].versions.push(ScannedVersion {
                version_number,
                content,
                file_name,
            });
        }

        for project in &mut projects {
            project.versions.sort_by_key(|v| v.version_number);
        }

        Ok(projects)
    }

    fn read_manifest(&self) -> Result<Option<Manifest>> {
        let path = self.manifest_path();
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path)?;
        Manifest::from_json(&raw).map(Some)
    }

    fn write_manifest(&self, manifest: &Manifest) -> Result<()> {
        self.ensure_dir(&self.root)?;

        let mut stamped = manifest.clone();
        stamped.last_updated = Some(Utc::now());
        let content = stamped.to_json_pretty()?;

        self.atomic_write(&self.root, &self.manifest_path(), &content)
    }

    fn rename_project_directory(&self, old_name: &str, new_name: &str) -> Result<()> {
        let old_dir = self.project_dir(old_name);
        let new_dir = self.project_dir(new_name);

        if !old_dir.is_dir() {
            return Err(WorkbenchError::ProjectDirNotFound(old_name.to_string()));
        }
        if new_dir.exists() {
            return Err(WorkbenchError::NameConflict(new_name.to_string()));
        }

        fs::rename(&old_dir, &new_dir)?;

        let entries = fs::read_dir(&new_dir)?.collect::<std::io::Result<Vec<_>>>()?;
        for entry in entries {
            let file_name = entry.file_name().to_string_lossy().to_string();
            if let Some((prefix, number)) = parse_version_file_name(&file_name) {
                if prefix == old_name {
                    fs::rename(entry.path(), new_dir.join(version_file_name(new_name, number)))?;
                }
            }
        }

        Ok(())
    }

    fn delete_project_directory(&self, name: &str) -> Result<()> {
        let dir = self.project_dir(name);
        if !dir.exists() {
            return Ok(());
        }
        match fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_version_file(
        &self,
        name: &str,
        version_number: u32,
        content: &str,
    ) -> Result<PathBuf> {
        let dir = self.project_dir(name);
        self.ensure_dir(&dir)?;

        let target = dir.join(version_file_name(name, version_number));
        if target.exists() {
            return Err(WorkbenchError::VersionExists {
                name: name.to_string(),
                number: version_number,
            });
        }

        self.atomic_write(&dir, &target, content)?;
        Ok(target)
    }

    fn last_modified(&self) -> Result<Option<DateTime<Utc>>> {
        match fs::metadata(&self.root) {
            Ok(meta) => Ok(meta.modified().ok().map(DateTime::<Utc>::from)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
