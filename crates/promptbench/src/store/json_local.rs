use super::local::ObjectStore;
use super::mem_local::Tables;
use crate::error::Result;
use crate::model::{Folder, Project, Version};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Object store persisted as one JSON file.
///
/// The whole table set is loaded once and rewritten atomically (temp file + rename)
/// after every mutation. Deleting the file is the equivalent of clearing browser
/// storage: the next startup rebuilds it from the File Store.
///
/// Mutations are applied to a copy and only become visible once the file write
/// succeeded, so a failed write leaves the store as it was. Between
/// [`ObjectStore::begin_batch`] and [`ObjectStore::commit_batch`] mutations collect in
/// a working copy and the file is written once, at commit.
///
/// A cache file that fails to parse is treated as empty, since everything in it can
/// be recovered by a rebuild.
pub struct JsonObjectStore {
    path: PathBuf,
    tables: RefCell<Option<Tables>>,
    batch: RefCell<Option<Tables>>,
}

impl JsonObjectStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            tables: RefCell::new(None),
            batch: RefCell::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<()> {
        if self.tables.borrow().is_some() {
            return Ok(());
        }
        let tables = if self.path.exists() {
            let raw = fs::read_to_string(&self.path)?;
            match serde_json::from_str::<Tables>(&raw) {
                Ok(tables) => tables,
                Err(e) => {
                    tracing::warn!(
                        "Ignoring unreadable object store {:?}: {}",
                        self.path,
                        e
                    );
                    Tables::default()
                }
            }
        } else {
            Tables::default()
        };
        *self.tables.borrow_mut() = Some(tables);
        Ok(())
    }

    /// The tables as last written to disk.
    fn committed(&self) -> Result<Tables> {
        self.load()?;
        Ok(self.tables.borrow().clone().unwrap_or_default())
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> Result<T> {
        self.load()?;
        if let Some(batch) = self.batch.borrow().as_ref() {
            return Ok(f(batch));
        }
        let guard = self.tables.borrow();
        match guard.as_ref() {
            Some(tables) => Ok(f(tables)),
            None => Ok(f(&Tables::default())),
        }
    }

    fn write<T>(&self, f: impl FnOnce(&mut Tables) -> T) -> Result<T> {
        self.load()?;
        if let Some(batch) = self.batch.borrow_mut().as_mut() {
            return Ok(f(batch));
        }
        let mut next = self.committed()?;
        let out = f(&mut next);
        self.persist(&next)?;
        *self.tables.borrow_mut() = Some(next);
        Ok(out)
    }

    fn persist(&self, tables: &Tables) -> Result<()> {
        let content = serde_json::to_string_pretty(tables)?;
        let dir = self
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        let tmp = dir.join(format!(".cache-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, content)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

impl ObjectStore for JsonObjectStore {
    fn all_projects(&self) -> Result<Vec<Project>> {
        self.read(|t| t.projects.values().cloned().collect())
    }

    fn get_project(&self, id: &Uuid) -> Result<Option<Project>> {
        self.read(|t| t.projects.get(id).cloned())
    }

    fn put_project(&self, project: &Project) -> Result<()> {
        self.write(|t| {
            t.projects.insert(project.id, project.clone());
        })
    }

    fn delete_project(&self, id: &Uuid) -> Result<bool> {
        self.write(|t| t.projects.remove(id).is_some())
    }

    fn all_versions(&self) -> Result<Vec<Version>> {
        self.read(|t| t.versions.values().cloned().collect())
    }

    fn versions_for(&self, project_id: &Uuid) -> Result<Vec<Version>> {
        self.read(|t| t.versions_for(project_id))
    }

    fn put_version(&self, version: &Version) -> Result<()> {
        self.write(|t| {
            t.versions.insert(version.id, version.clone());
        })
    }

    fn delete_version(&self, id: &Uuid) -> Result<bool> {
        self.write(|t| t.versions.remove(id).is_some())
    }

    fn all_folders(&self) -> Result<Vec<Folder>> {
        self.read(|t| t.folders.values().cloned().collect())
    }

    fn get_folder(&self, id: &Uuid) -> Result<Option<Folder>> {
        self.read(|t| t.folders.get(id).cloned())
    }

    fn put_folder(&self, folder: &Folder) -> Result<()> {
        self.write(|t| {
            t.folders.insert(folder.id, folder.clone());
        })
    }

    fn delete_folder(&self, id: &Uuid) -> Result<bool> {
        self.write(|t| t.folders.remove(id).is_some())
    }

    fn get_meta(&self, key: &str) -> Result<Option<String>> {
        self.read(|t| t.metadata.get(key).cloned())
    }

    fn put_meta(&self, key: &str, value: &str) -> Result<()> {
        self.write(|t| {
            t.metadata.insert(key.to_string(), value.to_string());
        })
    }

    fn clear_entities(&self) -> Result<()> {
        self.write(Tables::clear_entities)
    }

    fn begin_batch(&self) -> Result<()> {
        if self.batch.borrow().is_some() {
            return Ok(());
        }
        let working = self.committed()?;
        *self.batch.borrow_mut() = Some(working);
        Ok(())
    }

    fn commit_batch(&self) -> Result<()> {
        let Some(next) = self.batch.borrow_mut().take() else {
            return Ok(());
        };
        self.persist(&next)?;
        *self.tables.borrow_mut() = Some(next);
        Ok(())
    }

    fn abort_batch(&self) {
        self.batch.borrow_mut().take();
    }
}
