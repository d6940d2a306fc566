use crate::error::Result;
use crate::manifest::Manifest;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// One version file found by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedVersion {
    pub version_number: u32,
    pub content: String,
    pub file_name: String,
}

/// A group of version files sharing the same name prefix inside one directory.
///
/// A scan may return several groups with the same `name` (copies, symlinks, stray
/// directories). Deduplication is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedProject {
    pub name: String,
    /// Sorted by `version_number`.
    pub versions: Vec<ScannedVersion>,
}

/// The durable File Store: markdown version files plus the structure manifest.
///
/// This trait handles the "how" of the on-disk mirror (real filesystem vs memory),
/// while the reconcile and command layers handle the "what".
///
/// All names passed in are File Store names (already sanitized).
pub trait FileStore {
    /// Recursively scan for `{name}_v{N}.md` files, skipping the manifest and dotfiles.
    /// A missing root is an empty scan, not an error.
    fn list_projects_with_versions(&self) -> Result<Vec<ScannedProject>>;

    /// Returns Ok(None) when no manifest exists.
    /// Returns Err on I/O failures and on unparseable content.
    fn read_manifest(&self) -> Result<Option<Manifest>>;

    /// Replace the manifest wholesale, stamping `lastUpdated`.
    fn write_manifest(&self, manifest: &Manifest) -> Result<()>;

    /// Rename `<old>/` to `<new>/` and every `<old>_vN.md` inside to `<new>_vN.md`.
    ///
    /// Fails with `NameConflict` if `<new>/` exists and `ProjectDirNotFound` if `<old>/`
    /// does not.
    fn rename_project_directory(&self, old_name: &str, new_name: &str) -> Result<()>;

    /// Remove `<name>/` recursively. An absent directory is success.
    fn delete_project_directory(&self, name: &str) -> Result<()>;

    /// Write `<name>/<name>_v<N>.md`, creating the directory as needed.
    /// Never overwrites: an existing file yields `VersionExists`.
    fn write_version_file(&self, name: &str, version_number: u32, content: &str)
        -> Result<PathBuf>;

    /// Modification time of the root, used for freshness checks.
    fn last_modified(&self) -> Result<Option<DateTime<Utc>>>;
}
