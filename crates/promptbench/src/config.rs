//! # Configuration
//!
//! Workbench configuration is loaded with [`confique`]: a `promptbench.toml` in the
//! working directory, environment variables on top, compiled defaults underneath.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `root` | `prompts` | File Store root |
//! | `test_root` | `prompts-test` | File Store root while `test_mode` is on |
//! | `test_mode` | `false` | Env `PROMPTBENCH_TEST`; switches to `test_root` |
//! | `cache_file` | `.promptbench/cache.json` | Persisted object store (CLI), keyed per store root |
//! | `scan_depth` | `3` | Directory levels searched for version files |
//! | `sync_debounce_ms` | `100` | Delay between a mutation and the manifest write |
//! | `restore_sync_delay_ms` | `500` | Delay between a rebuild and the manifest write |
//! | `rebuild_policy` | `always` | `always` or `when-stale` |
//!
//! Relative paths are resolved against the directory the config was loaded from.
//!
//! The cache belongs to one File Store root. [`WorkbenchConfig::cache_path`] adds a
//! short digest of the root to the file name (`cache-1a2b3c4d.json`), so the
//! production and test roots never share a cache.

use crate::error::{Result, WorkbenchError};
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

pub const CONFIG_FILE_NAME: &str = "promptbench.toml";

/// When startup re-derives the object store from the File Store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RebuildPolicy {
    /// Every startup rebuilds. The File Store is unconditionally authoritative.
    #[default]
    Always,
    /// Rebuild only when the store is empty or the File Store changed since the
    /// last rebuild (root mtime vs. `lastRestore`).
    WhenStale,
}

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WorkbenchConfig {
    #[config(default = "prompts")]
    pub root: PathBuf,

    #[config(default = "prompts-test")]
    pub test_root: PathBuf,

    #[config(env = "PROMPTBENCH_TEST", default = false)]
    pub test_mode: bool,

    #[config(default = ".promptbench/cache.json")]
    pub cache_file: PathBuf,

    #[config(default = 3)]
    pub scan_depth: usize,

    #[config(default = 100)]
    pub sync_debounce_ms: u64,

    #[config(default = 500)]
    pub restore_sync_delay_ms: u64,

    #[config(default = "always")]
    pub rebuild_policy: RebuildPolicy,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("prompts"),
            test_root: PathBuf::from("prompts-test"),
            test_mode: false,
            cache_file: PathBuf::from(".promptbench/cache.json"),
            scan_depth: 3,
            sync_debounce_ms: 100,
            restore_sync_delay_ms: 500,
            rebuild_policy: RebuildPolicy::Always,
        }
    }
}

impl WorkbenchConfig {
    /// Load `<dir>/promptbench.toml` (optional) with env overrides.
    pub fn load(dir: &Path) -> Result<Self> {
        WorkbenchConfig::builder()
            .env()
            .file(dir.join(CONFIG_FILE_NAME))
            .load()
            .map_err(|e| WorkbenchError::Config(e.to_string()))
    }

    /// The File Store root for the active environment.
    pub fn store_root(&self, base: &Path) -> PathBuf {
        let root = if self.test_mode {
            &self.test_root
        } else {
            &self.root
        };
        resolve(base, root)
    }

    /// The cache file for the File Store at `store_root`.
    pub fn cache_path(&self, base: &Path, store_root: &Path) -> PathBuf {
        let file = resolve(base, &self.cache_file);
        let digest = Uuid::new_v5(
            &Uuid::NAMESPACE_URL,
            store_root.to_string_lossy().as_bytes(),
        )
        .simple()
        .to_string();
        let stem = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "cache".to_string());
        let name = match file.extension() {
            Some(ext) => format!("{}-{}.{}", stem, &digest[..8], ext.to_string_lossy()),
            None => format!("{}-{}", stem, &digest[..8]),
        };
        file.with_file_name(name)
    }

    pub fn sync_debounce(&self) -> Duration {
        Duration::from_millis(self.sync_debounce_ms)
    }

    pub fn restore_sync_delay(&self) -> Duration {
        Duration::from_millis(self.restore_sync_delay_ms)
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = WorkbenchConfig::default();
        assert_eq!(config.root, PathBuf::from("prompts"));
        assert_eq!(config.scan_depth, 3);
        assert_eq!(config.rebuild_policy, RebuildPolicy::Always);
        assert_eq!(config.sync_debounce(), Duration::from_millis(100));
    }

    #[test]
    fn test_mode_switches_root() {
        let base = Path::new("/work");
        let mut config = WorkbenchConfig::default();
        assert_eq!(config.store_root(base), PathBuf::from("/work/prompts"));

        config.test_mode = true;
        assert_eq!(config.store_root(base), PathBuf::from("/work/prompts-test"));
    }

    #[test]
    fn cache_is_keyed_by_store_root() {
        let base = Path::new("/work");
        let mut config = WorkbenchConfig::default();
        let prod = config.cache_path(base, &config.store_root(base));
        config.test_mode = true;
        let test = config.cache_path(base, &config.store_root(base));

        assert_ne!(prod, test);
        assert_eq!(prod.parent(), Some(Path::new("/work/.promptbench")));
        let name = prod.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("cache-") && name.ends_with(".json"), "{}", name);
        assert_eq!(name.len(), "cache-".len() + 8 + ".json".len());

        config.test_mode = false;
        assert_eq!(config.cache_path(base, &config.store_root(base)), prod);
    }

    #[test]
    fn absolute_paths_are_kept() {
        let config = WorkbenchConfig {
            root: PathBuf::from("/srv/prompts"),
            ..Default::default()
        };
        assert_eq!(
            config.store_root(Path::new("/work")),
            PathBuf::from("/srv/prompts")
        );
    }

    #[test]
    fn loads_values_from_toml_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "root = \"library\"\nscan_depth = 5\nrebuild_policy = \"when-stale\"\n",
        )
        .unwrap();

        let config = WorkbenchConfig::load(dir.path()).unwrap();
        assert_eq!(config.root, PathBuf::from("library"));
        assert_eq!(config.scan_depth, 5);
        assert_eq!(config.rebuild_policy, RebuildPolicy::WhenStale);
        assert_eq!(config.sync_debounce_ms, 100);
    }
}
