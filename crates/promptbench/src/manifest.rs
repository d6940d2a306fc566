//! # Structure Manifest (`structure.json`)
//!
//! The File Store only knows directory *names*. The Local Object Store needs stable *ids*
//! that survive a rebuild. The manifest is the durable record bridging the two, plus the
//! folder hierarchy and the per-version descriptions that never make it into the
//! markdown files.
//!
//! ## Shape
//!
//! ```json
//! {
//!   "version": "1.0.0",
//!   "folders": [{ "id": "…", "name": "Work", "parentId": null }],
//!   "projectMappings": { "Demo": "<folder id>" },
//!   "projectIdMappings": { "<project id>": { "folderId": "<folder id>", "fsName": "Demo" } },
//!   "fsNameToProjectId": { "Demo": "<project id>" },
//!   "versionDescriptions": { "Demo": { "1": "first draft" } },
//!   "lastUpdated": "2025-01-01T00:00:00Z"
//! }
//! ```
//!
//! Only `folders` and `projectMappings` are guaranteed to exist in older files; every
//! other map deserializes to empty when missing.
//!
//! ## Recovery
//!
//! A corrupt manifest is never fatal: callers substitute [`Manifest::empty`] and log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::Result;

pub const MANIFEST_FILE_NAME: &str = "structure.json";
pub const MANIFEST_SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderEntry {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectIdMapping {
    #[serde(default)]
    pub folder_id: Option<Uuid>,
    pub fs_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default = "default_schema_version")]
    pub version: String,
    #[serde(default)]
    pub folders: Vec<FolderEntry>,
    #[serde(default)]
    pub project_mappings: BTreeMap<String, Option<Uuid>>,
    #[serde(default)]
    pub project_id_mappings: BTreeMap<Uuid, ProjectIdMapping>,
    #[serde(default)]
    pub fs_name_to_project_id: BTreeMap<String, Uuid>,
    #[serde(default)]
    pub version_descriptions: BTreeMap<String, BTreeMap<u32, String>>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

fn default_schema_version() -> String {
    MANIFEST_SCHEMA_VERSION.to_string()
}

impl Default for Manifest {
    fn default() -> Self {
        Self::empty()
    }
}

impl Manifest {
    /// `folders: []`, `projectMappings: {}` and nothing else.
    pub fn empty() -> Self {
        Self {
            version: default_schema_version(),
            folders: Vec::new(),
            project_mappings: BTreeMap::new(),
            project_id_mappings: BTreeMap::new(),
            fs_name_to_project_id: BTreeMap::new(),
            version_descriptions: BTreeMap::new(),
            last_updated: None,
        }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The description recorded for `name`'s version `number`, if any.
    pub fn version_description(&self, name: &str, number: u32) -> Option<&str> {
        self.version_descriptions
            .get(name)
            .and_then(|versions| versions.get(&number))
            .map(String::as_str)
            .filter(|d| !d.is_empty())
    }

    /// Record every name↔id↔folder correspondence for one project.
    pub fn map_project(&mut self, name: &str, fs_name: &str, id: Uuid, folder_id: Option<Uuid>) {
        self.project_mappings.insert(name.to_string(), folder_id);
        self.project_id_mappings.insert(
            id,
            ProjectIdMapping {
                folder_id,
                fs_name: fs_name.to_string(),
            },
        );
        self.fs_name_to_project_id.insert(fs_name.to_string(), id);
    }

    /// Set or clear a version description. Empty descriptions remove the entry.
    pub fn set_version_description(&mut self, name: &str, number: u32, description: Option<&str>) {
        match description.filter(|d| !d.is_empty()) {
            Some(text) => {
                self.version_descriptions
                    .entry(name.to_string())
                    .or_default()
                    .insert(number, text.to_string());
            }
            None => {
                if let Some(versions) = self.version_descriptions.get_mut(name) {
                    versions.remove(&number);
                    if versions.is_empty() {
                        self.version_descriptions.remove(name);
                    }
                }
            }
        }
    }
}

/// Case, whitespace and hyphen-insensitive form used by the last-resort name match.
pub fn normalize_project_key(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
