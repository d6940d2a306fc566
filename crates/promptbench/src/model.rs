//! # Domain Model: Projects, Versions and Folders
//!
//! This module defines the entities the workbench manages: [`Project`], [`Version`] and
//! [`Folder`], plus the naming rules that map them onto the File Store.
//!
//! ## Identity vs. Name
//!
//! Every entity has a stable `id` (a v4 UUID). Projects additionally have a `name`, which
//! is the externally visible key: the File Store only knows directories and files named
//! after it. The two worlds are bridged by the structure manifest (see [`crate::manifest`]).
//!
//! ## File Naming
//!
//! ```text
//! <root>/<fsName>/<fsName>_v<N>.md
//! ```
//!
//! - `fsName` is the project name with every character of `<>:"/\|?*` replaced by `_`
//!   (see [`sanitize_name`]).
//! - The file body is exactly the version content. Descriptions and statistics never
//!   leave the Local Object Store except through the manifest.
//!
//! ## Versions are Immutable
//!
//! A save never mutates an existing [`Version`]; it appends a new one numbered
//! `max + 1`. Gaps left by manual file deletion are kept as-is.
//!
//! ## Opaque Project Config
//!
//! [`Project::config`] is a caller-defined settings blob. The core round-trips it without
//! interpreting it, so it is modelled as a plain [`serde_json::Value`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// Characters that cannot appear in a File Store name.
pub const UNSAFE_NAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Tag given to projects discovered on disk without a previous local record.
pub const RESTORED_TAG: &str = "restored";

pub type ProjectConfig = serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Major,
    #[default]
    Minor,
    Patch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "other".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub folder_id: Option<Uuid>,
    #[serde(default)]
    pub current_version: u32,
    #[serde(default = "default_project_config")]
    pub config: ProjectConfig,
    pub metadata: ProjectMetadata,
}

impl Project {
    pub fn new(name: String, description: Option<String>, folder_id: Option<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            description: normalize_description(description),
            folder_id,
            current_version: 0,
            config: default_project_config(),
            metadata: ProjectMetadata {
                created_at: now,
                updated_at: now,
                tags: Vec::new(),
                category: default_category(),
            },
        }
    }

    /// The directory/file-name-safe form of the project name.
    pub fn fs_name(&self) -> String {
        sanitize_name(&self.name)
    }

    pub fn touch(&mut self) {
        self.metadata.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionMetadata {
    pub lines: usize,
    pub characters: usize,
    pub words: usize,
    #[serde(default)]
    pub change_type: ChangeType,
}

impl VersionMetadata {
    pub fn from_content(content: &str, change_type: ChangeType) -> Self {
        Self {
            lines: content.split('\n').count(),
            characters: content.chars().count(),
            words: content.split_whitespace().count(),
            change_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub id: Uuid,
    pub project_id: Uuid,
    pub version_number: u32,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub auto_generated: bool,
    pub metadata: VersionMetadata,
}

impl Version {
    pub fn new(
        project_id: Uuid,
        version_number: u32,
        content: String,
        description: Option<String>,
    ) -> Self {
        let metadata = VersionMetadata::from_content(&content, ChangeType::default());
        Self {
            id: Uuid::new_v4(),
            project_id,
            version_number,
            content,
            timestamp: Utc::now(),
            description: normalize_description(description),
            auto_generated: false,
            metadata,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub collapsed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    pub fn new(name: String, parent_id: Option<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            parent_id,
            collapsed: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Replace every File Store-unsafe character with `_`.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if UNSAFE_NAME_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// `Demo` + 3 → `Demo_v3.md`
pub fn version_file_name(fs_name: &str, version_number: u32) -> String {
    format!("{}_v{}.md", fs_name, version_number)
}

/// Split a version file name into `(name, number)`.
///
/// Returns `None` for anything that does not look like `{name}_v{N}.md` with a
/// non-empty name and a positive number.
pub fn parse_version_file_name(file_name: &str) -> Option<(String, u32)> {
    let stem = file_name.strip_suffix(".md")?;
    let idx = stem.rfind("_v")?;
    let (name, rest) = stem.split_at(idx);
    let digits = &rest[2..];
    if name.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let number: u32 = digits.parse().ok()?;
    if number == 0 {
        return None;
    }
    Some((name.to_string(), number))
}

/// Blank descriptions are treated as absent.
pub fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

/// Settings blob given to projects created without one.
pub fn default_project_config() -> ProjectConfig {
    json!({
        "systemLimits": {
            "maxTokens": 4000,
            "temperature": 0.7,
            "model": "gpt-4-turbo-preview",
            "responseFormat": "markdown",
            "timeout": 30,
            "retryAttempts": 3
        },
        "outputRequirements": {
            "format": { "type": "structured", "schema": {} },
            "constraints": [],
            "examples": [],
            "validation": { "required": [], "optional": [] }
        },
        "testData": []
    })
}

/// Names must be non-empty after trimming and must not sanitize down to a dotfile,
/// which the scanner would skip.
pub fn validate_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Some("name cannot be empty".to_string());
    }
    if trimmed.starts_with('.') {
        return Some(format!("\"{}\" cannot start with '.'", trimmed));
    }
    None
}
