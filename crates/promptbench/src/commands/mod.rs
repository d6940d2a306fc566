//! # Command Layer
//!
//! The business logic of the workbench. Every operation is a plain function taking the
//! [`Workbench`](crate::workbench::Workbench) and typed arguments, and returning a
//! structured [`CmdResult`].
//!
//! ## Role and Responsibilities
//!
//! - Validate input (names, uniqueness, referenced folders and projects)
//! - Write the object store and, where an operation has a file side, the File Store
//! - Keep the workbench's in-memory lists in step with the store
//! - Request the debounced manifest sync after every structural mutation
//!
//! Commands never print and never decide policy on the caller's behalf. Deleting a
//! folder that still holds projects, for instance, takes an explicit
//! [`folders::FolderDeletePolicy`].
//!
//! ## Ordering of Side Effects
//!
//! When an operation touches both stores, the File Store goes first. A failed disk
//! write then leaves the object store untouched, and the next rebuild sees exactly
//! what is on disk.
//!
//! ## Command Modules
//!
//! - [`startup`]: Rebuild (per policy) and hydrate
//! - [`projects`]: Create, rename, update, move, delete, select, list
//! - [`folders`]: Create, rename, collapse, delete
//! - [`versions`]: Append-only version saves and lookups
//! - [`helpers`]: Name validation and uniqueness checks

use crate::model::{Folder, Project, Version};
use crate::reconcile::{RebuildReport, SyncReport};
use serde::Serialize;
use std::path::PathBuf;

pub mod folders;
pub mod helpers;
pub mod projects;
pub mod startup;
pub mod versions;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    /// Projects created or changed by the operation, in their post-operation state.
    pub affected_projects: Vec<Project>,
    /// Projects to display.
    pub listed_projects: Vec<Project>,
    pub folders: Vec<Folder>,
    pub versions: Vec<Version>,
    /// Files written by the operation.
    pub paths: Vec<PathBuf>,
    pub messages: Vec<CmdMessage>,
    pub rebuild: Option<RebuildReport>,
    pub sync: Option<SyncReport>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_listed_projects(mut self, projects: Vec<Project>) -> Self {
        self.listed_projects = projects;
        self
    }

    pub fn with_folders(mut self, folders: Vec<Folder>) -> Self {
        self.folders = folders;
        self
    }

    pub fn with_versions(mut self, versions: Vec<Version>) -> Self {
        self.versions = versions;
        self
    }

    /// Fold another command's output into this one.
    pub fn absorb(&mut self, other: CmdResult) {
        self.affected_projects.extend(other.affected_projects);
        self.paths.extend(other.paths);
        self.messages.extend(other.messages);
    }
}
