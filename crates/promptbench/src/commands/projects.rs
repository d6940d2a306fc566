use super::helpers::{checked_name, ensure_folder_exists, ensure_project_name_free};
use super::{CmdMessage, CmdResult};
use crate::error::{Result, WorkbenchError};
use crate::model::{normalize_description, sanitize_name, Project, ProjectConfig};
use crate::store::{FileStore, ObjectStore};
use crate::workbench::Workbench;
use uuid::Uuid;

/// Field changes for [`update`]. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    pub config: Option<ProjectConfig>,
    pub tags: Option<Vec<String>>,
    pub category: Option<String>,
}

pub fn create<L: ObjectStore, F: FileStore>(
    wb: &mut Workbench<L, F>,
    name: &str,
    description: Option<String>,
    folder_id: Option<Uuid>,
) -> Result<CmdResult> {
    let name = checked_name(name)?;
    ensure_project_name_free(wb, &name, None)?;
    ensure_folder_exists(wb, folder_id)?;

    let project = Project::new(name, description, folder_id);
    wb.local().put_project(&project)?;
    wb.insert_project(project.clone());
    wb.set_current(Some(project.id));
    wb.request_sync();

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Project created: {}",
        project.name
    )));
    result.affected_projects.push(project);
    Ok(result)
}

/// Rename a project and its File Store directory.
///
/// A project without versions has no directory yet; that is not an error. If the
/// store write fails after the directory was moved, the move is undone.
pub fn rename<L: ObjectStore, F: FileStore>(
    wb: &mut Workbench<L, F>,
    id: Uuid,
    new_name: &str,
) -> Result<CmdResult> {
    let new_name = checked_name(new_name)?;
    let project = wb
        .project(&id)
        .cloned()
        .ok_or(WorkbenchError::ProjectNotFound(id))?;

    let mut result = CmdResult::default();
    if project.name == new_name {
        result.add_message(CmdMessage::info(format!(
            "Project is already named {}",
            new_name
        )));
        result.affected_projects.push(project);
        return Ok(result);
    }
    ensure_project_name_free(wb, &new_name, Some(id))?;

    let old_fs_name = project.fs_name();
    let new_fs_name = sanitize_name(&new_name);
    let mut moved_dir = false;
    if old_fs_name != new_fs_name {
        match wb
            .files()
            .rename_project_directory(&old_fs_name, &new_fs_name)
        {
            Ok(()) => moved_dir = true,
            Err(e) if e.is_not_found() => {
                tracing::debug!("\"{}\" has no directory yet, nothing to move", project.name);
            }
            Err(e) => return Err(e),
        }
    }

    let mut renamed = project.clone();
    renamed.name = new_name;
    renamed.touch();
    if let Err(e) = wb.local().put_project(&renamed) {
        if moved_dir {
            if let Err(undo) = wb
                .files()
                .rename_project_directory(&new_fs_name, &old_fs_name)
            {
                tracing::warn!(
                    "Could not move \"{}\" back to \"{}\": {}",
                    new_fs_name,
                    old_fs_name,
                    undo
                );
            }
        }
        return Err(e);
    }
    *wb.project_mut(&id)? = renamed.clone();
    wb.request_sync();

    result.add_message(CmdMessage::success(format!(
        "Renamed {} to {}",
        project.name, renamed.name
    )));
    result.affected_projects.push(renamed);
    Ok(result)
}

pub fn update<L: ObjectStore, F: FileStore>(
    wb: &mut Workbench<L, F>,
    id: Uuid,
    changes: ProjectUpdate,
) -> Result<CmdResult> {
    let mut project = wb
        .project(&id)
        .cloned()
        .ok_or(WorkbenchError::ProjectNotFound(id))?;

    if let Some(description) = changes.description {
        project.description = normalize_description(description);
    }
    if let Some(config) = changes.config {
        project.config = config;
    }
    if let Some(tags) = changes.tags {
        project.metadata.tags = tags;
    }
    if let Some(category) = changes.category {
        project.metadata.category = category;
    }
    project.touch();

    wb.local().put_project(&project)?;
    *wb.project_mut(&id)? = project.clone();

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Project updated: {}",
        project.name
    )));
    result.affected_projects.push(project);
    Ok(result)
}

/// Move a project into a folder, or to root with `None`.
pub fn move_to<L: ObjectStore, F: FileStore>(
    wb: &mut Workbench<L, F>,
    id: Uuid,
    folder_id: Option<Uuid>,
) -> Result<CmdResult> {
    ensure_folder_exists(wb, folder_id)?;
    let mut project = wb
        .project(&id)
        .cloned()
        .ok_or(WorkbenchError::ProjectNotFound(id))?;

    project.folder_id = folder_id;
    project.touch();
    wb.local().put_project(&project)?;
    *wb.project_mut(&id)? = project.clone();
    match folder_id {
        Some(_) => wb.attach(&id),
        None => wb.detach(id),
    }
    wb.request_sync();

    let target = folder_id
        .and_then(|f| wb.folder(&f))
        .map(|f| f.name.clone())
        .unwrap_or_else(|| "root".to_string());
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Moved {} to {}",
        project.name, target
    )));
    result.affected_projects.push(project);
    Ok(result)
}

/// Delete a project, its versions and its File Store directory.
///
/// The directory goes first; if that fails nothing else is touched. An already
/// missing directory counts as deleted.
pub fn delete<L: ObjectStore, F: FileStore>(
    wb: &mut Workbench<L, F>,
    id: Uuid,
) -> Result<CmdResult> {
    let project = wb
        .project(&id)
        .cloned()
        .ok_or(WorkbenchError::ProjectNotFound(id))?;

    match wb.files().delete_project_directory(&project.fs_name()) {
        Ok(()) => {}
        Err(e) if e.is_not_found() => {
            tracing::debug!("\"{}\" had no directory to remove", project.name);
        }
        Err(e) => return Err(e),
    }
    for version in wb.local().versions_for(&id)? {
        wb.local().delete_version(&version.id)?;
    }
    wb.local().delete_project(&id)?;
    wb.remove_project(&id);
    wb.request_sync();

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Project deleted: {}",
        project.name
    )));
    result.affected_projects.push(project);
    Ok(result)
}

pub fn select<L: ObjectStore, F: FileStore>(
    wb: &mut Workbench<L, F>,
    id: Uuid,
) -> Result<CmdResult> {
    let project = wb
        .project(&id)
        .cloned()
        .ok_or(WorkbenchError::ProjectNotFound(id))?;
    wb.set_current(Some(id));

    let mut result = CmdResult::default();
    result.affected_projects.push(project);
    Ok(result)
}

/// All projects sorted by name, with the folder list.
pub fn list<L: ObjectStore, F: FileStore>(wb: &Workbench<L, F>) -> Result<CmdResult> {
    let mut projects = wb.projects().to_vec();
    projects.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(CmdResult::default()
        .with_listed_projects(projects)
        .with_folders(wb.folders().to_vec()))
}
