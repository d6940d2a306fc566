use super::helpers::{checked_name, ensure_folder_exists, ensure_folder_name_free};
use super::{projects, CmdMessage, CmdResult};
use crate::error::{Result, WorkbenchError};
use crate::model::Folder;
use crate::store::{FileStore, ObjectStore};
use crate::workbench::Workbench;
use chrono::Utc;
use uuid::Uuid;

/// What happens to the projects of a folder being deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderDeletePolicy {
    /// Delete every contained project, files included.
    CascadeProjects,
    /// Move every contained project to root.
    DetachProjects,
}

pub fn create<L: ObjectStore, F: FileStore>(
    wb: &mut Workbench<L, F>,
    name: &str,
    parent_id: Option<Uuid>,
) -> Result<CmdResult> {
    let name = checked_name(name)?;
    ensure_folder_name_free(wb, &name, None)?;
    ensure_folder_exists(wb, parent_id)?;

    let folder = Folder::new(name, parent_id);
    wb.local().put_folder(&folder)?;
    wb.insert_folder(folder.clone());
    wb.request_sync();

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Folder created: {}",
        folder.name
    )));
    result.folders.push(folder);
    Ok(result)
}

pub fn rename<L: ObjectStore, F: FileStore>(
    wb: &mut Workbench<L, F>,
    id: Uuid,
    new_name: &str,
) -> Result<CmdResult> {
    let new_name = checked_name(new_name)?;
    ensure_folder_name_free(wb, &new_name, Some(id))?;
    let mut folder = wb
        .folder(&id)
        .cloned()
        .ok_or(WorkbenchError::FolderNotFound(id))?;

    let old_name = std::mem::replace(&mut folder.name, new_name);
    folder.updated_at = Utc::now();
    wb.local().put_folder(&folder)?;
    *wb.folder_mut(&id)? = folder.clone();
    wb.request_sync();

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Renamed folder {} to {}",
        old_name, folder.name
    )));
    result.folders.push(folder);
    Ok(result)
}

pub fn toggle_collapse<L: ObjectStore, F: FileStore>(
    wb: &mut Workbench<L, F>,
    id: Uuid,
) -> Result<CmdResult> {
    let mut folder = wb
        .folder(&id)
        .cloned()
        .ok_or(WorkbenchError::FolderNotFound(id))?;

    folder.collapsed = !folder.collapsed;
    folder.updated_at = Utc::now();
    wb.local().put_folder(&folder)?;
    *wb.folder_mut(&id)? = folder.clone();
    wb.request_sync();

    let mut result = CmdResult::default();
    let state = if folder.collapsed {
        "collapsed"
    } else {
        "expanded"
    };
    result.add_message(CmdMessage::info(format!("Folder {}: {}", state, folder.name)));
    result.folders.push(folder);
    Ok(result)
}

/// Delete a folder. Its projects follow `policy`; its sub-folders move up to its
/// parent.
pub fn delete<L: ObjectStore, F: FileStore>(
    wb: &mut Workbench<L, F>,
    id: Uuid,
    policy: FolderDeletePolicy,
) -> Result<CmdResult> {
    let folder = wb
        .folder(&id)
        .cloned()
        .ok_or(WorkbenchError::FolderNotFound(id))?;

    let contained: Vec<Uuid> = wb
        .projects()
        .iter()
        .filter(|p| p.folder_id == Some(id))
        .map(|p| p.id)
        .collect();

    let mut result = CmdResult::default();
    for project_id in contained {
        let outcome = match policy {
            FolderDeletePolicy::CascadeProjects => projects::delete(wb, project_id)?,
            FolderDeletePolicy::DetachProjects => projects::move_to(wb, project_id, None)?,
        };
        result.absorb(outcome);
    }

    let children: Vec<Folder> = wb
        .folders()
        .iter()
        .filter(|f| f.parent_id == Some(id))
        .cloned()
        .collect();
    for mut child in children {
        child.parent_id = folder.parent_id;
        child.updated_at = Utc::now();
        wb.local().put_folder(&child)?;
        *wb.folder_mut(&child.id)? = child.clone();
    }

    wb.local().delete_folder(&id)?;
    wb.remove_folder(&id);
    wb.request_sync();

    result.add_message(CmdMessage::success(format!(
        "Folder deleted: {}",
        folder.name
    )));
    result.folders.push(folder);
    Ok(result)
}
