use crate::error::{Result, WorkbenchError};
use crate::model::{sanitize_name, validate_name};
use crate::store::{FileStore, ObjectStore};
use crate::workbench::Workbench;
use uuid::Uuid;

/// Trim and validate a user-supplied project or folder name.
pub fn checked_name(name: &str) -> Result<String> {
    if let Some(problem) = validate_name(name) {
        return Err(WorkbenchError::InvalidName(problem));
    }
    Ok(name.trim().to_string())
}

/// A project name must be unique among live projects, and so must its File Store
/// name: `a/b` and `a:b` would share the `a_b/` directory.
pub fn ensure_project_name_free<L: ObjectStore, F: FileStore>(
    wb: &Workbench<L, F>,
    name: &str,
    except: Option<Uuid>,
) -> Result<()> {
    let fs_name = sanitize_name(name);
    let taken = wb
        .projects()
        .iter()
        .filter(|p| Some(p.id) != except)
        .any(|p| p.name == name || p.fs_name() == fs_name);
    if taken {
        return Err(WorkbenchError::NameConflict(name.to_string()));
    }
    Ok(())
}

pub fn ensure_folder_name_free<L: ObjectStore, F: FileStore>(
    wb: &Workbench<L, F>,
    name: &str,
    except: Option<Uuid>,
) -> Result<()> {
    let taken = wb
        .folders()
        .iter()
        .filter(|f| Some(f.id) != except)
        .any(|f| f.name == name);
    if taken {
        return Err(WorkbenchError::NameConflict(name.to_string()));
    }
    Ok(())
}

pub fn ensure_folder_exists<L: ObjectStore, F: FileStore>(
    wb: &Workbench<L, F>,
    folder_id: Option<Uuid>,
) -> Result<()> {
    match folder_id {
        Some(id) if wb.folder(&id).is_none() => Err(WorkbenchError::FolderNotFound(id)),
        _ => Ok(()),
    }
}
