use super::{CmdMessage, CmdResult};
use crate::error::{Result, WorkbenchError};
use crate::model::Version;
use crate::store::{FileStore, ObjectStore};
use crate::workbench::Workbench;
use uuid::Uuid;

/// Save `content` as the next version of a project.
///
/// The number is one past the highest existing one, so gaps are never refilled. The
/// file is written first and never overwrites: a stray file with the same number
/// fails the save with `VersionExists` and nothing is recorded.
pub fn create_version<L: ObjectStore, F: FileStore>(
    wb: &mut Workbench<L, F>,
    project_id: Uuid,
    content: &str,
    description: Option<String>,
) -> Result<CmdResult> {
    let mut project = wb
        .project(&project_id)
        .cloned()
        .ok_or(WorkbenchError::ProjectNotFound(project_id))?;

    let next = wb
        .local()
        .versions_for(&project_id)?
        .iter()
        .map(|v| v.version_number)
        .max()
        .unwrap_or(0)
        .checked_add(1)
        .ok_or_else(|| WorkbenchError::VersionLimit(project.name.clone()))?;

    let path = wb
        .files()
        .write_version_file(&project.fs_name(), next, content)?;

    let version = Version::new(project_id, next, content.to_string(), description);
    wb.local().put_version(&version)?;

    project.current_version = next;
    project.touch();
    wb.local().put_project(&project)?;
    *wb.project_mut(&project_id)? = project.clone();
    wb.request_sync();

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Saved {} v{}",
        project.name, next
    )));
    result.affected_projects.push(project);
    result.versions.push(version);
    result.paths.push(path);
    Ok(result)
}

/// Every version of a project, oldest first.
pub fn list<L: ObjectStore, F: FileStore>(
    wb: &Workbench<L, F>,
    project_id: Uuid,
) -> Result<CmdResult> {
    let project = wb
        .project(&project_id)
        .cloned()
        .ok_or(WorkbenchError::ProjectNotFound(project_id))?;
    let versions = wb.local().versions_for(&project_id)?;

    let mut result = CmdResult::default().with_versions(versions);
    result.affected_projects.push(project);
    Ok(result)
}

/// One version, or the project's current one when `number` is `None`.
pub fn get<L: ObjectStore, F: FileStore>(
    wb: &Workbench<L, F>,
    project_id: Uuid,
    number: Option<u32>,
) -> Result<CmdResult> {
    let project = wb
        .project(&project_id)
        .cloned()
        .ok_or(WorkbenchError::ProjectNotFound(project_id))?;
    let number = number.unwrap_or(project.current_version);

    let version = wb
        .local()
        .versions_for(&project_id)?
        .into_iter()
        .find(|v| v.version_number == number)
        .ok_or(WorkbenchError::VersionNotFound {
            project: project_id,
            number,
        })?;

    let mut result = CmdResult::default().with_versions(vec![version]);
    result.affected_projects.push(project);
    Ok(result)
}
