use super::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::reconcile::{needs_rebuild, rebuild_from_file_store};
use crate::store::{FileStore, ObjectStore};
use crate::workbench::Workbench;

/// Bring the workbench up: rebuild from the File Store if the policy asks for it,
/// then hydrate the in-memory lists.
///
/// A failed rebuild is not fatal. Whatever the object store already holds is used and
/// the failure is reported as a warning.
pub fn load<L: ObjectStore, F: FileStore>(wb: &mut Workbench<L, F>) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    let rebuild = match needs_rebuild(wb.local(), wb.files(), wb.rebuild_policy()) {
        Ok(rebuild) => rebuild,
        Err(e) => {
            tracing::warn!("Freshness check failed, rebuilding: {}", e);
            true
        }
    };

    if rebuild {
        match rebuild_from_file_store(wb.local(), wb.files()) {
            Ok(report) => {
                if !report.skipped {
                    wb.request_restore_sync();
                    result.add_message(CmdMessage::info(format!(
                        "Loaded {} projects from files",
                        report.projects_total()
                    )));
                }
                for name in &report.duplicates_skipped {
                    result.add_message(CmdMessage::warning(format!(
                        "Ignored duplicate copy of {}",
                        name
                    )));
                }
                if report.manifest_recovered {
                    result.add_message(CmdMessage::warning(
                        "structure.json was unreadable, folder structure was reset",
                    ));
                }
                if !report.failures.is_empty() {
                    result.add_message(CmdMessage::warning(format!(
                        "{} items could not be restored",
                        report.failures.len()
                    )));
                }
                result.rebuild = Some(report);
            }
            Err(e) => {
                tracing::error!("Rebuild failed: {}", e);
                result.add_message(CmdMessage::warning(format!(
                    "Rebuild failed, using cached data: {}",
                    e
                )));
            }
        }
    } else {
        tracing::debug!("Local store is fresh, skipping rebuild");
    }

    wb.hydrate()?;

    let mut projects = wb.projects().to_vec();
    projects.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(result
        .with_listed_projects(projects)
        .with_folders(wb.folders().to_vec()))
}
