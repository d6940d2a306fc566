use crate::manifest::{normalize_project_key, Manifest};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Which manifest lookup produced a folder assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchStrategy {
    /// `projectMappings[name]`
    Direct,
    /// `fsNameToProjectId[fsName]` → `projectIdMappings[id].folderId`
    FsNameToId,
    /// The project's own id → `projectIdMappings[id].folderId`
    ProjectId,
    /// Case, whitespace and hyphen-insensitive scan of `projectMappings`
    Normalized,
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MatchStrategy::Direct => "direct",
            MatchStrategy::FsNameToId => "fs-name",
            MatchStrategy::ProjectId => "project-id",
            MatchStrategy::Normalized => "normalized",
        };
        f.write_str(label)
    }
}

/// What is known about the project whose folder is being looked up.
#[derive(Debug, Clone, Copy)]
pub struct FolderLookup<'a> {
    pub name: &'a str,
    pub fs_name: &'a str,
    pub project_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FolderResolution {
    pub folder_id: Uuid,
    pub strategy: MatchStrategy,
}

/// Find the folder a project belongs to according to `manifest`.
///
/// Strategies are tried in order: direct name, fsName → id chain, the project's own
/// id, normalized name. `canonical` maps a folder id recorded in the manifest to the
/// id of a folder that exists now; a candidate it rejects does not count and the
/// next strategy is tried.
///
/// Both the rebuild and the sync-out go through here, so the two can never disagree
/// about where a project lives.
pub fn resolve_folder_assignment<C>(
    lookup: &FolderLookup<'_>,
    manifest: &Manifest,
    canonical: C,
) -> Option<FolderResolution>
where
    C: Fn(Uuid) -> Option<Uuid>,
{
    let found = |candidate: Option<Uuid>, strategy: MatchStrategy| {
        candidate
            .and_then(&canonical)
            .map(|folder_id| FolderResolution {
                folder_id,
                strategy,
            })
    };

    let direct = manifest.project_mappings.get(lookup.name).copied().flatten();
    if let Some(hit) = found(direct, MatchStrategy::Direct) {
        return Some(hit);
    }

    let via_fs_name = manifest
        .fs_name_to_project_id
        .get(lookup.fs_name)
        .and_then(|id| manifest.project_id_mappings.get(id))
        .and_then(|mapping| mapping.folder_id);
    if let Some(hit) = found(via_fs_name, MatchStrategy::FsNameToId) {
        return Some(hit);
    }

    let via_id = lookup
        .project_id
        .and_then(|id| manifest.project_id_mappings.get(&id))
        .and_then(|mapping| mapping.folder_id);
    if let Some(hit) = found(via_id, MatchStrategy::ProjectId) {
        return Some(hit);
    }

    let key = normalize_project_key(lookup.name);
    if key.is_empty() {
        return None;
    }
    manifest
        .project_mappings
        .iter()
        .filter(|(name, _)| normalize_project_key(name) == key)
        .find_map(|(_, folder_id)| found(*folder_id, MatchStrategy::Normalized))
}
