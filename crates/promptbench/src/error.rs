use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum WorkbenchError {
    #[error("Project not found: {0}")]
    ProjectNotFound(Uuid),

    #[error("Folder not found: {0}")]
    FolderNotFound(Uuid),

    #[error("Version {number} of project {project} not found")]
    VersionNotFound { project: Uuid, number: u32 },

    #[error("No {kind} named \"{name}\"")]
    NameNotFound { kind: &'static str, name: String },

    #[error("Project directory \"{0}\" does not exist")]
    ProjectDirNotFound(String),

    #[error("Name already in use: \"{0}\"")]
    NameConflict(String),

    #[error("Version {number} of \"{name}\" already exists on disk")]
    VersionExists { name: String, number: u32 },

    #[error("Project \"{0}\" has no version numbers left")]
    VersionLimit(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl WorkbenchError {
    /// Not-found errors mean "nothing to do" on delete and rebuild paths.
    pub fn is_not_found(&self) -> bool {
        match self {
            WorkbenchError::ProjectNotFound(_)
            | WorkbenchError::FolderNotFound(_)
            | WorkbenchError::VersionNotFound { .. }
            | WorkbenchError::NameNotFound { .. }
            | WorkbenchError::ProjectDirNotFound(_) => true,
            WorkbenchError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, WorkbenchError>;
