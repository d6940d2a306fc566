//! # Storage Layer
//!
//! The workbench keeps its data in two places with very different guarantees:
//!
//! 1. **File Store** ([`files::FileStore`]): the durable, human-readable truth. A tree of
//!    markdown version files plus one `structure.json` manifest.
//! 2. **Local Object Store** ([`local::ObjectStore`]): a fast keyed store of projects,
//!    versions, folders and metadata. Volatile: it may be wiped at any time.
//!
//! The reconcile layer ([`crate::reconcile`]) keeps the two aligned: a rebuild re-derives
//! the object store from the files, and a sync-out writes the manifest from the current
//! in-memory state.
//!
//! ## Storage Layout
//!
//! ```text
//! prompts/
//! ├── structure.json          # Manifest: folders, name↔id mappings, descriptions
//! ├── Demo/
//! │   ├── Demo_v1.md          # Version bodies, exactly the saved content
//! │   └── Demo_v2.md
//! └── a_b/                    # "a/b" after sanitization
//!     └── a_b_v1.md
//! ```
//!
//! ## Implementations
//!
//! - [`fs_files::FsFileStore`]: the real directory tree.
//! - [`mem_files::MemFileStore`]: File Store in memory, for tests.
//! - [`mem_local::MemObjectStore`]: volatile object store.
//! - [`json_local::JsonObjectStore`]: object store persisted to a single JSON file, so a
//!   CLI process can keep its cache between invocations.
//!
//! All implementations take `&self` and use interior mutability where needed; the
//! workbench is single-threaded.

pub mod files;
pub mod fs_files;
pub mod json_local;
pub mod local;
pub mod mem_files;
pub mod mem_local;

pub use files::{FileStore, ScannedProject, ScannedVersion};
pub use local::{ObjectStore, StoreSnapshot, META_LAST_LOCAL_SYNC, META_LAST_RESTORE};
