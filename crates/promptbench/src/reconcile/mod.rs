//! # Reconciliation
//!
//! Keeps the Local Object Store and the File Store aligned. There are two halves:
//!
//! - **Rebuild** ([`rebuild::rebuild_from_file_store`]): on startup, scan the version
//!   files, read the manifest, and recreate every project, version and folder in the
//!   object store. Rows that existed before keep their ids, timestamps and
//!   descriptions, matched by project name.
//! - **Sync-out** ([`sync::sync_structure_to_local`]): after a mutation, recompute the
//!   manifest from in-memory state and replace `structure.json` with it.
//!
//! Both halves decide folder membership through one resolver
//! ([`resolve::resolve_folder_assignment`]).
//!
//! ```text
//!  startup                         mutation
//!     │                               │
//!     ▼                               ▼
//!  scan files ─► snapshot ─► clear ─► recreate ─► schedule sync ─► write manifest
//! ```
//!
//! Nothing here returns an error for a single bad entity. Per-entity failures are
//! logged with `tracing` and collected in the returned report.

pub mod rebuild;
pub mod resolve;
pub mod sync;

pub use rebuild::{needs_rebuild, rebuild_from_file_store, RebuildReport};
pub use resolve::{resolve_folder_assignment, FolderLookup, FolderResolution, MatchStrategy};
pub use sync::{sync_structure_to_local, SyncReport, SyncState};
