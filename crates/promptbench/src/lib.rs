//! # Promptbench Architecture
//!
//! Promptbench is a **local-first prompt workbench**: projects hold an append-only list
//! of prompt versions, grouped into folders. Every version is mirrored to a plain
//! markdown file, so the prompt library stays readable, diffable and recoverable
//! without the tool.
//!
//! It is a library first. The `promptbench` binary is one client of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (promptbench-cli)                                      │
//! │  - Parses arguments, renders results, sets up logging       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade, resolves name/uuid selectors to ids         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs) over Workbench state         │
//! │  - Create/rename/move/delete, version saves, startup        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Reconciliation (reconcile/)                                │
//! │  - Rebuild object store from files, sync manifest out       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - FileStore: markdown files + structure.json               │
//! │  - ObjectStore: volatile keyed cache                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The File Store is the Truth
//!
//! The object store is a cache. It can be deleted at any time; the next
//! [`commands::startup::load`] rebuilds it from the version files and the manifest,
//! keeping ids, timestamps and descriptions of everything it already knew.
//!
//! ## No I/O Assumptions in the Core
//!
//! From `api.rs` inward, code never prints, never exits and never reads a clock it was
//! not handed, except for entity timestamps. Logging goes through `tracing`; the
//! subscriber is the host's business.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`commands`]: Business logic per operation
//! - [`workbench`]: Owned state shared by the commands
//! - [`reconcile`]: Rebuild, sync-out and the shared folder resolver
//! - [`debounce`]: Deterministic trailing-edge sync scheduler
//! - [`store`]: File Store and object store traits and implementations
//! - [`manifest`]: The `structure.json` codec
//! - [`model`]: Projects, versions, folders and naming rules
//! - [`config`]: Configuration
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod debounce;
pub mod error;
pub mod manifest;
pub mod model;
pub mod reconcile;
pub mod store;
pub mod workbench;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
