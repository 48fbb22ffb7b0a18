//! # gitlane-core
//!
//! Core library for gitlane - in-memory commit graphs and their lane layout.
//!
//! This crate provides the commit store, repositories with `commit`, `branch`,
//! `checkout` and `merge`, a registry of repositories, and the layout engine
//! that turns a commit graph into positioned nodes and edges for rendering.

pub mod error;
pub mod layout;
pub mod listeners;
pub mod models;
pub mod registry;
pub mod repository;
pub mod script;
pub mod store;

pub use error::{Error, ErrorKind, Result};
pub use layout::{compute_layout, GraphLayout, Lane, LayoutConfig, LayoutEdge, LayoutNode};
pub use listeners::{ListenerId, ListenerSet};
pub use models::{BranchMap, Commit, CommitId, FileMap, RepositorySnapshot};
pub use registry::{Registry, RepositoryId, RepositorySummary};
pub use repository::{MergeOutcome, Repository};
pub use script::{ReplayReport, Script, Step};
pub use store::CommitStore;
