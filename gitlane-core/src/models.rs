use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// File path to opaque content. Never diffed or interpreted.
pub type FileMap = BTreeMap<String, String>;

/// Branch name to tip, in insertion order. Lane order is derived from it.
pub type BranchMap = IndexMap<String, CommitId>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(repository: &str, counter: u64) -> Self {
        Self(format!("{}-c{}", repository, counter))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommitId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: CommitId,
    pub message: String,
    /// First entry is the mainline parent.
    pub parents: Vec<CommitId>,
    pub files: FileMap,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    /// Creation order within the repository. Layout only, never identity.
    pub sequence: u64,
}

impl Commit {
    pub fn new(
        id: CommitId,
        sequence: u64,
        message: String,
        author: String,
        files: FileMap,
    ) -> Self {
        Self {
            id,
            message,
            parents: Vec::new(),
            files,
            author,
            timestamp: Utc::now(),
            sequence,
        }
    }

    pub fn with_parent(mut self, parent: CommitId) -> Self {
        self.parents.push(parent);
        self
    }

    pub fn first_parent(&self) -> Option<&CommitId> {
        self.parents.first()
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

/// Consistent copy of a repository's state, handed to the layout engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    pub name: String,
    pub head: String,
    pub branches: BranchMap,
    /// Every commit in the store, in creation order.
    pub commits: Vec<Commit>,
}
