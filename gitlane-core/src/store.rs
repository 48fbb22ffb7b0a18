use crate::error::{Error, Result};
use crate::models::{Commit, CommitId, FileMap};
use indexmap::IndexMap;

/// Append-only commit ledger for a single repository.
///
/// Ids and sequence numbers come from one counter, so a commit can only name
/// parents that were inserted before it and the graph stays acyclic.
#[derive(Debug, Clone)]
pub struct CommitStore {
    repository: String,
    commits: IndexMap<CommitId, Commit>,
    next_sequence: u64,
}

impl CommitStore {
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            commits: IndexMap::new(),
            next_sequence: 0,
        }
    }

    /// Create and store a commit on top of `parents`, which must already exist.
    pub fn create_commit(
        &mut self,
        message: String,
        author: String,
        files: FileMap,
        parents: &[CommitId],
    ) -> Result<CommitId> {
        if let Some(missing) = parents.iter().find(|p| !self.commits.contains_key(*p)) {
            return Err(Error::CommitNotFound(missing.to_string()));
        }

        Ok(self.append(message, author, files, parents))
    }

    /// Insert without checking parents. Callers hold ids taken from this store.
    pub(crate) fn append(
        &mut self,
        message: String,
        author: String,
        files: FileMap,
        parents: &[CommitId],
    ) -> CommitId {
        let sequence = self.next_sequence;
        let id = CommitId::new(&self.repository, sequence);
        let commit = parents.iter().cloned().fold(
            Commit::new(id.clone(), sequence, message, author, files),
            Commit::with_parent,
        );

        self.next_sequence += 1;
        self.commits.insert(id.clone(), commit);

        id
    }

    pub fn get(&self, id: &CommitId) -> Option<&Commit> {
        self.commits.get(id)
    }

    pub fn get_commit(&self, id: &CommitId) -> Result<&Commit> {
        self.get(id)
            .ok_or_else(|| Error::CommitNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &CommitId) -> bool {
        self.commits.contains_key(id)
    }

    /// All commits in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Commit> {
        self.commits.values()
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// Walk the first-parent chain starting at `tip`, newest first.
    pub fn first_parent_chain(&self, tip: &CommitId) -> Vec<&Commit> {
        let mut chain = Vec::new();
        let mut current = self.get(tip);

        while let Some(commit) = current {
            chain.push(commit);
            current = commit.first_parent().and_then(|p| self.get(p));
        }

        chain
    }
}
