use crate::error::{Error, Result};
use crate::layout::{compute_layout, GraphLayout, LayoutConfig};
use crate::listeners::{ListenerId, ListenerSet};
use crate::models::{BranchMap, Commit, CommitId, FileMap, RepositorySnapshot};
use crate::store::CommitStore;
use tracing::{debug, warn};

pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_AUTHOR: &str = "user";
pub const INITIAL_COMMIT_MESSAGE: &str = "Initial commit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// A merge commit was created and head moved to it.
    Merged(CommitId),
    /// Both branches already point at the same commit. Nothing changed.
    UpToDate,
}

/// A single in-memory repository: commit store, branch pointers and head.
///
/// State only changes through [`commit`](Self::commit), [`branch`](Self::branch),
/// [`checkout`](Self::checkout) and [`merge`](Self::merge). Each successful call
/// notifies subscribers exactly once, after the change is in place. A rejected
/// call leaves everything untouched and notifies nobody.
#[derive(Debug)]
pub struct Repository {
    name: String,
    author: String,
    store: CommitStore,
    branches: BranchMap,
    head: String,
    listeners: ListenerSet,
}

impl Repository {
    /// Create a repository with `main` pointing at an empty root commit.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_author(name, DEFAULT_AUTHOR)
    }

    pub fn with_author(name: impl Into<String>, author: impl Into<String>) -> Self {
        let mut repo = Self::empty_with_author(name, author);
        repo.record_commit(
            INITIAL_COMMIT_MESSAGE.to_string(),
            FileMap::new(),
            Vec::new(),
        );
        repo
    }

    /// Create a repository whose head branch has no tip yet.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::empty_with_author(name, DEFAULT_AUTHOR)
    }

    fn empty_with_author(name: impl Into<String>, author: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            store: CommitStore::new(name.clone()),
            name,
            author: author.into(),
            branches: BranchMap::new(),
            head: DEFAULT_BRANCH.to_string(),
            listeners: ListenerSet::new(),
        }
    }

    // Mutations

    /// Commit `files` on top of the head tip and advance head.
    pub fn commit(&mut self, message: impl Into<String>, files: FileMap) -> CommitId {
        let parents = self.head_tip().cloned().into_iter().collect();
        let id = self.record_commit(message.into(), files, parents);
        debug!("Committed {} on {} in {}", id, self.head, self.name);
        self.listeners.notify();
        id
    }

    /// Create branch `name` at the head tip. Existing branches are never overwritten.
    pub fn branch(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        let tip = self.require_head_tip()?.clone();

        if self.branches.contains_key(&name) {
            warn!("Refusing to overwrite branch {} in {}", name, self.name);
            return Err(Error::BranchExists(name));
        }

        debug!("Created branch {} at {} in {}", name, tip, self.name);
        self.branches.insert(name, tip);
        self.listeners.notify();
        Ok(())
    }

    pub fn checkout(&mut self, name: &str) -> Result<()> {
        if !self.branches.contains_key(name) {
            warn!("Checkout of unknown branch {} in {}", name, self.name);
            return Err(Error::BranchNotFound(name.to_string()));
        }

        self.head = name.to_string();
        debug!("Checked out {} in {}", name, self.name);
        self.listeners.notify();
        Ok(())
    }

    /// Structural merge of `name` into head. The merge commit keeps head's files.
    pub fn merge(&mut self, name: &str) -> Result<MergeOutcome> {
        let base = self.require_head_tip()?.clone();
        let other = self
            .branches
            .get(name)
            .cloned()
            .ok_or_else(|| Error::BranchNotFound(name.to_string()))?;

        if base == other {
            debug!("{} is already up to date with {}", self.head, name);
            return Ok(MergeOutcome::UpToDate);
        }

        let files = self
            .store
            .get(&base)
            .map(|commit| commit.files.clone())
            .unwrap_or_default();
        let message = format!("Merge branch '{}' into {}", name, self.head);
        let id = self.record_commit(message, files, vec![base, other]);

        debug!("Merged {} into {} as {}", name, self.head, id);
        self.listeners.notify();
        Ok(MergeOutcome::Merged(id))
    }

    fn record_commit(
        &mut self,
        message: String,
        files: FileMap,
        parents: Vec<CommitId>,
    ) -> CommitId {
        let id = self.store.append(message, self.author.clone(), files, &parents);
        self.branches.insert(self.head.clone(), id.clone());
        id
    }

    fn require_head_tip(&self) -> Result<&CommitId> {
        self.head_tip()
            .ok_or_else(|| Error::EmptyRepository(self.name.clone()))
    }

    // Queries

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn head(&self) -> &str {
        &self.head
    }

    pub fn head_tip(&self) -> Option<&CommitId> {
        self.branches.get(&self.head)
    }

    pub fn branches(&self) -> &BranchMap {
        &self.branches
    }

    pub fn branch_tip(&self, name: &str) -> Result<&CommitId> {
        self.branches
            .get(name)
            .ok_or_else(|| Error::BranchNotFound(name.to_string()))
    }

    pub fn commit_by_id(&self, id: &CommitId) -> Result<&Commit> {
        self.store.get_commit(id)
    }

    /// First-parent history of head, newest first, ending at the root commit.
    pub fn history(&self) -> Vec<&Commit> {
        match self.head_tip() {
            Some(tip) => self.store.first_parent_chain(tip),
            None => Vec::new(),
        }
    }

    /// Every commit in the store in creation order. Branches are never
    /// deleted, so this is exactly the set reachable from the branch tips.
    pub fn all_commits(&self) -> Vec<&Commit> {
        self.store.iter().collect()
    }

    pub fn snapshot(&self) -> RepositorySnapshot {
        RepositorySnapshot {
            name: self.name.clone(),
            head: self.head.clone(),
            branches: self.branches.clone(),
            commits: self.store.iter().cloned().collect(),
        }
    }

    pub fn layout(&self, config: &LayoutConfig) -> GraphLayout {
        compute_layout(self.store.iter(), &self.branches, &self.head, config)
    }

    // Notifications

    /// Handle to this repository's listener set.
    pub fn listeners(&self) -> &ListenerSet {
        &self.listeners
    }

    pub fn subscribe<F>(&self, callback: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }
}
