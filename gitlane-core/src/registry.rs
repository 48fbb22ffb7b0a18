use crate::error::{Error, Result};
use crate::listeners::{ListenerId, ListenerSet};
use crate::repository::{Repository, DEFAULT_AUTHOR};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub type RepositoryId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub id: RepositoryId,
    pub name: String,
    pub head: String,
    pub branch_count: usize,
    pub commit_count: usize,
    pub active: bool,
}

/// Owns every repository and tracks which one is active.
///
/// Once a repository exists the registry never drops below one, and exactly
/// one repository is active. Registry notifications are separate from the
/// notifications of the repositories it holds.
#[derive(Debug)]
pub struct Registry {
    repositories: IndexMap<RepositoryId, Repository>,
    active: Option<RepositoryId>,
    author: String,
    listeners: ListenerSet,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            repositories: IndexMap::new(),
            active: None,
            author: DEFAULT_AUTHOR.to_string(),
            listeners: ListenerSet::new(),
        }
    }

    /// Author label given to repositories created from now on.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// A registry seeded with one active repository.
    pub fn with_initial(name: impl Into<String>) -> Self {
        let mut registry = Self::new();
        registry.create_repository(name);
        registry
    }

    pub fn create_repository(&mut self, name: impl Into<String>) -> RepositoryId {
        let name = name.into();
        let id = Uuid::new_v4();

        info!("Created repository {} ({})", name, id);
        self.repositories
            .insert(id, Repository::with_author(name, self.author.clone()));
        if self.active.is_none() {
            self.active = Some(id);
        }

        self.listeners.notify();
        id
    }

    /// Make `id` active. Switching to the already active repository changes nothing.
    pub fn switch_to(&mut self, id: &RepositoryId) -> Result<()> {
        if !self.repositories.contains_key(id) {
            warn!("Switch to unknown repository {}", id);
            return Err(Error::RepositoryNotFound(id.to_string()));
        }
        if self.active.as_ref() == Some(id) {
            return Ok(());
        }

        debug!("Switched active repository to {}", id);
        self.active = Some(*id);
        self.listeners.notify();
        Ok(())
    }

    /// Remove and return a repository. The last one can never be deleted.
    ///
    /// Deleting the active repository activates the earliest-created survivor.
    pub fn delete_repository(&mut self, id: &RepositoryId) -> Result<Repository> {
        if !self.repositories.contains_key(id) {
            return Err(Error::RepositoryNotFound(id.to_string()));
        }
        if self.repositories.len() <= 1 {
            warn!("Refusing to delete the last repository {}", id);
            return Err(Error::LastRepository);
        }

        let removed = self
            .repositories
            .shift_remove(id)
            .ok_or_else(|| Error::RepositoryNotFound(id.to_string()))?;

        if self.active.as_ref() == Some(id) {
            self.active = self.repositories.keys().next().copied();
        }

        info!("Deleted repository {} ({})", removed.name(), id);
        self.listeners.notify();
        Ok(removed)
    }

    // Queries

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }

    pub fn contains(&self, id: &RepositoryId) -> bool {
        self.repositories.contains_key(id)
    }

    /// Repositories in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (&RepositoryId, &Repository)> {
        self.repositories.iter()
    }

    pub fn list(&self) -> Vec<RepositorySummary> {
        self.repositories
            .iter()
            .map(|(id, repo)| self.summarize(id, repo))
            .collect()
    }

    pub fn summary(&self, id: &RepositoryId) -> Result<RepositorySummary> {
        self.get(id).map(|repo| self.summarize(id, repo))
    }

    fn summarize(&self, id: &RepositoryId, repo: &Repository) -> RepositorySummary {
        RepositorySummary {
            id: *id,
            name: repo.name().to_string(),
            head: repo.head().to_string(),
            branch_count: repo.branches().len(),
            commit_count: repo.all_commits().len(),
            active: self.active.as_ref() == Some(id),
        }
    }

    pub fn get(&self, id: &RepositoryId) -> Result<&Repository> {
        self.repositories
            .get(id)
            .ok_or_else(|| Error::RepositoryNotFound(id.to_string()))
    }

    pub fn get_mut(&mut self, id: &RepositoryId) -> Result<&mut Repository> {
        self.repositories
            .get_mut(id)
            .ok_or_else(|| Error::RepositoryNotFound(id.to_string()))
    }

    pub fn active_id(&self) -> Option<RepositoryId> {
        self.active
    }

    pub fn active(&self) -> Option<&Repository> {
        self.active
            .as_ref()
            .and_then(|id| self.repositories.get(id))
    }

    pub fn active_mut(&mut self) -> Option<&mut Repository> {
        match self.active {
            Some(id) => self.repositories.get_mut(&id),
            None => None,
        }
    }

    pub fn active_name(&self) -> &str {
        self.active().map(Repository::name).unwrap_or("none")
    }

    // Notifications

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
