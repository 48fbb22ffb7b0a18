//! Replay scripts: a TOML list of repository operations.
//!
//! ```toml
//! [[step]]
//! op = "commit"
//! message = "Add readme"
//! files = { "README.md" = "# demo" }
//!
//! [[step]]
//! op = "branch"
//! name = "feature"
//! ```

use crate::error::{Error, Result};
use crate::models::{CommitId, FileMap};
use crate::repository::{MergeOutcome, Repository};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Step {
    Commit {
        message: String,
        #[serde(default)]
        files: FileMap,
    },
    Branch {
        name: String,
    },
    Checkout {
        name: String,
    },
    Merge {
        name: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub applied: usize,
    /// Commits created by `commit` and `merge` steps, in order.
    pub created: Vec<CommitId>,
    /// Merge steps that found nothing to merge.
    pub up_to_date: usize,
}

impl Script {
    pub fn parse(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Apply every step in order. The first failing step stops the replay;
    /// steps before it stay applied.
    pub fn apply(&self, repo: &mut Repository) -> Result<ReplayReport> {
        let mut report = ReplayReport::default();

        for (index, step) in self.steps.iter().enumerate() {
            if let Err(source) = Self::apply_step(repo, step, &mut report) {
                return Err(Error::InvalidStep {
                    index,
                    source: Box::new(source),
                });
            }
            report.applied += 1;
        }

        debug!("Replayed {} steps into {}", report.applied, repo.name());
        Ok(report)
    }

    fn apply_step(repo: &mut Repository, step: &Step, report: &mut ReplayReport) -> Result<()> {
        match step {
            Step::Commit { message, files } => {
                report.created.push(repo.commit(message.clone(), files.clone()));
            }
            Step::Branch { name } => repo.branch(name.clone())?,
            Step::Checkout { name } => repo.checkout(name)?,
            Step::Merge { name } => match repo.merge(name)? {
                MergeOutcome::Merged(id) => report.created.push(id),
                MergeOutcome::UpToDate => report.up_to_date += 1,
            },
        }
        Ok(())
    }
}
