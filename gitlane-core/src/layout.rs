//! Lane layout for commit graphs.
//!
//! Turns a commit set and a branch map into positioned nodes and edges:
//!
//! 1. Every branch gets a lane, in branch-map order.
//! 2. Each commit is owned by the lane whose first-parent walk reaches it
//!    first. Second parents of merges are never claimed by the walk.
//! 3. The visible set is everything reachable from any tip over all parents.
//! 4. `x` follows the commit sequence number, `y` follows the owning lane.
//! 5. One edge per parent; edges from second and later parents are merge edges.
//!
//! The output is fully determined by the inputs. Nodes are ordered by
//! sequence number and edges by child, then parent position.

use crate::models::{BranchMap, Commit, CommitId, RepositorySnapshot};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// Lane label for commits no first-parent walk reached.
pub const UNKNOWN_LANE: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Vertical distance between lanes.
    pub lane_height: f64,
    /// Horizontal distance between consecutive sequence numbers.
    pub commit_spacing: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            lane_height: 80.0,
            commit_spacing: 120.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lane {
    pub branch: String,
    pub index: usize,
    pub y: f64,
    pub tip: CommitId,
    pub is_head: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    pub id: CommitId,
    pub lane: String,
    pub x: f64,
    pub y: f64,
    pub is_head_tip: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEdge {
    pub id: String,
    pub parent_id: CommitId,
    pub child_id: CommitId,
    pub is_merge_edge: bool,
}

impl LayoutEdge {
    fn new(parent: &CommitId, child: &CommitId, is_merge_edge: bool) -> Self {
        let kind = if is_merge_edge { "merge" } else { "main" };
        Self {
            id: format!("{}->{}:{}", parent, child, kind),
            parent_id: parent.clone(),
            child_id: child.clone(),
            is_merge_edge,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphLayout {
    pub lanes: Vec<Lane>,
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
}

impl GraphLayout {
    pub fn from_snapshot(snapshot: &RepositorySnapshot, config: &LayoutConfig) -> Self {
        compute_layout(
            &snapshot.commits,
            &snapshot.branches,
            &snapshot.head,
            config,
        )
    }

    pub fn node(&self, id: &CommitId) -> Option<&LayoutNode> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    pub fn lane(&self, branch: &str) -> Option<&Lane> {
        self.lanes.iter().find(|lane| lane.branch == branch)
    }

    /// Edges whose child is `id`, in parent order.
    pub fn edges_into<'a>(&'a self, id: &'a CommitId) -> impl Iterator<Item = &'a LayoutEdge> {
        self.edges.iter().filter(move |edge| &edge.child_id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Lay out `commits` for the given branch map and head branch.
///
/// `commits` may hold more than the branches reach; only commits reachable
/// from a tip become nodes.
pub fn compute_layout<'a, I>(
    commits: I,
    branches: &BranchMap,
    head: &str,
    config: &LayoutConfig,
) -> GraphLayout
where
    I: IntoIterator<Item = &'a Commit>,
{
    let by_id: HashMap<&CommitId, &Commit> = commits.into_iter().map(|c| (&c.id, c)).collect();
    let head_tip = branches.get(head);

    let lanes: Vec<Lane> = branches
        .iter()
        .enumerate()
        .map(|(index, (branch, tip))| Lane {
            branch: branch.clone(),
            index,
            y: lane_y(index, config),
            tip: tip.clone(),
            is_head: branch == head,
        })
        .collect();

    let owners = claim_first_parent_chains(&by_id, branches);
    let visible = collect_reachable(&by_id, branches);
    let visible_ids: HashSet<&CommitId> = visible.iter().map(|c| &c.id).collect();
    let visible_ids = &visible_ids;

    let nodes: Vec<LayoutNode> = visible
        .iter()
        .map(|commit| {
            let (lane, y) = match owners.get(&commit.id) {
                Some(&index) => (lanes[index].branch.clone(), lanes[index].y),
                None => (UNKNOWN_LANE.to_string(), lane_y(lanes.len(), config)),
            };

            LayoutNode {
                id: commit.id.clone(),
                lane,
                x: commit.sequence as f64 * config.commit_spacing,
                y,
                is_head_tip: head_tip == Some(&commit.id),
            }
        })
        .collect();

    let edges: Vec<LayoutEdge> = visible
        .iter()
        .flat_map(|commit| {
            commit
                .parents
                .iter()
                .enumerate()
                .filter(move |(_, parent)| visible_ids.contains(parent))
                .map(move |(position, parent)| LayoutEdge::new(parent, &commit.id, position > 0))
        })
        .collect();

    trace!(
        "Laid out {} nodes and {} edges across {} lanes",
        nodes.len(),
        edges.len(),
        lanes.len()
    );

    GraphLayout {
        lanes,
        nodes,
        edges,
    }
}

fn lane_y(index: usize, config: &LayoutConfig) -> f64 {
    index as f64 * config.lane_height
}

/// Walk back from each tip along first parents, in branch-map order, stopping
/// at the first commit an earlier branch already claimed.
fn claim_first_parent_chains<'a>(
    by_id: &HashMap<&'a CommitId, &'a Commit>,
    branches: &BranchMap,
) -> HashMap<&'a CommitId, usize> {
    let mut owners: HashMap<&'a CommitId, usize> = HashMap::new();

    for (index, tip) in branches.values().enumerate() {
        let mut current = by_id.get(tip).copied();

        while let Some(commit) = current {
            if owners.contains_key(&commit.id) {
                break;
            }
            owners.insert(&commit.id, index);
            current = commit.first_parent().and_then(|p| by_id.get(p).copied());
        }
    }

    owners
}

/// Every commit reachable from any tip over all parents, each exactly once,
/// sorted by sequence number.
fn collect_reachable<'a>(
    by_id: &HashMap<&'a CommitId, &'a Commit>,
    branches: &BranchMap,
) -> Vec<&'a Commit> {
    let mut seen: HashSet<&CommitId> = HashSet::new();
    let mut stack: Vec<&'a Commit> = branches
        .values()
        .filter_map(|tip| by_id.get(tip).copied())
        .collect();
    let mut reachable = Vec::new();

    while let Some(commit) = stack.pop() {
        if !seen.insert(&commit.id) {
            continue;
        }
        reachable.push(commit);
        stack.extend(commit.parents.iter().filter_map(|p| by_id.get(p).copied()));
    }

    reachable.sort_by(|a, b| a.sequence.cmp(&b.sequence).then_with(|| a.id.cmp(&b.id)));
    reachable
}
