//! Cluster forest storage: arena, level index and traversal.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::entities::ClusterNode;

/// Nodes of one level keyed by `level_id`.
pub type LevelMap = BTreeMap<i64, Index>;

/// Arena-backed forest of cluster nodes.
///
/// Parent and child links are arena indices, so navigation in both directions
/// is O(1) without reference cycles. A forest may hold any number of roots.
#[derive(Debug, Default)]
pub struct ClusterForest {
    /// Arena storage for all cluster nodes
    arena: Arena<ClusterNode>,
    /// level -> level_id -> node
    levels: BTreeMap<i64, LevelMap>,
    /// node name -> node
    names: HashMap<String, Index>,
}

impl ClusterForest {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        arena: Arena<ClusterNode>,
        levels: BTreeMap<i64, LevelMap>,
        names: HashMap<String, Index>,
    ) -> Self {
        Self {
            arena,
            levels,
            names,
        }
    }

    pub fn levels(&self) -> &BTreeMap<i64, LevelMap> {
        &self.levels
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn get(&self, idx: Index) -> Option<&ClusterNode> {
        self.arena.get(idx)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn node_at(&self, level: i64, level_id: i64) -> Option<Index> {
        self.levels.get(&level)?.get(&level_id).copied()
    }

    #[instrument(level = "trace", skip(self))]
    pub fn find(&self, name: &str) -> Option<Index> {
        self.names.get(name).copied()
    }

    pub fn parent(&self, idx: Index) -> Option<&ClusterNode> {
        self.parent_of(self.get(idx)?)
    }

    pub fn parent_of(&self, node: &ClusterNode) -> Option<&ClusterNode> {
        node.parent().and_then(|p| self.get(p))
    }

    /// Child nodes without their names, `None` for leaves.
    pub fn child_nodes(&self, idx: Index) -> Option<Vec<&ClusterNode>> {
        let entries = self.get(idx)?.child_entries()?;
        Some(
            entries
                .iter()
                .filter_map(|(_, child)| self.get(*child))
                .collect(),
        )
    }

    /// Update the user label of a node. Returns false if the index is stale.
    pub fn set_label(&mut self, idx: Index, label: Option<String>) -> bool {
        match self.arena.get_mut(idx) {
            Some(node) => {
                node.set_label(label);
                true
            }
            None => false,
        }
    }

    /// Update the user description of a node. Returns false if the index is stale.
    pub fn set_description(&mut self, idx: Index, description: Option<String>) -> bool {
        match self.arena.get_mut(idx) {
            Some(node) => {
                node.set_description(description);
                true
            }
            None => false,
        }
    }

    /// All nodes in level order.
    pub fn nodes(&self) -> impl Iterator<Item = (Index, &ClusterNode)> + '_ {
        self.levels
            .values()
            .flat_map(|level| level.values())
            .filter_map(move |&idx| self.get(idx).map(|node| (idx, node)))
    }

    /// Nodes without parent, ordered by (level, level_id).
    #[instrument(level = "debug", skip(self))]
    pub fn roots(&self) -> Vec<Index> {
        self.nodes()
            .filter(|(_, node)| node.is_root())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Nodes without children collection, ordered by (level, level_id).
    #[instrument(level = "debug", skip(self))]
    pub fn leaves(&self) -> Vec<Index> {
        self.nodes()
            .filter(|(_, node)| node.is_leaf())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Number of nodes on the longest root-to-leaf path.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.iter_postorder()
            .fold(HashMap::new(), |mut depths: HashMap<Index, usize>, (idx, node)| {
                let below = node
                    .child_entries()
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|(_, child)| depths.get(child).copied())
                    .max()
                    .unwrap_or(0);
                depths.insert(idx, below + 1);
                depths
            })
            .into_iter()
            .filter(|(idx, _)| self.get(*idx).is_some_and(ClusterNode::is_root))
            .map(|(_, depth)| depth)
            .max()
            .unwrap_or(0)
    }

    /// Pre-order traversal of every tree, roots in (level, level_id) order.
    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> ForestIterator<'_> {
        ForestIterator::new(self)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }
}

impl fmt::Display for ClusterForest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#levels: {}, #roots: {}",
            self.level_count(),
            self.roots().len()
        )
    }
}

fn child_indices(node: &ClusterNode) -> impl DoubleEndedIterator<Item = Index> + '_ {
    node.child_entries()
        .unwrap_or_default()
        .iter()
        .map(|(_, idx)| *idx)
}

pub struct ForestIterator<'a> {
    forest: &'a ClusterForest,
    stack: Vec<Index>,
}

impl<'a> ForestIterator<'a> {
    fn new(forest: &'a ClusterForest) -> Self {
        let mut stack = forest.roots();
        stack.reverse();
        Self { forest, stack }
    }
}

impl<'a> Iterator for ForestIterator<'a> {
    type Item = (Index, &'a ClusterNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.forest.get(current_idx) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(child_indices(node).rev());
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    forest: &'a ClusterForest,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(forest: &'a ClusterForest) -> Self {
        let stack = forest
            .roots()
            .into_iter()
            .rev()
            .map(|root| (root, false))
            .collect();
        Self { forest, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a ClusterNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.forest.get(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    self.stack
                        .extend(child_indices(node).rev().map(|child| (child, false)));
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
