//! termtree rendering of cluster forests.

use generational_arena::Index;
use itertools::Itertools;
use termtree::Tree;
use tracing::instrument;

use crate::domain::{ClusterForest, ClusterNode};

/// How a node is summarized in a rendered tree.
#[derive(Debug, Clone)]
pub struct RenderStyle {
    /// Period whose weight is shown
    pub period: String,
    /// Keywords shown when the node has no label
    pub max_keywords: usize,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            period: crate::domain::DEFAULT_PERIOD.to_string(),
            max_keywords: 5,
        }
    }
}

impl RenderStyle {
    /// One-line summary: `<name> (w=<weight>) <label | keywords>`.
    pub fn describe(&self, node: &ClusterNode) -> String {
        let weight = node
            .weight(&self.period)
            .map(|w| w.to_string())
            .unwrap_or_else(|| "-".to_string());
        let caption = match node.label() {
            Some(label) => label.to_string(),
            None => node.keywords().iter().take(self.max_keywords).join(", "),
        };
        format!("{} (w={}) {}", node.name(), weight, caption)
            .trim_end()
            .to_string()
    }
}

pub trait TreeNodeConvert {
    /// One rendered tree per root.
    fn to_tree_strings(&self, style: &RenderStyle) -> Vec<Tree<String>>;
}

impl TreeNodeConvert for ClusterForest {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_strings(&self, style: &RenderStyle) -> Vec<Tree<String>> {
        fn build_tree(forest: &ClusterForest, idx: Index, style: &RenderStyle) -> Option<Tree<String>> {
            let node = forest.get(idx)?;
            let leaves: Vec<_> = node
                .child_entries()
                .unwrap_or_default()
                .iter()
                .filter_map(|(_, child)| build_tree(forest, *child, style))
                .collect();
            Some(Tree::new(style.describe(node)).with_leaves(leaves))
        }

        self.roots()
            .into_iter()
            .filter_map(|root| build_tree(self, root, style))
            .collect()
    }
}
