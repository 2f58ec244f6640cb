//! Domain entities: core data structures

use std::collections::BTreeMap;
use std::fmt;

use generational_arena::Index;
use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::record::Declared;

/// Period used when the caller does not name one.
pub const DEFAULT_PERIOD: &str = "total";

/// Returned by [`ClusterNode::weight_or_sentinel`] for unknown periods.
pub const WEIGHT_SENTINEL: i64 = -1;

/// Sentiment classes that carry a polarity weight. Other classes only add to the total.
pub const SENTIMENT_WEIGHTS: [(&str, i64); 3] = [("positive", 1), ("neutral", 0), ("negative", -1)];

/// Tweet counts per sentiment class for one period.
///
/// Classes are kept as recorded; the three weighted classes are only required
/// when the period is scored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentimentCounts(BTreeMap<String, i64>);

impl SentimentCounts {
    pub fn new(counts: BTreeMap<String, i64>) -> Self {
        Self(counts)
    }

    pub fn get(&self, class: &str) -> Option<i64> {
        self.0.get(class).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.0.iter().map(|(class, count)| (class.as_str(), *count))
    }

    /// Sum over every recorded class.
    pub fn total(&self) -> i128 {
        self.0.values().map(|&count| i128::from(count)).sum()
    }
}

/// Children of a cluster.
///
/// A leaf carries no collection at all; `Listed(vec![])` is a parent without children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Children {
    /// `children` key absent from the record
    #[default]
    Missing,
    /// `children: null`
    Null,
    /// Child names with their arena indices, in declaration order
    Listed(Vec<(String, Index)>),
}

impl Children {
    pub fn is_absent(&self) -> bool {
        !matches!(self, Children::Listed(_))
    }

    pub fn entries(&self) -> Option<&[(String, Index)]> {
        match self {
            Children::Listed(entries) => Some(entries),
            Children::Missing | Children::Null => None,
        }
    }

    /// Arena index of the child named `name`.
    pub fn get(&self, name: &str) -> Option<Index> {
        self.entries()?
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, idx)| *idx)
    }
}

/// One cluster in the hierarchy.
///
/// Topology (`parent`, `children`) is fixed once the forest is built; only the
/// annotations `label` and `description` may change afterwards.
#[derive(Debug, Clone)]
pub struct ClusterNode {
    name: String,
    level: i64,
    level_id: i64,
    weight_dict: BTreeMap<String, i64>,
    keywords: Vec<String>,
    label: Option<String>,
    description: Option<String>,
    sentiment_dict: Declared<BTreeMap<String, SentimentCounts>>,
    parent: Option<Index>,
    children: Children,
}

impl ClusterNode {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: String,
        level: i64,
        level_id: i64,
        weight_dict: BTreeMap<String, i64>,
        keywords: Vec<String>,
        label: Option<String>,
        description: Option<String>,
        sentiment_dict: Declared<BTreeMap<String, SentimentCounts>>,
    ) -> Self {
        Self {
            name,
            level,
            level_id,
            weight_dict,
            keywords,
            label,
            description,
            sentiment_dict,
            parent: None,
            children: Children::Missing,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> i64 {
        self.level
    }

    pub fn level_id(&self) -> i64 {
        self.level_id
    }

    pub fn weight_dict(&self) -> &BTreeMap<String, i64> {
        &self.weight_dict
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn sentiment_dict(&self) -> &Declared<BTreeMap<String, SentimentCounts>> {
        &self.sentiment_dict
    }

    pub fn parent(&self) -> Option<Index> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Index) {
        self.parent = Some(parent);
    }

    pub fn children(&self) -> &Children {
        &self.children
    }

    /// Name-keyed children, `None` for leaves.
    pub fn child_entries(&self) -> Option<&[(String, Index)]> {
        self.children.entries()
    }

    pub(crate) fn set_children(&mut self, children: Children) {
        self.children = children;
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_absent()
    }

    /// Weight (tweet count) for `period`, `None` if the period is not recorded.
    pub fn weight(&self, period: &str) -> Option<i64> {
        self.weight_dict.get(period).copied()
    }

    /// Weight for `period`, or [`WEIGHT_SENTINEL`] if the period is not recorded.
    pub fn weight_or_sentinel(&self, period: &str) -> i64 {
        self.weight(period).unwrap_or(WEIGHT_SENTINEL)
    }

    pub fn total_weight(&self) -> Option<i64> {
        self.weight(DEFAULT_PERIOD)
    }

    /// Sentiment polarity for `period`, in [-1, 1] rounded to 4 decimals.
    ///
    /// The weighted sum of positive (+1), neutral (0) and negative (-1) counts
    /// is divided by the count of every recorded class.
    /// `Ok(None)` when no sentiment was recorded for the node or the period.
    ///
    /// # Errors
    /// * [`DomainError::MissingSentimentClass`] if a weighted class is absent
    /// * [`DomainError::NegativeSentimentCount`] if any count is below zero
    /// * [`DomainError::EmptySentiment`] if the counts sum to zero
    pub fn sentiment_score(&self, period: &str) -> DomainResult<Option<f64>> {
        let Some(counts) = self
            .sentiment_dict
            .as_value()
            .and_then(|dict| dict.get(period))
        else {
            return Ok(None);
        };

        if let Some((class, count)) = counts.iter().find(|(_, count)| *count < 0) {
            return Err(DomainError::NegativeSentimentCount {
                name: self.name.clone(),
                period: period.to_string(),
                class: class.to_string(),
                count,
            });
        }

        let mut weighted: i128 = 0;
        for (class, weight) in SENTIMENT_WEIGHTS {
            let count = counts
                .get(class)
                .ok_or_else(|| DomainError::MissingSentimentClass {
                    name: self.name.clone(),
                    period: period.to_string(),
                    class: class.to_string(),
                })?;
            weighted += i128::from(count) * i128::from(weight);
        }

        let total = counts.total();
        if total == 0 {
            return Err(DomainError::EmptySentiment {
                name: self.name.clone(),
                period: period.to_string(),
            });
        }
        let score = weighted as f64 / total as f64;
        Ok(Some((score * 10_000.0).round() / 10_000.0))
    }
}

impl fmt::Display for ClusterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "level={}, level_id={}, weight={}, keywords={:?}",
            self.level,
            self.level_id,
            self.weight_or_sentinel(DEFAULT_PERIOD),
            self.keywords
        )
    }
}
