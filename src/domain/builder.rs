//! Tree builder: reads cluster records and assembles the forest level by level.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use generational_arena::{Arena, Index};
use itertools::Itertools;
use tracing::{debug, instrument, trace};

use crate::domain::arena::{ClusterForest, LevelMap};
use crate::domain::entities::{Children, ClusterNode};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::record::{ChildRef, Declared, NodeRecord};

/// Phases of a single build. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    Empty,
    Ingesting,
    Sorted,
    Assembling(i64),
    Sealed,
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildPhase::Empty => write!(f, "empty"),
            BuildPhase::Ingesting => write!(f, "ingesting"),
            BuildPhase::Sorted => write!(f, "sorted"),
            BuildPhase::Assembling(level) => write!(f, "assembling(level={})", level),
            BuildPhase::Sealed => write!(f, "sealed"),
        }
    }
}

/// Constructs a [`ClusterForest`] from line-delimited JSON records.
///
/// Records may arrive in any order. They are stable-sorted by level and
/// processed once; a node's children must live in a level that was already
/// sealed when the node is reached.
#[derive(Debug)]
pub struct TreeBuilder {
    phase: BuildPhase,
    arena: Arena<ClusterNode>,
    sealed: BTreeMap<i64, LevelMap>,
    names: HashMap<String, Index>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            phase: BuildPhase::Empty,
            arena: Arena::new(),
            sealed: BTreeMap::new(),
            names: HashMap::new(),
        }
    }

    pub fn phase(&self) -> BuildPhase {
        self.phase
    }

    /// Build a forest from a record file.
    #[instrument(level = "debug", skip(self))]
    pub fn build_from_path(&mut self, path: &Path) -> DomainResult<ClusterForest> {
        if !path.is_file() {
            return Err(DomainError::FileNotFound(path.to_path_buf()));
        }
        let file = File::open(path)?;
        self.build_from_reader(BufReader::new(file))
    }

    pub fn build_from_str(&mut self, content: &str) -> DomainResult<ClusterForest> {
        self.build_from_reader(content.as_bytes())
    }

    #[instrument(level = "debug", skip_all)]
    pub fn build_from_reader<R: BufRead>(&mut self, reader: R) -> DomainResult<ClusterForest> {
        self.reset();
        let records = self.ingest(reader)?;
        let records = self.sort(records);
        self.assemble(records)
    }

    /// Parse every line into a record; the first bad line aborts.
    #[instrument(level = "debug", skip_all)]
    pub fn ingest<R: BufRead>(&mut self, reader: R) -> DomainResult<Vec<NodeRecord>> {
        self.transition(BuildPhase::Ingesting);
        let mut records = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record =
                NodeRecord::from_json(&line).map_err(|e| DomainError::from_json(i + 1, e))?;
            records.push(record);
        }
        debug!("ingested {} records", records.len());
        Ok(records)
    }

    fn sort(&mut self, records: Vec<NodeRecord>) -> Vec<NodeRecord> {
        // sorted_by_key is stable: records within a level keep input order
        let records = records.into_iter().sorted_by_key(|r| r.level).collect_vec();
        self.transition(BuildPhase::Sorted);
        records
    }

    fn assemble(&mut self, records: Vec<NodeRecord>) -> DomainResult<ClusterForest> {
        let mut current: Option<(i64, LevelMap)> = None;

        for record in records {
            match &mut current {
                Some((level, level_map)) if record.level > *level => {
                    let done = std::mem::take(level_map);
                    self.seal(*level, done);
                    *level = record.level;
                    self.transition(BuildPhase::Assembling(record.level));
                }
                Some(_) => {}
                None => {
                    current = Some((record.level, LevelMap::new()));
                    self.transition(BuildPhase::Assembling(record.level));
                }
            }
            if let Some((_, level_map)) = &mut current {
                self.insert_record(record, level_map)?;
            }
        }

        if let Some((level, level_map)) = current {
            self.seal(level, level_map);
        }
        self.transition(BuildPhase::Sealed);

        let forest = ClusterForest::from_parts(
            std::mem::take(&mut self.arena),
            std::mem::take(&mut self.sealed),
            std::mem::take(&mut self.names),
        );
        debug!("built forest: {}", forest);
        Ok(forest)
    }

    #[instrument(level = "trace", skip(self, record, level_map), fields(name = %record.name))]
    fn insert_record(&mut self, record: NodeRecord, level_map: &mut LevelMap) -> DomainResult<()> {
        if self.names.contains_key(&record.name) {
            return Err(DomainError::DuplicateNode { name: record.name });
        }
        if level_map.contains_key(&record.level_id) {
            return Err(DomainError::DuplicateLevelId {
                level: record.level,
                level_id: record.level_id,
            });
        }

        let NodeRecord {
            name,
            level,
            level_id,
            weight_dict,
            keywords,
            label,
            description,
            sentiment_dict,
            children,
        } = record;

        let node = ClusterNode::new(
            name.clone(),
            level,
            level_id,
            weight_dict,
            keywords,
            label,
            description,
            sentiment_dict,
        );
        let node_idx = self.arena.insert(node);

        let children = match children {
            Declared::Missing => Children::Missing,
            Declared::Null => Children::Null,
            Declared::Value(tokens) => {
                let mut listed = Vec::with_capacity(tokens.len());
                for token in &tokens {
                    if let Some(entry) = self.adopt(node_idx, &name, token)? {
                        listed.push(entry);
                    }
                }
                Children::Listed(listed)
            }
        };
        if let Some(node) = self.arena.get_mut(node_idx) {
            node.set_children(children);
        }

        self.names.insert(name, node_idx);
        level_map.insert(level_id, node_idx);
        Ok(())
    }

    /// Resolve `token` in the sealed levels and link the child to `parent_idx`.
    ///
    /// `None` if the child is already linked to `parent_idx` (repeated token).
    fn adopt(
        &mut self,
        parent_idx: Index,
        parent_name: &str,
        token: &str,
    ) -> DomainResult<Option<(String, Index)>> {
        let child_ref: ChildRef = token
            .parse()
            .map_err(|_| DomainError::InvalidChildToken {
                parent: parent_name.to_string(),
                token: token.to_string(),
            })?;

        let child_idx = self
            .sealed
            .get(&child_ref.level)
            .and_then(|level| level.get(&child_ref.level_id))
            .copied()
            .ok_or_else(|| DomainError::UnresolvedChild {
                parent: parent_name.to_string(),
                level: child_ref.level,
                level_id: child_ref.level_id,
            })?;

        let current_parent = self.arena.get(child_idx).and_then(ClusterNode::parent);
        if current_parent == Some(parent_idx) {
            trace!("{} lists {} more than once", parent_name, token);
            return Ok(None);
        }
        let first_parent = current_parent
            .and_then(|p| self.arena.get(p))
            .map(|p| p.name().to_string());

        let child = self
            .arena
            .get_mut(child_idx)
            .ok_or_else(|| DomainError::UnresolvedChild {
                parent: parent_name.to_string(),
                level: child_ref.level,
                level_id: child_ref.level_id,
            })?;
        if let Some(first) = first_parent {
            return Err(DomainError::MultipleParents {
                child: child.name().to_string(),
                first,
                second: parent_name.to_string(),
            });
        }
        child.set_parent(parent_idx);
        trace!("{} -> {}", parent_name, child.name());
        Ok(Some((child.name().to_string(), child_idx)))
    }

    fn seal(&mut self, level: i64, level_map: LevelMap) {
        debug!("sealing level {} with {} nodes", level, level_map.len());
        self.sealed.insert(level, level_map);
    }

    fn transition(&mut self, next: BuildPhase) {
        trace!("build phase: {} -> {}", self.phase, next);
        self.phase = next;
    }

    fn reset(&mut self) {
        self.phase = BuildPhase::Empty;
        self.arena.clear();
        self.sealed.clear();
        self.names.clear();
    }
}
