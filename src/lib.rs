//! Rebuild hierarchical cluster forests from line-delimited JSON records.
//!
//! Each input line describes one cluster at some level of a clustering
//! hierarchy and names its children as `"<level>/<level_id>"` tokens.
//! [`domain::TreeBuilder`] orders the records by level and links every node
//! to its already-built children in a single pass, producing a
//! [`domain::ClusterForest`].

pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod tree_traits;
pub mod util;

pub use domain::{ClusterForest, ClusterNode, DomainError, DomainResult, TreeBuilder};
