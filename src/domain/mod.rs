//! Domain layer: cluster entities, record parsing and forest assembly
//!
//! This layer is independent of CLI and configuration concerns.

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod record;

pub use arena::{ClusterForest, ForestIterator, LevelMap, PostOrderIterator};
pub use builder::{BuildPhase, TreeBuilder};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use record::{ChildRef, Declared, NodeRecord};
