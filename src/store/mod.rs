//! Durable storage port for node records and parent/child edges.
//!
//! The simulator core only touches persistence through the narrow
//! [`NodeStore`] trait: inserts are idempotent, removes of missing entities
//! are a no-op, and readers treat store failures as "no data". Two backends
//! ship with the crate; anything else can implement the trait.

pub mod file;
pub mod memory;

use serde::{Deserialize, Serialize};

use crate::core::{NodeId, NodeType, Result};

/// Persisted shape of a node: identity, type, and owning cluster edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub node_type: NodeType,
    pub parent_id: Option<NodeId>,
}

impl NodeRecord {
    pub fn new(id: NodeId, node_type: NodeType) -> Self {
        Self {
            id,
            node_type,
            parent_id: None,
        }
    }

    pub fn with_parent(mut self, parent: NodeId) -> Self {
        self.parent_id = Some(parent);
        self
    }
}

/// Storage port consumed by the mediator and the command log.
///
/// `get_all` must return records in insertion order so replay reconstructs
/// membership deterministically.
pub trait NodeStore: Send + Sync {
    fn get_all(&self) -> Result<Vec<NodeRecord>>;

    /// Insert a record; re-inserting an existing id updates it in place
    fn insert(&self, record: NodeRecord) -> Result<()>;

    /// Remove a record; a missing id is a no-op, not an error
    fn remove(&self, id: NodeId) -> Result<()>;

    /// Record `child` as a member of `parent`
    fn add_cluster_relationship(&self, parent: NodeId, child: NodeId) -> Result<()>;

    /// Records whose parent edge points at `parent_id`, in insertion order
    fn get_cluster_children(&self, parent_id: NodeId) -> Result<Vec<NodeRecord>>;
}

pub use file::FileNodeStore;
pub use memory::MemoryNodeStore;
