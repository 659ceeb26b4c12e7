use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a topology node
///
/// Globally unique and immutable after creation. New ids are random (v4);
/// ids loaded from a store are preserved so replay reconstructs the same
/// topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Generate a new unique node ID
    pub fn new() -> Self {
        NodeId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for NodeId {
    fn from(id: Uuid) -> Self {
        NodeId(id)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kinds of nodes that make up the simulated infrastructure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    /// Content-delivery node at the edge of the gateway tier
    Cdn,

    /// Load balancer in the gateway tier
    LoadBalancer,

    /// Cache node in the processing tier
    Cache,

    /// Compute node in the processing tier
    Compute,

    /// Database node in the data tier
    Database,

    /// Composite node containing child nodes
    Cluster,
}

impl NodeType {
    pub fn is_cluster(&self) -> bool {
        matches!(self, NodeType::Cluster)
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeType::Cdn => write!(f, "CDN"),
            NodeType::LoadBalancer => write!(f, "LoadBalancer"),
            NodeType::Cache => write!(f, "Cache"),
            NodeType::Compute => write!(f, "Compute"),
            NodeType::Database => write!(f, "Database"),
            NodeType::Cluster => write!(f, "Cluster"),
        }
    }
}
