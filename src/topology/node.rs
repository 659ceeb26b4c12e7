use std::sync::{Arc, RwLock};

use crate::capability::CapabilityProfile;
use crate::core::{NodeId, NodeType, Result};
use crate::health::HealthState;

use super::validator::ValidatorStrategy;
use super::visitor::NodeVisitor;

/// Shared handle to a node.
///
/// The core is single-owner and synchronous; the lock exists so the async
/// load generator and topology mutations can share nodes without observing a
/// half-updated cluster. Poisoning maps to [`crate::core::SimError::Lock`].
pub type NodeHandle = Arc<RwLock<Node>>;

/// Variant payload distinguishing leaf servers from composite clusters
#[derive(Debug, Default)]
pub enum NodeKind {
    #[default]
    Server,
    Cluster {
        children: Vec<NodeHandle>,
    },
}

/// A unit of the simulated topology: leaf server or composite cluster.
///
/// Writing the request count is the sole trigger for health re-evaluation.
/// A cluster's own request count is set directly by its parent in the routing
/// chain; it never sums its children.
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    node_type: NodeType,
    capability: CapabilityProfile,
    requests: u64,
    health: HealthState,
    validator: Option<Arc<dyn ValidatorStrategy>>,
    kind: NodeKind,
}

impl Node {
    pub(crate) fn new(
        id: NodeId,
        node_type: NodeType,
        capability: CapabilityProfile,
        validator: Option<Arc<dyn ValidatorStrategy>>,
    ) -> Self {
        let kind = if node_type.is_cluster() {
            NodeKind::Cluster { children: Vec::new() }
        } else {
            NodeKind::Server
        };
        Self {
            id,
            node_type,
            capability,
            requests: 0,
            health: HealthState::Idle,
            validator,
            kind,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn capability(&self) -> CapabilityProfile {
        self.capability
    }

    pub fn requests(&self) -> u64 {
        self.requests
    }

    pub fn health(&self) -> HealthState {
        self.health
    }

    pub fn validator(&self) -> Option<&Arc<dyn ValidatorStrategy>> {
        self.validator.as_ref()
    }

    pub fn set_validator(&mut self, validator: Arc<dyn ValidatorStrategy>) {
        self.validator = Some(validator);
    }

    pub fn is_cluster(&self) -> bool {
        matches!(self.kind, NodeKind::Cluster { .. })
    }

    /// Assign a request count and re-derive the health bucket
    pub fn handle_requests(&mut self, requests: u64) {
        self.requests = requests;
        self.health = HealthState::classify(self.requests, self.capability.max_throughput);
    }

    /// Child nodes; empty for leaf servers
    pub fn children(&self) -> &[NodeHandle] {
        match &self.kind {
            NodeKind::Server => &[],
            NodeKind::Cluster { children } => children,
        }
    }

    pub fn has_child(&self, id: NodeId) -> Result<bool> {
        for child in self.children() {
            if child.read()?.id() == id {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Append a child, keeping children unique by id.
    ///
    /// Returns `false` when a child with the same id is already present,
    /// which makes re-applying a recorded mutation safe.
    pub fn add_child(&mut self, child: NodeHandle) -> Result<bool> {
        let child_id = child.read()?.id();
        if self.has_child(child_id)? {
            return Ok(false);
        }
        match &mut self.kind {
            NodeKind::Server => Err(crate::core::SimError::NotACluster(self.id)),
            NodeKind::Cluster { children } => {
                children.push(child);
                Ok(true)
            }
        }
    }

    /// Remove a child by id; absent children are a no-op.
    pub fn remove_child(&mut self, id: NodeId) -> Result<bool> {
        let NodeKind::Cluster { children } = &mut self.kind else {
            return Err(crate::core::SimError::NotACluster(self.id));
        };
        let mut index = None;
        for (i, child) in children.iter().enumerate() {
            if child.read()?.id() == id {
                index = Some(i);
                break;
            }
        }
        match index {
            Some(i) => {
                children.remove(i);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn accept(&self, visitor: &mut dyn NodeVisitor) {
        visitor.visit(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::NodeBuilder;

    #[test]
    fn handle_requests_redrives_health() {
        let mut node = NodeBuilder::new().with_type(NodeType::Compute).build();
        assert_eq!(node.health(), HealthState::Idle);

        node.handle_requests(500);
        assert_eq!(node.health(), HealthState::Normal);

        node.handle_requests(1000);
        assert_eq!(node.health(), HealthState::Failed);

        node.handle_requests(0);
        assert_eq!(node.health(), HealthState::Idle);
    }

    #[test]
    fn add_child_is_unique_by_id() {
        let cluster = NodeBuilder::new().with_type(NodeType::Cluster).build_handle();
        let child = NodeBuilder::new().with_type(NodeType::Cache).build_handle();

        assert!(cluster.write().unwrap().add_child(child.clone()).unwrap());
        assert!(!cluster.write().unwrap().add_child(child.clone()).unwrap());
        assert_eq!(cluster.read().unwrap().children().len(), 1);
    }

    #[test]
    fn remove_child_tolerates_absent_ids() {
        let cluster = NodeBuilder::new().with_type(NodeType::Cluster).build_handle();
        let child = NodeBuilder::new().with_type(NodeType::Cache).build_handle();
        let child_id = child.read().unwrap().id();

        assert!(!cluster.write().unwrap().remove_child(child_id).unwrap());
        cluster.write().unwrap().add_child(child).unwrap();
        assert!(cluster.write().unwrap().remove_child(child_id).unwrap());
        assert!(cluster.read().unwrap().children().is_empty());
    }

    #[test]
    fn leaf_nodes_reject_children() {
        let mut leaf = NodeBuilder::new().with_type(NodeType::Compute).build();
        let child = NodeBuilder::new().with_type(NodeType::Cache).build_handle();
        assert!(leaf.add_child(child).is_err());
    }
}
