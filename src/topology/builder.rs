use std::sync::{Arc, RwLock};

use crate::capability::CapabilityProfile;
use crate::core::{NodeId, NodeType};

use super::node::{Node, NodeHandle};
use super::validator::ValidatorStrategy;

/// Step-by-step node construction.
///
/// Defaults: fresh id, `Compute` type, the base capability, no validator.
/// Replay supplies an explicit id so a restored node keeps its persisted
/// identity.
pub struct NodeBuilder {
    id: Option<NodeId>,
    node_type: NodeType,
    capability: CapabilityProfile,
    validator: Option<Arc<dyn ValidatorStrategy>>,
}

impl NodeBuilder {
    pub fn new() -> Self {
        Self {
            id: None,
            node_type: NodeType::Compute,
            capability: CapabilityProfile::BASE,
            validator: None,
        }
    }

    pub fn with_id(mut self, id: NodeId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_type(mut self, node_type: NodeType) -> Self {
        self.node_type = node_type;
        self
    }

    pub fn with_capability(mut self, capability: CapabilityProfile) -> Self {
        self.capability = capability;
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn ValidatorStrategy>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn build(self) -> Node {
        Node::new(
            self.id.unwrap_or_default(),
            self.node_type,
            self.capability,
            self.validator,
        )
    }

    pub fn build_handle(self) -> NodeHandle {
        Arc::new(RwLock::new(self.build()))
    }
}

impl Default for NodeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
