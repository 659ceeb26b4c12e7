use std::sync::Arc;

use crate::capability::{CapabilityCatalog, CapabilityLineage};
use crate::core::{NodeId, NodeType, Result};

use super::builder::NodeBuilder;
use super::node::NodeHandle;
use super::validator::{DataValidator, GatewayValidator, ProcessorsValidator, ServerValidator};

/// Node construction port.
///
/// The mediator and the replay path only create nodes through this trait, so
/// tests can substitute a failing factory to exercise the degraded
/// construction paths.
pub trait NodeFactory: Send + Sync {
    /// Create a node of the given type with a fresh id
    fn create(&self, node_type: NodeType) -> Result<NodeHandle>;

    /// Re-create a node under its persisted id
    fn restore(&self, id: NodeId, node_type: NodeType) -> Result<NodeHandle>;

    fn create_compute(&self) -> Result<NodeHandle> {
        self.create(NodeType::Compute)
    }

    fn create_cdn(&self) -> Result<NodeHandle> {
        self.create(NodeType::Cdn)
    }

    fn create_load_balancer(&self) -> Result<NodeHandle> {
        self.create(NodeType::LoadBalancer)
    }

    fn create_cache(&self) -> Result<NodeHandle> {
        self.create(NodeType::Cache)
    }

    fn create_database(&self) -> Result<NodeHandle> {
        self.create(NodeType::Database)
    }

    /// Plain composite with no membership requirements
    fn create_cluster(&self) -> Result<NodeHandle> {
        self.create(NodeType::Cluster)
    }

    fn create_gateway_cluster(&self) -> Result<NodeHandle>;

    fn create_processors_cluster(&self) -> Result<NodeHandle>;

    fn create_data_cluster(&self) -> Result<NodeHandle>;
}

/// Factory backed by a capability catalog.
///
/// Leaf servers get the leaf health validator; tier clusters get their
/// membership validators. Capability assignment happens here and only here,
/// so a node type always carries the catalog's composed profile.
pub struct CatalogNodeFactory {
    catalog: CapabilityCatalog,
}

impl CatalogNodeFactory {
    pub fn new(catalog: CapabilityCatalog) -> Self {
        Self { catalog }
    }

    pub fn for_lineage(lineage: CapabilityLineage) -> Self {
        Self::new(CapabilityCatalog::for_lineage(lineage))
    }

    fn builder(&self, node_type: NodeType) -> NodeBuilder {
        let builder = NodeBuilder::new()
            .with_type(node_type)
            .with_capability(self.catalog.create(node_type));
        if node_type.is_cluster() {
            builder
        } else {
            builder.with_validator(Arc::new(ServerValidator))
        }
    }
}

impl Default for CatalogNodeFactory {
    fn default() -> Self {
        Self::new(crate::capability::default_catalog().clone())
    }
}

impl NodeFactory for CatalogNodeFactory {
    fn create(&self, node_type: NodeType) -> Result<NodeHandle> {
        Ok(self.builder(node_type).build_handle())
    }

    fn restore(&self, id: NodeId, node_type: NodeType) -> Result<NodeHandle> {
        Ok(self.builder(node_type).with_id(id).build_handle())
    }

    fn create_gateway_cluster(&self) -> Result<NodeHandle> {
        Ok(self
            .builder(NodeType::Cluster)
            .with_validator(Arc::new(GatewayValidator))
            .build_handle())
    }

    fn create_processors_cluster(&self) -> Result<NodeHandle> {
        Ok(self
            .builder(NodeType::Cluster)
            .with_validator(Arc::new(ProcessorsValidator))
            .build_handle())
    }

    fn create_data_cluster(&self) -> Result<NodeHandle> {
        Ok(self
            .builder(NodeType::Cluster)
            .with_validator(Arc::new(DataValidator))
            .build_handle())
    }
}
