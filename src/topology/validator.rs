use crate::core::NodeType;

use super::node::Node;

/// Topology validity check attached to a node.
///
/// Cluster validators assert required member types; the leaf validator
/// asserts the node has not failed under load. Validation never errors: a
/// node whose children cannot be inspected simply fails the check.
pub trait ValidatorStrategy: Send + Sync + std::fmt::Debug {
    fn validate(&self, node: &Node) -> bool;
}

fn has_member(node: &Node, node_type: NodeType) -> bool {
    node.children().iter().any(|child| {
        child
            .read()
            .map(|c| c.node_type() == node_type)
            .unwrap_or(false)
    })
}

/// The gateway tier requires an edge node and a load balancer
#[derive(Debug)]
pub struct GatewayValidator;

impl ValidatorStrategy for GatewayValidator {
    fn validate(&self, node: &Node) -> bool {
        node.is_cluster()
            && has_member(node, NodeType::Cdn)
            && has_member(node, NodeType::LoadBalancer)
    }
}

/// The processing tier requires a cache node and a compute node
#[derive(Debug)]
pub struct ProcessorsValidator;

impl ValidatorStrategy for ProcessorsValidator {
    fn validate(&self, node: &Node) -> bool {
        node.is_cluster()
            && has_member(node, NodeType::Cache)
            && has_member(node, NodeType::Compute)
    }
}

/// The data tier requires a database node
#[derive(Debug)]
pub struct DataValidator;

impl ValidatorStrategy for DataValidator {
    fn validate(&self, node: &Node) -> bool {
        node.is_cluster() && has_member(node, NodeType::Database)
    }
}

/// A leaf server is valid while it has not failed under load
#[derive(Debug)]
pub struct ServerValidator;

impl ValidatorStrategy for ServerValidator {
    fn validate(&self, node: &Node) -> bool {
        !node.health().is_failed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::NodeBuilder;

    fn cluster_with(types: &[NodeType]) -> Node {
        let mut cluster = NodeBuilder::new().with_type(NodeType::Cluster).build();
        for t in types {
            let child = NodeBuilder::new().with_type(*t).build_handle();
            cluster.add_child(child).unwrap();
        }
        cluster
    }

    #[test]
    fn gateway_requires_cdn_and_load_balancer() {
        assert!(!GatewayValidator.validate(&cluster_with(&[NodeType::Cdn])));
        assert!(!GatewayValidator.validate(&cluster_with(&[NodeType::LoadBalancer])));
        assert!(GatewayValidator.validate(&cluster_with(&[NodeType::Cdn, NodeType::LoadBalancer])));
    }

    #[test]
    fn processors_require_cache_and_compute() {
        assert!(!ProcessorsValidator.validate(&cluster_with(&[NodeType::Cache])));
        assert!(
            ProcessorsValidator.validate(&cluster_with(&[NodeType::Cache, NodeType::Compute]))
        );
    }

    #[test]
    fn data_requires_a_database() {
        assert!(!DataValidator.validate(&cluster_with(&[])));
        assert!(DataValidator.validate(&cluster_with(&[NodeType::Database])));
    }

    #[test]
    fn validators_reject_leaf_nodes() {
        let leaf = NodeBuilder::new().with_type(NodeType::Cdn).build();
        assert!(!GatewayValidator.validate(&leaf));
        assert!(!DataValidator.validate(&leaf));
    }

    #[test]
    fn server_validator_tracks_failure() {
        let mut node = NodeBuilder::new().with_type(NodeType::Compute).build();
        assert!(ServerValidator.validate(&node));
        node.handle_requests(1000);
        assert!(!ServerValidator.validate(&node));
        node.handle_requests(10);
        assert!(ServerValidator.validate(&node));
    }
}
