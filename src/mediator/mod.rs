//! The topology mediator: sole coordinator of the cluster graph.
//!
//! Owns the three tier clusters, routes every add/remove through the command
//! log, rebuilds membership from the store on construction, and converts
//! observed user counts into routed load through the delivery chain.

use std::sync::Arc;

use log::{debug, error, warn};
use serde::Serialize;

use crate::capability::CapabilityProfile;
use crate::command::{CommandLog, TopologyCommand};
use crate::config::SimConfig;
use crate::core::{NodeId, NodeType, Result};
use crate::health::HealthState;
use crate::routing::{RoutingStage, TierScopes, build_chain};
use crate::store::{NodeRecord, NodeStore};
use crate::topology::{
    CostCalculator, NodeBuilder, NodeFactory, NodeHandle, StatusCalculator, flatten,
};

/// Point-in-time view of one node, for reporting
#[derive(Debug, Clone, Serialize)]
pub struct NodeStatus {
    pub id: NodeId,
    pub node_type: NodeType,
    pub requests: u64,
    pub health: HealthState,
    pub cost: u64,
}

/// Coordinator owning the Gateway, Processors, and Data clusters.
///
/// Construction never fails: a cluster the factory cannot produce is
/// replaced by an empty zero-cost cluster, store failures during bootstrap
/// are logged and treated as "no data", and the mediator is always usable
/// (if degraded) afterwards. Malformed routing tables are the one exception:
/// those are programmer errors and panic up front.
pub struct TopologyMediator {
    gateway: NodeHandle,
    processors: NodeHandle,
    data: NodeHandle,
    factory: Arc<dyn NodeFactory>,
    store: Arc<dyn NodeStore>,
    log: CommandLog,
    config: SimConfig,
}

impl TopologyMediator {
    pub fn new(
        factory: Arc<dyn NodeFactory>,
        store: Arc<dyn NodeStore>,
        config: SimConfig,
    ) -> Self {
        config.policy.validate();

        let gateway = cluster_or_empty(factory.create_gateway_cluster(), "gateway");
        let processors = cluster_or_empty(factory.create_processors_cluster(), "processors");
        let data = cluster_or_empty(factory.create_data_cluster(), "data");

        // The gateway tier always fronts the processing tier.
        if let Err(e) = gateway
            .write()
            .map_err(crate::core::SimError::from)
            .and_then(|mut g| g.add_child(processors.clone()))
        {
            error!("could not attach processors under gateway: {e}");
        }

        let mut mediator = Self {
            gateway,
            processors,
            data,
            factory,
            store,
            log: CommandLog::new(),
            config,
        };
        mediator.persist_clusters();
        mediator.replay();
        mediator
    }

    fn persist_clusters(&self) {
        let clusters = [
            (&self.gateway, None),
            (&self.processors, self.cluster_id(&self.gateway)),
            (&self.data, None),
        ];
        for (handle, parent) in clusters {
            let Some(id) = self.cluster_id(handle) else {
                continue;
            };
            let mut record = NodeRecord::new(id, NodeType::Cluster);
            if let Some(parent_id) = parent {
                record = record.with_parent(parent_id);
            }
            if let Err(e) = self.store.insert(record) {
                warn!("could not persist cluster record '{id}': {e}");
            }
        }
        if let (Some(gateway_id), Some(processors_id)) = (
            self.cluster_id(&self.gateway),
            self.cluster_id(&self.processors),
        ) {
            if let Err(e) = self
                .store
                .add_cluster_relationship(gateway_id, processors_id)
            {
                warn!("could not persist gateway/processors edge: {e}");
            }
        }
    }

    /// Rebuild membership and history from persisted records.
    ///
    /// Cluster records are skipped: the tier clusters are re-created fresh
    /// each boot, so membership is routed by node type, the deterministic
    /// mirror of how the edges were recorded. A `parent_id` matching a live
    /// cluster is honored directly. Nodes are attached straight to their
    /// cluster (the store already holds them) and the commands are seeded
    /// into the log without re-running, leaving the whole history undoable.
    fn replay(&mut self) {
        let records = match self.store.get_all() {
            Ok(records) => records,
            Err(e) => {
                warn!("could not load persisted topology, starting empty: {e}");
                return;
            }
        };

        let mut commands = Vec::new();
        for record in records {
            if record.node_type.is_cluster() {
                continue;
            }
            let node = match self.factory.restore(record.id, record.node_type) {
                Ok(node) => node,
                Err(e) => {
                    error!("could not restore node '{}', skipping: {e}", record.id);
                    continue;
                }
            };
            let cluster = self.cluster_for_record(&record);
            if let Err(e) = cluster
                .write()
                .map_err(crate::core::SimError::from)
                .and_then(|mut c| c.add_child(node.clone()))
            {
                error!("could not attach replayed node '{}': {e}", record.id);
                continue;
            }
            commands.push(TopologyCommand::add(node, cluster, self.store.clone()));
        }
        if !commands.is_empty() {
            debug!("replayed {} persisted mutations", commands.len());
        }
        self.log.load_commands(commands);
    }

    fn cluster_id(&self, handle: &NodeHandle) -> Option<NodeId> {
        handle.read().map(|c| c.id()).ok()
    }

    fn cluster_for_record(&self, record: &NodeRecord) -> NodeHandle {
        if let Some(parent_id) = record.parent_id {
            for cluster in [&self.gateway, &self.processors, &self.data] {
                if self.cluster_id(cluster) == Some(parent_id) {
                    return cluster.clone();
                }
            }
        }
        self.cluster_for_type(record.node_type)
    }

    fn cluster_for_type(&self, node_type: NodeType) -> NodeHandle {
        match node_type {
            NodeType::Cdn | NodeType::LoadBalancer => self.gateway.clone(),
            NodeType::Cache | NodeType::Compute => self.processors.clone(),
            NodeType::Database | NodeType::Cluster => self.data.clone(),
        }
    }

    pub fn gateway(&self) -> &NodeHandle {
        &self.gateway
    }

    pub fn processors(&self) -> &NodeHandle {
        &self.processors
    }

    pub fn data(&self) -> &NodeHandle {
        &self.data
    }

    /// Add a server to the cluster its type belongs in, through the log
    pub fn add_server(&mut self, node: NodeHandle) -> Result<()> {
        let node_type = node.read()?.node_type();
        if node_type.is_cluster() {
            debug!("ignoring attempt to add a bare cluster to the topology");
            return Ok(());
        }
        let cluster = self.cluster_for_type(node_type);
        self.log
            .execute(TopologyCommand::add(node, cluster, self.store.clone()))
    }

    /// Remove a server from the cluster its type belongs in, through the log
    pub fn remove_server(&mut self, node: NodeHandle) -> Result<()> {
        let node_type = node.read()?.node_type();
        if node_type.is_cluster() {
            debug!("ignoring attempt to remove a bare cluster from the topology");
            return Ok(());
        }
        let cluster = self.cluster_for_type(node_type);
        self.log
            .execute(TopologyCommand::remove(node, cluster, self.store.clone()))
    }

    pub fn undo(&mut self) -> Result<()> {
        self.log.undo()
    }

    pub fn redo(&mut self) -> Result<()> {
        self.log.redo()
    }

    pub fn has_undo(&self) -> bool {
        self.log.has_undo()
    }

    pub fn has_redo(&self) -> bool {
        self.log.has_redo()
    }

    fn reachable(&self) -> Result<Vec<NodeHandle>> {
        // Processors lives under Gateway; Data is a sibling root.
        let mut nodes = flatten(&self.gateway)?;
        nodes.extend(flatten(&self.data)?);
        Ok(nodes)
    }

    /// Sum of every reachable node's capability cost, clusters included
    pub fn total_cost(&self) -> u64 {
        let mut costs = CostCalculator::new();
        match self.reachable() {
            Ok(nodes) => {
                for handle in nodes {
                    match handle.read() {
                        Ok(node) => node.accept(&mut costs),
                        Err(e) => warn!("skipping unreadable node in cost walk: {e}"),
                    }
                }
            }
            Err(e) => warn!("cost walk failed, reporting partial total: {e}"),
        }
        costs.total_cost()
    }

    /// Logical AND of every reachable node's validator verdict.
    ///
    /// Never panics or errors; an uninspectable topology reports `false`.
    pub fn is_ok(&self) -> bool {
        let Ok(nodes) = self.reachable() else {
            return false;
        };
        let mut status = StatusCalculator::new();
        for handle in nodes {
            match handle.read() {
                Ok(node) => node.accept(&mut status),
                Err(_) => return false,
            }
        }
        status.is_ok()
    }

    /// Observer entry point: convert a user count into routed request load
    pub fn update(&mut self, user_count: u64) {
        let requests = user_count.saturating_mul(self.config.requests_per_user);
        debug!("routing {requests} requests for {user_count} users");
        self.route(requests);
    }

    fn route(&mut self, total: u64) {
        // The mediator is the tier clusters' parent: their own request
        // counts are set here, not summed from children.
        for cluster in [&self.gateway, &self.processors, &self.data] {
            match cluster.write() {
                Ok(mut node) => node.handle_requests(total),
                Err(e) => warn!("could not update tier load: {e}"),
            }
        }
        if let Some(chain) = self.delivery_chain() {
            chain.deliver_requests(total);
        }
    }

    /// Build the delivery chain over snapshots of the current members
    pub fn delivery_chain(&self) -> Option<RoutingStage> {
        let scopes = TierScopes {
            gateway: self.tier_members(&self.gateway),
            processors: self.tier_members(&self.processors),
            data: self.tier_members(&self.data),
        };
        build_chain(&self.config.policy, &scopes)
    }

    fn tier_members(&self, cluster: &NodeHandle) -> Vec<NodeHandle> {
        match cluster.read() {
            Ok(node) => node.children().to_vec(),
            Err(e) => {
                warn!("could not snapshot tier members: {e}");
                Vec::new()
            }
        }
    }

    /// Point-in-time report over every reachable node
    pub fn node_statuses(&self) -> Vec<NodeStatus> {
        let Ok(nodes) = self.reachable() else {
            return Vec::new();
        };
        nodes
            .iter()
            .filter_map(|handle| handle.read().ok())
            .map(|node| NodeStatus {
                id: node.id(),
                node_type: node.node_type(),
                requests: node.requests(),
                health: node.health(),
                cost: node.capability().cost,
            })
            .collect()
    }
}

fn cluster_or_empty(result: Result<NodeHandle>, label: &str) -> NodeHandle {
    match result {
        Ok(handle) => handle,
        Err(e) => {
            error!("could not create {label} cluster, falling back to an empty one: {e}");
            NodeBuilder::new()
                .with_type(NodeType::Cluster)
                .with_capability(CapabilityProfile::empty())
                .build_handle()
        }
    }
}
