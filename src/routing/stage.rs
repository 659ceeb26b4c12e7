use log::{debug, warn};

use crate::core::{NodeType, Result};
use crate::topology::NodeHandle;

use super::policy::{RoutingPolicy, Tier};

/// Member-list snapshots the chain is built over, one per tier
#[derive(Debug, Clone, Default)]
pub struct TierScopes {
    pub gateway: Vec<NodeHandle>,
    pub processors: Vec<NodeHandle>,
    pub data: Vec<NodeHandle>,
}

impl TierScopes {
    fn scope(&self, tier: Tier) -> &[NodeHandle] {
        match tier {
            Tier::Gateway => &self.gateway,
            Tier::Processors => &self.processors,
            Tier::Data => &self.data,
        }
    }
}

/// One link of the delivery chain.
///
/// Stateless between invocations apart from the `next` pointer; the chain is
/// a singly linked, acyclic list fixed when it is built.
pub struct RoutingStage {
    name: String,
    share: f64,
    target: NodeType,
    scope: Vec<NodeHandle>,
    next: Option<Box<RoutingStage>>,
}

impl RoutingStage {
    /// Build a single stage. Panics on a share outside `[0, 1]`; that is a
    /// construction-time programmer error, not a runtime condition.
    pub fn new(
        name: impl Into<String>,
        share: f64,
        target: NodeType,
        scope: Vec<NodeHandle>,
    ) -> Self {
        let name = name.into();
        assert!(
            share.is_finite() && (0.0..=1.0).contains(&share),
            "stage '{}' has share {} outside [0, 1]",
            name,
            share
        );
        Self {
            name,
            share,
            target,
            scope,
            next: None,
        }
    }

    /// Append a stage at the tail of the chain
    pub fn then(mut self, next: RoutingStage) -> Self {
        self.next = Some(Box::new(match self.next.take() {
            Some(tail) => (*tail).then(next),
            None => next,
        }));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apportion `total` requests through this stage and its successors.
    ///
    /// Claims `floor(total * share)`, splits it exactly across matching
    /// nodes (difference between any two assignments is at most 1), and
    /// forwards the remainder. An empty target list rolls the claim forward
    /// untouched; a stage that errors mid-distribution forwards the original
    /// total rather than losing it. The terminal stage drops its leftover.
    pub fn deliver_requests(&self, total: u64) {
        let forwarded = match self.distribute(total) {
            Ok(remainder) => remainder,
            Err(e) => {
                warn!(
                    "stage '{}' failed while distributing: {}; forwarding {} untouched",
                    self.name, e, total
                );
                total
            }
        };
        match &self.next {
            Some(next) => next.deliver_requests(forwarded),
            None => {
                if forwarded > 0 {
                    debug!(
                        "terminal stage '{}' dropped {} undeliverable requests",
                        self.name, forwarded
                    );
                }
            }
        }
    }

    /// Returns the remainder to forward to the next stage
    fn distribute(&self, total: u64) -> Result<u64> {
        let claimed = (total as f64 * self.share).floor() as u64;

        let mut targets = Vec::new();
        for handle in &self.scope {
            if handle.read()?.node_type() == self.target {
                targets.push(handle.clone());
            }
        }
        if targets.is_empty() {
            // Nothing to deliver to: the claim rolls over to the next stage.
            return Ok(total);
        }

        let count = targets.len() as u64;
        let per_node = claimed / count;
        let extra = (claimed % count) as usize;
        let mut distributed = 0u64;
        for (i, handle) in targets.iter().enumerate() {
            let assigned = per_node + u64::from(i < extra);
            handle.write()?.handle_requests(assigned);
            distributed += assigned;
        }
        debug_assert_eq!(distributed, claimed);

        Ok(total - distributed)
    }
}

/// Build the delivery chain described by `policy` over the given scopes.
///
/// Validates the policy first (panicking on malformed tables) and returns
/// `None` only for a table with no stages after validation, which cannot
/// happen with the shipped presets.
pub fn build_chain(policy: &RoutingPolicy, scopes: &TierScopes) -> Option<RoutingStage> {
    policy.validate();
    let mut chain: Option<RoutingStage> = None;
    for stage in policy.stages.iter().rev() {
        let mut link = RoutingStage::new(
            stage.name.clone(),
            stage.share,
            stage.target,
            scopes.scope(stage.tier).to_vec(),
        );
        link.next = chain.take().map(Box::new);
        chain = Some(link);
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::NodeBuilder;
    use pretty_assertions::assert_eq;

    fn nodes_of(types: &[NodeType]) -> Vec<NodeHandle> {
        types
            .iter()
            .map(|t| NodeBuilder::new().with_type(*t).build_handle())
            .collect()
    }

    fn requests(handle: &NodeHandle) -> u64 {
        handle.read().unwrap().requests()
    }

    #[test]
    fn edge_then_load_balancer_splits_70_30() {
        let scope = nodes_of(&[NodeType::Cdn, NodeType::LoadBalancer]);
        let chain = RoutingStage::new("edge", 0.70, NodeType::Cdn, scope.clone()).then(
            RoutingStage::new("load-balancer", 1.0, NodeType::LoadBalancer, scope.clone()),
        );

        chain.deliver_requests(100);
        assert_eq!(requests(&scope[0]), 70);
        assert_eq!(requests(&scope[1]), 30);
    }

    #[test]
    fn claimed_share_splits_evenly_across_targets() {
        let scope = nodes_of(&[NodeType::Cdn, NodeType::Cdn, NodeType::LoadBalancer]);
        let chain = RoutingStage::new("edge", 0.70, NodeType::Cdn, scope.clone()).then(
            RoutingStage::new("load-balancer", 1.0, NodeType::LoadBalancer, scope.clone()),
        );

        chain.deliver_requests(100);
        assert_eq!(requests(&scope[0]), 35);
        assert_eq!(requests(&scope[1]), 35);
        assert_eq!(requests(&scope[2]), 30);
    }

    #[test]
    fn unclaimed_share_rolls_over_when_no_targets_match() {
        let scope = nodes_of(&[NodeType::LoadBalancer]);
        let chain = RoutingStage::new("edge", 0.70, NodeType::Cdn, scope.clone()).then(
            RoutingStage::new("load-balancer", 1.0, NodeType::LoadBalancer, scope.clone()),
        );

        chain.deliver_requests(100);
        assert_eq!(requests(&scope[0]), 100);
    }

    #[test]
    fn remainder_assignment_is_deterministic_by_index() {
        let scope = nodes_of(&[NodeType::Cache, NodeType::Cache, NodeType::Cache]);
        let stage = RoutingStage::new("cache", 1.0, NodeType::Cache, scope.clone());

        stage.deliver_requests(10);
        // 10 across 3: the first `10 % 3` targets get one extra
        assert_eq!(requests(&scope[0]), 4);
        assert_eq!(requests(&scope[1]), 3);
        assert_eq!(requests(&scope[2]), 3);
    }

    #[test]
    fn distribution_sums_to_the_claimed_share_exactly() {
        for total in [0u64, 1, 7, 99, 100, 1001, 123_457] {
            for node_count in 1..=7usize {
                let scope = nodes_of(&vec![NodeType::Compute; node_count]);
                let stage = RoutingStage::new("compute", 0.70, NodeType::Compute, scope.clone());
                stage.deliver_requests(total);

                let claimed = (total as f64 * 0.70).floor() as u64;
                let assigned: Vec<u64> = scope.iter().map(requests).collect();
                assert_eq!(assigned.iter().sum::<u64>(), claimed);

                let max = assigned.iter().max().unwrap();
                let min = assigned.iter().min().unwrap();
                assert!(max - min <= 1);
            }
        }
    }

    #[test]
    fn chain_conserves_requests() {
        // distributed at every stage plus the terminal drop equals the total
        let gateway = nodes_of(&[NodeType::Cdn, NodeType::LoadBalancer]);
        let processors = nodes_of(&[NodeType::Cache, NodeType::Cache]);
        let chain = RoutingStage::new("edge", 0.70, NodeType::Cdn, gateway.clone())
            .then(RoutingStage::new("cache", 0.80, NodeType::Cache, processors.clone()))
            .then(RoutingStage::new("load-balancer", 0.50, NodeType::LoadBalancer, gateway.clone()));

        let total = 1000;
        chain.deliver_requests(total);

        // edge claims 700; cache claims floor(300 * 0.8) = 240 split 120/120;
        // load-balancer claims floor(60 * 0.5) = 30; terminal drops 30.
        assert_eq!(requests(&gateway[0]), 700);
        assert_eq!(requests(&processors[0]), 120);
        assert_eq!(requests(&processors[1]), 120);
        assert_eq!(requests(&gateway[1]), 30);

        let delivered: u64 = gateway.iter().chain(processors.iter()).map(requests).sum();
        let dropped_at_sink = 30;
        assert_eq!(delivered + dropped_at_sink, total);
    }

    #[test]
    fn zero_total_is_distributed_as_zero() {
        let scope = nodes_of(&[NodeType::Cache]);
        let stage = RoutingStage::new("cache", 0.80, NodeType::Cache, scope.clone());
        stage.deliver_requests(0);
        assert_eq!(requests(&scope[0]), 0);
        assert!(scope[0].read().unwrap().health().is_idle());
    }

    #[test]
    #[should_panic(expected = "outside [0, 1]")]
    fn negative_share_panics_at_construction() {
        RoutingStage::new("bad", -0.1, NodeType::Cdn, Vec::new());
    }

    #[test]
    fn failing_stage_forwards_the_original_total() {
        let poisoned = NodeBuilder::new().with_type(NodeType::Cdn).build_handle();
        let clone = poisoned.clone();
        std::thread::spawn(move || {
            let _guard = clone.write().unwrap();
            panic!("poison the edge node");
        })
        .join()
        .ok();

        let lb = NodeBuilder::new()
            .with_type(NodeType::LoadBalancer)
            .build_handle();
        let chain = RoutingStage::new("edge", 0.70, NodeType::Cdn, vec![poisoned]).then(
            RoutingStage::new("load-balancer", 1.0, NodeType::LoadBalancer, vec![lb.clone()]),
        );

        // the edge stage cannot even enumerate its scope; the untouched
        // total must reach the next stage
        chain.deliver_requests(100);
        assert_eq!(requests(&lb), 100);
    }

    #[test]
    fn build_chain_orders_stages_like_the_policy() {
        let policy = RoutingPolicy::canonical();
        let scopes = TierScopes::default();
        let chain = build_chain(&policy, &scopes).unwrap();
        assert_eq!(chain.name(), "edge");
    }
}
