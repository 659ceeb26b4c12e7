use serde::{Deserialize, Serialize};

use crate::core::{NodeType, Result};

/// Which tier's member list a stage draws its targets from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Gateway,
    Processors,
    Data,
}

/// One stage of the delivery pipeline: claim `share` of the incoming count
/// for nodes of `target` type within `tier`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagePolicy {
    pub name: String,
    pub tier: Tier,
    pub target: NodeType,
    pub share: f64,
}

impl StagePolicy {
    pub fn new(name: impl Into<String>, tier: Tier, target: NodeType, share: f64) -> Self {
        Self {
            name: name.into(),
            tier,
            target,
            share,
        }
    }
}

/// Ordered percentage-policy table the delivery chain is built from.
///
/// Two presets exist, mirroring the two historical constant sets; both are
/// plain data and either can be selected (or a custom table loaded from
/// JSON) without code changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingPolicy {
    pub stages: Vec<StagePolicy>,
}

impl RoutingPolicy {
    /// The canonical table: edge 70%, then full rollover through the load
    /// balancers, cache 80% of what reaches the processing tier, and the
    /// database stage as the terminal sink.
    pub fn canonical() -> Self {
        Self {
            stages: vec![
                StagePolicy::new("edge", Tier::Gateway, NodeType::Cdn, 0.70),
                StagePolicy::new("load-balancer", Tier::Gateway, NodeType::LoadBalancer, 1.00),
                StagePolicy::new("cache", Tier::Processors, NodeType::Cache, 0.80),
                StagePolicy::new("compute", Tier::Processors, NodeType::Compute, 1.00),
                StagePolicy::new("database", Tier::Data, NodeType::Database, 1.00),
            ],
        }
    }

    /// The alternate historical constants (cache 50%, database 30%)
    pub fn legacy() -> Self {
        Self {
            stages: vec![
                StagePolicy::new("edge", Tier::Gateway, NodeType::Cdn, 0.70),
                StagePolicy::new("load-balancer", Tier::Gateway, NodeType::LoadBalancer, 1.00),
                StagePolicy::new("cache", Tier::Processors, NodeType::Cache, 0.50),
                StagePolicy::new("compute", Tier::Processors, NodeType::Compute, 1.00),
                StagePolicy::new("database", Tier::Data, NodeType::Database, 0.30),
            ],
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Panic on tables no chain can be built from.
    ///
    /// A malformed table is a programmer error, not a runtime condition:
    /// shares must lie in `[0, 1]` and a stage cannot target the cluster
    /// type. With remainder forwarding, in-range shares keep the cumulative
    /// claim within the original total.
    pub fn validate(&self) {
        assert!(
            !self.stages.is_empty(),
            "routing policy must declare at least one stage"
        );
        for stage in &self.stages {
            assert!(
                stage.share.is_finite() && (0.0..=1.0).contains(&stage.share),
                "stage '{}' has share {} outside [0, 1]",
                stage.name,
                stage.share
            );
            assert!(
                !stage.target.is_cluster(),
                "stage '{}' cannot target the cluster type",
                stage.name
            );
        }
    }
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        Self::canonical()
    }
}
