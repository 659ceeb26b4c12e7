//! Capability profiles for node types.
//!
//! A [`CapabilityProfile`] is an immutable throughput/cost descriptor. Profiles
//! are produced by a [`CapabilityCatalog`]: an ordered list of pure
//! [`CapabilityLayer`] transforms per node type, applied over a base profile.
//! The catalog is the single source of truth for composition order, so the
//! same node type always yields the same final profile.

use std::collections::HashMap;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::core::NodeType;

/// Immutable throughput/cost descriptor for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityProfile {
    /// Maximum request throughput before the node fails
    pub max_throughput: u64,

    /// Operating cost of the node
    pub cost: u64,
}

impl CapabilityProfile {
    /// The undecorated baseline every composition starts from
    pub const BASE: CapabilityProfile = CapabilityProfile {
        max_throughput: 1000,
        cost: 2500,
    };

    /// Zero-valued profile used as the degraded fallback when normal
    /// construction fails. A zero throughput classifies as failed under
    /// any load.
    pub const fn empty() -> Self {
        CapabilityProfile {
            max_throughput: 0,
            cost: 0,
        }
    }
}

/// How a layer adjusts the wrapped maximum-throughput figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThroughputAdjust {
    /// Multiply the wrapped maximum throughput
    Scale(u64),

    /// Pin the maximum throughput to an absolute value
    Pin(u64),
}

/// One pure transform in a capability composition.
///
/// Layers never fail and have no side effects; cost is always additive,
/// throughput is scaled or pinned depending on the lineage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityLayer {
    pub name: String,
    pub throughput: ThroughputAdjust,
    pub added_cost: u64,
}

impl CapabilityLayer {
    pub fn new(name: impl Into<String>, throughput: ThroughputAdjust, added_cost: u64) -> Self {
        Self {
            name: name.into(),
            throughput,
            added_cost,
        }
    }

    /// Apply this layer to a wrapped profile
    pub fn apply(&self, profile: CapabilityProfile) -> CapabilityProfile {
        let max_throughput = match self.throughput {
            ThroughputAdjust::Scale(factor) => profile.max_throughput.saturating_mul(factor),
            ThroughputAdjust::Pin(value) => value,
        };
        CapabilityProfile {
            max_throughput,
            cost: profile.cost.saturating_add(self.added_cost),
        }
    }

    fn temporary_storage(adjust: ThroughputAdjust) -> Self {
        Self::new("temporary-storage", adjust, 1000)
    }

    fn traffic_distribution(adjust: ThroughputAdjust) -> Self {
        Self::new("traffic-distribution", adjust, 1500)
    }

    fn edge_delivery(adjust: ThroughputAdjust) -> Self {
        Self::new("edge-delivery", adjust, 50_000)
    }

    fn persistent_storage(adjust: ThroughputAdjust) -> Self {
        Self::new("persistent-storage", adjust, 5000)
    }
}

/// Which of the two historical composition tables to use.
///
/// Both lineages assign the same cost increments; they differ in how a layer
/// treats the wrapped throughput (multiplicative vs. absolute).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityLineage {
    /// Multiplicative layers (the canonical lineage)
    #[default]
    Layered,

    /// Absolute-throughput layers
    Fixed,
}

/// Per-type capability composition table.
///
/// Immutable after construction and cheap to clone; `create` is a pure
/// function of the node type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityCatalog {
    base: CapabilityProfile,
    layers: HashMap<NodeType, Vec<CapabilityLayer>>,
}

impl CapabilityCatalog {
    /// The canonical multiplicative lineage
    pub fn layered() -> Self {
        let mut layers = HashMap::new();
        layers.insert(
            NodeType::Cache,
            vec![CapabilityLayer::temporary_storage(ThroughputAdjust::Scale(100))],
        );
        layers.insert(
            NodeType::LoadBalancer,
            vec![CapabilityLayer::traffic_distribution(ThroughputAdjust::Scale(10_000))],
        );
        layers.insert(
            NodeType::Cdn,
            vec![
                CapabilityLayer::temporary_storage(ThroughputAdjust::Scale(100)),
                CapabilityLayer::traffic_distribution(ThroughputAdjust::Scale(10_000)),
                CapabilityLayer::edge_delivery(ThroughputAdjust::Scale(1000)),
            ],
        );
        layers.insert(
            NodeType::Database,
            vec![CapabilityLayer::persistent_storage(ThroughputAdjust::Scale(50))],
        );
        Self {
            base: CapabilityProfile::BASE,
            layers,
        }
    }

    /// The absolute-throughput lineage
    pub fn fixed() -> Self {
        let mut layers = HashMap::new();
        layers.insert(
            NodeType::Cache,
            vec![CapabilityLayer::temporary_storage(ThroughputAdjust::Pin(100))],
        );
        layers.insert(
            NodeType::LoadBalancer,
            vec![CapabilityLayer::traffic_distribution(ThroughputAdjust::Pin(10_000))],
        );
        layers.insert(
            NodeType::Cdn,
            vec![
                CapabilityLayer::temporary_storage(ThroughputAdjust::Pin(100)),
                CapabilityLayer::traffic_distribution(ThroughputAdjust::Pin(10_000)),
                CapabilityLayer::edge_delivery(ThroughputAdjust::Pin(1000)),
            ],
        );
        Self {
            base: CapabilityProfile::BASE,
            layers,
        }
    }

    pub fn for_lineage(lineage: CapabilityLineage) -> Self {
        match lineage {
            CapabilityLineage::Layered => Self::layered(),
            CapabilityLineage::Fixed => Self::fixed(),
        }
    }

    /// Compose the profile for a node type.
    ///
    /// Deterministic: the same type yields the same profile every time.
    pub fn create(&self, node_type: NodeType) -> CapabilityProfile {
        let mut profile = self.base;
        if let Some(layers) = self.layers.get(&node_type) {
            for layer in layers {
                profile = layer.apply(profile);
            }
        }
        profile
    }
}

impl Default for CapabilityCatalog {
    fn default() -> Self {
        Self::layered()
    }
}

lazy_static! {
    static ref DEFAULT_CATALOG: CapabilityCatalog = CapabilityCatalog::layered();
}

/// The shared default (layered) catalog
pub fn default_catalog() -> &'static CapabilityCatalog {
    &DEFAULT_CATALOG
}
