//! Simulation configuration.
//!
//! Everything a deployment might want to vary is plain data here: which
//! capability lineage composes node profiles, which percentage table drives
//! the delivery chain, the user-to-request multiplier, and the load-generator
//! knobs. Either historical lineage can be selected, or a custom table
//! loaded from JSON.

use serde::{Deserialize, Serialize};

use crate::capability::CapabilityLineage;
use crate::core::Result;
use crate::generator::GeneratorConfig;
use crate::routing::RoutingPolicy;

/// Fixed multiplier converting observed users into routed requests
pub const DEFAULT_REQUESTS_PER_USER: u64 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Capability composition table to build node profiles from
    pub lineage: CapabilityLineage,

    /// Percentage table the delivery chain is built from
    pub policy: RoutingPolicy,

    /// Requests fed into the chain per observed user
    pub requests_per_user: u64,

    /// Load-generator pacing
    pub generator: GeneratorConfig,
}

impl SimConfig {
    pub fn new() -> Self {
        Self {
            lineage: CapabilityLineage::Layered,
            policy: RoutingPolicy::canonical(),
            requests_per_user: DEFAULT_REQUESTS_PER_USER,
            generator: GeneratorConfig::default(),
        }
    }

    /// Both alternate historical constant sets at once
    pub fn legacy() -> Self {
        Self {
            lineage: CapabilityLineage::Fixed,
            policy: RoutingPolicy::legacy(),
            ..Self::new()
        }
    }

    pub fn with_lineage(mut self, lineage: CapabilityLineage) -> Self {
        self.lineage = lineage;
        self
    }

    pub fn with_policy(mut self, policy: RoutingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_requests_per_user(mut self, requests_per_user: u64) -> Self {
        self.requests_per_user = requests_per_user;
        self
    }

    pub fn with_generator(mut self, generator: GeneratorConfig) -> Self {
        self.generator = generator;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_select_the_canonical_tables() {
        let config = SimConfig::default();
        assert_eq!(config.lineage, CapabilityLineage::Layered);
        assert_eq!(config.policy, RoutingPolicy::canonical());
        assert_eq!(config.requests_per_user, DEFAULT_REQUESTS_PER_USER);
    }

    #[test]
    fn legacy_preset_selects_the_alternate_tables() {
        let config = SimConfig::legacy();
        assert_eq!(config.lineage, CapabilityLineage::Fixed);
        assert_eq!(config.policy, RoutingPolicy::legacy());
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = SimConfig::legacy().with_requests_per_user(7);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(SimConfig::from_json(&json).unwrap(), config);
    }
}
