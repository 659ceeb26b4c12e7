//! One-import surface for building and driving a simulation.
//!
//! Intended usage in app code: build a [`crate::SimConfig`], wire a store
//! and factory into a [`crate::TopologyMediator`], add servers, then either
//! call `update` directly or let a [`crate::LoadGenerator`] drive it.

pub use crate::capability::{CapabilityCatalog, CapabilityLineage, CapabilityProfile};
pub use crate::config::SimConfig;
pub use crate::core::{NodeId, NodeType, Result, SimError};
pub use crate::generator::{GeneratorConfig, LoadGenerator};
pub use crate::health::HealthState;
pub use crate::mediator::TopologyMediator;
pub use crate::routing::RoutingPolicy;
pub use crate::store::{FileNodeStore, MemoryNodeStore, NodeStore};
pub use crate::topology::{CatalogNodeFactory, NodeFactory, NodeHandle};
