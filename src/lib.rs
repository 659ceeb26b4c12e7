// ============================================================================
// TierSim Library
// ============================================================================

pub mod capability;
pub mod command;
pub mod config;
pub mod core;
pub mod generator;
pub mod health;
pub mod mediator;
pub mod prelude;
pub mod routing;
pub mod store;
pub mod topology;

// Re-export main types for convenience
pub use capability::{CapabilityCatalog, CapabilityLineage, CapabilityProfile};
pub use command::{CommandAction, CommandLog, TopologyCommand};
pub use config::SimConfig;
pub use self::core::{NodeId, NodeType, Result, SimError};
pub use generator::{GeneratorConfig, GeneratorHandle, LoadGenerator};
pub use health::HealthState;
pub use mediator::{NodeStatus, TopologyMediator};
pub use routing::{RoutingPolicy, RoutingStage};
pub use store::{FileNodeStore, MemoryNodeStore, NodeRecord, NodeStore};
pub use topology::{CatalogNodeFactory, NodeBuilder, NodeFactory, NodeHandle};
