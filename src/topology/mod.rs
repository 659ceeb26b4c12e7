//! The cluster graph: nodes, composite clusters, and the seams that walk them.
//!
//! A [`Node`] is a single tagged-variant type: leaf servers and composite
//! clusters share one struct, with the children list only meaningful for the
//! cluster variant. Trait dispatch is kept to the genuinely polymorphic
//! operations: validation strategies and visitors.

pub mod builder;
pub mod factory;
pub mod iterator;
pub mod node;
pub mod validator;
pub mod visitor;

pub use builder::NodeBuilder;
pub use factory::{CatalogNodeFactory, NodeFactory};
pub use iterator::flatten;
pub use node::{Node, NodeHandle, NodeKind};
pub use validator::{
    DataValidator, GatewayValidator, ProcessorsValidator, ServerValidator, ValidatorStrategy,
};
pub use visitor::{CostCalculator, NodeVisitor, StatusCalculator};
