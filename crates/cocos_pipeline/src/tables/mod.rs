//! Static lookup data the processors consult.

pub mod assets;
pub mod components;
pub mod node_types;

pub use node_types::{default_node_types, ChildSpec, NodeTypeSpec, NodeTypeTable};
