//! Plain-text mirror of the structured document
//!
//! - `tree` - read-only tree walk and the owned `DocNode`
//! - `mapper` - `PositionMapper` and `PositionMapping`
//! - `remap` - re-locating entities in a fresh mirror

pub mod tree;
pub mod mapper;
pub mod remap;

pub use tree::{DocNode, DocumentTree, NodeKind, NodeVisit};
pub use mapper::{build_mapping, PositionMapper, PositionMapping};
pub use remap::{find_occurrences, remap_entities};
