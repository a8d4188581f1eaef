//! Error types for graph mutation.

use crate::graph::{EdgeId, NodeId};

/// Errors reported by graph mutation primitives.
#[derive(Debug, thiserror::Error)]
pub enum IrError {
    /// The node handle does not refer to a live node.
    #[error("node {0:?} is not in the graph")]
    UnknownNode(NodeId),

    /// The edge handle was never registered.
    #[error("edge {0:?} is not registered in the graph")]
    UnknownEdge(EdgeId),

    /// An output slot index is out of range for the node.
    #[error("node {node:?} has no output slot {slot}")]
    OutputSlot { node: NodeId, slot: usize },

    /// An input slot index is out of range for the node.
    #[error("node {node:?} has no input slot {slot}")]
    InputSlot { node: NodeId, slot: usize },
}
