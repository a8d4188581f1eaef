//! Graph representation for layout-transpose rewrites.
//!
//! A small operator graph (nodes, tensor edges, attributes, element types and
//! shapes) with the query and mutation primitives that transpose push-through
//! handlers need: attribute get/set/clear, copy-node-with-new-identity,
//! move-output-between-nodes and node removal.

mod attr;
mod error;
pub mod graph;
mod types;

pub use attr::Attribute;
pub use error::IrError;
pub use graph::{
    EdgeId, Graph, GraphNode, MS_DOMAIN, MS_INTERNAL_NHWC_DOMAIN, NodeId, ONNX_DOMAIN, Operator,
    TensorInfo,
};
pub use types::{Bytes, Dimension, Scalar, ScalarKind, TensorShape};
