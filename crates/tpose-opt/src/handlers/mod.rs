//! Operator-specific push-through handlers.
//!
//! Each [`Handler`] pairs an input selector (which input slots may receive
//! the pushed Transpose) with a rewrite. A rewrite either applies every
//! mutation and returns `true`, or returns `false` with the node untouched.

mod max_pool;
mod qlinear;
mod resize;

use tpose_ir::GraphNode;

use crate::context::HandlerArgs;

pub use qlinear::{q_linear_binary_op_inputs, q_linear_concat_inputs};

/// A registered push-through behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handler {
    /// Resize, held back on unassigned or layout-sensitive targets.
    EpAwareResize,
    /// QLinearConcat: axis handler over the data inputs only.
    QLinearConcat,
    /// QLinearAdd / QLinearMul: broadcast handler over `A` and `B`.
    QLinearBinaryOp,
    /// QLinearAveragePool / QLinearGlobalAveragePool: flips `channels_last`.
    QLinearPool,
    /// MaxPool on CPU: swapped for the NHWC kernel.
    MaxPool,
    /// Single data input, layout agnostic.
    SimpleNode,
    /// Reduction over `axes`.
    Reduce,
}

/// Selector for handlers that only move input 0.
pub fn first_input(_node: &GraphNode) -> Vec<usize> {
    vec![0]
}

impl Handler {
    /// Input slots of `node` eligible to receive a pushed Transpose.
    pub fn transposible_inputs(self, node: &GraphNode) -> Vec<usize> {
        match self {
            Self::QLinearConcat => q_linear_concat_inputs(node),
            Self::QLinearBinaryOp => q_linear_binary_op_inputs(node),
            Self::EpAwareResize
            | Self::QLinearPool
            | Self::MaxPool
            | Self::SimpleNode
            | Self::Reduce => first_input(node),
        }
    }

    /// Attempts the rewrite. `false` means nothing was changed.
    pub fn rewrite(self, args: &mut HandlerArgs<'_, '_>) -> bool {
        let generic = args.ctx.generic;
        match self {
            Self::EpAwareResize => resize::handle_ep_aware_resize(args),
            Self::QLinearConcat => qlinear::handle_q_linear_concat(args),
            Self::QLinearBinaryOp => qlinear::handle_q_linear_binary_op(args),
            Self::QLinearPool => qlinear::handle_q_linear_pool_op(args),
            Self::MaxPool => max_pool::handle_max_pool(args),
            Self::SimpleNode => generic.simple_node(args),
            Self::Reduce => generic.reduce(args),
        }
    }
}
