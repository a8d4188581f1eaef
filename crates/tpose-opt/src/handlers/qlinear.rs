//! Quantized-linear contrib operators, whose inputs interleave data with
//! per-tensor scale and zero-point.

use tpose_ir::GraphNode;

use crate::context::HandlerArgs;
use crate::perm::Permutation;
use crate::transpose::{can_transpose, transpose_first_input, transpose_outputs};

/// `[Y_scale, Y_zero_point, (X, X_scale, X_zero_point)...]`: every third
/// slot from 2.
pub fn q_linear_concat_inputs(node: &GraphNode) -> Vec<usize> {
    (2..node.inputs.len()).step_by(3).collect()
}

/// `[A, A_scale, A_zero_point, B, B_scale, B_zero_point, C_scale,
/// C_zero_point]`: only `A` and `B`.
pub fn q_linear_binary_op_inputs(_node: &GraphNode) -> Vec<usize> {
    vec![0, 3]
}

pub(super) fn handle_q_linear_concat(args: &mut HandlerArgs<'_, '_>) -> bool {
    let generic = args.ctx.generic;
    generic.simple_node_with_axis(args)
}

pub(super) fn handle_q_linear_binary_op(args: &mut HandlerArgs<'_, '_>) -> bool {
    let generic = args.ctx.generic;
    generic.simple_node_broadcast(args)
}

/// Swaps between the channel-first and channel-last pooling variants.
///
/// Only a Transpose that exactly converts between the two layouts can be
/// absorbed: NHWC to NCHW into a channel-first node, or NCHW to NHWC into a
/// channel-last one.
pub(super) fn handle_q_linear_pool_op(args: &mut HandlerArgs<'_, '_>) -> bool {
    let Some(channel_first) = Permutation::channel_last_to_first(args.perm.rank()) else {
        return false;
    };
    let Some(node) = args.ctx.graph.node(args.node) else {
        return false;
    };
    let channels_last = node.attribute_int_or("channels_last", 0) != 0;
    let applicable = if channels_last {
        args.perm.inverse_slice() == channel_first.as_slice()
    } else {
        args.perm == channel_first
    };
    if !applicable {
        log::debug!(
            "{} {:?}: perm {:?} does not match channels_last={channels_last}",
            node.op.op_type,
            args.node,
            args.perm.as_slice()
        );
        return false;
    }
    if !can_transpose(args.ctx.graph, args.node, &[0]) {
        return false;
    }

    let inverse = args.perm.clone().inverted();
    if let Err(err) = transpose_first_input(args.ctx.graph, args.node, &inverse) {
        log::warn!("QLinear pool {:?}: {err}", args.node);
        return false;
    }
    if let Err(err) = transpose_outputs(args.ctx.graph, args.node, &args.perm) {
        log::warn!("QLinear pool {:?}: {err}", args.node);
        return false;
    }
    if let Some(node) = args.ctx.graph.node_mut(args.node) {
        node.set_attribute("channels_last", i64::from(!channels_last));
    }
    true
}
