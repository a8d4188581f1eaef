use tpose_ir::MS_DOMAIN;

use crate::context::HandlerArgs;
use crate::perm::Permutation;
use crate::replace::swap_node_op_type_domain_and_since_version;
use crate::targets::CPU_EXECUTION_PROVIDER;
use crate::transpose::{can_transpose, transpose_first_input, transpose_outputs};

/// Rewrites an 8-bit CPU MaxPool fed by an NHWC to NCHW Transpose into the
/// channel-last `NhwcMaxPool` contrib kernel.
pub(super) fn handle_max_pool(args: &mut HandlerArgs<'_, '_>) -> bool {
    let graph = &*args.ctx.graph;
    let Some(node) = graph.node(args.node) else {
        return false;
    };

    if node.execution_provider() != Some(CPU_EXECUTION_PROVIDER) {
        return false;
    }
    // The optional indices output has no NHWC equivalent.
    if node.has_output(1) {
        log::debug!("MaxPool {}: indices output in use", node.name);
        return false;
    }
    let Some(dtype) = node
        .outputs
        .first()
        .copied()
        .flatten()
        .and_then(|out| graph.edge(out))
        .map(|info| info.scalar)
    else {
        return false;
    };
    if !dtype.is_8bit_int() {
        log::debug!("MaxPool {}: {dtype} output has no NHWC kernel", node.name);
        return false;
    }
    match Permutation::channel_last_to_first(args.perm.rank()) {
        Some(channel_first) if channel_first == args.perm => {}
        _ => return false,
    }
    if !can_transpose(graph, args.node, &[0]) {
        log::debug!("MaxPool {}: input or output edge missing", node.name);
        return false;
    }

    let new_node = match swap_node_op_type_domain_and_since_version(
        args.ctx.graph,
        args.node,
        "NhwcMaxPool",
        MS_DOMAIN,
        1,
    ) {
        Ok(id) => id,
        Err(err) => {
            log::warn!("MaxPool {:?}: replacement failed: {err}", args.node);
            return false;
        }
    };
    args.node = new_node;

    if let Some(node) = args.ctx.graph.node_mut(new_node) {
        // Only meaningful for the indices output, and rejected by NhwcMaxPool.
        node.clear_attribute("storage_order");
    }
    let inverse = args.perm.clone().inverted();
    if let Err(err) = transpose_first_input(args.ctx.graph, new_node, &inverse) {
        log::warn!("NhwcMaxPool {new_node:?}: {err}");
        return false;
    }
    if let Err(err) = transpose_outputs(args.ctx.graph, new_node, &args.perm) {
        log::warn!("NhwcMaxPool {new_node:?}: {err}");
        return false;
    }
    true
}
