//! Replacing a node's operator identity while keeping its outputs.

use tpose_ir::{Graph, IrError, NodeId, Operator};

fn swap_node(
    graph: &mut Graph,
    node: NodeId,
    op_type: &str,
    domain: &str,
    since_version: Option<u32>,
) -> Result<NodeId, IrError> {
    let old = graph.node(node).ok_or(IrError::UnknownNode(node))?;
    let since_version = since_version.unwrap_or(old.op.since_version);
    let outputs = old.outputs.clone();

    let new_node = graph.copy_node(node, Operator::new(op_type, domain, since_version))?;
    for (slot, output) in outputs.iter().enumerate() {
        if output.is_some() {
            graph.move_output(node, slot, new_node, slot)?;
        }
    }
    graph.remove_node(node)?;
    log::debug!("replaced node {node:?} with {domain}.{op_type} ({new_node:?})");
    Ok(new_node)
}

/// Replaces `node` with a copy whose type and domain are changed, keeping
/// the opset version.
///
/// Inputs and attributes are carried over, every used output edge moves to
/// the same slot of the new node, and the old node is removed. The returned
/// handle replaces `node`, which is dead afterwards.
pub fn swap_node_op_type_and_domain(
    graph: &mut Graph,
    node: NodeId,
    op_type: &str,
    domain: &str,
) -> Result<NodeId, IrError> {
    swap_node(graph, node, op_type, domain, None)
}

/// [`swap_node_op_type_and_domain`] with an explicit opset version.
pub fn swap_node_op_type_domain_and_since_version(
    graph: &mut Graph,
    node: NodeId,
    op_type: &str,
    domain: &str,
    since_version: u32,
) -> Result<NodeId, IrError> {
    swap_node(graph, node, op_type, domain, Some(since_version))
}
