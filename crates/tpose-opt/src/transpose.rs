//! Transpose insertion around a node whose layout is being changed.

use tpose_ir::{EdgeId, Graph, IrError, NodeId, Operator, TensorInfo, TensorShape};

use crate::perm::{Permutation, compose_perm, is_identity};

/// Opset version stamped on Transpose nodes created here.
const TRANSPOSE_OPSET: u32 = 13;

fn permuted_shape(shape: Option<&TensorShape>, perm: &[usize]) -> Option<TensorShape> {
    let shape = shape?;
    if shape.rank() != perm.len() {
        return None;
    }
    Some(TensorShape {
        dims: crate::perm::permute(&shape.dims, perm),
    })
}

/// Returns `true` if every slot in `inputs` and every used output of `node`
/// holds a registered edge, so that [`transpose_input`] on those slots and
/// [`transpose_outputs`] cannot fail.
pub fn can_transpose(graph: &Graph, node: NodeId, inputs: &[usize]) -> bool {
    let Some(target) = graph.node(node) else {
        return false;
    };
    let inputs_ok = inputs.iter().all(|&index| {
        matches!(target.inputs.get(index), Some(Some(edge)) if graph.edge(*edge).is_some())
    });
    inputs_ok
        && target
            .outputs
            .iter()
            .flatten()
            .all(|&edge| graph.edge(edge).is_some())
}

/// Returns the Transpose producing `edge` and its input, if that Transpose
/// followed by `perm` cancels out.
fn cancelling_transpose(
    graph: &Graph,
    edge: EdgeId,
    perm: &Permutation,
) -> Option<(NodeId, EdgeId)> {
    let producer = graph.edge_producer(edge)?;
    if !producer.is_op("Transpose", "") {
        return None;
    }
    let producer_perm = producer.attribute_ints("perm")?;
    let producer_perm = Permutation::from_i64(producer_perm).ok()?;
    if producer_perm.rank() != perm.rank() {
        return None;
    }
    if is_identity(&compose_perm(producer_perm.as_slice(), perm.as_slice())) {
        let source = producer.inputs.first().copied().flatten()?;
        Some((producer.id, source))
    } else {
        None
    }
}

/// Makes input `index` of `node` see its value transposed by `perm`.
///
/// An existing Transpose that `perm` undoes is bypassed instead of stacking a
/// second one on top of it, and removed once nothing else reads it.
pub fn transpose_input(
    graph: &mut Graph,
    node: NodeId,
    index: usize,
    perm: &Permutation,
) -> Result<(), IrError> {
    let target = graph.node(node).ok_or(IrError::UnknownNode(node))?;
    let input = target
        .inputs
        .get(index)
        .copied()
        .flatten()
        .ok_or(IrError::InputSlot { node, slot: index })?;

    if let Some((producer, source)) = cancelling_transpose(graph, input, perm) {
        log::trace!("node {node:?} input {index}: cancelled existing transpose");
        if let Some(target) = graph.node_mut(node) {
            target.inputs[index] = Some(source);
        }
        if graph.edge_consumers(input).is_empty() && !graph.outputs.contains(&input) {
            graph.remove_node(producer)?;
        }
        return Ok(());
    }

    let name = format!("{}_transpose_in{index}", target.name);
    let provider = target.execution_provider.clone();
    let info = graph.edge(input).ok_or(IrError::UnknownEdge(input))?;
    let transposed = TensorInfo::new(
        format!("{}_transposed", info.name),
        info.scalar,
        permuted_shape(info.shape.as_ref(), perm.as_slice()),
    );

    let edge = graph.add_edge(transposed);
    let transpose = graph.add_node(
        Operator::onnx("Transpose", TRANSPOSE_OPSET),
        [input],
        [edge],
        name,
    );
    if let Some(t) = graph.node_mut(transpose) {
        t.set_attribute("perm", perm.to_i64());
        t.execution_provider = provider;
    }
    if let Some(target) = graph.node_mut(node) {
        target.inputs[index] = Some(edge);
    }
    Ok(())
}

/// [`transpose_input`] on input 0.
pub fn transpose_first_input(
    graph: &mut Graph,
    node: NodeId,
    perm: &Permutation,
) -> Result<(), IrError> {
    transpose_input(graph, node, 0, perm)
}

/// Transposes every used output of `node` by `perm`.
///
/// Each output edge keeps its identity: the node is given a fresh edge in
/// pre-transpose layout, and a new Transpose produces the original edge from
/// it, so downstream consumers are untouched. Empty slots are skipped.
pub fn transpose_outputs(
    graph: &mut Graph,
    node: NodeId,
    perm: &Permutation,
) -> Result<(), IrError> {
    let target = graph.node(node).ok_or(IrError::UnknownNode(node))?;
    let outputs = target.outputs.clone();
    let node_name = target.name.clone();
    let provider = target.execution_provider.clone();

    for (slot, output) in outputs.into_iter().enumerate() {
        let Some(output) = output else {
            continue;
        };
        let info = graph.edge(output).ok_or(IrError::UnknownEdge(output))?;
        let untransposed = TensorInfo::new(
            format!("{}_untransposed", info.name),
            info.scalar,
            permuted_shape(info.shape.as_ref(), perm.inverse_slice()),
        );

        let edge = graph.add_edge(untransposed);
        if let Some(target) = graph.node_mut(node) {
            target.outputs[slot] = Some(edge);
        }
        let transpose = graph.add_node(
            Operator::onnx("Transpose", TRANSPOSE_OPSET),
            [edge],
            [output],
            format!("{node_name}_transpose_out{slot}"),
        );
        if let Some(t) = graph.node_mut(transpose) {
            t.set_attribute("perm", perm.to_i64());
            t.execution_provider = provider.clone();
        }
    }
    Ok(())
}
