//! Target-aware cost check consulted before pushing a Transpose.

use std::collections::HashSet;
use std::fmt;

use tpose_ir::{EdgeId, Graph, GraphNode};

use crate::targets::CPU_EXECUTION_PROVIDER;

/// Outcome of a cost check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CostCheckResult {
    /// Push the Transpose through the node.
    PushTranspose,
    /// Do not push; stop propagating here.
    Stop,
    /// No opinion; use the driver's default heuristic.
    FallThrough,
}

impl fmt::Display for CostCheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PushTranspose => "push",
            Self::Stop => "stop",
            Self::FallThrough => "fall-through",
        })
    }
}

/// Resize has a faster NHWC path for 4D 8-bit inputs in linear mode.
fn is_nhwc_friendly_resize(graph: &Graph, node: &GraphNode) -> bool {
    let Some(input) = node
        .inputs
        .first()
        .copied()
        .flatten()
        .and_then(|edge| graph.edge(edge))
    else {
        return false;
    };
    input.rank() == Some(4)
        && input.scalar.is_8bit_int()
        && node.attribute_string("mode") == Some("linear")
}

/// Cost check special-casing kernels of the CPU target.
///
/// `MaxPool` always pushes since its NHWC variant is faster whenever the
/// handler accepts it; the handler does the eligibility checks. `Resize`
/// pushes for 4D `int8`/`uint8` input in `linear` mode. Everything else falls
/// through. `perm` and `outputs_leading_to_transpose` are accepted for the
/// driver's signature and ignored.
pub fn ort_ep_cost_check(
    graph: &Graph,
    node: &GraphNode,
    _perm: &[usize],
    _outputs_leading_to_transpose: &HashSet<EdgeId>,
) -> CostCheckResult {
    if node.execution_provider() != Some(CPU_EXECUTION_PROVIDER) {
        return CostCheckResult::FallThrough;
    }

    let result = if node.is_op("MaxPool", "") {
        CostCheckResult::PushTranspose
    } else if node.is_op("Resize", "") && is_nhwc_friendly_resize(graph, node) {
        CostCheckResult::PushTranspose
    } else {
        CostCheckResult::FallThrough
    };
    log::trace!("cost check {} ({}): {result}", node.name, node.op.key());
    result
}
