#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use tpose_ir::{EdgeId, Graph, NodeId, Operator, Scalar, TensorInfo, TensorShape};
use tpose_opt::{
    GenericHandlers, HandlerArgs, OptimizerCtx, Permutation, handle_simple_node,
    handle_simple_node_with_axis,
};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Generic handlers that record every delegation.
///
/// `resize`, `simple_node_broadcast` and `reduce` answer with `verdict`
/// without touching the graph. `simple_node` and `simple_node_with_axis`
/// run the real default rewrite.
pub struct RecordingHandlers {
    pub verdict: Cell<bool>,
    pub calls: RefCell<Vec<(&'static str, Vec<usize>)>>,
}

impl RecordingHandlers {
    pub fn new(verdict: bool) -> Self {
        Self {
            verdict: Cell::new(verdict),
            calls: RefCell::new(Vec::new()),
        }
    }

    fn record(&self, name: &'static str, args: &HandlerArgs<'_, '_>) {
        self.calls
            .borrow_mut()
            .push((name, args.transposible_inputs.clone()));
    }

    pub fn call_names(&self) -> Vec<&'static str> {
        self.calls.borrow().iter().map(|(name, _)| *name).collect()
    }
}

impl GenericHandlers for RecordingHandlers {
    fn resize(&self, args: &mut HandlerArgs<'_, '_>) -> bool {
        self.record("resize", args);
        self.verdict.get()
    }

    fn simple_node_broadcast(&self, args: &mut HandlerArgs<'_, '_>) -> bool {
        self.record("simple_node_broadcast", args);
        self.verdict.get()
    }

    fn reduce(&self, args: &mut HandlerArgs<'_, '_>) -> bool {
        self.record("reduce", args);
        self.verdict.get()
    }

    fn simple_node(&self, args: &mut HandlerArgs<'_, '_>) -> bool {
        self.record("simple_node", args);
        handle_simple_node(args)
    }

    fn simple_node_with_axis(&self, args: &mut HandlerArgs<'_, '_>) -> bool {
        self.record("simple_node_with_axis", args);
        handle_simple_node_with_axis(args)
    }
}

pub fn nhwc_to_nchw() -> Permutation {
    Permutation::channel_last_to_first(4).unwrap()
}

pub fn nchw_to_nhwc() -> Permutation {
    Permutation::channel_first_to_last(4).unwrap()
}

pub fn tensor(graph: &mut Graph, name: &str, scalar: Scalar, dims: &[u32]) -> EdgeId {
    graph.add_edge(TensorInfo::new(name, scalar, Some(TensorShape::fixed(dims))))
}

/// Adds a Transpose from `input` to a new edge with the permuted shape.
pub fn add_transpose(graph: &mut Graph, input: EdgeId, perm: &Permutation) -> EdgeId {
    let info = graph.edge(input).unwrap().clone();
    let shape = info.shape.map(|s| TensorShape {
        dims: perm.apply(&s.dims),
    });
    let out = graph.add_edge(TensorInfo::new(
        format!("{}_t", info.name),
        info.scalar,
        shape,
    ));
    let node = graph.add_node(
        Operator::onnx("Transpose", 13),
        [input],
        [out],
        format!("{}_transpose", info.name),
    );
    graph
        .node_mut(node)
        .unwrap()
        .set_attribute("perm", perm.to_i64());
    out
}

/// Adds a consumer of `edge` so the graph has a downstream user to check.
pub fn add_consumer(graph: &mut Graph, edge: EdgeId) -> NodeId {
    let info = graph.edge(edge).unwrap().clone();
    let out = graph.add_edge(TensorInfo::new("sink", info.scalar, info.shape));
    graph.add_node(Operator::onnx("Identity", 16), [edge], [out], "sink")
}

pub fn set_provider(graph: &mut Graph, node: NodeId, provider: &str) {
    graph.node_mut(node).unwrap().execution_provider = Some(provider.to_owned());
}

pub fn ctx<'g>(
    graph: &'g mut Graph,
    provider: Option<&str>,
    generic: &'g dyn GenericHandlers,
) -> OptimizerCtx<'g> {
    OptimizerCtx::new(graph, provider.map(str::to_owned), generic)
}

/// Number of Transpose nodes in the graph.
pub fn transpose_count(graph: &Graph) -> usize {
    graph
        .topological_order()
        .into_iter()
        .filter(|n| n.is_op("Transpose", ""))
        .count()
}
