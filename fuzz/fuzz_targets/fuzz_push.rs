#![no_main]

use libfuzzer_sys::fuzz_target;
use tpose_ir::{Graph, Operator, Scalar, TensorInfo, TensorShape};
use tpose_opt::{
    CPU_EXECUTION_PROVIDER, GenericHandlers, HandlerArgs, OptimizerCtx, Permutation,
    ort_extended_handlers,
};

struct Declining;

impl GenericHandlers for Declining {
    fn resize(&self, _args: &mut HandlerArgs<'_, '_>) -> bool {
        false
    }

    fn simple_node_broadcast(&self, _args: &mut HandlerArgs<'_, '_>) -> bool {
        false
    }

    fn reduce(&self, _args: &mut HandlerArgs<'_, '_>) -> bool {
        false
    }
}

const OPS: [(&str, bool); 4] = [
    ("MaxPool", false),
    ("QLinearAveragePool", true),
    ("QLinearSigmoid", true),
    ("QLinearConcat", true),
];

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let axes: Vec<i64> = rest.iter().map(|&b| i64::from(b % 8)).collect();
    let Ok(perm) = Permutation::from_i64(&axes) else {
        return;
    };

    let (op_type, contrib) = OPS[usize::from(selector) % OPS.len()];
    let op = if contrib {
        Operator::contrib(op_type, 1)
    } else {
        Operator::onnx(op_type, 12)
    };
    let mut graph = Graph::new();
    let dims: Vec<u32> = (1..=4).collect();
    let scalar = if selector & 0x80 != 0 { Scalar::U8 } else { Scalar::F32 };
    let inputs: Vec<_> = (0..5)
        .map(|i| {
            graph.add_edge(TensorInfo::new(
                format!("in{i}"),
                scalar,
                Some(TensorShape::fixed(&dims)),
            ))
        })
        .collect();
    let output = graph.add_edge(TensorInfo::new("out", scalar, Some(TensorShape::fixed(&dims))));
    let node = graph.add_node(op, inputs, [output], "node");
    graph.node_mut(node).unwrap().execution_provider = Some(CPU_EXECUTION_PROVIDER.to_owned());

    let generic = Declining;
    let mut ctx = OptimizerCtx::new(&mut graph, Some(CPU_EXECUTION_PROVIDER.to_owned()), &generic);
    // Handlers either rewrite or decline; neither may panic.
    let _ = ort_extended_handlers().try_push(&mut ctx, node, perm);
    assert_eq!(graph.topological_order().len(), graph.node_count());
});
