//! Operator key to [`Handler`] tables.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use tpose_ir::{GraphNode, NodeId};

use crate::context::{HandlerArgs, OptimizerCtx};
use crate::handlers::Handler;
use crate::perm::Permutation;

/// Immutable map from operator key (`"Resize"`, `"com.microsoft.QLinearAdd"`)
/// to its handler.
#[derive(Clone, Debug, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<&'static str, Handler>,
}

/// Result of offering a node to a registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushOutcome {
    /// No handler is registered for the node's operator.
    Unhandled,
    /// The handler declined; the node is unchanged.
    Declined,
    /// The Transpose was pushed. Carries the node's handle, which differs
    /// from the original if the node was replaced.
    Pushed(NodeId),
}

impl HandlerRegistry {
    /// Operators with target-specific handling that the generic optimizer
    /// also knows about.
    pub fn baseline() -> Self {
        Self {
            handlers: HashMap::from([("Resize", Handler::EpAwareResize)]),
        }
    }

    /// The baseline plus contrib operators and operators with
    /// target-specific kernels.
    pub fn extended() -> Self {
        let mut handlers = HashMap::from([
            ("MaxPool", Handler::MaxPool),
            ("com.microsoft.QLinearAdd", Handler::QLinearBinaryOp),
            ("com.microsoft.QLinearAveragePool", Handler::QLinearPool),
            ("com.microsoft.QLinearConcat", Handler::QLinearConcat),
            ("com.microsoft.QLinearGlobalAveragePool", Handler::QLinearPool),
            ("com.microsoft.QLinearLeakyRelu", Handler::SimpleNode),
            ("com.microsoft.QLinearMul", Handler::QLinearBinaryOp),
            ("com.microsoft.QLinearReduceMean", Handler::Reduce),
            ("com.microsoft.QLinearSigmoid", Handler::SimpleNode),
        ]);
        for (key, handler) in Self::baseline().handlers {
            handlers.entry(key).or_insert(handler);
        }
        Self { handlers }
    }

    pub fn lookup(&self, key: &str) -> Option<Handler> {
        self.handlers.get(key).copied()
    }

    pub fn lookup_node(&self, node: &GraphNode) -> Option<Handler> {
        self.lookup(&node.op.key())
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.handlers.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Looks up the handler for `node` and offers it the Transpose `perm`.
    pub fn try_push(
        &self,
        ctx: &mut OptimizerCtx<'_>,
        node: NodeId,
        perm: Permutation,
    ) -> PushOutcome {
        let Some(target) = ctx.graph.node(node) else {
            return PushOutcome::Unhandled;
        };
        let Some(handler) = self.lookup_node(target) else {
            return PushOutcome::Unhandled;
        };
        let inputs = handler.transposible_inputs(target);

        let mut args = HandlerArgs::new(ctx, node, perm, inputs);
        if handler.rewrite(&mut args) {
            PushOutcome::Pushed(args.node)
        } else {
            PushOutcome::Declined
        }
    }
}

static ORT_HANDLERS: Lazy<HandlerRegistry> = Lazy::new(HandlerRegistry::baseline);
static ORT_EXTENDED_HANDLERS: Lazy<HandlerRegistry> = Lazy::new(HandlerRegistry::extended);

/// Process-wide baseline registry, built on first use.
pub fn ort_handlers() -> &'static HandlerRegistry {
    &ORT_HANDLERS
}

/// Process-wide extended registry, built on first use.
pub fn ort_extended_handlers() -> &'static HandlerRegistry {
    &ORT_EXTENDED_HANDLERS
}

/// Which registry a pass dispatches through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HandlerSet {
    /// Only handlers the generic optimizer also understands.
    Baseline,
    /// Baseline plus contrib and target-specific handlers.
    #[default]
    Extended,
}

impl HandlerSet {
    pub fn registry(self) -> &'static HandlerRegistry {
        match self {
            Self::Baseline => ort_handlers(),
            Self::Extended => ort_extended_handlers(),
        }
    }
}
