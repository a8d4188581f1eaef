use tpose_ir::{Graph, NodeId};

use crate::generic::GenericHandlers;
use crate::perm::Permutation;

/// State shared by every handler invocation within one optimization pass.
pub struct OptimizerCtx<'g> {
    /// The graph being rewritten.
    pub graph: &'g mut Graph,
    /// Execution target the pass runs for; `None` before partitioning.
    pub provider_type: Option<String>,
    /// Default handlers the specialized handlers delegate to.
    pub generic: &'g dyn GenericHandlers,
}

impl<'g> OptimizerCtx<'g> {
    pub fn new(
        graph: &'g mut Graph,
        provider_type: Option<String>,
        generic: &'g dyn GenericHandlers,
    ) -> Self {
        Self {
            graph,
            provider_type,
            generic,
        }
    }

    /// The assigned execution target, treating an empty name as unassigned.
    pub fn provider(&self) -> Option<&str> {
        self.provider_type.as_deref().filter(|ep| !ep.is_empty())
    }
}

/// Arguments for a single handler invocation.
pub struct HandlerArgs<'c, 'g> {
    pub ctx: &'c mut OptimizerCtx<'g>,
    /// The matched node. Updated in place when a handler replaces the node.
    pub node: NodeId,
    /// The permutation of the Transpose being pushed, with its inverse.
    pub perm: Permutation,
    /// Input slots allowed to receive the pushed Transpose.
    pub transposible_inputs: Vec<usize>,
}

impl<'c, 'g> HandlerArgs<'c, 'g> {
    pub fn new(
        ctx: &'c mut OptimizerCtx<'g>,
        node: NodeId,
        perm: Permutation,
        transposible_inputs: Vec<usize>,
    ) -> Self {
        Self {
            ctx,
            node,
            perm,
            transposible_inputs,
        }
    }
}
