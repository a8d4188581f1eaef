//! Target-aware extension layer for the layout transpose optimizer.
//!
//! The generic transpose optimizer pushes Transpose nodes through operators
//! to cancel them out. This crate supplies what the generic optimizer cannot
//! know on its own: handlers for contrib operators, handlers that depend on
//! the execution target ([`HandlerRegistry`]), and a [`ort_ep_cost_check`]
//! that overrides the default push heuristic for specific CPU kernels.
//!
//! Handlers rewrite through [`OptimizerCtx`] and delegate the common cases
//! to the driver's [`GenericHandlers`].

pub mod context;
pub mod cost;
pub mod generic;
pub mod handlers;
pub mod perm;
pub mod registry;
pub mod replace;
pub mod targets;
pub mod transpose;

pub use context::{HandlerArgs, OptimizerCtx};
pub use cost::{CostCheckResult, ort_ep_cost_check};
pub use generic::{GenericHandlers, handle_simple_node, handle_simple_node_with_axis};
pub use handlers::{Handler, first_input, q_linear_binary_op_inputs, q_linear_concat_inputs};
pub use perm::{Permutation, PermutationError, channel_last_to_first_perm};
pub use registry::{
    HandlerRegistry, HandlerSet, PushOutcome, ort_extended_handlers, ort_handlers,
};
pub use replace::{swap_node_op_type_and_domain, swap_node_op_type_domain_and_since_version};
pub use targets::{
    CPU_EXECUTION_PROVIDER, CUDA_EXECUTION_PROVIDER, INTERNAL_TESTING_EXECUTION_PROVIDER,
    QNN_EXECUTION_PROVIDER, ROCM_EXECUTION_PROVIDER, eps_with_layout_sensitive_resize,
};
