//! Execution target identifiers and per-target layout constraints.

use std::collections::HashSet;

use once_cell::sync::Lazy;

pub const CPU_EXECUTION_PROVIDER: &str = "CPUExecutionProvider";
pub const CUDA_EXECUTION_PROVIDER: &str = "CUDAExecutionProvider";
pub const ROCM_EXECUTION_PROVIDER: &str = "ROCMExecutionProvider";
pub const QNN_EXECUTION_PROVIDER: &str = "QNNExecutionProvider";
/// Reserved for exercising layout-sensitive behavior in tests.
pub const INTERNAL_TESTING_EXECUTION_PROVIDER: &str = "InternalTestingExecutionProvider";

// CUDA's Resize kernel only accepts NCHW, and ROCm is generated from it. QNN
// needs Resize to stay NHWC once the layout transformer has moved it to
// `tpose_ir::MS_INTERNAL_NHWC_DOMAIN`, where no handler is registered.
static EPS_WITH_LAYOUT_SENSITIVE_RESIZE: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        CUDA_EXECUTION_PROVIDER,
        ROCM_EXECUTION_PROVIDER,
        QNN_EXECUTION_PROVIDER,
        INTERNAL_TESTING_EXECUTION_PROVIDER,
    ])
});

/// Targets whose Resize must keep its current layout.
pub fn eps_with_layout_sensitive_resize() -> &'static HashSet<&'static str> {
    &EPS_WITH_LAYOUT_SENSITIVE_RESIZE
}

pub fn is_layout_sensitive_resize_ep(provider: &str) -> bool {
    EPS_WITH_LAYOUT_SENSITIVE_RESIZE.contains(provider)
}
