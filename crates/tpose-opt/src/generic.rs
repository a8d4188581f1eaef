//! Seam to the driver's default push-through handlers.
//!
//! The specialized handlers gate or reroute nodes and then hand the actual
//! rewrite to one of these. `simple_node` and `simple_node_with_axis` have
//! complete default implementations; resize, broadcasting and reduce handling
//! depend on the driver's shape machinery and must be supplied.

use tpose_ir::IrError;

use crate::context::HandlerArgs;
use crate::transpose::{can_transpose, transpose_input, transpose_outputs};

/// Default handlers supplied by the transpose optimizer driver.
pub trait GenericHandlers {
    /// Push through a Resize (permutes `roi`, `scales` and `sizes`).
    fn resize(&self, args: &mut HandlerArgs<'_, '_>) -> bool;

    /// Push through a node whose selected inputs broadcast against each other.
    fn simple_node_broadcast(&self, args: &mut HandlerArgs<'_, '_>) -> bool;

    /// Push through a reduction, remapping `axes`.
    fn reduce(&self, args: &mut HandlerArgs<'_, '_>) -> bool;

    /// Push through a layout-agnostic node.
    fn simple_node(&self, args: &mut HandlerArgs<'_, '_>) -> bool {
        handle_simple_node(args)
    }

    /// Push through a node with a single `axis` attribute.
    fn simple_node_with_axis(&self, args: &mut HandlerArgs<'_, '_>) -> bool {
        handle_simple_node_with_axis(args)
    }
}

fn transpose_selected(args: &mut HandlerArgs<'_, '_>) -> Result<(), IrError> {
    let inverse = args.perm.clone().inverted();
    for &index in &args.transposible_inputs {
        transpose_input(args.ctx.graph, args.node, index, &inverse)?;
    }
    transpose_outputs(args.ctx.graph, args.node, &args.perm)
}

/// Transposes the selected inputs by the inverse permutation and all outputs
/// by the permutation.
///
/// Every selected input and used output must hold a registered edge;
/// otherwise the node is left alone.
pub fn handle_simple_node(args: &mut HandlerArgs<'_, '_>) -> bool {
    if !can_transpose(args.ctx.graph, args.node, &args.transposible_inputs) {
        return false;
    }
    match transpose_selected(args) {
        Ok(()) => true,
        Err(err) => {
            log::warn!("push through node {:?} failed: {err}", args.node);
            false
        }
    }
}

/// Resolves a possibly negative axis against `rank`.
pub fn normalize_axis(axis: i64, rank: usize) -> Option<usize> {
    let rank = i64::try_from(rank).ok()?;
    let axis = if axis < 0 { axis + rank } else { axis };
    if (0..rank).contains(&axis) {
        usize::try_from(axis).ok()
    } else {
        None
    }
}

/// Like [`handle_simple_node`], then rewrites `axis` to `perm[axis]`.
///
/// A node without an in-range `axis` attribute is left alone.
pub fn handle_simple_node_with_axis(args: &mut HandlerArgs<'_, '_>) -> bool {
    let rank = args.perm.rank();
    let Some(node) = args.ctx.graph.node(args.node) else {
        return false;
    };
    let Some(axis) = node.attribute_int("axis") else {
        return false;
    };
    let Some(axis) = normalize_axis(axis, rank) else {
        return false;
    };

    if !handle_simple_node(args) {
        return false;
    }
    let new_axis = args.perm.as_slice()[axis] as i64;
    if let Some(node) = args.ctx.graph.node_mut(args.node) {
        node.set_attribute("axis", new_axis);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_axis_bounds() {
        assert_eq!(normalize_axis(1, 4), Some(1));
        assert_eq!(normalize_axis(-1, 4), Some(3));
        assert_eq!(normalize_axis(-4, 4), Some(0));
        assert_eq!(normalize_axis(4, 4), None);
        assert_eq!(normalize_axis(-5, 4), None);
        assert_eq!(normalize_axis(0, 0), None);
    }
}
