use crate::context::HandlerArgs;
use crate::targets::is_layout_sensitive_resize_ep;

/// Resize is not layout sensitive, but some targets implement only one
/// layout. Push through it only once a target is assigned and that target
/// handles any layout.
pub(super) fn handle_ep_aware_resize(args: &mut HandlerArgs<'_, '_>) -> bool {
    let Some(provider) = args.ctx.provider() else {
        log::debug!("Resize {:?}: no execution target yet", args.node);
        return false;
    };
    if is_layout_sensitive_resize_ep(provider) {
        log::debug!("Resize {:?}: {provider} needs a fixed layout", args.node);
        return false;
    }

    let generic = args.ctx.generic;
    generic.resize(args)
}
