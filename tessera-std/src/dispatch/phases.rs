//! The standard phase implementations.
//!
//! Each function runs one top-level lifecycle phase against a context and
//! records the phase in the context's [`Phases`](tessera_core::Phases) once
//! it ran. [`Lifecycle`](super::Lifecycle) implementations that override a
//! phase can call back into these.

use crate::{block::EffectBlock, config::VerbConfig, context::RequestContext};
use tessera_core::{AccessDenied, DispatchError, Flow, Phase};

/// Register a parentless component as the request root.
pub fn register_root<S>(ctx: &mut RequestContext<'_, '_, S>) -> Result<Flow, DispatchError> {
    if ctx.component().parent().is_some() {
        return Ok(Flow::Next);
    }
    let identity = ctx.component().identity();
    ctx.exchange_mut().scope_mut().register_root(identity)?;
    ctx.mark(Phase::RootRegistration);
    Ok(Flow::Next)
}

/// Run the load-data block with backfire, then the component's
/// after-load-data hook. Skipped without a load-data block.
pub fn load_data<S: Clone>(
    ctx: &mut RequestContext<'_, '_, S>,
    config: &VerbConfig<S>,
) -> Result<Flow, DispatchError> {
    let Some(block) = config.load_data() else {
        return Ok(Flow::Next);
    };
    run_effect(ctx, Phase::LoadData, block)?;
    if let Some(hook) = ctx.component().def().after_load_data().cloned() {
        run_effect(ctx, Phase::AfterLoadData, &hook)?;
    }
    Ok(Flow::Next)
}

/// Run the assign-attributes block with backfire, then the component's
/// after-assign-attributes hook. Skipped without an assign-attributes block.
pub fn assign_attributes<S: Clone>(
    ctx: &mut RequestContext<'_, '_, S>,
    config: &VerbConfig<S>,
) -> Result<Flow, DispatchError> {
    let Some(block) = config.assign_attributes() else {
        return Ok(Flow::Next);
    };
    run_effect(ctx, Phase::AssignAttributes, block)?;
    if let Some(hook) = ctx.component().def().after_assign_attributes().cloned() {
        run_effect(ctx, Phase::AfterAssignAttributes, &hook)?;
    }
    Ok(Flow::Next)
}

/// Evaluate the authorize block, without backfire.
///
/// # Errors
///
/// [`DispatchError::AccessDenied`] when the block returns `false`.
pub fn authorize<S>(
    ctx: &mut RequestContext<'_, '_, S>,
    config: &VerbConfig<S>,
) -> Result<Flow, DispatchError> {
    let authorize = config.authorize();
    let permitted = ctx.evaluate(|ctx| authorize(ctx));
    ctx.mark(Phase::Authorize);
    if permitted {
        return Ok(Flow::Next);
    }

    let denied = AccessDenied {
        component: ctx.component().identity(),
        standalone: config.standalone().clone(),
        verb: config.verb(),
    };
    crate::trace_event!(warn, %denied, "access denied");
    Err(denied.into())
}

/// Run the store-data block with backfire. Skipped without one.
pub fn store_data<S: Clone>(
    ctx: &mut RequestContext<'_, '_, S>,
    config: &VerbConfig<S>,
) -> Result<Flow, DispatchError> {
    if let Some(block) = config.store_data() {
        run_effect(ctx, Phase::StoreData, block)?;
    }
    Ok(Flow::Next)
}

/// Run the respond block for the requested format, else the fallback
/// block, without backfire.
///
/// # Errors
///
/// [`DispatchError::NoRespondBlock`] when neither exists.
pub fn respond<S>(
    ctx: &mut RequestContext<'_, '_, S>,
    config: &VerbConfig<S>,
) -> Result<Flow, DispatchError> {
    let format = ctx.format();
    let Some(block) = config.respond_block_for(&format) else {
        return Err(DispatchError::NoRespondBlock {
            component: ctx.component().identity(),
            verb: config.verb(),
            format,
        });
    };
    ctx.evaluate(|ctx| block(ctx))
        .map_err(|err| DispatchError::from_block(Phase::Respond, err))?;
    ctx.mark(Phase::Respond);
    Ok(Flow::Next)
}

fn run_effect<S: Clone>(
    ctx: &mut RequestContext<'_, '_, S>,
    phase: Phase,
    block: &EffectBlock<S>,
) -> Result<(), DispatchError> {
    crate::trace_event!(debug, %phase, component = %ctx.component().identity(), "running phase");
    ctx.evaluate_with_backfire(|ctx| block(ctx))
        .map_err(|err| DispatchError::from_block(phase, err))?;
    ctx.mark(phase);
    Ok(())
}
