//! The overridable lifecycle.

use super::phases;
use crate::{config::VerbConfig, context::RequestContext};
use tessera_core::{DispatchError, Flow, Phase};

/// The request lifecycle, one method per top-level phase.
///
/// Every method defaults to the matching function in [`phases`]. Override a
/// method to change a phase; return [`Flow::Stop`] to end the dispatch after
/// it.
///
/// # Example
///
/// ```rust,ignore
/// struct AuditedLifecycle;
///
/// impl<S: Clone> Lifecycle<S> for AuditedLifecycle {
///     fn store_data(
///         &self,
///         ctx: &mut RequestContext<'_, '_, S>,
///         config: &VerbConfig<S>,
///     ) -> Result<Flow, DispatchError> {
///         audit::record(ctx.component().identity());
///         phases::store_data(ctx, config)
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Lifecycle` for component state `{S}`",
    label = "missing `Lifecycle` implementation",
    note = "An empty `impl<S: Clone> Lifecycle<S> for {Self} {}` uses the standard phases."
)]
pub trait Lifecycle<S: Clone> {
    /// Register a parentless component as the request root.
    fn register_root(&self, ctx: &mut RequestContext<'_, '_, S>) -> Result<Flow, DispatchError> {
        phases::register_root(ctx)
    }

    /// Load data, followed by the after-load-data hook.
    fn load_data(
        &self,
        ctx: &mut RequestContext<'_, '_, S>,
        config: &VerbConfig<S>,
    ) -> Result<Flow, DispatchError> {
        phases::load_data(ctx, config)
    }

    /// Assign attributes, followed by the after-assign-attributes hook.
    fn assign_attributes(
        &self,
        ctx: &mut RequestContext<'_, '_, S>,
        config: &VerbConfig<S>,
    ) -> Result<Flow, DispatchError> {
        phases::assign_attributes(ctx, config)
    }

    /// Authorize the request.
    fn authorize(
        &self,
        ctx: &mut RequestContext<'_, '_, S>,
        config: &VerbConfig<S>,
    ) -> Result<Flow, DispatchError> {
        phases::authorize(ctx, config)
    }

    /// Store data.
    fn store_data(
        &self,
        ctx: &mut RequestContext<'_, '_, S>,
        config: &VerbConfig<S>,
    ) -> Result<Flow, DispatchError> {
        phases::store_data(ctx, config)
    }

    /// Respond in the requested format.
    fn respond(
        &self,
        ctx: &mut RequestContext<'_, '_, S>,
        config: &VerbConfig<S>,
    ) -> Result<Flow, DispatchError> {
        phases::respond(ctx, config)
    }

    /// Run one top-level phase. Nested phases are run by their parent phase
    /// and are ignored here.
    fn run_phase(
        &self,
        phase: Phase,
        ctx: &mut RequestContext<'_, '_, S>,
        config: &VerbConfig<S>,
    ) -> Result<Flow, DispatchError> {
        match phase {
            Phase::RootRegistration => self.register_root(ctx),
            Phase::LoadData => self.load_data(ctx, config),
            Phase::AssignAttributes => self.assign_attributes(ctx, config),
            Phase::Authorize => self.authorize(ctx, config),
            Phase::StoreData => self.store_data(ctx, config),
            Phase::Respond => self.respond(ctx, config),
            Phase::AfterLoadData
            | Phase::AfterAssignAttributes
            | Phase::BeforeRender
            | Phase::Render => Ok(Flow::Next),
        }
    }
}

/// The lifecycle with every phase at its default.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardLifecycle;

impl<S: Clone> Lifecycle<S> for StandardLifecycle {}

impl<S: Clone, L: Lifecycle<S> + ?Sized> Lifecycle<S> for &L {
    fn register_root(&self, ctx: &mut RequestContext<'_, '_, S>) -> Result<Flow, DispatchError> {
        (**self).register_root(ctx)
    }

    fn load_data(
        &self,
        ctx: &mut RequestContext<'_, '_, S>,
        config: &VerbConfig<S>,
    ) -> Result<Flow, DispatchError> {
        (**self).load_data(ctx, config)
    }

    fn assign_attributes(
        &self,
        ctx: &mut RequestContext<'_, '_, S>,
        config: &VerbConfig<S>,
    ) -> Result<Flow, DispatchError> {
        (**self).assign_attributes(ctx, config)
    }

    fn authorize(
        &self,
        ctx: &mut RequestContext<'_, '_, S>,
        config: &VerbConfig<S>,
    ) -> Result<Flow, DispatchError> {
        (**self).authorize(ctx, config)
    }

    fn store_data(
        &self,
        ctx: &mut RequestContext<'_, '_, S>,
        config: &VerbConfig<S>,
    ) -> Result<Flow, DispatchError> {
        (**self).store_data(ctx, config)
    }

    fn respond(
        &self,
        ctx: &mut RequestContext<'_, '_, S>,
        config: &VerbConfig<S>,
    ) -> Result<Flow, DispatchError> {
        (**self).respond(ctx, config)
    }

    fn run_phase(
        &self,
        phase: Phase,
        ctx: &mut RequestContext<'_, '_, S>,
        config: &VerbConfig<S>,
    ) -> Result<Flow, DispatchError> {
        (**self).run_phase(phase, ctx, config)
    }
}
