//! Render finalization.
//!
//! [`finalize`] runs the before-render hook, then renders the component's
//! content and emits it as HTML. If a response already exists when the
//! content would be rendered (typically a redirect issued from the
//! before-render hook) nothing is emitted.

use crate::{
    block::RespondBlock,
    component::Component,
    context::RequestContext,
    exchange::Exchange,
};
use std::{fmt, sync::Arc};
use tessera_core::{
    BoxError, ConfigError, DispatchError, Phase, Response, StandaloneName, StatusCode,
};

/// Produces a component's markup.
///
/// Returning `Ok(None)` means the renderer produced a terminal response of
/// its own (or decided to emit nothing); finalization then emits nothing.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Renderer` for component state `{S}`",
    label = "missing `Renderer` implementation",
    note = "Closures can be used through `ComponentBuilder::content_fn`."
)]
pub trait Renderer<S>: Send + Sync {
    /// Render the markup.
    fn render(&self, ctx: &mut RequestContext<'_, '_, S>) -> Result<Option<String>, BoxError>;
}

/// A [`Renderer`] backed by a closure.
pub struct FnRenderer<F> {
    render: F,
}

impl<F> FnRenderer<F> {
    /// Wrap a closure.
    pub fn new(render: F) -> Self {
        Self { render }
    }
}

impl<S, F> Renderer<S> for FnRenderer<F>
where
    F: Fn(&mut RequestContext<'_, '_, S>) -> Result<Option<String>, BoxError> + Send + Sync,
{
    fn render(&self, ctx: &mut RequestContext<'_, '_, S>) -> Result<Option<String>, BoxError> {
        (self.render)(ctx)
    }
}

/// The outcome of a render finalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finalized {
    /// The rendered HTML was emitted.
    Emitted,
    /// Nothing was emitted because a response already existed, or the
    /// renderer produced none.
    Suppressed,
}

impl fmt::Display for Finalized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finalized::Emitted => f.write_str("emitted"),
            Finalized::Suppressed => f.write_str("suppressed"),
        }
    }
}

/// Finalize the render of standalone entry point `name`.
///
/// Fails with [`ConfigError::UnknownStandalone`] before anything runs when
/// the definition has no entry point `name`.
///
/// 1. Runs the before-render hook with backfire.
/// 2. Stops if a response exists.
/// 3. Renders the content; `None` stops here.
/// 4. Emits the markup as HTML with the layout of `name` (else the default
///    layout from the settings) and `status` if given.
///
/// HTML is emitted whatever format the request asked for.
pub fn finalize<S: Clone>(
    component: &mut Component<S>,
    exchange: &mut Exchange<'_>,
    status: Option<StatusCode>,
    name: &StandaloneName,
) -> Result<Finalized, DispatchError> {
    let mut ctx = RequestContext::new(component, exchange).for_target(name.clone(), None);
    finalize_in(&mut ctx, status)
}

/// Finalize within an existing context, for its targeted standalone entry.
pub(crate) fn finalize_in<S: Clone>(
    ctx: &mut RequestContext<'_, '_, S>,
    status: Option<StatusCode>,
) -> Result<Finalized, DispatchError> {
    let layout = ctx
        .component()
        .def()
        .standalone_or_err(ctx.standalone())?
        .layout()
        .map(str::to_owned);

    if let Some(hook) = ctx.component().def().before_render().cloned() {
        ctx.evaluate_with_backfire(|ctx| hook(ctx))
            .map_err(|err| DispatchError::from_block(Phase::BeforeRender, err))?;
        ctx.mark(Phase::BeforeRender);
    }

    if ctx.is_responded() {
        crate::trace_event!(
            debug,
            component = %ctx.component().identity(),
            "render suppressed, response already emitted"
        );
        return Ok(Finalized::Suppressed);
    }

    let renderer = ctx
        .component()
        .def()
        .content()
        .cloned()
        .ok_or_else(|| ConfigError::MissingField {
            component: ctx.component().def().name().to_owned(),
            field: "content",
        })?;

    let rendered = ctx
        .evaluate(|ctx| renderer.render(ctx))
        .map_err(|err| DispatchError::from_block(Phase::Render, err))?;
    ctx.mark(Phase::Render);

    let Some(body) = rendered else {
        return Ok(Finalized::Suppressed);
    };
    if ctx.is_responded() {
        return Err(DispatchError::AlreadyResponded);
    }

    let layout = layout.or_else(|| ctx.exchange().settings().default_layout.clone());

    let mut response = Response::html(body).with_layout(layout);
    if let Some(status) = status {
        response = response.with_status(status);
    }
    ctx.exchange_mut().take_responder()?.send(response);
    Ok(Finalized::Emitted)
}

/// A respond block that finalizes the render of the dispatched standalone
/// entry point.
///
/// ```rust,ignore
/// s.verb(Verb::Get, |v| {
///     v.authorize(|_| true)
///         .respond_with(RespondFormat::Fallback, render_standalone_block(None));
/// });
/// ```
pub fn render_standalone_block<S: Clone + 'static>(status: Option<StatusCode>) -> RespondBlock<S> {
    Arc::new(move |ctx: &mut RequestContext<'_, '_, S>| {
        ctx.render_standalone(status)?;
        Ok(())
    })
}
