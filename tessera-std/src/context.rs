//! The evaluation environment of DSL blocks.
//!
//! A [`RequestContext`] binds the component instance and the request
//! [`Exchange`]. It may carry a secondary helper (e.g. a form helper) in which
//! case the block works on a transferred copy of the instance state:
//!
//! - [`state`](RequestContext::state) and
//!   [`state_mut`](RequestContext::state_mut) address the secondary copy
//!   when a helper is present, the instance otherwise
//! - [`evaluate`](RequestContext::evaluate) runs a block and leaves the
//!   instance untouched
//! - [`evaluate_with_backfire`](RequestContext::evaluate_with_backfire)
//!   copies the secondary state back onto the instance afterwards
//!
//! Without a helper the two evaluation forms are identical.

use crate::{
    component::Component,
    exchange::Exchange,
    render::{self, Finalized},
};
use std::any::Any;
use tessera_core::{
    DispatchError, Format, Phase, Phases, Response, StandaloneName, StatusCode, Verb,
};

/// The secondary slot: a helper and its own copy of the state.
struct Secondary<'a, S> {
    helper: &'a mut (dyn Any + 'static),
    state: S,
}

/// Scoped evaluation context for DSL blocks.
pub struct RequestContext<'a, 'c, S> {
    component: &'a mut Component<S>,
    exchange: &'a mut Exchange<'c>,
    secondary: Option<Secondary<'a, S>>,
    standalone: StandaloneName,
    verb: Option<Verb>,
    ran: Phases,
}

impl<'a, 'c, S> RequestContext<'a, 'c, S> {
    /// A context without a helper, targeting the default standalone entry.
    pub fn new(component: &'a mut Component<S>, exchange: &'a mut Exchange<'c>) -> Self {
        Self {
            component,
            exchange,
            secondary: None,
            standalone: StandaloneName::DEFAULT,
            verb: None,
            ran: Phases::empty(),
        }
    }

    /// A context with a secondary helper. The instance state is transferred
    /// into the secondary slot.
    pub fn with_helper(
        component: &'a mut Component<S>,
        exchange: &'a mut Exchange<'c>,
        helper: &'a mut (dyn Any + 'static),
    ) -> Self
    where
        S: Clone,
    {
        let state = component.state().clone();
        Self {
            component,
            exchange,
            secondary: Some(Secondary { helper, state }),
            standalone: StandaloneName::DEFAULT,
            verb: None,
            ran: Phases::empty(),
        }
    }

    /// Target a standalone entry point and verb.
    pub fn for_target(mut self, standalone: StandaloneName, verb: Option<Verb>) -> Self {
        self.standalone = standalone;
        self.verb = verb;
        self
    }

    /// Run `block` with this context as its receiver.
    pub fn evaluate<R>(&mut self, block: impl FnOnce(&mut Self) -> R) -> R {
        block(self)
    }

    /// Run `block`, then copy the secondary state back onto the instance.
    ///
    /// With a helper, the secondary state replaces the instance state once
    /// `block` returns. Writes made through [`Self::component_mut`] inside
    /// `block` are overwritten unless [`Self::transfer_from_primary`] is
    /// called after them.
    pub fn evaluate_with_backfire<R>(&mut self, block: impl FnOnce(&mut Self) -> R) -> R
    where
        S: Clone,
    {
        let result = block(self);
        self.backfire();
        result
    }

    /// Copy the secondary state onto the instance, replacing it whole. No-op
    /// without a helper.
    pub fn backfire(&mut self)
    where
        S: Clone,
    {
        if let Some(secondary) = &self.secondary {
            self.component.state_mut().clone_from(&secondary.state);
        }
    }

    /// Refresh the secondary state from the instance. No-op without a
    /// helper.
    pub fn transfer_from_primary(&mut self)
    where
        S: Clone,
    {
        if let Some(secondary) = &mut self.secondary {
            secondary.state.clone_from(self.component.state());
        }
    }

    /// Whether a secondary helper is present.
    pub fn has_helper(&self) -> bool {
        self.secondary.is_some()
    }

    /// The secondary helper, if present and of type `T`.
    pub fn helper<T: Any>(&self) -> Option<&T> {
        self.secondary
            .as_ref()
            .and_then(|secondary| secondary.helper.downcast_ref::<T>())
    }

    /// The secondary helper, mutably.
    pub fn helper_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.secondary
            .as_mut()
            .and_then(|secondary| secondary.helper.downcast_mut::<T>())
    }

    /// The state blocks read: the secondary copy if a helper is present.
    pub fn state(&self) -> &S {
        match &self.secondary {
            Some(secondary) => &secondary.state,
            None => self.component.state(),
        }
    }

    /// The state blocks write: the secondary copy if a helper is present.
    pub fn state_mut(&mut self) -> &mut S {
        match &mut self.secondary {
            Some(secondary) => &mut secondary.state,
            None => self.component.state_mut(),
        }
    }

    /// The component instance.
    pub fn component(&self) -> &Component<S> {
        &*self.component
    }

    /// The component instance, mutably. Bypasses the secondary slot.
    pub fn component_mut(&mut self) -> &mut Component<S> {
        &mut *self.component
    }

    /// The request exchange.
    pub fn exchange(&self) -> &Exchange<'c> {
        &*self.exchange
    }

    /// The request exchange, mutably.
    pub fn exchange_mut(&mut self) -> &mut Exchange<'c> {
        &mut *self.exchange
    }

    /// The component instance and the exchange, both mutably.
    pub fn parts_mut(&mut self) -> (&mut Component<S>, &mut Exchange<'c>) {
        (&mut *self.component, &mut *self.exchange)
    }

    /// The targeted standalone entry point.
    pub fn standalone(&self) -> &StandaloneName {
        &self.standalone
    }

    /// The targeted verb, if dispatching.
    pub fn verb(&self) -> Option<Verb> {
        self.verb
    }

    /// The phases run in this context so far.
    pub fn phases(&self) -> Phases {
        self.ran
    }

    pub(crate) fn mark(&mut self, phase: Phase) {
        self.ran |= phase.flag();
    }

    /// The requested format.
    pub fn format(&self) -> Format {
        self.exchange.format()
    }

    /// A request parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.exchange.param(name)
    }

    /// Whether the request already has a response.
    pub fn is_responded(&self) -> bool {
        self.exchange.is_responded()
    }

    /// Send the terminal response.
    pub fn respond(&mut self, response: Response) -> Result<(), DispatchError> {
        self.exchange.respond(response)
    }

    /// Send a `303 See Other` redirect.
    pub fn redirect(&mut self, location: impl Into<String>) -> Result<(), DispatchError> {
        self.exchange.redirect(location)
    }

    /// Finalize the render of the targeted standalone entry point.
    ///
    /// See [`render::finalize`].
    pub fn render_standalone(
        &mut self,
        status: Option<StatusCode>,
    ) -> Result<Finalized, DispatchError>
    where
        S: Clone,
    {
        render::finalize_in(self, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{component::ComponentDef, testing::RecordingController};

    #[derive(Debug, Clone, Default, PartialEq)]
    struct State {
        title: String,
        views: u32,
    }

    struct Helper {
        prefix: &'static str,
    }

    fn fixture() -> (Component<State>, RecordingController) {
        let def = ComponentDef::builder("posts/show").build().unwrap();
        (
            Component::new(&def, State::default()),
            RecordingController::new(Format::Html),
        )
    }

    #[test]
    fn test_without_helper_both_forms_write_the_instance() {
        let (mut component, controller) = fixture();
        let mut exchange = Exchange::new(controller);
        let mut ctx = RequestContext::new(&mut component, &mut exchange);

        ctx.evaluate(|ctx| ctx.state_mut().views += 1);
        ctx.evaluate_with_backfire(|ctx| ctx.state_mut().views += 1);

        assert!(!ctx.has_helper());
        assert_eq!(component.state().views, 2);
    }

    #[test]
    fn test_plain_evaluate_with_helper_leaves_instance_untouched() {
        let (mut component, controller) = fixture();
        let mut exchange = Exchange::new(controller);
        let mut helper = Helper { prefix: "Re: " };
        let mut ctx = RequestContext::with_helper(&mut component, &mut exchange, &mut helper);

        ctx.evaluate(|ctx| {
            let prefix = ctx.helper::<Helper>().unwrap().prefix;
            ctx.state_mut().title = format!("{prefix}hello");
        });

        assert_eq!(ctx.state().title, "Re: hello");
        assert_eq!(ctx.component().state().title, "");
    }

    #[test]
    fn test_backfire_is_visible_to_next_primary_evaluation() {
        let (mut component, controller) = fixture();
        let mut exchange = Exchange::new(controller);
        let mut helper = Helper { prefix: "" };

        {
            let mut ctx =
                RequestContext::with_helper(&mut component, &mut exchange, &mut helper);
            ctx.evaluate_with_backfire(|ctx| ctx.state_mut().title = "loaded".into());
        }

        let mut ctx = RequestContext::new(&mut component, &mut exchange);
        let seen = ctx.evaluate(|ctx| ctx.state().title.clone());
        assert_eq!(seen, "loaded");
    }

    #[test]
    fn test_backfire_overwrites_direct_instance_writes() {
        let (mut component, controller) = fixture();
        let mut exchange = Exchange::new(controller);
        let mut helper = Helper { prefix: "" };
        let mut ctx = RequestContext::with_helper(&mut component, &mut exchange, &mut helper);

        ctx.evaluate_with_backfire(|ctx| {
            ctx.component_mut().state_mut().views = 3;
            ctx.state_mut().title = "secondary".into();
        });
        assert_eq!(ctx.component().state().views, 0);
        assert_eq!(ctx.component().state().title, "secondary");

        ctx.evaluate_with_backfire(|ctx| {
            ctx.component_mut().state_mut().views = 3;
            ctx.transfer_from_primary();
        });
        assert_eq!(ctx.component().state().views, 3);
        assert_eq!(ctx.component().state().title, "secondary");
    }

    #[test]
    fn test_transfer_from_primary_refreshes_secondary() {
        let (mut component, controller) = fixture();
        let mut exchange = Exchange::new(controller);
        let mut helper = Helper { prefix: "" };
        let mut ctx = RequestContext::with_helper(&mut component, &mut exchange, &mut helper);

        ctx.component_mut().state_mut().views = 7;
        assert_eq!(ctx.state().views, 0);
        ctx.transfer_from_primary();
        assert_eq!(ctx.state().views, 7);
    }

    #[test]
    fn test_helper_downcast_mismatch_is_none() {
        let (mut component, controller) = fixture();
        let mut exchange = Exchange::new(controller);
        let mut helper = Helper { prefix: "" };
        let mut ctx = RequestContext::with_helper(&mut component, &mut exchange, &mut helper);

        assert!(ctx.helper::<String>().is_none());
        ctx.helper_mut::<Helper>().unwrap().prefix = "x";
        assert_eq!(ctx.helper::<Helper>().unwrap().prefix, "x");
    }

    #[test]
    fn test_respond_goes_through_exchange() {
        let (mut component, controller) = fixture();
        let mut exchange = Exchange::new(controller.clone());
        let mut ctx = RequestContext::new(&mut component, &mut exchange)
            .for_target(StandaloneName::from("export"), Some(Verb::Get));

        assert_eq!(ctx.standalone(), &StandaloneName::from("export"));
        assert_eq!(ctx.verb(), Some(Verb::Get));
        ctx.redirect("/elsewhere").unwrap();
        assert!(ctx.is_responded());
        assert!(ctx.respond(Response::text("again")).is_err());
        assert_eq!(controller.count(), 1);
    }
}
