//! Request dispatch.
//!
//! The [`Dispatcher`] drives a component through the request lifecycle:
//!
//! ```text
//! root registration
//!   → load data (→ after-load-data hook)
//!   → assign attributes (→ after-assign-attributes hook)
//!   → authorize            false → AccessDenied
//!   → store data
//!   → respond              exact format, else fallback, else NoRespondBlock
//! ```
//!
//! A phase ends the dispatch by failing, by returning [`Flow::Stop`], or by
//! producing a response (e.g. a redirect from load data) before respond.
//! Each phase is a method of [`Lifecycle`]; [`StandardLifecycle`] runs the
//! defaults from [`phases`].

mod lifecycle;
pub mod phases;
#[cfg(feature = "tracing")]
mod traced;

pub use lifecycle::{Lifecycle, StandardLifecycle};
#[cfg(feature = "tracing")]
pub use traced::TracingLifecycle;

use crate::{
    component::Component, config::VerbConfig, context::RequestContext, exchange::Exchange,
};
use std::sync::Arc;
use tessera_core::{
    DispatchError, Flow, Phase, Phases, ResponseKind, StandaloneName, Verb,
};

/// The outcome of a successful dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatched {
    /// The phases that ran, nested hooks included.
    pub phases: Phases,
    /// The phase after which the dispatch stopped early, if it did.
    pub halted_after: Option<Phase>,
    /// The kind of response emitted for the request, if any.
    pub response: Option<ResponseKind>,
}

impl Dispatched {
    /// Whether every top-level phase had its turn.
    pub fn completed(&self) -> bool {
        self.halted_after.is_none()
    }
}

/// A component whose data is ready for an authorization check.
///
/// Authorize blocks typically inspect loaded data, so
/// [`Dispatcher::is_access_permitted`] only accepts a prepared component.
pub struct Prepared<'a, S> {
    component: &'a mut Component<S>,
}

impl<'a, S: Clone> Prepared<'a, S> {
    /// The caller asserts the data authorize reads was supplied when the
    /// component was instantiated.
    pub fn assume_loaded(component: &'a mut Component<S>) -> Self {
        Self { component }
    }

    /// Run the load-data phase (and its after-hook) of `verb` on standalone
    /// entry `name` first.
    pub fn by_loading(
        component: &'a mut Component<S>,
        exchange: &mut Exchange<'_>,
        name: &StandaloneName,
        verb: Verb,
    ) -> Result<Self, DispatchError> {
        let config = component.def().verb_config(name, verb)?;
        let mut ctx = RequestContext::new(&mut *component, exchange)
            .for_target(name.clone(), Some(verb));
        phases::load_data(&mut ctx, &config)?;
        Ok(Self { component })
    }

    /// The prepared component.
    pub fn component(&self) -> &Component<S> {
        &*self.component
    }
}

/// Drives components through the request lifecycle.
///
/// A dispatcher holds no per-request state and can be shared between
/// threads when its lifecycle can.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher<L = StandardLifecycle> {
    lifecycle: L,
}

impl Dispatcher {
    /// A dispatcher running the standard lifecycle.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<L> Dispatcher<L> {
    /// A dispatcher running a custom lifecycle.
    pub fn with_lifecycle(lifecycle: L) -> Self {
        Self { lifecycle }
    }

    /// The lifecycle.
    pub fn lifecycle(&self) -> &L {
        &self.lifecycle
    }

    /// Run the full lifecycle of `config` for `component`.
    pub fn dispatch<S: Clone>(
        &self,
        component: &mut Component<S>,
        config: &VerbConfig<S>,
        exchange: &mut Exchange<'_>,
    ) -> Result<Dispatched, DispatchError>
    where
        L: Lifecycle<S>,
    {
        let mut ctx = RequestContext::new(component, exchange)
            .for_target(config.standalone().clone(), Some(config.verb()));

        crate::trace_event!(
            debug,
            component = %ctx.component().identity(),
            standalone = %config.standalone(),
            verb = %config.verb(),
            format = %ctx.format(),
            "dispatching"
        );

        let mut halted_after = None;
        for phase in Phase::PIPELINE {
            let flow = self.lifecycle.run_phase(phase, &mut ctx, config)?;
            if phase == Phase::Respond {
                break;
            }
            if flow == Flow::Stop || ctx.is_responded() {
                crate::trace_event!(debug, %phase, "dispatch halted");
                halted_after = Some(phase);
                break;
            }
        }

        Ok(Dispatched {
            phases: ctx.phases(),
            halted_after,
            response: ctx.exchange().emitted(),
        })
    }

    /// Host entry point: resolve `verb` on standalone entry `name` from the
    /// component's definition and dispatch it.
    pub fn access<S: Clone>(
        &self,
        component: &mut Component<S>,
        exchange: &mut Exchange<'_>,
        name: &StandaloneName,
        verb: Verb,
    ) -> Result<Dispatched, DispatchError>
    where
        L: Lifecycle<S>,
    {
        let config: Arc<VerbConfig<S>> = component.def().verb_config(name, verb)?;
        self.dispatch(component, &config, exchange)
    }

    /// Whether the caller may access `verb` on standalone entry `name`.
    ///
    /// Runs the authorize phase only; a denial is `Ok(false)`.
    pub fn is_access_permitted<S: Clone>(
        &self,
        prepared: Prepared<'_, S>,
        exchange: &mut Exchange<'_>,
        name: &StandaloneName,
        verb: Verb,
    ) -> Result<bool, DispatchError>
    where
        L: Lifecycle<S>,
    {
        let config = prepared.component.def().verb_config(name, verb)?;
        let mut ctx = RequestContext::new(prepared.component, exchange)
            .for_target(name.clone(), Some(verb));
        match self.lifecycle.authorize(&mut ctx, &config) {
            Ok(_) => Ok(true),
            Err(DispatchError::AccessDenied(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{component::ComponentDef, testing::RecordingController};
    use std::sync::Mutex;
    use tessera_core::{ConfigError, Format, Response};

    #[derive(Debug, Clone, Default)]
    struct State {
        loaded: bool,
        saved: bool,
        allowed: bool,
        log: Vec<&'static str>,
    }

    fn crud_def() -> Arc<ComponentDef<State>> {
        ComponentDef::<State>::builder("posts/edit")
            .after_load_data(|ctx| {
                ctx.state_mut().log.push("after_load_data");
                Ok(())
            })
            .standalone(StandaloneName::DEFAULT, |s| {
                s.verb(Verb::Patch, |v| {
                    v.load_data(|ctx| {
                        ctx.state_mut().log.push("load_data");
                        ctx.state_mut().loaded = true;
                        Ok(())
                    })
                    .authorize(|ctx| ctx.state().allowed)
                    .store_data(|ctx| {
                        ctx.state_mut().log.push("store_data");
                        ctx.state_mut().saved = true;
                        Ok(())
                    })
                    .respond_to(Format::Json, |ctx| {
                        ctx.respond(Response::json(serde_json::json!({ "ok": true })))?;
                        Ok(())
                    })
                    .respond(|ctx| {
                        ctx.redirect("/posts")?;
                        Ok(())
                    });
                });
            })
            .build()
            .unwrap()
    }

    fn allowed() -> State {
        State {
            allowed: true,
            ..State::default()
        }
    }

    #[test]
    fn test_runs_phases_in_order() {
        let controller = RecordingController::new(Format::Html);
        let mut exchange = Exchange::new(controller.clone());
        let mut component = Component::new(&crud_def(), allowed());

        let dispatched = Dispatcher::new()
            .access(&mut component, &mut exchange, &StandaloneName::DEFAULT, Verb::Patch)
            .unwrap();

        assert!(dispatched.completed());
        assert_eq!(
            dispatched.phases,
            Phases::ROOT_REGISTRATION
                | Phases::LOAD_DATA
                | Phases::AFTER_LOAD_DATA
                | Phases::AUTHORIZE
                | Phases::STORE_DATA
                | Phases::RESPOND
        );
        assert_eq!(dispatched.response, Some(ResponseKind::Redirect));
        assert_eq!(
            component.state().log,
            vec!["load_data", "after_load_data", "store_data"]
        );
        assert_eq!(controller.deliveries(), vec![Response::redirect("/posts")]);
    }

    #[test]
    fn test_denied_access_skips_store_and_respond() {
        let controller = RecordingController::new(Format::Html);
        let mut exchange = Exchange::new(controller.clone());
        let mut component = Component::new(&crud_def(), State::default());

        let err = Dispatcher::new()
            .access(&mut component, &mut exchange, &StandaloneName::DEFAULT, Verb::Patch)
            .unwrap_err();

        match err {
            DispatchError::AccessDenied(denied) => {
                assert_eq!(denied.component, component.identity());
                assert_eq!(denied.verb, Verb::Patch);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(component.state().loaded);
        assert!(!component.state().saved);
        assert_eq!(controller.count(), 0);
    }

    #[test]
    fn test_exact_format_wins_over_fallback() {
        let controller = RecordingController::new(Format::Json);
        let mut exchange = Exchange::new(controller.clone());
        let mut component = Component::new(&crud_def(), allowed());

        let dispatched = Dispatcher::new()
            .access(&mut component, &mut exchange, &StandaloneName::DEFAULT, Verb::Patch)
            .unwrap();

        assert_eq!(dispatched.response, Some(ResponseKind::Json));
    }

    #[test]
    fn test_missing_respond_block_is_an_error() {
        let def = ComponentDef::<()>::builder("api/ping")
            .standalone(StandaloneName::DEFAULT, |s| {
                s.verb(Verb::Get, |v| {
                    v.authorize(|_| true).respond_to(Format::Json, |_| Ok(()));
                });
            })
            .build()
            .unwrap();
        let mut exchange = Exchange::new(RecordingController::new(Format::Csv));
        let mut component = Component::new(&def, ());

        let err = Dispatcher::new()
            .access(&mut component, &mut exchange, &StandaloneName::DEFAULT, Verb::Get)
            .unwrap_err();

        assert!(matches!(
            err,
            DispatchError::NoRespondBlock { verb: Verb::Get, format: Format::Csv, .. }
        ));
    }

    #[test]
    fn test_response_from_load_data_halts_pipeline() {
        let def = ComponentDef::<()>::builder("posts/show")
            .standalone(StandaloneName::DEFAULT, |s| {
                s.verb(Verb::Get, |v| {
                    v.load_data(|ctx| {
                        ctx.redirect("/login")?;
                        Ok(())
                    })
                    .authorize(|_| panic!("authorize must not run"))
                    .respond(|_| panic!("respond must not run"));
                });
            })
            .build()
            .unwrap();
        let controller = RecordingController::new(Format::Html);
        let mut exchange = Exchange::new(controller.clone());
        let mut component = Component::new(&def, ());

        let dispatched = Dispatcher::new()
            .access(&mut component, &mut exchange, &StandaloneName::DEFAULT, Verb::Get)
            .unwrap();

        assert_eq!(dispatched.halted_after, Some(Phase::LoadData));
        assert!(!dispatched.phases.ran(Phase::Authorize));
        assert_eq!(controller.deliveries(), vec![Response::redirect("/login")]);
    }

    #[test]
    fn test_block_errors_name_their_phase() {
        let def = ComponentDef::<()>::builder("posts/create")
            .standalone(StandaloneName::DEFAULT, |s| {
                s.verb(Verb::Post, |v| {
                    v.authorize(|_| true)
                        .store_data(|_| Err("disk full".into()))
                        .respond(|_| Ok(()));
                });
            })
            .build()
            .unwrap();
        let mut exchange = Exchange::new(RecordingController::new(Format::Html));
        let mut component = Component::new(&def, ());

        let err = Dispatcher::new()
            .access(&mut component, &mut exchange, &StandaloneName::DEFAULT, Verb::Post)
            .unwrap_err();

        match err {
            DispatchError::Phase { phase, source } => {
                assert_eq!(phase, Phase::StoreData);
                assert_eq!(source.to_string(), "disk full");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_verb_is_a_config_error() {
        let mut exchange = Exchange::new(RecordingController::new(Format::Html));
        let mut component = Component::new(&crud_def(), allowed());

        let err = Dispatcher::new()
            .access(&mut component, &mut exchange, &StandaloneName::DEFAULT, Verb::Delete)
            .unwrap_err();

        assert!(matches!(
            err,
            DispatchError::Config(ConfigError::UnknownVerb { verb: Verb::Delete, .. })
        ));
    }

    #[test]
    fn test_nested_component_does_not_register_root() {
        let def = crud_def();
        let outer = Component::new(&def, allowed());
        let mut inner = Component::new(&def, allowed()).with_parent(outer.identity());
        let mut exchange = Exchange::new(RecordingController::new(Format::Html));

        let dispatched = Dispatcher::new()
            .access(&mut inner, &mut exchange, &StandaloneName::DEFAULT, Verb::Patch)
            .unwrap();

        assert!(!dispatched.phases.ran(Phase::RootRegistration));
        assert!(exchange.scope().root().is_none());
    }

    #[test]
    fn test_overridden_phase_can_stop_the_dispatch() {
        struct ReadOnly {
            skipped: Mutex<Vec<Verb>>,
        }

        impl<S: Clone> Lifecycle<S> for ReadOnly {
            fn store_data(
                &self,
                ctx: &mut RequestContext<'_, '_, S>,
                config: &VerbConfig<S>,
            ) -> Result<Flow, DispatchError> {
                self.skipped.lock().unwrap().push(config.verb());
                ctx.respond(Response::text("read only"))?;
                Ok(Flow::Stop)
            }
        }

        let dispatcher = Dispatcher::with_lifecycle(ReadOnly {
            skipped: Mutex::new(Vec::new()),
        });
        let controller = RecordingController::new(Format::Html);
        let mut exchange = Exchange::new(controller.clone());
        let mut component = Component::new(&crud_def(), allowed());

        let dispatched = dispatcher
            .access(&mut component, &mut exchange, &StandaloneName::DEFAULT, Verb::Patch)
            .unwrap();

        assert_eq!(dispatched.halted_after, Some(Phase::StoreData));
        assert!(!component.state().saved);
        assert_eq!(*dispatcher.lifecycle().skipped.lock().unwrap(), vec![Verb::Patch]);
        assert_eq!(controller.deliveries(), vec![Response::text("read only")]);
    }

    #[test]
    fn test_is_access_permitted() {
        let def = crud_def();
        let mut exchange = Exchange::new(RecordingController::new(Format::Html));

        let mut permitted = Component::new(&def, allowed());
        assert!(
            Dispatcher::new()
                .is_access_permitted(
                    Prepared::assume_loaded(&mut permitted),
                    &mut exchange,
                    &StandaloneName::DEFAULT,
                    Verb::Patch,
                )
                .unwrap()
        );

        let mut denied = Component::new(&def, State::default());
        let prepared = Prepared::by_loading(
            &mut denied,
            &mut exchange,
            &StandaloneName::DEFAULT,
            Verb::Patch,
        )
        .unwrap();
        assert!(prepared.component().state().loaded);
        assert!(
            !Dispatcher::new()
                .is_access_permitted(prepared, &mut exchange, &StandaloneName::DEFAULT, Verb::Patch)
                .unwrap()
        );
        assert!(!exchange.is_responded());
        assert!(exchange.scope().root().is_none());
    }
}
