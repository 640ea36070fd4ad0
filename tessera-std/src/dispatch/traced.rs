//! A lifecycle decorator that traces every phase.

use super::Lifecycle;
use crate::{config::VerbConfig, context::RequestContext};
use tessera_core::{DispatchError, Flow, Phase};

/// Wraps a lifecycle and runs each top-level phase inside a `phase` span.
///
/// Failures are recorded as `debug` events, access denials as `info`.
///
/// ```rust,ignore
/// let dispatcher = Dispatcher::with_lifecycle(TracingLifecycle::new(StandardLifecycle));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLifecycle<L> {
    inner: L,
}

impl<L> TracingLifecycle<L> {
    /// Trace `inner`.
    pub fn new(inner: L) -> Self {
        Self { inner }
    }

    /// The wrapped lifecycle.
    pub fn inner(&self) -> &L {
        &self.inner
    }
}

impl<S: Clone, L: Lifecycle<S>> Lifecycle<S> for TracingLifecycle<L> {
    fn register_root(&self, ctx: &mut RequestContext<'_, '_, S>) -> Result<Flow, DispatchError> {
        self.inner.register_root(ctx)
    }

    fn load_data(
        &self,
        ctx: &mut RequestContext<'_, '_, S>,
        config: &VerbConfig<S>,
    ) -> Result<Flow, DispatchError> {
        self.inner.load_data(ctx, config)
    }

    fn assign_attributes(
        &self,
        ctx: &mut RequestContext<'_, '_, S>,
        config: &VerbConfig<S>,
    ) -> Result<Flow, DispatchError> {
        self.inner.assign_attributes(ctx, config)
    }

    fn authorize(
        &self,
        ctx: &mut RequestContext<'_, '_, S>,
        config: &VerbConfig<S>,
    ) -> Result<Flow, DispatchError> {
        self.inner.authorize(ctx, config)
    }

    fn store_data(
        &self,
        ctx: &mut RequestContext<'_, '_, S>,
        config: &VerbConfig<S>,
    ) -> Result<Flow, DispatchError> {
        self.inner.store_data(ctx, config)
    }

    fn respond(
        &self,
        ctx: &mut RequestContext<'_, '_, S>,
        config: &VerbConfig<S>,
    ) -> Result<Flow, DispatchError> {
        self.inner.respond(ctx, config)
    }

    fn run_phase(
        &self,
        phase: Phase,
        ctx: &mut RequestContext<'_, '_, S>,
        config: &VerbConfig<S>,
    ) -> Result<Flow, DispatchError> {
        let span = tracing::debug_span!(
            "phase",
            %phase,
            component = %ctx.component().identity(),
            standalone = %config.standalone(),
            verb = %config.verb(),
        );
        let _enter = span.enter();

        let result = self.inner.run_phase(phase, ctx, config);
        match &result {
            Ok(flow) => tracing::trace!(?flow, "phase finished"),
            Err(err) if err.is_access_denied() => tracing::info!(error = %err, "access denied"),
            Err(err) => tracing::debug!(error = %err, "phase failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        component::{Component, ComponentDef},
        dispatch::{Dispatcher, StandardLifecycle},
        exchange::Exchange,
        testing::RecordingController,
    };
    use std::{
        fmt,
        sync::{Arc, Mutex},
    };
    use tessera_core::{Format, Response, StandaloneName, Verb};
    use tracing::{
        Subscriber,
        field::{Field, Visit},
        span,
    };
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    /// Records the `phase` field of every `phase` span opened.
    #[derive(Clone, Default)]
    struct PhaseSpans(Arc<Mutex<Vec<String>>>);

    impl PhaseSpans {
        fn names(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    impl<S: Subscriber> Layer<S> for PhaseSpans {
        fn on_new_span(&self, attrs: &span::Attributes<'_>, _id: &span::Id, _ctx: Context<'_, S>) {
            if attrs.metadata().name() != "phase" {
                return;
            }
            let mut field = PhaseField(None);
            attrs.record(&mut field);
            if let Some(phase) = field.0 {
                self.0.lock().unwrap().push(phase);
            }
        }
    }

    struct PhaseField(Option<String>);

    impl Visit for PhaseField {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "phase" {
                self.0 = Some(format!("{value:?}"));
            }
        }
    }

    fn counter_def(step: u32) -> Arc<ComponentDef<u32>> {
        ComponentDef::<u32>::builder("counter")
            .standalone(StandaloneName::DEFAULT, |s| {
                s.verb(Verb::Post, |v| {
                    v.load_data(move |ctx| {
                        *ctx.state_mut() += step;
                        Ok(())
                    })
                    .authorize(|ctx| *ctx.state() > 0)
                    .respond(|ctx| {
                        let count = *ctx.state();
                        ctx.respond(Response::text(count.to_string()))?;
                        Ok(())
                    });
                });
            })
            .build()
            .unwrap()
    }

    fn traced_dispatch(step: u32) -> (Result<bool, DispatchError>, Vec<String>) {
        let spans = PhaseSpans::default();
        let subscriber = tracing_subscriber::registry().with(spans.clone());
        let def = counter_def(step);
        let mut exchange = Exchange::new(RecordingController::new(Format::Html));
        let mut component = Component::new(&def, 0);

        let result = tracing::subscriber::with_default(subscriber, || {
            Dispatcher::with_lifecycle(TracingLifecycle::new(StandardLifecycle))
                .access(&mut component, &mut exchange, &StandaloneName::DEFAULT, Verb::Post)
                .map(|dispatched| dispatched.completed())
        });
        (result, spans.names())
    }

    #[test]
    fn test_opens_a_span_per_phase() {
        let (result, spans) = traced_dispatch(1);

        assert!(result.unwrap());
        let expected: Vec<_> = Phase::PIPELINE.iter().map(|p| p.to_string()).collect();
        assert_eq!(spans, expected);
    }

    #[test]
    fn test_denied_dispatch_has_no_spans_past_authorize() {
        let (result, spans) = traced_dispatch(0);

        assert!(result.unwrap_err().is_access_denied());
        assert_eq!(
            spans,
            vec!["root_registration", "load_data", "assign_attributes", "authorize"]
        );
    }

    #[test]
    fn test_traced_dispatch_behaves_like_inner() {
        let def = counter_def(1);
        let controller = RecordingController::new(Format::Html);
        let mut exchange = Exchange::new(controller.clone());
        let mut component = Component::new(&def, 0);

        let dispatcher = Dispatcher::with_lifecycle(TracingLifecycle::new(StandardLifecycle));
        let dispatched = dispatcher
            .access(&mut component, &mut exchange, &StandaloneName::DEFAULT, Verb::Post)
            .unwrap();

        assert!(dispatched.completed());
        assert_eq!(controller.deliveries(), vec![Response::text("1")]);
    }
}
