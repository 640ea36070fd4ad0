//! The per-request exchange between the framework and the host.
//!
//! An [`Exchange`] wraps the host's [`Controller`] together with the state
//! that belongs to one request: the [`RequestScope`], the shared
//! [`Settings`] and whether a response has been emitted.
//!
//! # Single emission
//!
//! The only way to reach [`Controller::deliver`] is through a [`Responder`],
//! and [`Exchange::take_responder`] hands out a responder only while
//! nothing has been emitted. Sending consumes the responder, so a request
//! can never produce two responses.

use crate::{scope::RequestScope, settings::Settings};
use std::{fmt, sync::Arc};
use tessera_core::{Controller, DispatchError, Format, Response, ResponseKind};

/// One request's exchange with the host.
pub struct Exchange<'c> {
    controller: Box<dyn Controller + 'c>,
    emitted: Option<ResponseKind>,
    scope: RequestScope,
    settings: Arc<Settings>,
}

impl<'c> Exchange<'c> {
    /// Start a request exchange with default settings.
    pub fn new(controller: impl Controller + 'c) -> Self {
        Self {
            controller: Box::new(controller),
            emitted: None,
            scope: RequestScope::new(),
            settings: Arc::new(Settings::default()),
        }
    }

    /// Use shared framework settings.
    pub fn with_settings(mut self, settings: Arc<Settings>) -> Self {
        self.settings = settings;
        self
    }

    /// The framework settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The format requested by the host.
    pub fn format(&self) -> Format {
        self.controller.format()
    }

    /// A request parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.controller.param(name)
    }

    /// The request scope.
    pub fn scope(&self) -> &RequestScope {
        &self.scope
    }

    /// The request scope, mutably.
    pub fn scope_mut(&mut self) -> &mut RequestScope {
        &mut self.scope
    }

    /// Whether a response has been emitted.
    pub fn is_responded(&self) -> bool {
        self.emitted.is_some()
    }

    /// The kind of the emitted response, if any.
    pub fn emitted(&self) -> Option<ResponseKind> {
        self.emitted
    }

    /// Take the response channel.
    ///
    /// Fails with [`DispatchError::AlreadyResponded`] once a response was
    /// sent.
    pub fn take_responder(&mut self) -> Result<Responder<'_, 'c>, DispatchError> {
        if self.emitted.is_some() {
            return Err(DispatchError::AlreadyResponded);
        }
        Ok(Responder { exchange: self })
    }

    /// Send `response` to the host.
    pub fn respond(&mut self, response: Response) -> Result<(), DispatchError> {
        self.take_responder()?.send(response);
        Ok(())
    }

    /// Send a `303 See Other` redirect to the host.
    pub fn redirect(&mut self, location: impl Into<String>) -> Result<(), DispatchError> {
        self.respond(Response::redirect(location))
    }
}

impl fmt::Debug for Exchange<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exchange")
            .field("format", &self.controller.format())
            .field("emitted", &self.emitted)
            .field("scope", &self.scope)
            .finish()
    }
}

/// The single-use response channel of an [`Exchange`].
#[must_use = "a responder does nothing until `send` is called"]
pub struct Responder<'e, 'c> {
    exchange: &'e mut Exchange<'c>,
}

impl Responder<'_, '_> {
    /// Deliver the terminal response.
    pub fn send(self, response: Response) {
        let kind = response.kind();
        crate::trace_event!(debug, ?kind, status = %response.status(), "response emitted");
        self.exchange.emitted = Some(kind);
        self.exchange.controller.deliver(response);
    }
}
