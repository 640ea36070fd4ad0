//! Testing utilities for Tessera.
//!
//! This module provides doubles for the host-side collaborators so that
//! component definitions can be exercised without a web layer.
//!
//! # Features
//!
//! - [`RecordingController`]: A controller that records every delivered response
//! - [`StaticRenderer`]: A content renderer returning fixed markup
//! - [`RecordingFormBuilder`]: A form builder that records the inputs it renders

use crate::{context::RequestContext, form::FormBuilder, model::Attr, render::Renderer};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use tessera_core::{BoxError, Controller, Format, Response};

// ============================================================================
// Recording Controller
// ============================================================================

/// A controller that records every response it receives.
///
/// Clones share the recording, so a test can keep one clone and hand the
/// other to an [`Exchange`](crate::exchange::Exchange).
///
/// # Example
///
/// ```rust,ignore
/// let controller = RecordingController::new(Format::Html).with_param("q", "ada");
/// let mut exchange = Exchange::new(controller.clone());
///
/// dispatcher.access(&mut component, &mut exchange, &StandaloneName::DEFAULT, Verb::Get)?;
///
/// assert_eq!(controller.count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct RecordingController {
    format: Format,
    params: HashMap<String, String>,
    deliveries: Arc<Mutex<Vec<Response>>>,
}

impl RecordingController {
    /// Create a controller requesting `format`.
    pub fn new(format: Format) -> Self {
        Self {
            format,
            params: HashMap::new(),
            deliveries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a request parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Get a clone of the delivered responses.
    pub fn deliveries(&self) -> Vec<Response> {
        self.deliveries.lock().unwrap().clone()
    }

    /// Get the number of delivered responses.
    pub fn count(&self) -> usize {
        self.deliveries.lock().unwrap().len()
    }

    /// The most recent response.
    pub fn last(&self) -> Option<Response> {
        self.deliveries.lock().unwrap().last().cloned()
    }
}

impl Controller for RecordingController {
    fn format(&self) -> Format {
        self.format.clone()
    }

    fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    fn deliver(&mut self, response: Response) {
        self.deliveries.lock().unwrap().push(response);
    }
}

// ============================================================================
// Static Renderer
// ============================================================================

/// A renderer returning fixed markup, or none at all.
#[derive(Debug, Clone, Default)]
pub struct StaticRenderer {
    markup: Option<String>,
}

impl StaticRenderer {
    /// Always render `markup`.
    pub fn html(markup: impl Into<String>) -> Self {
        Self {
            markup: Some(markup.into()),
        }
    }

    /// Never render anything.
    pub fn none() -> Self {
        Self { markup: None }
    }
}

impl<S> Renderer<S> for StaticRenderer {
    fn render(&self, _ctx: &mut RequestContext<'_, '_, S>) -> Result<Option<String>, BoxError> {
        Ok(self.markup.clone())
    }
}

// ============================================================================
// Recording Form Builder
// ============================================================================

/// A form builder rendering `[wrapper.attr]` placeholders and recording the
/// attribute names it was asked for.
#[derive(Debug, Clone, Default)]
pub struct RecordingFormBuilder {
    inputs: Arc<Mutex<Vec<String>>>,
}

impl RecordingFormBuilder {
    /// Create a new recording form builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the attribute names rendered so far.
    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

impl FormBuilder for RecordingFormBuilder {
    fn input(&mut self, attr: &Attr, wrapper_key: &str) -> Result<String, BoxError> {
        self.inputs.lock().unwrap().push(attr.name().to_owned());
        Ok(format!("[{wrapper_key}.{}]", attr.name()))
    }
}
