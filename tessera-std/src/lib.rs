//! # tessera-std
//!
//! Standard implementations for the Tessera component dispatch framework.
//!
//! This crate provides:
//! - **Component definitions**: [`ComponentDef`] built through the
//!   [`ComponentBuilder`] configuration DSL, with inheritance and deep-merge
//! - **Resolved configurations**: [`StandaloneConfig`], [`VerbConfig`]
//! - **Request evaluation**: [`RequestContext`], [`Exchange`], [`RequestScope`]
//! - **Dispatch**: [`Dispatcher`] and the overridable [`Lifecycle`]
//! - **Rendering**: [`finalize`](render::finalize) and the [`Renderer`] trait
//! - **Models and forms**: [`AttrGroups`], [`Form`]
//! - **Testing**: doubles in [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core
pub use tessera_core;

mod macros;
pub(crate) use macros::trace_event;

// Modules
pub mod block;
pub mod component;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod dsl;
pub mod exchange;
pub mod form;
pub mod model;
pub mod render;
pub mod scope;
pub mod settings;
pub mod testing;

pub use block::{AuthorizeBlock, Block, EffectBlock, Node, RespondBlock};
pub use component::{Component, ComponentBuilder, ComponentDef};
pub use config::{StandaloneConfig, VerbConfig};
pub use context::RequestContext;
#[cfg(feature = "tracing")]
pub use dispatch::TracingLifecycle;
pub use dispatch::{Dispatched, Dispatcher, Lifecycle, Prepared, StandardLifecycle};
pub use dsl::{StandaloneDsl, VerbDsl};
pub use exchange::{Exchange, Responder};
pub use form::{
    AttrFormHelper, Form, FormBuilder, FormError, FormRenderer, RenderedForm, Schema,
    SchemaBuilder, SubmitPath, Suggestion,
};
pub use model::{Attr, AttrGroup, AttrGroups, FieldKind, Model};
pub use render::{Finalized, FnRenderer, Renderer, finalize, render_standalone_block};
pub use scope::RequestScope;
pub use settings::Settings;
