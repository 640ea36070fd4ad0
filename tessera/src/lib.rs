//! # tessera - Component Request Dispatch
//!
//! `tessera` lets reusable components declare, through a nested
//! configuration DSL, how they answer HTTP-like verbs. A request runs
//! through a fixed lifecycle of load data, assign attributes, authorize,
//! store data and respond, and components inherit and deep-merge each
//! other's configuration.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tessera::prelude::*;
//!
//! #[derive(Clone, Default)]
//! struct ShowPost { post: Option<Post> }
//!
//! let def = ComponentDef::<ShowPost>::builder("posts/show")
//!     .standalone(StandaloneName::DEFAULT, |s| {
//!         s.path("posts/:id");
//!         s.verb(Verb::Get, |v| {
//!             v.load_data(|ctx| {
//!                 let id = ctx.param("id").ok_or("id missing")?.parse()?;
//!                 ctx.state_mut().post = Post::find(id);
//!                 Ok(())
//!             })
//!             .authorize(|ctx| ctx.state().post.is_some())
//!             .respond_with(RespondFormat::Fallback, render_standalone_block(None));
//!         });
//!     })
//!     .content_fn(|ctx| Ok(Some(render_post(ctx.state()))))
//!     .build()?;
//!
//! // Per request:
//! let mut component = Component::new(&def, ShowPost::default());
//! let mut exchange = Exchange::new(controller);
//! Dispatcher::new().access(&mut component, &mut exchange, &StandaloneName::DEFAULT, Verb::Get)?;
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use tessera_core::{
    // Errors
    AccessDenied,
    BoxError,
    // Identifiers
    ComponentRef,
    // Configuration tree
    ConfigError,
    ConfigKey,
    ConfigMap,
    ConfigNode,
    // Host contract
    Controller,
    DispatchError,
    // Lifecycle vocabulary
    Flow,
    Format,
    ParseVerbError,
    Phase,
    Phases,
    RespondFormat,
    Response,
    ResponseKind,
    Scalar,
    StandaloneName,
    StatusCode,
    TesseraError,
    Verb,
    version,
};

pub use tessera_std::{
    Component, ComponentBuilder, ComponentDef, Dispatched, Dispatcher, Exchange, Finalized,
    Lifecycle, Prepared, RequestContext, RequestScope, Responder, Settings, StandaloneConfig,
    StandardLifecycle, VerbConfig, finalize, render_standalone_block,
};

#[cfg(feature = "tracing")]
pub use tessera_std::TracingLifecycle;

/// The configuration DSL.
pub mod dsl {
    pub use tessera_std::{
        AuthorizeBlock, Block, EffectBlock, Node, RespondBlock, StandaloneDsl, VerbDsl,
    };
}

/// Standard phase implementations, for lifecycle overrides.
pub mod phases {
    #![allow(clippy::wildcard_imports)]
    pub use tessera_std::dispatch::phases::*;
}

/// Rendering.
pub mod render {
    pub use tessera_std::render::{Finalized, FnRenderer, Renderer, finalize, render_standalone_block};
}

/// Model attribute groups and forms.
pub mod forms {
    pub use tessera_std::{
        Attr, AttrFormHelper, AttrGroup, AttrGroups, FieldKind, Form, FormBuilder, FormError,
        FormRenderer, Model, RenderedForm, Schema, SchemaBuilder, SubmitPath, Suggestion,
    };
    pub use tessera_std::model::{AttrGroupDsl, AttrGroupsBuilder};
    pub use tessera_std::form::{FormFieldsBlock, SchemaField};
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use tessera_std::testing::*;
}

/// Prelude module - common imports for Tessera.
///
/// # Usage
///
/// ```rust,ignore
/// use tessera::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Errors
        AccessDenied,
        BoxError,
        // Definitions
        Component,
        ComponentDef,
        ConfigError,
        DispatchError,
        // Dispatch
        Dispatcher,
        Exchange,
        Flow,
        // Identifiers
        Format,
        Lifecycle,
        RequestContext,
        RespondFormat,
        // Responses
        Response,
        StandaloneName,
        StatusCode,
        Verb,
        render_standalone_block,
    };
}
