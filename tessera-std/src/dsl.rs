//! The declarative configuration DSL.
//!
//! [`StandaloneDsl`] and [`VerbDsl`] record declarations into a configuration
//! tree. They never execute blocks; the tree is resolved into typed
//! configurations when the component definition is built.
//!
//! ```rust,ignore
//! ComponentDef::<PostState>::builder("posts/edit")
//!     .standalone(StandaloneName::DEFAULT, |s| {
//!         s.path("posts/:id/edit").layout("admin");
//!         s.verb(Verb::Get, |v| {
//!             v.load_data(|ctx| { ctx.state_mut().post = Some(find(ctx.param("id"))?); Ok(()) })
//!                 .authorize(|ctx| ctx.state().post.is_some())
//!                 .respond(|ctx| { ctx.render_standalone(None)?; Ok(()) });
//!         });
//!     })
//! ```

use crate::{
    block::{Block, Node, RespondBlock},
    context::RequestContext,
};
use std::{borrow::Cow, sync::Arc};
use tessera_core::{BoxError, ConfigKey, Format, RespondFormat, Scalar, Verb};

/// Keys the framework gives meaning to.
pub(crate) mod keys {
    use tessera_core::ConfigKey;

    pub const PATH: ConfigKey = ConfigKey::Field("path");
    pub const LAYOUT: ConfigKey = ConfigKey::Field("layout");
    pub const VERBS: ConfigKey = ConfigKey::Field("verbs");
    pub const LOAD_DATA: ConfigKey = ConfigKey::Field("load_data");
    pub const ASSIGN_ATTRIBUTES: ConfigKey = ConfigKey::Field("assign_attributes");
    pub const AUTHORIZE: ConfigKey = ConfigKey::Field("authorize");
    pub const STORE_DATA: ConfigKey = ConfigKey::Field("store_data");
    pub const RESPOND: ConfigKey = ConfigKey::Field("respond");
}

/// Records the declarations of one standalone configuration.
pub struct StandaloneDsl<S> {
    node: Node<S>,
}

impl<S> StandaloneDsl<S> {
    pub(crate) fn new() -> Self {
        Self { node: Node::empty() }
    }

    pub(crate) fn into_node(self) -> Node<S> {
        self.node
    }

    /// Set the path the host routes to this entry point.
    pub fn path(&mut self, path: impl Into<String>) -> &mut Self {
        self.node
            .merge_at(keys::PATH, Node::Scalar(Scalar::Str(path.into())));
        self
    }

    /// Set the layout used when rendering this entry point.
    pub fn layout(&mut self, layout: impl Into<String>) -> &mut Self {
        self.node
            .merge_at(keys::LAYOUT, Node::Scalar(Scalar::Str(layout.into())));
        self
    }

    /// Set a free-form scalar, readable through
    /// [`StandaloneConfig::extra`](crate::config::StandaloneConfig::extra).
    pub fn set(&mut self, key: impl Into<Cow<'static, str>>, value: impl Into<Scalar>) -> &mut Self {
        self.node
            .merge_at(ConfigKey::Named(key.into()), Node::Scalar(value.into()));
        self
    }

    /// Declare (or extend) how this entry point answers `verb`.
    pub fn verb(&mut self, verb: Verb, dsl: impl FnOnce(&mut VerbDsl<S>)) -> &mut Self {
        let mut verb_dsl = VerbDsl::new();
        dsl(&mut verb_dsl);
        let mut verbs = Node::empty();
        verbs.merge_at(ConfigKey::Verb(verb), verb_dsl.node);
        self.node.merge_at(keys::VERBS, verbs);
        self
    }
}

/// Records the blocks of one verb configuration.
pub struct VerbDsl<S> {
    node: Node<S>,
}

impl<S> VerbDsl<S> {
    fn new() -> Self {
        Self { node: Node::empty() }
    }

    fn effect(
        &mut self,
        key: ConfigKey,
        block: impl Fn(&mut RequestContext<'_, '_, S>) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> &mut Self {
        self.node
            .merge_at(key, Node::Block(Block::Effect(Arc::new(block))));
        self
    }

    /// Load the data this verb operates on. Runs with backfire.
    pub fn load_data(
        &mut self,
        block: impl Fn(&mut RequestContext<'_, '_, S>) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> &mut Self {
        self.effect(keys::LOAD_DATA, block)
    }

    /// Assign request attributes onto the loaded data. Runs with backfire.
    pub fn assign_attributes(
        &mut self,
        block: impl Fn(&mut RequestContext<'_, '_, S>) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> &mut Self {
        self.effect(keys::ASSIGN_ATTRIBUTES, block)
    }

    /// Decide whether the current caller may access this verb. Mandatory.
    pub fn authorize(
        &mut self,
        block: impl Fn(&mut RequestContext<'_, '_, S>) -> bool + Send + Sync + 'static,
    ) -> &mut Self {
        self.node.merge_at(
            keys::AUTHORIZE,
            Node::Block(Block::Authorize(Arc::new(block))),
        );
        self
    }

    /// Persist the data. Runs with backfire.
    pub fn store_data(
        &mut self,
        block: impl Fn(&mut RequestContext<'_, '_, S>) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> &mut Self {
        self.effect(keys::STORE_DATA, block)
    }

    /// The respond block used when no block matches the requested format.
    pub fn respond(
        &mut self,
        block: impl Fn(&mut RequestContext<'_, '_, S>) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> &mut Self {
        self.respond_for(RespondFormat::Fallback, Arc::new(block))
    }

    /// The respond block for one exact format.
    pub fn respond_to(
        &mut self,
        format: Format,
        block: impl Fn(&mut RequestContext<'_, '_, S>) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> &mut Self {
        self.respond_for(RespondFormat::Exact(format), Arc::new(block))
    }

    /// Store an already built respond block, e.g. one from
    /// [`render_standalone_block`](crate::render::render_standalone_block).
    pub fn respond_with(&mut self, format: RespondFormat, block: RespondBlock<S>) -> &mut Self {
        self.respond_for(format, block)
    }

    fn respond_for(&mut self, format: RespondFormat, block: RespondBlock<S>) -> &mut Self {
        let format = match format {
            RespondFormat::Exact(format) => RespondFormat::Exact(format.normalized()),
            RespondFormat::Fallback => RespondFormat::Fallback,
        };
        let mut responds = Node::empty();
        responds.merge_at(ConfigKey::Respond(format), Node::Block(Block::Respond(block)));
        self.node.merge_at(keys::RESPOND, responds);
        self
    }
}
