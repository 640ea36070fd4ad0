//! Component definitions and their builder.
//!
//! A [`ComponentDef`] is built once, at load time, by a [`ComponentBuilder`].
//! Declarations accumulate into per-name configuration trees; `build()`
//! resolves the effective tree of every standalone name in the inheritance
//! chain and freezes the result. The frozen definition is immutable and can
//! be shared between threads via `Arc`.
//!
//! # Example
//!
//! ```rust,ignore
//! let base = ComponentDef::<WidgetState>::builder("base_widget")
//!     .standalone(StandaloneName::DEFAULT, |s| {
//!         s.verb(Verb::Get, |v| {
//!             v.authorize(|_| true)
//!                 .respond(|ctx| { ctx.respond(Response::text("base"))?; Ok(()) });
//!         });
//!     })
//!     .build()?;
//!
//! let widget = ComponentDef::builder("widget")
//!     .inherit(&base)
//!     .standalone(StandaloneName::DEFAULT, |s| {
//!         s.verb(Verb::Get, |v| {
//!             v.respond_to(Format::Json, |ctx| { ctx.respond(Response::json(json!({})))?; Ok(()) });
//!         });
//!     })
//!     .build()?;
//! ```

use crate::{
    block::{EffectBlock, Node},
    config::{StandaloneConfig, VerbConfig},
    context::RequestContext,
    dsl::StandaloneDsl,
    render::Renderer,
};
use std::{
    borrow::Cow,
    collections::{BTreeMap, BTreeSet},
    fmt,
    sync::Arc,
};
use tessera_core::{BoxError, ConfigError, StandaloneName, Verb};

/// Component-wide hooks, inherited through the chain unless overridden.
struct Hooks<S> {
    after_load_data: Option<EffectBlock<S>>,
    after_assign_attributes: Option<EffectBlock<S>>,
    before_render: Option<EffectBlock<S>>,
}

impl<S> Default for Hooks<S> {
    fn default() -> Self {
        Self {
            after_load_data: None,
            after_assign_attributes: None,
            before_render: None,
        }
    }
}

/// A frozen component definition.
pub struct ComponentDef<S> {
    name: Arc<str>,
    parent: Option<Arc<ComponentDef<S>>>,
    declared: BTreeMap<StandaloneName, Node<S>>,
    hooks: Hooks<S>,
    content: Option<Arc<dyn Renderer<S>>>,
    resolved: BTreeMap<StandaloneName, Arc<StandaloneConfig<S>>>,
}

impl<S> ComponentDef<S> {
    /// Start building a definition.
    pub fn builder(name: impl Into<Cow<'static, str>>) -> ComponentBuilder<S> {
        ComponentBuilder::new(name)
    }

    /// The definition name, e.g. `users/show`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn shared_name(&self) -> &Arc<str> {
        &self.name
    }

    /// The definition this one inherits from.
    pub fn parent(&self) -> Option<&Arc<ComponentDef<S>>> {
        self.parent.as_ref()
    }

    /// The inheritance chain, from the most distant ancestor to `self`.
    pub fn lineage(&self) -> Vec<&ComponentDef<S>> {
        let mut chain = Vec::new();
        let mut current = Some(self);
        while let Some(def) = current {
            chain.push(def);
            current = def.parent.as_deref();
        }
        chain.reverse();
        chain
    }

    /// The configuration tree declared for `name` on this definition only.
    pub fn declared(&self, name: &StandaloneName) -> Option<&Node<S>> {
        self.declared.get(name)
    }

    /// The effective configuration tree for `name`: every level's local
    /// declaration, deep-merged from the most distant ancestor to `self`.
    pub fn effective_node(&self, name: &StandaloneName) -> Option<Node<S>> {
        Node::merge_all(
            self.lineage()
                .into_iter()
                .filter_map(|def| def.declared.get(name).cloned()),
        )
    }

    /// The resolved configuration for `name`.
    pub fn standalone(&self, name: &StandaloneName) -> Option<&Arc<StandaloneConfig<S>>> {
        self.resolved.get(name)
    }

    /// The resolved configuration for `name`, or an error naming the
    /// component.
    pub fn standalone_or_err(
        &self,
        name: &StandaloneName,
    ) -> Result<&Arc<StandaloneConfig<S>>, ConfigError> {
        self.standalone(name)
            .ok_or_else(|| ConfigError::UnknownStandalone {
                component: self.name.to_string(),
                standalone: name.clone(),
            })
    }

    /// The resolved configuration of `verb` on standalone entry `name`.
    pub fn verb_config(
        &self,
        name: &StandaloneName,
        verb: Verb,
    ) -> Result<Arc<VerbConfig<S>>, ConfigError> {
        self.standalone_or_err(name)?
            .verb(verb)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownVerb {
                component: self.name.to_string(),
                standalone: name.clone(),
                verb,
            })
    }

    /// All resolved standalone names.
    pub fn standalone_names(&self) -> impl Iterator<Item = &StandaloneName> + '_ {
        self.resolved.keys()
    }

    /// The nearest after-load-data hook in the chain.
    pub fn after_load_data(&self) -> Option<&EffectBlock<S>> {
        self.nearest(|hooks| hooks.after_load_data.as_ref())
    }

    /// The nearest after-assign-attributes hook in the chain.
    pub fn after_assign_attributes(&self) -> Option<&EffectBlock<S>> {
        self.nearest(|hooks| hooks.after_assign_attributes.as_ref())
    }

    /// The nearest before-render hook in the chain.
    pub fn before_render(&self) -> Option<&EffectBlock<S>> {
        self.nearest(|hooks| hooks.before_render.as_ref())
    }

    /// The nearest content renderer in the chain.
    pub fn content(&self) -> Option<&Arc<dyn Renderer<S>>> {
        let mut current = Some(self);
        while let Some(def) = current {
            if let Some(content) = &def.content {
                return Some(content);
            }
            current = def.parent.as_deref();
        }
        None
    }

    fn nearest<'a>(
        &'a self,
        pick: impl Fn(&'a Hooks<S>) -> Option<&'a EffectBlock<S>>,
    ) -> Option<&'a EffectBlock<S>> {
        let mut current = Some(self);
        while let Some(def) = current {
            if let Some(block) = pick(&def.hooks) {
                return Some(block);
            }
            current = def.parent.as_deref();
        }
        None
    }
}

impl<S> fmt::Debug for ComponentDef<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDef")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("standalones", &self.resolved.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ============================================================================
// ComponentBuilder - for constructing definitions
// ============================================================================

/// Builder for a [`ComponentDef`].
///
/// Declarations for the same standalone name deep-merge in call order.
/// Call [`build`](Self::build) to resolve and freeze the definition.
pub struct ComponentBuilder<S> {
    name: Cow<'static, str>,
    parent: Option<Arc<ComponentDef<S>>>,
    declared: BTreeMap<StandaloneName, Node<S>>,
    hooks: Hooks<S>,
    content: Option<Arc<dyn Renderer<S>>>,
}

impl<S> ComponentBuilder<S> {
    /// Create a builder for a definition called `name`.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            declared: BTreeMap::new(),
            hooks: Hooks::default(),
            content: None,
        }
    }

    /// The name of the definition being built.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inherit every declaration and hook of `parent`.
    pub fn inherit(mut self, parent: &Arc<ComponentDef<S>>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    /// Declare (or extend) the standalone configuration `name`.
    pub fn standalone(
        mut self,
        name: impl Into<StandaloneName>,
        dsl: impl FnOnce(&mut StandaloneDsl<S>),
    ) -> Self {
        self.standalone_mut(name, dsl);
        self
    }

    /// Declare (or extend) the standalone configuration `name` (mutable
    /// version).
    pub fn standalone_mut(
        &mut self,
        name: impl Into<StandaloneName>,
        dsl: impl FnOnce(&mut StandaloneDsl<S>),
    ) {
        let mut standalone = StandaloneDsl::new();
        dsl(&mut standalone);
        self.declared
            .entry(name.into())
            .or_default()
            .deep_merge(standalone.into_node());
    }

    /// Declare the standalone configuration `name` without a block.
    pub fn declare_standalone(self, name: impl Into<StandaloneName>) -> Self {
        self.standalone(name, |_| {})
    }

    /// Run after every load-data block of this component.
    pub fn after_load_data(
        mut self,
        block: impl Fn(&mut RequestContext<'_, '_, S>) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.after_load_data = Some(Arc::new(block));
        self
    }

    /// Run after every assign-attributes block of this component.
    pub fn after_assign_attributes(
        mut self,
        block: impl Fn(&mut RequestContext<'_, '_, S>) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.after_assign_attributes = Some(Arc::new(block));
        self
    }

    /// Run before rendering. Producing a response here (e.g. a redirect)
    /// suppresses the render.
    pub fn before_render(
        mut self,
        block: impl Fn(&mut RequestContext<'_, '_, S>) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.before_render = Some(Arc::new(block));
        self
    }

    /// Set the renderer producing this component's markup.
    pub fn content(mut self, renderer: impl Renderer<S> + 'static) -> Self {
        self.content = Some(Arc::new(renderer));
        self
    }

    /// Set the markup renderer from a closure.
    pub fn content_fn(
        self,
        render: impl Fn(&mut RequestContext<'_, '_, S>) -> Result<Option<String>, BoxError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.content(crate::render::FnRenderer::new(render))
    }

    /// Resolve every standalone configuration visible through the
    /// inheritance chain and freeze the definition.
    pub fn build(self) -> Result<Arc<ComponentDef<S>>, ConfigError> {
        let mut def = ComponentDef {
            name: Arc::from(self.name.as_ref()),
            parent: self.parent,
            declared: self.declared,
            hooks: self.hooks,
            content: self.content,
            resolved: BTreeMap::new(),
        };

        let names: BTreeSet<StandaloneName> = def
            .lineage()
            .into_iter()
            .flat_map(|level| level.declared.keys().cloned())
            .collect();

        let mut resolved = BTreeMap::new();
        for name in names {
            let Some(node) = def.effective_node(&name) else {
                continue;
            };
            let config = StandaloneConfig::resolve(&def.name, &name, &node)?;
            resolved.insert(name, Arc::new(config));
        }
        def.resolved = resolved;

        crate::trace_event!(
            debug,
            component = %def.name,
            standalones = def.resolved.len(),
            "component definition built"
        );

        Ok(Arc::new(def))
    }
}
