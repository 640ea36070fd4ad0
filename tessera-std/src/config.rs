//! Resolved, immutable standalone and verb configurations.
//!
//! A component definition resolves the merged configuration tree of every
//! standalone name into a [`StandaloneConfig`] when it is built. Resolution
//! is where structural mistakes are caught: a verb without an authorize
//! block, a key holding the wrong kind of node, or a key with no meaning.
//! After resolution the configurations are only read, so they are shared
//! between concurrently processed requests through `Arc`.

use crate::block::{AuthorizeBlock, Block, EffectBlock, Node, RespondBlock};
use std::{collections::BTreeMap, fmt, sync::Arc};
use tessera_core::{
    ConfigError, ConfigKey, ConfigMap, Format, RespondFormat, Scalar, StandaloneName, Verb,
};

/// The resolved configuration of one standalone entry point.
pub struct StandaloneConfig<S> {
    name: StandaloneName,
    path: Option<String>,
    layout: Option<String>,
    extras: BTreeMap<String, Scalar>,
    verbs: BTreeMap<Verb, Arc<VerbConfig<S>>>,
}

impl<S> StandaloneConfig<S> {
    /// Resolve a merged configuration tree.
    pub(crate) fn resolve(
        component: &Arc<str>,
        name: &StandaloneName,
        node: &Node<S>,
    ) -> Result<Self, ConfigError> {
        let location = name.to_string();
        let map = expect_map(node, &location)?;

        let mut config = StandaloneConfig {
            name: name.clone(),
            path: None,
            layout: None,
            extras: BTreeMap::new(),
            verbs: BTreeMap::new(),
        };

        for (key, child) in map {
            let key_path = format!("{location}.{key}");
            match key {
                ConfigKey::Field("path") => config.path = Some(expect_str(child, &key_path)?),
                ConfigKey::Field("layout") => config.layout = Some(expect_str(child, &key_path)?),
                ConfigKey::Field("verbs") => {
                    for (verb_key, verb_node) in expect_map(child, &key_path)? {
                        let ConfigKey::Verb(verb) = verb_key else {
                            return Err(unexpected(component, &format!("{key_path}.{verb_key}")));
                        };
                        let verb_config = VerbConfig::resolve(component, name, *verb, verb_node)?;
                        config.verbs.insert(*verb, Arc::new(verb_config));
                    }
                }
                ConfigKey::Named(extra) => {
                    let scalar = child.as_scalar().ok_or_else(|| ConfigError::TypeMismatch {
                        key: key_path.clone(),
                        expected: "scalar",
                        found: child.kind(),
                    })?;
                    config.extras.insert(extra.to_string(), scalar.clone());
                }
                _ => return Err(unexpected(component, &key_path)),
            }
        }

        Ok(config)
    }

    /// The standalone name.
    pub fn name(&self) -> &StandaloneName {
        &self.name
    }

    /// The routed path, if declared.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// The layout used when rendering, if declared.
    pub fn layout(&self) -> Option<&str> {
        self.layout.as_deref()
    }

    /// A free-form scalar set with `StandaloneDsl::set`.
    pub fn extra(&self, key: &str) -> Option<&Scalar> {
        self.extras.get(key)
    }

    /// The configuration for `verb`, if declared.
    pub fn verb(&self, verb: Verb) -> Option<&Arc<VerbConfig<S>>> {
        self.verbs.get(&verb)
    }

    /// The declared verbs, in order.
    pub fn verbs(&self) -> impl Iterator<Item = Verb> + '_ {
        self.verbs.keys().copied()
    }
}

impl<S> fmt::Debug for StandaloneConfig<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandaloneConfig")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("layout", &self.layout)
            .field("extras", &self.extras)
            .field("verbs", &self.verbs.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// The resolved configuration of one verb of a standalone entry point.
pub struct VerbConfig<S> {
    standalone: StandaloneName,
    verb: Verb,
    load_data: Option<EffectBlock<S>>,
    assign_attributes: Option<EffectBlock<S>>,
    authorize: AuthorizeBlock<S>,
    store_data: Option<EffectBlock<S>>,
    respond: BTreeMap<RespondFormat, RespondBlock<S>>,
}

impl<S> VerbConfig<S> {
    fn resolve(
        component: &Arc<str>,
        standalone: &StandaloneName,
        verb: Verb,
        node: &Node<S>,
    ) -> Result<Self, ConfigError> {
        let location = format!("{standalone}.verbs.{verb}");
        let map = expect_map(node, &location)?;

        let mut load_data = None;
        let mut assign_attributes = None;
        let mut authorize = None;
        let mut store_data = None;
        let mut respond = BTreeMap::new();

        for (key, child) in map {
            let key_path = format!("{location}.{key}");
            match key {
                ConfigKey::Field("load_data") => load_data = Some(expect_effect(child, &key_path)?),
                ConfigKey::Field("assign_attributes") => {
                    assign_attributes = Some(expect_effect(child, &key_path)?)
                }
                ConfigKey::Field("store_data") => store_data = Some(expect_effect(child, &key_path)?),
                ConfigKey::Field("authorize") => match child {
                    Node::Block(Block::Authorize(block)) => authorize = Some(Arc::clone(block)),
                    other => return Err(mismatch(&key_path, "authorize block", other)),
                },
                ConfigKey::Field("respond") => {
                    for (format_key, block) in expect_map(child, &key_path)? {
                        let format_path = format!("{location}.{format_key}");
                        let ConfigKey::Respond(format) = format_key else {
                            return Err(unexpected(component, &format_path));
                        };
                        match block {
                            Node::Block(Block::Respond(block)) => {
                                respond.insert(format.clone(), Arc::clone(block));
                            }
                            other => return Err(mismatch(&format_path, "respond block", other)),
                        }
                    }
                }
                _ => return Err(unexpected(component, &key_path)),
            }
        }

        let authorize = authorize.ok_or_else(|| ConfigError::MissingAuthorize {
            component: component.to_string(),
            standalone: standalone.clone(),
            verb,
        })?;

        Ok(VerbConfig {
            standalone: standalone.clone(),
            verb,
            load_data,
            assign_attributes,
            authorize,
            store_data,
            respond,
        })
    }

    /// The verb this configuration answers.
    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// The standalone entry point this verb belongs to.
    pub fn standalone(&self) -> &StandaloneName {
        &self.standalone
    }

    /// The load-data block, if declared.
    pub fn load_data(&self) -> Option<&EffectBlock<S>> {
        self.load_data.as_ref()
    }

    /// The assign-attributes block, if declared.
    pub fn assign_attributes(&self) -> Option<&EffectBlock<S>> {
        self.assign_attributes.as_ref()
    }

    /// The authorize block.
    pub fn authorize(&self) -> &AuthorizeBlock<S> {
        &self.authorize
    }

    /// The store-data block, if declared.
    pub fn store_data(&self) -> Option<&EffectBlock<S>> {
        self.store_data.as_ref()
    }

    /// Select the respond block for `format`: the exact entry, else the
    /// fallback entry. Format names compare case-insensitively.
    pub fn respond_block_for(&self, format: &Format) -> Option<&RespondBlock<S>> {
        self.respond
            .get(&RespondFormat::Exact(format.clone().normalized()))
            .or_else(|| self.respond.get(&RespondFormat::Fallback))
    }

    /// The formats with a respond block.
    pub fn respond_formats(&self) -> impl Iterator<Item = &RespondFormat> + '_ {
        self.respond.keys()
    }
}

impl<S> fmt::Debug for VerbConfig<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerbConfig")
            .field("standalone", &self.standalone)
            .field("verb", &self.verb)
            .field("load_data", &self.load_data.is_some())
            .field("assign_attributes", &self.assign_attributes.is_some())
            .field("store_data", &self.store_data.is_some())
            .field("respond", &self.respond.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn expect_map<'n, S>(node: &'n Node<S>, key: &str) -> Result<&'n ConfigMap<Block<S>>, ConfigError> {
    node.as_map().ok_or_else(|| mismatch(key, "map", node))
}

fn expect_str<S>(node: &Node<S>, key: &str) -> Result<String, ConfigError> {
    node.as_scalar()
        .and_then(Scalar::as_str)
        .map(str::to_string)
        .ok_or_else(|| mismatch(key, "string", node))
}

fn expect_effect<S>(node: &Node<S>, key: &str) -> Result<EffectBlock<S>, ConfigError> {
    match node {
        Node::Block(Block::Effect(block)) => Ok(Arc::clone(block)),
        other => Err(mismatch(key, "effect block", other)),
    }
}

fn mismatch<S>(key: &str, expected: &'static str, found: &Node<S>) -> ConfigError {
    let found = match found {
        Node::Block(block) => block.kind(),
        other => other.kind(),
    };
    ConfigError::TypeMismatch {
        key: key.to_string(),
        expected,
        found,
    }
}

fn unexpected(component: &str, key: &str) -> ConfigError {
    ConfigError::UnexpectedKey {
        component: component.to_string(),
        key: key.to_string(),
    }
}
