//! Typed configuration tree.
//!
//! Declarations made through the component DSL are accumulated as a tree of
//! [`ConfigNode`]s. Each node is one of three kinds:
//!
//! - [`ConfigNode::Scalar`] - a plain value such as a layout name
//! - [`ConfigNode::Block`] - a stored block (the payload type `B` is chosen
//!   by the crate that executes blocks)
//! - [`ConfigNode::Map`] - nested keyed nodes
//!
//! # Merge semantics
//!
//! [`ConfigNode::deep_merge`] merges maps key by key, recursively. Every other
//! combination is replaced by the incoming node: later scalars and blocks
//! override earlier ones, and keys absent from the incoming map survive.

use crate::ident::{RespondFormat, Verb};
use std::{
    borrow::Cow,
    collections::{BTreeMap, btree_map::Entry},
    fmt,
};

/// A scalar configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    /// A string value.
    Str(String),
    /// A boolean flag.
    Bool(bool),
    /// An integer.
    Int(i64),
}

impl Scalar {
    /// The string value, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The boolean value, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The integer value, if this is an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Scalar::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Str(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Str(s) => write!(f, "{s:?}"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
        }
    }
}

/// A key within a configuration map.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigKey {
    /// A field known to the framework (`layout`, `verbs`, `authorize`, ...).
    Field(&'static str),
    /// A per-verb entry.
    Verb(Verb),
    /// A per-format respond entry.
    Respond(RespondFormat),
    /// A free-form key set by component authors.
    Named(Cow<'static, str>),
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigKey::Field(name) => f.write_str(name),
            ConfigKey::Verb(verb) => write!(f, "{verb}"),
            ConfigKey::Respond(format) => write!(f, "respond[{format}]"),
            ConfigKey::Named(name) => f.write_str(name),
        }
    }
}

/// Map of configuration nodes, ordered by key.
pub type ConfigMap<B> = BTreeMap<ConfigKey, ConfigNode<B>>;

/// A node of the configuration tree.
#[derive(Debug, Clone)]
pub enum ConfigNode<B> {
    /// A plain value.
    Scalar(Scalar),
    /// A stored block.
    Block(B),
    /// Nested keyed nodes.
    Map(ConfigMap<B>),
}

impl<B> Default for ConfigNode<B> {
    fn default() -> Self {
        ConfigNode::Map(BTreeMap::new())
    }
}

impl<B> ConfigNode<B> {
    /// An empty map node.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The node kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigNode::Scalar(_) => "scalar",
            ConfigNode::Block(_) => "block",
            ConfigNode::Map(_) => "map",
        }
    }

    /// Merge `other` into `self`.
    ///
    /// Maps merge key by key; everything else is replaced by `other`.
    pub fn deep_merge(&mut self, other: ConfigNode<B>) {
        match (self, other) {
            (ConfigNode::Map(base), ConfigNode::Map(overrides)) => {
                for (key, node) in overrides {
                    match base.entry(key) {
                        Entry::Occupied(mut existing) => existing.get_mut().deep_merge(node),
                        Entry::Vacant(slot) => {
                            slot.insert(node);
                        }
                    }
                }
            }
            (slot, other) => *slot = other,
        }
    }

    /// Owned variant of [`deep_merge`](Self::deep_merge).
    pub fn merged(mut self, other: ConfigNode<B>) -> Self {
        self.deep_merge(other);
        self
    }

    /// Deep-merge a sequence of nodes in order. Returns `None` for an empty
    /// sequence.
    pub fn merge_all<I>(nodes: I) -> Option<Self>
    where
        I: IntoIterator<Item = ConfigNode<B>>,
    {
        nodes.into_iter().reduce(ConfigNode::merged)
    }

    /// Insert a child under `key`, merging with an existing child.
    ///
    /// A non-map node is replaced by a map first.
    pub fn merge_at(&mut self, key: ConfigKey, node: ConfigNode<B>) {
        if !matches!(self, ConfigNode::Map(_)) {
            *self = ConfigNode::empty();
        }
        if let ConfigNode::Map(map) = self {
            match map.entry(key) {
                Entry::Occupied(mut existing) => existing.get_mut().deep_merge(node),
                Entry::Vacant(slot) => {
                    slot.insert(node);
                }
            }
        }
    }

    /// The child under `key`, if this is a map containing it.
    pub fn get(&self, key: &ConfigKey) -> Option<&ConfigNode<B>> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Follow a path of keys.
    pub fn get_path(&self, path: &[ConfigKey]) -> Option<&ConfigNode<B>> {
        path.iter().try_fold(self, |node, key| node.get(key))
    }

    /// The map, if this is a map node.
    pub fn as_map(&self) -> Option<&ConfigMap<B>> {
        match self {
            ConfigNode::Map(map) => Some(map),
            _ => None,
        }
    }

    /// The scalar, if this is a scalar node.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            ConfigNode::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// The block, if this is a block node.
    pub fn as_block(&self) -> Option<&B> {
        match self {
            ConfigNode::Block(block) => Some(block),
            _ => None,
        }
    }
}

impl<B> From<Scalar> for ConfigNode<B> {
    fn from(scalar: Scalar) -> Self {
        ConfigNode::Scalar(scalar)
    }
}
