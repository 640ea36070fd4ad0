//! Stored DSL blocks.
//!
//! Blocks are function values kept in the configuration tree, tagged by the
//! kind of phase that runs them. The dispatcher decides when each runs; a
//! block never invokes another phase itself.

use crate::context::RequestContext;
use std::{fmt, sync::Arc};
use tessera_core::{BoxError, ConfigNode};

/// A block that mutates request state: load-data, assign-attributes,
/// store-data and the component-wide after-hooks.
pub type EffectBlock<S> =
    Arc<dyn Fn(&mut RequestContext<'_, '_, S>) -> Result<(), BoxError> + Send + Sync>;

/// The authorize predicate.
pub type AuthorizeBlock<S> = Arc<dyn Fn(&mut RequestContext<'_, '_, S>) -> bool + Send + Sync>;

/// A respond block. It produces the response through the request exchange.
pub type RespondBlock<S> =
    Arc<dyn Fn(&mut RequestContext<'_, '_, S>) -> Result<(), BoxError> + Send + Sync>;

/// A block stored in the configuration tree.
pub enum Block<S> {
    /// See [`EffectBlock`].
    Effect(EffectBlock<S>),
    /// See [`AuthorizeBlock`].
    Authorize(AuthorizeBlock<S>),
    /// See [`RespondBlock`].
    Respond(RespondBlock<S>),
}

impl<S> Block<S> {
    /// The block kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Effect(_) => "effect block",
            Block::Authorize(_) => "authorize block",
            Block::Respond(_) => "respond block",
        }
    }
}

impl<S> Clone for Block<S> {
    fn clone(&self) -> Self {
        match self {
            Block::Effect(block) => Block::Effect(Arc::clone(block)),
            Block::Authorize(block) => Block::Authorize(Arc::clone(block)),
            Block::Respond(block) => Block::Respond(Arc::clone(block)),
        }
    }
}

impl<S> fmt::Debug for Block<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.kind())
    }
}

/// A configuration tree whose blocks run against component state `S`.
pub type Node<S> = ConfigNode<Block<S>>;
