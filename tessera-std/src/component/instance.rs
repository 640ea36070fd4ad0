//! Per-request component instances.

use super::def::ComponentDef;
use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use tessera_core::ComponentRef;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// A component instance, created for one request.
///
/// The instance couples the shared definition with the request state `S`
/// that the DSL blocks read and write. Every instance receives a
/// process-unique id.
pub struct Component<S> {
    def: Arc<ComponentDef<S>>,
    id: u64,
    parent: Option<ComponentRef>,
    state: S,
}

impl<S> Component<S> {
    /// Instantiate `def` with initial request state.
    pub fn new(def: &Arc<ComponentDef<S>>, state: S) -> Self {
        Self {
            def: Arc::clone(def),
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            parent: None,
            state,
        }
    }

    /// Nest this instance inside `parent`. Nested components never register
    /// as the request root.
    pub fn with_parent(mut self, parent: ComponentRef) -> Self {
        self.parent = Some(parent);
        self
    }

    /// The identity used in errors and logs.
    pub fn identity(&self) -> ComponentRef {
        ComponentRef::new(Arc::clone(self.def.shared_name()), self.id)
    }

    /// The process-unique instance id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The enclosing component, if nested.
    pub fn parent(&self) -> Option<&ComponentRef> {
        self.parent.as_ref()
    }

    /// The component definition.
    pub fn def(&self) -> &Arc<ComponentDef<S>> {
        &self.def
    }

    /// The request state.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// The request state, mutably.
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    /// Consume the instance, returning its request state.
    pub fn into_state(self) -> S {
        self.state
    }
}

impl<S: fmt::Debug> fmt::Debug for Component<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("identity", &self.identity())
            .field("parent", &self.parent)
            .field("state", &self.state)
            .finish()
    }
}
