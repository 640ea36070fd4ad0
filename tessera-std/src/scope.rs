//! Request-scoped storage.

use std::{
    any::{Any, TypeId},
    collections::HashMap,
};
use tessera_core::{ComponentRef, DispatchError};

/// State that lives exactly as long as one request.
///
/// Holds the root component marker and a typed store for host or component
/// values. A fresh scope is created with every
/// [`Exchange`](crate::exchange::Exchange), so nothing leaks from one request
/// into the next.
#[derive(Default)]
pub struct RequestScope {
    root: Option<ComponentRef>,
    vars: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl RequestScope {
    /// Create an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `component` as the root component of this request.
    ///
    /// Fails with [`DispatchError::RootConflict`] if a root is already set;
    /// the existing root is kept.
    pub fn register_root(&mut self, component: ComponentRef) -> Result<(), DispatchError> {
        if let Some(existing) = &self.root {
            crate::trace_event!(
                warn,
                attempted = %component,
                existing = %existing,
                "root component conflict"
            );
            return Err(DispatchError::RootConflict {
                attempted: component,
                existing: existing.clone(),
            });
        }
        crate::trace_event!(debug, root = %component, "root component registered");
        self.root = Some(component);
        Ok(())
    }

    /// The root component of this request, if one registered.
    pub fn root(&self) -> Option<&ComponentRef> {
        self.root.as_ref()
    }

    /// Forget the root component. For hosts that reuse a scope.
    pub fn clear_root(&mut self) -> Option<ComponentRef> {
        self.root.take()
    }

    /// Store a value, returning the previous value of the same type.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) -> Option<T> {
        self.vars
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    /// A stored value by type.
    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.vars
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// A stored value by type, mutably.
    pub fn get_mut<T: Any + Send + Sync>(&mut self) -> Option<&mut T> {
        self.vars
            .get_mut(&TypeId::of::<T>())
            .and_then(|value| value.downcast_mut::<T>())
    }

    /// Remove a stored value by type.
    pub fn remove<T: Any + Send + Sync>(&mut self) -> Option<T> {
        self.vars
            .remove(&TypeId::of::<T>())
            .and_then(|value| value.downcast::<T>().ok())
            .map(|value| *value)
    }
}

impl std::fmt::Debug for RequestScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestScope")
            .field("root", &self.root)
            .field("vars", &self.vars.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_root_is_rejected_with_both_identities() {
        let mut scope = RequestScope::new();
        let first = ComponentRef::new("users/index", 1);
        let second = ComponentRef::new("users/show", 2);

        scope.register_root(first.clone()).unwrap();
        let err = scope.register_root(second.clone()).unwrap_err();

        match err {
            DispatchError::RootConflict { attempted, existing } => {
                assert_eq!(attempted, second);
                assert_eq!(existing, first);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(scope.root(), Some(&first));
    }

    #[test]
    fn test_clear_root_allows_new_registration() {
        let mut scope = RequestScope::new();
        scope.register_root(ComponentRef::new("a", 1)).unwrap();
        assert_eq!(scope.clear_root(), Some(ComponentRef::new("a", 1)));
        scope.register_root(ComponentRef::new("b", 2)).unwrap();
        assert_eq!(scope.root().map(|r| r.name()), Some("b"));
    }

    #[test]
    fn test_typed_store() {
        #[derive(Debug, PartialEq)]
        struct CurrentUser(&'static str);

        let mut scope = RequestScope::new();
        assert!(scope.get::<CurrentUser>().is_none());
        assert!(scope.insert(CurrentUser("ada")).is_none());
        assert_eq!(scope.insert(CurrentUser("grace")), Some(CurrentUser("ada")));

        scope.get_mut::<CurrentUser>().unwrap().0 = "linus";
        assert_eq!(scope.get::<CurrentUser>(), Some(&CurrentUser("linus")));
        assert_eq!(scope.remove::<CurrentUser>(), Some(CurrentUser("linus")));
        assert!(scope.get::<CurrentUser>().is_none());
    }
}
