//! Error types for Tessera.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`TesseraError`] - Top-level error type for all Tessera operations
//! - [`ConfigError`] - Structural errors in component definitions
//! - [`DispatchError`] - Errors raised while dispatching a request
//! - [`AccessDenied`] - The expected, user-facing authorization failure

use crate::{
    ident::{ComponentRef, Format, StandaloneName, Verb},
    phase::Phase,
};
use http::StatusCode;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Tessera operations.
#[derive(Error, Debug)]
pub enum TesseraError {
    /// A component definition is structurally invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Dispatching a request failed.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// Errors in component definitions.
///
/// These indicate a bug in a component definition and are never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A verb configuration has no authorize block.
    #[error("{component} standalone {standalone} verb {verb} has no authorize block")]
    MissingAuthorize {
        /// Component definition name.
        component: String,
        /// Standalone configuration name.
        standalone: StandaloneName,
        /// The verb missing the block.
        verb: Verb,
    },

    /// The component does not declare the requested standalone configuration.
    #[error("{component} does not provide the standalone config {standalone}")]
    UnknownStandalone {
        /// Component definition name.
        component: String,
        /// The requested standalone name.
        standalone: StandaloneName,
    },

    /// The standalone configuration does not declare the requested verb.
    #[error("{component} standalone config {standalone} does not provide verb {verb}")]
    UnknownVerb {
        /// Component definition name.
        component: String,
        /// Standalone configuration name.
        standalone: StandaloneName,
        /// The requested verb.
        verb: Verb,
    },

    /// A configuration node has the wrong kind for its key.
    #[error("config key `{key}` expected {expected}, found {found}")]
    TypeMismatch {
        /// Path of the offending key.
        key: String,
        /// Expected node kind.
        expected: &'static str,
        /// Actual node kind.
        found: &'static str,
    },

    /// A key that has no meaning at this position of the configuration.
    #[error("unexpected config key `{key}` in {component}")]
    UnexpectedKey {
        /// Component definition name.
        component: String,
        /// Path of the offending key.
        key: String,
    },

    /// A required declarative field was never set.
    #[error("{component} requires {field}")]
    MissingField {
        /// Component definition name.
        component: String,
        /// The missing field.
        field: &'static str,
    },

    /// A model does not define the requested attribute group.
    #[error("missing attr_group `{group}` for {model}")]
    MissingAttrGroup {
        /// Model name.
        model: String,
        /// Attribute group key.
        group: String,
    },
}

/// The authorize phase rejected the request.
///
/// Hosts translate this into a 403 response; see [`AccessDenied::status`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("access denied to {component} ({standalone}, {verb})")]
pub struct AccessDenied {
    /// The component instance that denied access.
    pub component: ComponentRef,
    /// The standalone configuration being accessed.
    pub standalone: StandaloneName,
    /// The verb being accessed.
    pub verb: Verb,
}

impl AccessDenied {
    /// The HTTP status hosts should answer with.
    pub fn status(&self) -> StatusCode {
        StatusCode::FORBIDDEN
    }
}

/// Errors that can occur while dispatching a request to a component.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The authorize block evaluated to `false`.
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    /// A second root component tried to register in the same request scope.
    #[error("{attempted} is attempting to become root component, but {existing} is already root")]
    RootConflict {
        /// The component that attempted to register.
        attempted: ComponentRef,
        /// The component already registered as root.
        existing: ComponentRef,
    },

    /// Neither the requested format nor the fallback has a respond block.
    #[error("{component} has no respond block for format {format} and no fallback (verb {verb})")]
    NoRespondBlock {
        /// The dispatched component.
        component: ComponentRef,
        /// The dispatched verb.
        verb: Verb,
        /// The requested format.
        format: Format,
    },

    /// The request already produced a response.
    #[error("a response was already emitted for this request")]
    AlreadyResponded,

    /// A block failed while running the given phase.
    #[error("{phase} phase failed")]
    Phase {
        /// The phase whose block failed.
        phase: Phase,
        /// The underlying failure.
        #[source]
        source: BoxError,
    },

    /// The component definition is invalid for this dispatch.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl DispatchError {
    /// Wrap a block failure, unwrapping errors that already are dispatch
    /// errors so they surface unchanged.
    pub fn from_block(phase: Phase, source: BoxError) -> Self {
        match source.downcast::<DispatchError>() {
            Ok(err) => *err,
            Err(source) => match source.downcast::<AccessDenied>() {
                Ok(denied) => DispatchError::AccessDenied(*denied),
                Err(source) => DispatchError::Phase { phase, source },
            },
        }
    }

    /// Whether this is an authorization denial.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, DispatchError::AccessDenied(_))
    }

    /// The HTTP status a host should answer with for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::AccessDenied(denied) => denied.status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
