//! # tessera-core
//!
//! Core vocabulary for the Tessera component dispatch framework.
//!
//! This crate has minimal dependencies and is meant to be imported by host
//! integrations that only need to speak the framework's types without
//! pulling in the full `tessera-std` implementation.
//!
//! # Contents
//!
//! - **Identifiers**: [`Verb`], [`Format`], [`RespondFormat`],
//!   [`StandaloneName`], [`ComponentRef`]
//! - **Configuration tree**: [`ConfigNode`], [`ConfigKey`], [`Scalar`] with
//!   recursive deep-merge
//! - **Lifecycle vocabulary**: [`Phase`], the [`Phases`] set and [`Flow`]
//! - **Host contract**: [`Controller`] and the [`Response`] it receives
//!
//! # Error Types
//!
//! - [`TesseraError`] - Top-level error type
//! - [`ConfigError`] - Structural component definition errors
//! - [`DispatchError`] - Errors during request dispatch
//! - [`AccessDenied`] - Authorization denial, answered with 403

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod controller;
mod error;
mod ident;
mod node;
mod phase;
mod response;
pub mod version;

// Re-exports
pub use controller::Controller;
pub use error::{AccessDenied, BoxError, ConfigError, DispatchError, TesseraError};
pub use ident::{ComponentRef, Format, ParseVerbError, RespondFormat, StandaloneName, Verb};
pub use node::{ConfigKey, ConfigMap, ConfigNode, Scalar};
pub use phase::{Flow, Phase, Phases};
pub use response::{Response, ResponseKind};

pub use http::StatusCode;
