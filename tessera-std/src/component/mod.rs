//! Component definitions and instances.
//!
//! - [`ComponentDef`] is the static, shared definition built through a
//!   [`ComponentBuilder`]
//! - [`Component`] is one instance of a definition, owned by one request

mod def;
mod instance;

pub use def::{ComponentBuilder, ComponentDef};
pub use instance::Component;
