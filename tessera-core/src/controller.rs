//! The host's request handle.

use crate::{ident::Format, response::Response};

/// The inbound request handle supplied by the hosting web layer.
///
/// The framework reads the requested format and parameters through it and
/// hands it exactly one terminal [`Response`] per request.
///
/// # Example
///
/// ```rust,ignore
/// struct AxumController { format: Format, query: HashMap<String, String>, out: Option<Response> }
///
/// impl Controller for AxumController {
///     fn format(&self) -> Format { self.format.clone() }
///     fn param(&self, name: &str) -> Option<&str> { self.query.get(name).map(String::as_str) }
///     fn deliver(&mut self, response: Response) { self.out = Some(response); }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Controller`",
    label = "missing `Controller` implementation",
    note = "Controllers must provide `format`, `deliver` and optionally `param`."
)]
pub trait Controller {
    /// The response format requested by the inbound request.
    fn format(&self) -> Format;

    /// A request parameter by name.
    fn param(&self, name: &str) -> Option<&str> {
        let _ = name;
        None
    }

    /// Receive the terminal response. Called at most once per request.
    fn deliver(&mut self, response: Response);
}

impl<C: Controller + ?Sized> Controller for &mut C {
    fn format(&self) -> Format {
        (**self).format()
    }

    fn param(&self, name: &str) -> Option<&str> {
        (**self).param(name)
    }

    fn deliver(&mut self, response: Response) {
        (**self).deliver(response)
    }
}

impl<C: Controller + ?Sized> Controller for Box<C> {
    fn format(&self) -> Format {
        (**self).format()
    }

    fn param(&self, name: &str) -> Option<&str> {
        (**self).param(name)
    }

    fn deliver(&mut self, response: Response) {
        (**self).deliver(response)
    }
}
