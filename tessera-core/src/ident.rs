//! Identifiers shared across the framework: verbs, formats, standalone names
//! and component identities.

use std::{
    borrow::Cow,
    fmt,
    str::FromStr,
    sync::Arc,
};
use thiserror::Error;

/// An HTTP-like verb a standalone configuration can respond to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Verb {
    /// `GET`
    Get,
    /// `HEAD`
    Head,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
    /// `OPTIONS`
    Options,
}

impl Verb {
    /// All verbs, in declaration order.
    pub const ALL: [Verb; 7] = [
        Verb::Get,
        Verb::Head,
        Verb::Post,
        Verb::Put,
        Verb::Patch,
        Verb::Delete,
        Verb::Options,
    ];

    /// The upper-case method name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Head => "HEAD",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
            Verb::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string or method does not name a supported verb.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported verb: {0}")]
pub struct ParseVerbError(pub String);

impl FromStr for Verb {
    type Err = ParseVerbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verb::ALL
            .into_iter()
            .find(|verb| verb.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseVerbError(s.to_string()))
    }
}

impl TryFrom<&http::Method> for Verb {
    type Error = ParseVerbError;

    fn try_from(method: &http::Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}

impl From<Verb> for http::Method {
    fn from(verb: Verb) -> Self {
        match verb {
            Verb::Get => http::Method::GET,
            Verb::Head => http::Method::HEAD,
            Verb::Post => http::Method::POST,
            Verb::Put => http::Method::PUT,
            Verb::Patch => http::Method::PATCH,
            Verb::Delete => http::Method::DELETE,
            Verb::Options => http::Method::OPTIONS,
        }
    }
}

/// A response format requested by the inbound request.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Format {
    /// `text/html`
    Html,
    /// `application/json`
    Json,
    /// Turbo stream fragments.
    TurboStream,
    /// `application/xml`
    Xml,
    /// `text/csv`
    Csv,
    /// Any other format, by its lowercase short name. Build it with
    /// [`Format::other`] to get the name normalized.
    Other(Cow<'static, str>),
}

impl Format {
    /// A format by short name, compared case-insensitively: `other("PDF")`
    /// equals a parsed `pdf`, and `other("Json")` is [`Format::Json`].
    pub fn other(name: impl Into<Cow<'static, str>>) -> Self {
        Self::from_name(name.into())
    }

    /// Lowercase an [`Other`](Format::Other) name and map it to a known
    /// variant where one exists.
    pub fn normalized(self) -> Self {
        match self {
            Format::Other(name) => Self::from_name(name),
            known => known,
        }
    }

    fn from_name(name: Cow<'static, str>) -> Self {
        let name = if name.bytes().any(|b| b.is_ascii_uppercase()) {
            Cow::Owned(name.to_ascii_lowercase())
        } else {
            name
        };
        match name.as_ref() {
            "html" => Format::Html,
            "json" => Format::Json,
            "turbo_stream" => Format::TurboStream,
            "xml" => Format::Xml,
            "csv" => Format::Csv,
            _ => Format::Other(name),
        }
    }

    /// The short format name (`html`, `json`, ...).
    pub fn as_str(&self) -> &str {
        match self {
            Format::Html => "html",
            Format::Json => "json",
            Format::TurboStream => "turbo_stream",
            Format::Xml => "xml",
            Format::Csv => "csv",
            Format::Other(name) => name,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(Cow::Owned(s.to_owned())))
    }
}

/// Selects which respond block a format maps to.
///
/// `Fallback` is used when no block matches the requested format exactly.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RespondFormat {
    /// Matches exactly this format.
    Exact(Format),
    /// Matches any format without an exact entry.
    Fallback,
}

impl fmt::Display for RespondFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RespondFormat::Exact(format) => write!(f, "{format}"),
            RespondFormat::Fallback => f.write_str("*"),
        }
    }
}

impl From<Format> for RespondFormat {
    fn from(format: Format) -> Self {
        RespondFormat::Exact(format)
    }
}

/// Name of a standalone configuration. The unnamed entry is the component's
/// primary entry point.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StandaloneName(Option<Cow<'static, str>>);

impl StandaloneName {
    /// The unnamed, primary entry point.
    pub const DEFAULT: StandaloneName = StandaloneName(None);

    /// A named standalone entry.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self(Some(name.into()))
    }

    /// The name, or `None` for the primary entry point.
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Whether this is the primary entry point.
    pub fn is_default(&self) -> bool {
        self.0.is_none()
    }
}

impl fmt::Display for StandaloneName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(name) => f.write_str(name),
            None => f.write_str("(default)"),
        }
    }
}

impl From<&'static str> for StandaloneName {
    fn from(name: &'static str) -> Self {
        Self::named(name)
    }
}

impl From<String> for StandaloneName {
    fn from(name: String) -> Self {
        Self::named(name)
    }
}

impl From<Option<&'static str>> for StandaloneName {
    fn from(name: Option<&'static str>) -> Self {
        Self(name.map(Cow::Borrowed))
    }
}

/// Identity of one component instance, used in diagnostics and errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentRef {
    name: Arc<str>,
    id: u64,
}

impl ComponentRef {
    /// Create an identity from a component name and instance id.
    pub fn new(name: impl Into<Arc<str>>, id: u64) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }

    /// The component definition name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The instance id.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<{}:{}>", self.name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_parse_is_case_insensitive() {
        assert_eq!("get".parse::<Verb>().unwrap(), Verb::Get);
        assert_eq!("Patch".parse::<Verb>().unwrap(), Verb::Patch);
        assert_eq!(
            "BREW".parse::<Verb>().unwrap_err(),
            ParseVerbError("BREW".into())
        );
    }

    #[test]
    fn test_verb_from_http_method() {
        assert_eq!(Verb::try_from(&http::Method::DELETE).unwrap(), Verb::Delete);
        assert!(Verb::try_from(&http::Method::CONNECT).is_err());
        assert_eq!(http::Method::from(Verb::Put), http::Method::PUT);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("HTML".parse::<Format>().unwrap(), Format::Html);
        assert_eq!(
            "pdf".parse::<Format>().unwrap(),
            Format::Other(Cow::Borrowed("pdf"))
        );
    }

    #[test]
    fn test_other_format_is_normalized() {
        assert_eq!(Format::other("PDF"), "pdf".parse::<Format>().unwrap());
        assert_eq!(Format::other("Json"), Format::Json);
        assert_eq!(
            Format::Other(Cow::Borrowed("Turbo_Stream")).normalized(),
            Format::TurboStream
        );
        assert_eq!(Format::Xml.normalized(), Format::Xml);
    }

    #[test]
    fn test_standalone_name_display() {
        assert_eq!(StandaloneName::DEFAULT.to_string(), "(default)");
        assert_eq!(StandaloneName::from("edit").to_string(), "edit");
        assert!(StandaloneName::from(None::<&'static str>).is_default());
    }

    #[test]
    fn test_component_ref_display() {
        let r = ComponentRef::new("users/show", 7);
        assert_eq!(r.to_string(), "#<users/show:7>");
    }
}
