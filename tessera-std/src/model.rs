//! Model attribute groups.
//!
//! A model declares named, ordered groups of attributes, e.g. the fields an
//! edit form shows or a search form filters by. A group may start from
//! another group: it inherits the base attributes in their order,
//! redeclaring an attribute replaces it in place and new attributes are
//! appended.
//!
//! ```rust,ignore
//! lazy_static! {
//!     static ref POST_GROUPS: AttrGroups = AttrGroups::builder("post")
//!         .attr_group("default", None, |g| {
//!             g.required("title", FieldKind::String).attr("body", FieldKind::Text);
//!         })
//!         .attr_group("admin", Some("default"), |g| {
//!             g.attr("published", FieldKind::Boolean);
//!         })
//!         .build()
//!         .expect("valid attr groups");
//! }
//! ```

use std::{borrow::Cow, collections::BTreeMap, fmt, sync::Arc};
use tessera_core::ConfigError;

/// The value kind of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// A single line of text.
    String,
    /// Multi-line text.
    Text,
    /// A whole number.
    Integer,
    /// A decimal number.
    Decimal,
    /// `true` or `false`.
    Boolean,
    /// A calendar date, `YYYY-MM-DD`.
    Date,
    /// A date and time.
    DateTime,
    /// The id of another record.
    Reference,
}

impl FieldKind {
    /// The kind name.
    pub const fn as_str(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Decimal => "decimal",
            FieldKind::Boolean => "boolean",
            FieldKind::Date => "date",
            FieldKind::DateTime => "datetime",
            FieldKind::Reference => "reference",
        }
    }

    /// Whether a submitted parameter value fits this kind.
    ///
    /// Form parameters usually arrive as strings, so numeric and boolean
    /// kinds also accept their string spellings.
    pub fn accepts(self, value: &serde_json::Value) -> bool {
        use serde_json::Value;

        match (self, value) {
            (FieldKind::String | FieldKind::Text | FieldKind::DateTime, Value::String(_)) => true,
            (FieldKind::Date, Value::String(s)) => is_date(s),
            (FieldKind::Integer | FieldKind::Reference, Value::Number(n)) => {
                n.is_i64() || n.is_u64()
            }
            (FieldKind::Integer | FieldKind::Reference, Value::String(s)) => {
                s.trim().parse::<i64>().is_ok()
            }
            (FieldKind::Decimal, Value::Number(_)) => true,
            (FieldKind::Decimal, Value::String(s)) => s.trim().parse::<f64>().is_ok(),
            (FieldKind::Boolean, Value::Bool(_)) => true,
            (FieldKind::Boolean, Value::String(s)) => {
                matches!(s.as_str(), "0" | "1" | "true" | "false")
            }
            _ => false,
        }
    }
}

fn is_date(s: &str) -> bool {
    let parts: Vec<&str> = s.split('-').collect();
    matches!(parts.as_slice(), [y, m, d]
        if y.len() == 4 && m.len() == 2 && d.len() == 2
            && [y, m, d].iter().all(|p| p.bytes().all(|b| b.is_ascii_digit())))
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One attribute of a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    name: Cow<'static, str>,
    kind: FieldKind,
    required: bool,
}

impl Attr {
    /// An optional attribute.
    pub fn new(name: impl Into<Cow<'static, str>>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
        }
    }

    /// Mark the attribute as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// The attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The value kind.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Whether a value must be present.
    pub fn is_required(&self) -> bool {
        self.required
    }
}

/// A named, ordered group of attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrGroup {
    name: String,
    attrs: Vec<Attr>,
}

impl AttrGroup {
    /// The group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The attributes, in order.
    pub fn attrs(&self) -> &[Attr] {
        &self.attrs
    }

    /// An attribute by name.
    pub fn get(&self, name: &str) -> Option<&Attr> {
        self.attrs.iter().find(|attr| attr.name() == name)
    }

    /// Whether the group contains an attribute called `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// Declares the attributes of one group.
#[derive(Debug, Default)]
pub struct AttrGroupDsl {
    attrs: Vec<Attr>,
}

impl AttrGroupDsl {
    /// Add an attribute, replacing an inherited one of the same name in
    /// place.
    pub fn add(&mut self, attr: Attr) -> &mut Self {
        match self.attrs.iter_mut().find(|existing| existing.name == attr.name) {
            Some(existing) => *existing = attr,
            None => self.attrs.push(attr),
        }
        self
    }

    /// Add an optional attribute.
    pub fn attr(&mut self, name: impl Into<Cow<'static, str>>, kind: FieldKind) -> &mut Self {
        self.add(Attr::new(name, kind))
    }

    /// Add a required attribute.
    pub fn required(&mut self, name: impl Into<Cow<'static, str>>, kind: FieldKind) -> &mut Self {
        self.add(Attr::new(name, kind).required())
    }

    /// Drop an inherited attribute.
    pub fn remove(&mut self, name: &str) -> &mut Self {
        self.attrs.retain(|attr| attr.name() != name);
        self
    }
}

/// All attribute groups of one model.
#[derive(Debug, Clone, Default)]
pub struct AttrGroups {
    model: String,
    groups: BTreeMap<String, Arc<AttrGroup>>,
}

impl AttrGroups {
    /// Start declaring the groups of `model`.
    pub fn builder(model: impl Into<String>) -> AttrGroupsBuilder {
        AttrGroupsBuilder {
            groups: AttrGroups {
                model: model.into(),
                groups: BTreeMap::new(),
            },
            error: None,
        }
    }

    /// The model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// A group by name.
    pub fn get(&self, name: &str) -> Option<&Arc<AttrGroup>> {
        self.groups.get(name)
    }

    /// A group by name, or [`ConfigError::MissingAttrGroup`].
    pub fn get_or_err(&self, name: &str) -> Result<&Arc<AttrGroup>, ConfigError> {
        self.get(name).ok_or_else(|| ConfigError::MissingAttrGroup {
            model: self.model.clone(),
            group: name.to_owned(),
        })
    }

    /// The group names.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.groups.keys().map(String::as_str)
    }
}

/// Builder for [`AttrGroups`].
#[derive(Debug)]
pub struct AttrGroupsBuilder {
    groups: AttrGroups,
    error: Option<ConfigError>,
}

impl AttrGroupsBuilder {
    /// Declare group `name`, optionally starting from the group `inherit`.
    /// Redeclaring a group replaces it.
    pub fn attr_group(
        mut self,
        name: impl Into<String>,
        inherit: Option<&str>,
        dsl: impl FnOnce(&mut AttrGroupDsl),
    ) -> Self {
        let mut group = AttrGroupDsl::default();
        if let Some(base) = inherit {
            match self.groups.get(base) {
                Some(base) => group.attrs = base.attrs.clone(),
                None => {
                    self.error.get_or_insert(ConfigError::MissingAttrGroup {
                        model: self.groups.model.clone(),
                        group: base.to_owned(),
                    });
                }
            }
        }
        dsl(&mut group);

        let name = name.into();
        self.groups.groups.insert(
            name.clone(),
            Arc::new(AttrGroup {
                name,
                attrs: group.attrs,
            }),
        );
        self
    }

    /// Finish declaring.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingAttrGroup`] if a group inherits from one that
    /// was not declared before it.
    pub fn build(self) -> Result<AttrGroups, ConfigError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.groups),
        }
    }
}

/// A model with attribute groups.
pub trait Model {
    /// The singular parameter key, e.g. `post`.
    fn model_name() -> &'static str;

    /// The model's attribute groups.
    fn attr_groups() -> &'static AttrGroups;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn groups() -> AttrGroups {
        AttrGroups::builder("post")
            .attr_group("default", None, |g| {
                g.required("title", FieldKind::String)
                    .attr("body", FieldKind::Text)
                    .attr("position", FieldKind::Integer);
            })
            .attr_group("admin", Some("default"), |g| {
                g.required("body", FieldKind::Text)
                    .attr("published", FieldKind::Boolean)
                    .remove("position");
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_inherited_group_replaces_in_place_and_appends() {
        let groups = groups();
        let admin = groups.get("admin").unwrap();
        let names: Vec<_> = admin.attrs().iter().map(Attr::name).collect();

        assert_eq!(names, vec!["title", "body", "published"]);
        assert!(admin.get("body").unwrap().is_required());
        assert!(!groups.get("default").unwrap().get("body").unwrap().is_required());
    }

    #[test]
    fn test_unknown_base_group_fails_build() {
        let err = AttrGroups::builder("post")
            .attr_group("admin", Some("default"), |_| {})
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingAttrGroup {
                model: "post".into(),
                group: "default".into(),
            }
        );
    }

    #[test]
    fn test_missing_group_lookup() {
        let groups = groups();
        assert!(groups.get_or_err("default").is_ok());
        assert!(matches!(
            groups.get_or_err("search"),
            Err(ConfigError::MissingAttrGroup { .. })
        ));
        assert_eq!(groups.names().collect::<Vec<_>>(), vec!["admin", "default"]);
    }

    #[test]
    fn test_field_kind_accepts() {
        assert!(FieldKind::Integer.accepts(&json!(3)));
        assert!(FieldKind::Integer.accepts(&json!("42")));
        assert!(!FieldKind::Integer.accepts(&json!("4.2")));
        assert!(FieldKind::Decimal.accepts(&json!("4.2")));
        assert!(FieldKind::Boolean.accepts(&json!("1")));
        assert!(!FieldKind::Boolean.accepts(&json!("yes")));
        assert!(FieldKind::Date.accepts(&json!("2024-02-29")));
        assert!(!FieldKind::Date.accepts(&json!("29.02.2024")));
        assert!(!FieldKind::String.accepts(&json!(1)));
    }
}
