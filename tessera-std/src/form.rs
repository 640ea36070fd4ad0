//! Form support.
//!
//! A [`Form`] describes the form of a component: a block producing the
//! field markup, the attribute group the fields come from, the parameter
//! schema, and the submit/cancel buttons. The field block runs in a
//! [`RequestContext`] whose secondary helper is an [`AttrFormHelper`], so it
//! can write `helper.attr("title")` and only reach attributes of the chosen
//! group.
//!
//! Widget markup itself comes from the host's [`FormBuilder`].
//!
//! ```rust,ignore
//! let form = Form::<PostState>::new("posts/form")
//!     .attr_group("edit")
//!     .submit_path(SubmitPath::dynamic(|exchange| format!("/posts/{}", exchange.param("id").unwrap_or_default())))
//!     .form_fields(|ctx| {
//!         let helper = ctx.helper_mut::<AttrFormHelper>().ok_or("no form helper")?;
//!         Ok(format!("{}{}", helper.attr("title")?, helper.attr("body")?))
//!     });
//!
//! let def = ComponentDef::builder("posts/form")
//!     .content(form.into_renderer::<Post>(|| Box::new(HtmlFormBuilder::default())))
//!     .build()?;
//! ```

use crate::{
    component::{Component, ComponentBuilder},
    context::RequestContext,
    exchange::Exchange,
    model::{Attr, AttrGroup, FieldKind, Model},
    render::Renderer,
    settings::Settings,
};
use serde::Serialize;
use std::{borrow::Cow, fmt, marker::PhantomData, sync::Arc};
use tessera_core::{
    BoxError, ConfigError, DispatchError, Phase, Response, StandaloneName, Verb,
};
use thiserror::Error;

/// Produces the field markup of a form.
pub type FormFieldsBlock<S> =
    Arc<dyn Fn(&mut RequestContext<'_, '_, S>) -> Result<String, BoxError> + Send + Sync>;

/// Errors raised by form helpers and parameter schemas.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// The attribute is not part of the form's attribute group.
    #[error("attribute `{attr}` is not in attr_group `{group}`")]
    UnknownAttr {
        /// The attribute group.
        group: String,
        /// The requested attribute.
        attr: String,
    },

    /// The parameters lack the wrapper object.
    #[error("parameters are missing `{wrapper_key}`")]
    MissingWrapper {
        /// The expected wrapper key.
        wrapper_key: String,
    },

    /// A required field is missing or null.
    #[error("`{wrapper_key}.{field}` is required")]
    MissingField {
        /// The wrapper key.
        wrapper_key: String,
        /// The field.
        field: String,
    },

    /// A field value does not fit its kind.
    #[error("`{wrapper_key}.{field}` must be a {expected}")]
    InvalidType {
        /// The wrapper key.
        wrapper_key: String,
        /// The field.
        field: String,
        /// The expected kind.
        expected: FieldKind,
    },
}

/// Where a form submits to.
#[derive(Clone)]
pub enum SubmitPath {
    /// A fixed path.
    Fixed(String),
    /// A path computed from the request.
    Dynamic(Arc<dyn Fn(&Exchange<'_>) -> String + Send + Sync>),
}

impl SubmitPath {
    /// A path computed from the request.
    pub fn dynamic(path: impl Fn(&Exchange<'_>) -> String + Send + Sync + 'static) -> Self {
        SubmitPath::Dynamic(Arc::new(path))
    }

    /// The path for this request.
    pub fn resolve(&self, exchange: &Exchange<'_>) -> String {
        match self {
            SubmitPath::Fixed(path) => path.clone(),
            SubmitPath::Dynamic(path) => path(exchange),
        }
    }
}

impl From<&str> for SubmitPath {
    fn from(path: &str) -> Self {
        SubmitPath::Fixed(path.to_owned())
    }
}

impl From<String> for SubmitPath {
    fn from(path: String) -> Self {
        SubmitPath::Fixed(path)
    }
}

impl fmt::Debug for SubmitPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitPath::Fixed(path) => f.debug_tuple("Fixed").field(path).finish(),
            SubmitPath::Dynamic(_) => f.write_str("Dynamic(<fn>)"),
        }
    }
}

// ============================================================================
// Schema
// ============================================================================

/// One permitted parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    /// The parameter name.
    pub name: String,
    /// The value kind.
    pub kind: FieldKind,
    /// Whether a value must be present.
    pub required: bool,
}

/// The parameters a form accepts, nested under a wrapper key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    wrapper_key: String,
    fields: Vec<SchemaField>,
}

impl Schema {
    /// Derive a schema from an attribute group.
    pub fn from_group(wrapper_key: impl Into<String>, group: &AttrGroup) -> Self {
        Self {
            wrapper_key: wrapper_key.into(),
            fields: group
                .attrs()
                .iter()
                .map(|attr| SchemaField {
                    name: attr.name().to_owned(),
                    kind: attr.kind(),
                    required: attr.is_required(),
                })
                .collect(),
        }
    }

    /// The wrapper key.
    pub fn wrapper_key(&self) -> &str {
        &self.wrapper_key
    }

    /// The permitted fields.
    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    /// Filter request parameters down to the permitted fields.
    ///
    /// Unknown keys are dropped; absent optional fields are skipped.
    pub fn permit(
        &self,
        params: &serde_json::Value,
    ) -> Result<serde_json::Map<String, serde_json::Value>, FormError> {
        let wrapped = params
            .get(&self.wrapper_key)
            .and_then(serde_json::Value::as_object)
            .ok_or_else(|| FormError::MissingWrapper {
                wrapper_key: self.wrapper_key.clone(),
            })?;

        let mut permitted = serde_json::Map::new();
        for field in &self.fields {
            match wrapped.get(&field.name) {
                None | Some(serde_json::Value::Null) if field.required => {
                    return Err(FormError::MissingField {
                        wrapper_key: self.wrapper_key.clone(),
                        field: field.name.clone(),
                    });
                }
                None => {}
                Some(value) if value.is_null() || field.kind.accepts(value) => {
                    permitted.insert(field.name.clone(), value.clone());
                }
                Some(_) => {
                    return Err(FormError::InvalidType {
                        wrapper_key: self.wrapper_key.clone(),
                        field: field.name.clone(),
                        expected: field.kind,
                    });
                }
            }
        }
        Ok(permitted)
    }
}

/// Declares an explicit schema.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<SchemaField>,
}

impl SchemaBuilder {
    /// Permit an optional field.
    pub fn field(&mut self, name: impl Into<String>, kind: FieldKind) -> &mut Self {
        self.push(name.into(), kind, false)
    }

    /// Permit a required field.
    pub fn required(&mut self, name: impl Into<String>, kind: FieldKind) -> &mut Self {
        self.push(name.into(), kind, true)
    }

    fn push(&mut self, name: String, kind: FieldKind, required: bool) -> &mut Self {
        self.fields.retain(|field| field.name != name);
        self.fields.push(SchemaField { name, kind, required });
        self
    }
}

// ============================================================================
// Form builders and helpers
// ============================================================================

/// Renders form inputs. Implemented by the host's widget layer.
pub trait FormBuilder {
    /// Markup for the input of `attr`, named under `wrapper_key`.
    fn input(&mut self, attr: &Attr, wrapper_key: &str) -> Result<String, BoxError>;
}

/// The secondary helper of a form's field block.
pub struct AttrFormHelper {
    builder: Box<dyn FormBuilder>,
    group: Arc<AttrGroup>,
    wrapper_key: String,
}

impl AttrFormHelper {
    /// A helper restricted to `group`.
    pub fn new(
        builder: Box<dyn FormBuilder>,
        group: Arc<AttrGroup>,
        wrapper_key: impl Into<String>,
    ) -> Self {
        Self {
            builder,
            group,
            wrapper_key: wrapper_key.into(),
        }
    }

    /// The input markup for attribute `name` of the group.
    pub fn attr(&mut self, name: &str) -> Result<String, BoxError> {
        let attr = self.group.get(name).ok_or_else(|| FormError::UnknownAttr {
            group: self.group.name().to_owned(),
            attr: name.to_owned(),
        })?;
        self.builder.input(attr, &self.wrapper_key)
    }

    /// The attribute group.
    pub fn group(&self) -> &AttrGroup {
        &self.group
    }

    /// The parameter wrapper key.
    pub fn wrapper_key(&self) -> &str {
        &self.wrapper_key
    }

    /// The underlying form builder.
    pub fn builder_mut(&mut self) -> &mut dyn FormBuilder {
        self.builder.as_mut()
    }
}

// ============================================================================
// Form
// ============================================================================

/// A rendered form, before it is wrapped into markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedForm {
    /// Markup of the fields.
    pub fields: String,
    /// Label of the submit button.
    pub submit_label: String,
    /// Label of the cancel button, unless skipped.
    pub cancel_label: Option<String>,
    /// Where the form submits to.
    pub submit_path: Option<String>,
    /// The parameter wrapper key.
    pub wrapper_key: String,
}

impl RenderedForm {
    /// Wrap the fields and buttons into a `<form>` element.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<form");
        if let Some(path) = &self.submit_path {
            html.push_str(&format!(r#" action="{}""#, escape(path)));
        }
        html.push_str(r#" method="post">"#);
        html.push_str(&self.fields);
        html.push_str(r#"<div class="form-buttons">"#);
        html.push_str(&format!(
            r#"<button type="submit">{}</button>"#,
            escape(&self.submit_label)
        ));
        if let Some(cancel) = &self.cancel_label {
            html.push_str(&format!(r#"<a class="cancel">{}</a>"#, escape(cancel)));
        }
        html.push_str("</div></form>");
        html
    }
}

fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"']) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// The form declaration of a component.
pub struct Form<S> {
    component: String,
    form_fields: Option<FormFieldsBlock<S>>,
    skipped_cancel: bool,
    attr_group: Cow<'static, str>,
    schema: Option<Schema>,
    submit_label: Option<String>,
    cancel_label: Option<String>,
    submit_path: Option<SubmitPath>,
}

impl<S> Form<S> {
    /// A form for component `component`.
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            form_fields: None,
            skipped_cancel: false,
            attr_group: Cow::Borrowed("default"),
            schema: None,
            submit_label: None,
            cancel_label: None,
            submit_path: None,
        }
    }

    /// Set the block producing the field markup.
    pub fn form_fields(
        mut self,
        block: impl Fn(&mut RequestContext<'_, '_, S>) -> Result<String, BoxError> + Send + Sync + 'static,
    ) -> Self {
        self.form_fields = Some(Arc::new(block));
        self
    }

    /// Do not render a cancel button.
    pub fn skip_cancel(mut self) -> Self {
        self.skipped_cancel = true;
        self
    }

    /// Use attribute group `key` instead of `default`.
    pub fn attr_group(mut self, key: impl Into<Cow<'static, str>>) -> Self {
        self.attr_group = key.into();
        self
    }

    /// Declare the parameter schema explicitly.
    pub fn schema(
        mut self,
        wrapper_key: impl Into<String>,
        dsl: impl FnOnce(&mut SchemaBuilder),
    ) -> Self {
        let mut builder = SchemaBuilder::default();
        dsl(&mut builder);
        self.schema = Some(Schema {
            wrapper_key: wrapper_key.into(),
            fields: builder.fields,
        });
        self
    }

    /// Override the submit button label.
    pub fn submit_label(mut self, label: impl Into<String>) -> Self {
        self.submit_label = Some(label.into());
        self
    }

    /// Override the cancel button label.
    pub fn cancel_label(mut self, label: impl Into<String>) -> Self {
        self.cancel_label = Some(label.into());
        self
    }

    /// Set where the form submits to.
    pub fn submit_path(mut self, path: impl Into<SubmitPath>) -> Self {
        self.submit_path = Some(path.into());
        self
    }

    /// Whether the cancel button is skipped.
    pub fn skipped_cancel(&self) -> bool {
        self.skipped_cancel
    }

    /// The attribute group key.
    pub fn attr_group_key(&self) -> &str {
        &self.attr_group
    }

    /// Fail unless the form has a field block.
    pub fn check_config(&self) -> Result<(), ConfigError> {
        self.fields_block().map(|_| ())
    }

    fn fields_block(&self) -> Result<&FormFieldsBlock<S>, ConfigError> {
        self.form_fields.as_ref().ok_or_else(|| ConfigError::MissingField {
            component: self.component.clone(),
            field: "form_fields",
        })
    }

    /// The parameter wrapper key: the explicit schema's, else the model
    /// name.
    pub fn schema_wrapper_key_for<M: Model>(&self) -> String {
        match &self.schema {
            Some(schema) => schema.wrapper_key.clone(),
            None => M::model_name().to_owned(),
        }
    }

    /// The parameter schema: the explicit one, else derived from the
    /// attribute group.
    pub fn schema_for<M: Model>(&self) -> Result<Schema, ConfigError> {
        match &self.schema {
            Some(schema) => Ok(schema.clone()),
            None => Ok(Schema::from_group(
                M::model_name(),
                self.attr_group_for::<M>()?,
            )),
        }
    }

    /// The form's attribute group on model `M`.
    pub fn attr_group_for<M: Model>(&self) -> Result<&'static Arc<AttrGroup>, ConfigError> {
        M::attr_groups().get_or_err(&self.attr_group)
    }

    /// The submit label, falling back to the settings.
    pub fn submit_label_or<'a>(&'a self, settings: &'a Settings) -> &'a str {
        self.submit_label
            .as_deref()
            .unwrap_or(&settings.form_submit_label)
    }

    /// The cancel label, falling back to the settings. `None` when skipped.
    pub fn cancel_label_or<'a>(&'a self, settings: &'a Settings) -> Option<&'a str> {
        if self.skipped_cancel {
            return None;
        }
        Some(
            self.cancel_label
                .as_deref()
                .unwrap_or(&settings.form_cancel_label),
        )
    }
}

impl<S: Clone> Form<S> {
    /// Render the form of `component` for model `M`.
    ///
    /// The field block runs with an [`AttrFormHelper`] over `builder` as
    /// secondary helper, on a copy of the component state. It does not
    /// backfire.
    pub fn render<M: Model>(
        &self,
        component: &mut Component<S>,
        exchange: &mut Exchange<'_>,
        builder: Box<dyn FormBuilder>,
    ) -> Result<RenderedForm, DispatchError> {
        let block = Arc::clone(self.fields_block()?);

        let wrapper_key = self.schema_wrapper_key_for::<M>();
        let group = Arc::clone(self.attr_group_for::<M>()?);
        let mut helper = AttrFormHelper::new(builder, group, wrapper_key.clone());

        let fields = {
            let mut ctx = RequestContext::with_helper(component, exchange, &mut helper);
            ctx.evaluate(|ctx| block(ctx))
                .map_err(|err| DispatchError::from_block(Phase::Render, err))?
        };

        let settings = exchange.settings();
        Ok(RenderedForm {
            fields,
            submit_label: self.submit_label_or(settings).to_owned(),
            cancel_label: self.cancel_label_or(settings).map(str::to_owned),
            submit_path: self.submit_path.as_ref().map(|path| path.resolve(exchange)),
            wrapper_key,
        })
    }

    /// Turn the form into the content renderer of its component.
    pub fn into_renderer<M: Model>(
        self,
        builder: impl Fn() -> Box<dyn FormBuilder> + Send + Sync + 'static,
    ) -> FormRenderer<S, M> {
        FormRenderer {
            form: self,
            builder: Box::new(builder),
            model: PhantomData,
        }
    }
}

impl<S: Clone + 'static> Form<S> {
    /// Declare an autocomplete endpoint for `field` on `builder`.
    ///
    /// Adds standalone entry `autocomplete_<field>` at path
    /// `<component>/autocomplete_<field>`. A GET answers with a JSON array
    /// of [`Suggestion`]s produced by `source` for the `q` parameter.
    /// Access is always granted; `source` is expected to return only
    /// records the caller may see.
    pub fn autocomplete(
        builder: ComponentBuilder<S>,
        field: &str,
        source: impl Fn(&mut RequestContext<'_, '_, S>, &str) -> Result<Vec<Suggestion>, BoxError>
        + Send
        + Sync
        + 'static,
    ) -> ComponentBuilder<S> {
        let segment = format!("autocomplete_{field}");
        let path = format!("{}/{segment}", builder.name());
        builder.standalone(StandaloneName::named(segment), move |s| {
            s.path(path);
            s.verb(Verb::Get, move |v| {
                v.authorize(|_| true)
                    .respond(move |ctx: &mut RequestContext<'_, '_, S>| {
                        let query = ctx.param("q").unwrap_or_default().to_owned();
                        let suggestions = source(ctx, &query)?;
                        ctx.respond(Response::json(serde_json::to_value(suggestions)?))?;
                        Ok(())
                    });
            });
        })
    }
}

/// One autocomplete result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    /// The label shown to the user.
    pub text: String,
    /// The value submitted.
    pub value: serde_json::Value,
}

impl Suggestion {
    /// A suggestion.
    pub fn new(text: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            text: text.into(),
            value: value.into(),
        }
    }
}

/// A [`Form`] used as a component's content renderer.
pub struct FormRenderer<S, M> {
    form: Form<S>,
    builder: Box<dyn Fn() -> Box<dyn FormBuilder> + Send + Sync>,
    model: PhantomData<fn() -> M>,
}

impl<S: Clone, M: Model> Renderer<S> for FormRenderer<S, M> {
    fn render(&self, ctx: &mut RequestContext<'_, '_, S>) -> Result<Option<String>, BoxError> {
        let (component, exchange) = ctx.parts_mut();
        let rendered = self
            .form
            .render::<M>(component, exchange, (self.builder)())?;
        Ok(Some(rendered.to_html()))
    }
}
