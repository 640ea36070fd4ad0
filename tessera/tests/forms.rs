//! Attribute groups, forms and autocomplete through the public API.

use serde_json::json;
use tessera::{
    Component, ComponentDef, DispatchError, Dispatcher, Format, Phase, RespondFormat, Response, StandaloneName,
    StatusCode, Verb,
    forms::{AttrFormHelper, FieldKind, Form, FormBuilder, FormError, Model, Suggestion},
    render_standalone_block,
    testing::{RecordingController, RecordingFormBuilder},
};

mod common;
use common::{Post, PostState, controller, exchange};

fn post_form() -> Form<PostState> {
    Form::<PostState>::new("posts/form")
        .attr_group("admin")
        .submit_path("/posts")
        .form_fields(|ctx| {
            let helper = ctx
                .helper_mut::<AttrFormHelper>()
                .ok_or("form helper missing")?;
            let mut markup = helper.attr("title")?;
            markup.push_str(&helper.attr("published")?);
            Ok(markup)
        })
}

#[test]
fn test_attr_group_inheritance() {
    let admin = Post::attr_groups().get("admin").unwrap();
    let names: Vec<_> = admin.attrs().iter().map(|attr| attr.name()).collect();

    assert_eq!(names, vec!["title", "body", "published", "position"]);
    assert!(admin.get("title").unwrap().is_required());
    assert!(!Post::attr_groups().get("default").unwrap().contains("published"));
}

#[test]
fn test_form_renders_as_component_content() {
    let inputs = RecordingFormBuilder::new();
    let recorder = inputs.clone();
    let def = ComponentDef::<PostState>::builder("posts/form")
        .content(post_form().into_renderer::<Post>(move || {
            Box::new(recorder.clone()) as Box<dyn FormBuilder>
        }))
        .standalone(StandaloneName::DEFAULT, |s| {
            s.path("posts/new");
            s.verb(Verb::Get, |v| {
                v.authorize(|ctx| ctx.state().can_edit)
                    .respond_with(RespondFormat::Fallback, render_standalone_block(None));
            });
        })
        .build()
        .unwrap();
    let controller = controller(Format::Html);
    let mut exchange = exchange(&controller);

    Dispatcher::new()
        .access(
            &mut Component::new(&def, PostState::editor()),
            &mut exchange,
            &StandaloneName::DEFAULT,
            Verb::Get,
        )
        .unwrap();

    assert_eq!(inputs.inputs(), vec!["title", "published"]);
    assert_eq!(
        controller.deliveries(),
        vec![Response::html(
            "<form action=\"/posts\" method=\"post\">[post.title][post.published]\
             <div class=\"form-buttons\"><button type=\"submit\">Submit</button>\
             <a class=\"cancel\">Cancel</a></div></form>"
        )]
    );
}

#[test]
fn test_form_field_outside_group_fails() {
    let form = Form::<PostState>::new("posts/form").form_fields(|ctx| {
        let helper = ctx
            .helper_mut::<AttrFormHelper>()
            .ok_or("form helper missing")?;
        helper.attr("published")
    });
    let controller = controller(Format::Html);
    let mut exchange = exchange(&controller);
    let def = ComponentDef::<PostState>::builder("posts/form").build().unwrap();

    let err = form
        .render::<Post>(
            &mut Component::new(&def, PostState::default()),
            &mut exchange,
            Box::new(RecordingFormBuilder::new()),
        )
        .unwrap_err();

    match err {
        DispatchError::Phase { phase, source } => {
            assert_eq!(phase, Phase::Render);
            assert_eq!(
                source.downcast_ref::<FormError>(),
                Some(&FormError::UnknownAttr {
                    group: "default".into(),
                    attr: "published".into(),
                })
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_schema_derived_from_group() {
    let schema = post_form().schema_for::<Post>().unwrap();

    assert_eq!(schema.wrapper_key(), "post");
    let permitted = schema
        .permit(&json!({
            "post": { "title": "Hello", "published": "1", "admin": true }
        }))
        .unwrap();
    assert_eq!(permitted.len(), 2);
    assert!(!permitted.contains_key("admin"));

    assert_eq!(
        schema.permit(&json!({ "post": { "position": "3" } })),
        Err(FormError::MissingField {
            wrapper_key: "post".into(),
            field: "title".into(),
        })
    );
    assert_eq!(
        schema.permit(&json!({ "post": { "title": "x", "position": "third" } })),
        Err(FormError::InvalidType {
            wrapper_key: "post".into(),
            field: "position".into(),
            expected: FieldKind::Integer,
        })
    );
}

#[test]
fn test_missing_form_fields_is_a_config_error() {
    let form = Form::<PostState>::new("posts/form");
    let err = form.check_config().unwrap_err();
    assert_eq!(err.to_string(), "posts/form requires form_fields");
}

#[test]
fn test_autocomplete_standalone() {
    let def = Form::autocomplete(
        ComponentDef::<PostState>::builder("posts/form"),
        "author",
        |_ctx, query| {
            Ok(["Ada", "Alan", "Grace"]
                .iter()
                .enumerate()
                .filter(|(_, name)| name.to_lowercase().starts_with(&query.to_lowercase()))
                .map(|(id, name)| Suggestion::new(*name, id))
                .collect())
        },
    )
    .build()
    .unwrap();

    let name = StandaloneName::named("autocomplete_author");
    assert_eq!(
        def.standalone(&name).unwrap().path(),
        Some("posts/form/autocomplete_author")
    );

    let controller = RecordingController::new(Format::Json).with_param("q", "a");
    let mut exchange = exchange(&controller);
    Dispatcher::new()
        .access(
            &mut Component::new(&def, PostState::default()),
            &mut exchange,
            &name,
            Verb::Get,
        )
        .unwrap();

    assert_eq!(
        controller.last(),
        Some(Response::json(json!([
            { "text": "Ada", "value": 0 },
            { "text": "Alan", "value": 1 },
        ])))
    );
    assert_eq!(controller.last().map(|r| r.status()), Some(StatusCode::OK));
}
