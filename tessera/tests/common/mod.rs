#![allow(dead_code)]

use lazy_static::lazy_static;
use std::sync::Arc;
use tessera::{
    ComponentDef, Exchange, Format, Response, StandaloneName, Verb,
    forms::{AttrGroups, FieldKind, Model},
    testing::RecordingController,
};

// ============================================================================
// Test Models
// ============================================================================

pub struct Post;

lazy_static! {
    static ref POST_ATTR_GROUPS: AttrGroups = AttrGroups::builder("post")
        .attr_group("default", None, |g| {
            g.required("title", FieldKind::String)
                .attr("body", FieldKind::Text);
        })
        .attr_group("admin", Some("default"), |g| {
            g.attr("published", FieldKind::Boolean)
                .attr("position", FieldKind::Integer);
        })
        .build()
        .unwrap();
}

impl Model for Post {
    fn model_name() -> &'static str {
        "post"
    }

    fn attr_groups() -> &'static AttrGroups {
        &POST_ATTR_GROUPS
    }
}

// ============================================================================
// Test Component State
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostState {
    pub id: Option<u64>,
    pub title: String,
    pub can_edit: bool,
    pub saved: bool,
    pub trail: Vec<&'static str>,
}

impl PostState {
    pub fn editor() -> Self {
        Self {
            can_edit: true,
            ..Self::default()
        }
    }
}

// ============================================================================
// Test Components
// ============================================================================

/// `base_widget`: GET answers "base" in every format.
pub fn base_widget() -> Arc<ComponentDef<()>> {
    ComponentDef::<()>::builder("base_widget")
        .standalone(StandaloneName::DEFAULT, |s| {
            s.path("widgets").layout("widgets");
            s.verb(Verb::Get, |v| {
                v.authorize(|_| true).respond(|ctx| {
                    ctx.respond(Response::text("base"))?;
                    Ok(())
                });
            });
        })
        .build()
        .unwrap()
}

pub fn exchange(controller: &RecordingController) -> Exchange<'static> {
    Exchange::new(controller.clone())
}

pub fn controller(format: Format) -> RecordingController {
    RecordingController::new(format)
}
