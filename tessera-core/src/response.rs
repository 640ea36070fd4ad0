//! Terminal responses produced by a dispatch.

use http::StatusCode;

/// A terminal response handed to the host's [`Controller`](crate::Controller).
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Redirect to another location.
    Redirect {
        /// Target location.
        location: String,
        /// Redirect status (303 by default).
        status: StatusCode,
    },
    /// Rendered HTML, wrapped in a layout by the host.
    Html {
        /// Rendered markup.
        body: String,
        /// Layout to wrap the markup in, if any.
        layout: Option<String>,
        /// Response status.
        status: StatusCode,
    },
    /// A JSON document.
    Json {
        /// The document.
        body: serde_json::Value,
        /// Response status.
        status: StatusCode,
    },
    /// Plain text.
    Text {
        /// The text.
        body: String,
        /// Response status.
        status: StatusCode,
    },
    /// No body, status only.
    Empty {
        /// Response status.
        status: StatusCode,
    },
}

/// The kind of a [`Response`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    /// See [`Response::Redirect`].
    Redirect,
    /// See [`Response::Html`].
    Html,
    /// See [`Response::Json`].
    Json,
    /// See [`Response::Text`].
    Text,
    /// See [`Response::Empty`].
    Empty,
}

impl Response {
    /// A `303 See Other` redirect.
    pub fn redirect(location: impl Into<String>) -> Self {
        Response::Redirect {
            location: location.into(),
            status: StatusCode::SEE_OTHER,
        }
    }

    /// A `200 OK` HTML response without layout.
    pub fn html(body: impl Into<String>) -> Self {
        Response::Html {
            body: body.into(),
            layout: None,
            status: StatusCode::OK,
        }
    }

    /// A `200 OK` JSON response.
    pub fn json(body: serde_json::Value) -> Self {
        Response::Json {
            body,
            status: StatusCode::OK,
        }
    }

    /// A `200 OK` text response.
    pub fn text(body: impl Into<String>) -> Self {
        Response::Text {
            body: body.into(),
            status: StatusCode::OK,
        }
    }

    /// A bodiless response.
    pub fn empty(status: StatusCode) -> Self {
        Response::Empty { status }
    }

    /// Replace the status.
    pub fn with_status(mut self, new_status: StatusCode) -> Self {
        match &mut self {
            Response::Redirect { status, .. }
            | Response::Html { status, .. }
            | Response::Json { status, .. }
            | Response::Text { status, .. }
            | Response::Empty { status } => *status = new_status,
        }
        self
    }

    /// Set the layout of an HTML response. Other kinds are unchanged.
    pub fn with_layout(mut self, new_layout: Option<String>) -> Self {
        if let Response::Html { layout, .. } = &mut self {
            *layout = new_layout;
        }
        self
    }

    /// The response status.
    pub fn status(&self) -> StatusCode {
        match self {
            Response::Redirect { status, .. }
            | Response::Html { status, .. }
            | Response::Json { status, .. }
            | Response::Text { status, .. }
            | Response::Empty { status } => *status,
        }
    }

    /// The response kind.
    pub fn kind(&self) -> ResponseKind {
        match self {
            Response::Redirect { .. } => ResponseKind::Redirect,
            Response::Html { .. } => ResponseKind::Html,
            Response::Json { .. } => ResponseKind::Json,
            Response::Text { .. } => ResponseKind::Text,
            Response::Empty { .. } => ResponseKind::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_status_and_layout() {
        let response = Response::html("<p>hi</p>")
            .with_status(StatusCode::UNPROCESSABLE_ENTITY)
            .with_layout(Some("admin".into()));
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            response,
            Response::Html {
                body: "<p>hi</p>".into(),
                layout: Some("admin".into()),
                status: StatusCode::UNPROCESSABLE_ENTITY,
            }
        );
    }

    #[test]
    fn test_layout_ignored_for_redirects() {
        let response = Response::redirect("/users").with_layout(Some("admin".into()));
        assert_eq!(response.kind(), ResponseKind::Redirect);
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }
}
