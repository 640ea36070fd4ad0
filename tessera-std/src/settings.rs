//! Framework-wide settings.
//!
//! Settings are read once at startup and shared by every [`Exchange`]
//! through an `Arc`.
//!
//! ```rust,ignore
//! let settings = Settings::from_json(r#"{ "default_layout": "application" }"#)?;
//! let exchange = Exchange::new(controller).with_settings(Arc::new(settings));
//! ```
//!
//! [`Exchange`]: crate::exchange::Exchange

use serde::Deserialize;

/// Framework-wide settings. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Layout used when a standalone configuration declares none.
    pub default_layout: Option<String>,
    /// Label of form submit buttons unless a form overrides it.
    pub form_submit_label: String,
    /// Label of form cancel buttons unless a form overrides it.
    pub form_cancel_label: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_layout: None,
            form_submit_label: "Submit".to_owned(),
            form_cancel_label: "Cancel".to_owned(),
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_document_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "default_layout": "application" }"#).unwrap();
        assert_eq!(settings.default_layout.as_deref(), Some("application"));
        assert_eq!(settings.form_submit_label, "Submit");
        assert_eq!(settings.form_cancel_label, "Cancel");
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(Settings::from_json("{}").unwrap(), Settings::default());
    }

    #[test]
    fn test_rejects_wrong_types() {
        assert!(Settings::from_json(r#"{ "form_submit_label": 3 }"#).is_err());
    }
}
