//! Loader configuration.
//!
//! All configuration is immutable after construction. A `LoaderConfig` is
//! borrowed by every translation function for the duration of one load.
//!
//! # Example
//!
//! ```rust
//! use sigdoc::config::LoaderConfig;
//!
//! let config = LoaderConfig::builder()
//!     .hidden_marker("__")
//!     .lift_top_comment(false)
//!     .build();
//!
//! assert!(!config.lift_top_comment);
//! assert!(config.is_doc_attribute("ocaml.doc"));
//! ```

use crate::names::DEFAULT_HIDDEN_MARKER;
use serde::{Deserialize, Serialize};

/// Immutable loader configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Substring marking a module name as internal (hidden).
    pub hidden_marker: String,
    /// Attribute names carrying documentation attached to a declaration.
    pub doc_attributes: Vec<String>,
    /// Attribute names carrying standalone comments.
    pub text_attributes: Vec<String>,
    /// Lift a signature's leading standalone comment into its own doc.
    pub lift_top_comment: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            hidden_marker: DEFAULT_HIDDEN_MARKER.to_string(),
            doc_attributes: vec!["ocaml.doc".to_string(), "doc".to_string()],
            text_attributes: vec!["ocaml.text".to_string(), "text".to_string()],
            lift_top_comment: true,
        }
    }
}

impl LoaderConfig {
    pub fn builder() -> LoaderConfigBuilder {
        LoaderConfigBuilder::default()
    }

    pub fn is_doc_attribute(&self, name: &str) -> bool {
        self.doc_attributes.iter().any(|a| a == name)
    }

    pub fn is_text_attribute(&self, name: &str) -> bool {
        self.text_attributes.iter().any(|a| a == name)
    }
}

#[derive(Debug, Default)]
pub struct LoaderConfigBuilder {
    config: LoaderConfig,
}

impl LoaderConfigBuilder {
    pub fn hidden_marker(mut self, value: impl Into<String>) -> Self {
        self.config.hidden_marker = value.into();
        self
    }

    pub fn doc_attributes(mut self, value: Vec<String>) -> Self {
        self.config.doc_attributes = value;
        self
    }

    pub fn text_attributes(mut self, value: Vec<String>) -> Self {
        self.config.text_attributes = value;
        self
    }

    pub fn lift_top_comment(mut self, value: bool) -> Self {
        self.config.lift_top_comment = value;
        self
    }

    pub fn build(self) -> LoaderConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoaderConfig::default();
        assert_eq!(config.hidden_marker, "__");
        assert!(config.lift_top_comment);
        assert!(config.is_doc_attribute("doc"));
        assert!(config.is_text_attribute("ocaml.text"));
        assert!(!config.is_doc_attribute("ocaml.text"));
    }

    #[test]
    fn test_builder() {
        let config = LoaderConfig::builder()
            .hidden_marker("_impl")
            .doc_attributes(vec!["res.doc".to_string()])
            .build();

        assert_eq!(config.hidden_marker, "_impl");
        assert!(config.is_doc_attribute("res.doc"));
        assert!(!config.is_doc_attribute("ocaml.doc"));
        assert!(config.is_text_attribute("text"));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: LoaderConfig = serde_json::from_str(r#"{"lift_top_comment": false}"#).unwrap();
        assert!(!config.lift_top_comment);
        assert_eq!(config.hidden_marker, "__");
        assert_eq!(config.doc_attributes.len(), 2);
    }
}
