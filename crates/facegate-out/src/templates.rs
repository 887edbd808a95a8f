//! Fragment template loading.
//!
//! Templates live in a YAML file:
//! - `version`
//! - `templates`: name → `{ description, template }`, Handlebars syntax

use serde::Deserialize;
use std::collections::HashMap;

/// Templates shipped with the crate
pub const EMBEDDED_TEMPLATES: &str = include_str!("../templates/fragments.yaml");

/// Every templates file must define these
pub const REQUIRED_TEMPLATES: [&str; 6] =
    ["error", "success", "found", "found_many", "unknown", "failure"];

/// Top-level templates file structure
#[derive(Debug, Clone, Deserialize)]
pub struct TemplatesFile {
    pub version: String,
    pub templates: HashMap<String, Template>,
}

/// A single template definition
#[derive(Debug, Clone, Deserialize)]
pub struct Template {
    #[serde(default)]
    pub description: String,
    pub template: String,
}

impl TemplatesFile {
    /// Load templates from a YAML file
    pub fn load(path: &str) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read templates file {}: {}", path, e))?;
        Self::from_yaml(&content)
    }

    /// The templates embedded in this crate
    pub fn embedded() -> Result<Self, String> {
        Self::from_yaml(EMBEDDED_TEMPLATES)
    }

    /// Parse templates from YAML content and check required names are present
    pub fn from_yaml(yaml: &str) -> Result<Self, String> {
        let file: TemplatesFile = serde_yaml::from_str(yaml)
            .map_err(|e| format!("Failed to parse templates YAML: {}", e))?;

        let missing: Vec<&str> = REQUIRED_TEMPLATES
            .iter()
            .copied()
            .filter(|name| !file.templates.contains_key(*name))
            .collect();
        if !missing.is_empty() {
            return Err(format!("Missing templates: {}", missing.join(", ")));
        }

        Ok(file)
    }

    /// Get a template by name
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// List all template names
    pub fn list_templates(&self) -> Vec<&str> {
        self.templates.keys().map(|s| s.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_templates_parse() {
        let file = TemplatesFile::embedded().unwrap();
        for name in REQUIRED_TEMPLATES {
            assert!(file.get(name).is_some(), "missing {}", name);
        }
    }

    #[test]
    fn test_missing_required_template() {
        let yaml = r#"
version: "1.0"
templates:
  error:
    description: Error
    template: "<h2>{{message}}</h2>"
"#;
        let err = TemplatesFile::from_yaml(yaml).unwrap_err();
        assert!(err.contains("success"));
        assert!(err.contains("found_many"));
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(TemplatesFile::from_yaml("templates: [").is_err());
    }
}
