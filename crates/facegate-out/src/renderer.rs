//! Template rendering for fragments.
//!
//! Uses Handlebars with its default HTML escaping on every `{{ }}`
//! interpolation, plus one helper:
//! - image_url: public URL for an engine image file name

use facegate_core::{DecodedResult, FoundEntry, SubCommand};
use handlebars::{
    html_escape, Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext,
};
use serde_json::{json, Value};

use crate::templates::TemplatesFile;
use crate::RenderError;

/// Route under which the engine's image directory is served
pub const IMAGE_ROUTE: &str = "/images/";

/// Compiled renderer with registered helpers
pub struct FragmentRenderer<'a> {
    handlebars: Handlebars<'a>,
    templates: TemplatesFile,
}

impl<'a> FragmentRenderer<'a> {
    /// Create a renderer from a templates file
    pub fn new(templates: TemplatesFile) -> Result<Self, RenderError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        handlebars.register_helper("image_url", Box::new(ImageUrlHelper));

        for (name, template) in &templates.templates {
            handlebars
                .register_template_string(name, &template.template)
                .map_err(|e| RenderError::Template(format!("{}: {}", name, e)))?;
        }

        Ok(FragmentRenderer { handlebars, templates })
    }

    /// Renderer over the embedded templates
    pub fn embedded() -> Result<Self, RenderError> {
        Self::new(TemplatesFile::embedded().map_err(RenderError::Template)?)
    }

    /// Load from a file path
    pub fn load(path: &str) -> Result<Self, RenderError> {
        Self::new(TemplatesFile::load(path).map_err(RenderError::Template)?)
    }

    /// Render the fragment for a decoded engine result
    pub fn render(&self, operation: SubCommand, result: &DecodedResult) -> Result<String, RenderError> {
        let (template, data) = fragment_data(operation, result);
        self.render_named(template, &data)
    }

    /// Render the minimal body used for non-2xx responses
    pub fn render_failure(&self, message: &str) -> Result<String, RenderError> {
        self.render_named("failure", &json!({ "message": message }))
    }

    /// List available template names
    pub fn list_templates(&self) -> Vec<&str> {
        self.templates.list_templates()
    }

    fn render_named(&self, template: &str, data: &Value) -> Result<String, RenderError> {
        self.handlebars
            .render(template, data)
            .map_err(|e| RenderError::Render(format!("{}: {}", template, e)))
    }
}

/// Template name and context for a result
fn fragment_data(operation: SubCommand, result: &DecodedResult) -> (&'static str, Value) {
    let label = operation.label();
    match result {
        DecodedResult::Error { message } => {
            ("error", json!({ "operation": label, "message": message }))
        }
        DecodedResult::Success { message } => {
            ("success", json!({ "operation": label, "message": message }))
        }
        DecodedResult::Found(entry) => {
            let mut data = entry_data(entry);
            data["operation"] = json!(label);
            ("found", data)
        }
        DecodedResult::FoundMany { entries } => {
            let entries: Vec<Value> = entries.iter().map(entry_data).collect();
            ("found_many", json!({ "operation": label, "entries": entries }))
        }
        DecodedResult::Unknown { raw } => {
            ("unknown", json!({ "operation": label, "raw": raw.to_string() }))
        }
    }
}

fn entry_data(entry: &FoundEntry) -> Value {
    json!({ "name": entry.name, "image_path": entry.image_path })
}

/// Public URL for an image file name (`a.jpg` -> `/images/a.jpg`), escaped
/// for use inside an attribute.
struct ImageUrlHelper;

impl HelperDef for ImageUrlHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _r: &'reg Handlebars<'reg>,
        _ctx: &'rc Context,
        _rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let path = h.param(0)
            .and_then(|v| v.value().as_str())
            .unwrap_or("");

        out.write(&html_escape(&format!("{}{}", IMAGE_ROUTE, path)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> FragmentRenderer<'static> {
        FragmentRenderer::embedded().unwrap()
    }

    #[test]
    fn test_error_fragment() {
        let html = renderer()
            .render(SubCommand::SearchPerson, &DecodedResult::Error { message: "No match".into() })
            .unwrap();
        assert_eq!(html, r#"<h2 class="result result-error">No match</h2>"#);
    }

    #[test]
    fn test_found_card() {
        let result = DecodedResult::Found(FoundEntry {
            name: "Ada".into(),
            image_path: "ada.jpg".into(),
        });
        let html = renderer().render(SubCommand::SearchPerson, &result).unwrap();
        assert!(html.contains(r#"src="/images/ada.jpg""#));
        assert!(html.contains(r#"<p class="result-caption">Ada</p>"#));
    }

    #[test]
    fn test_card_without_image() {
        let result = DecodedResult::Found(FoundEntry {
            name: "No match found in the database.".into(),
            image_path: String::new(),
        });
        let html = renderer().render(SubCommand::SearchPerson, &result).unwrap();
        assert!(!html.contains("<img"));
        assert!(html.contains("No match found in the database."));
    }

    #[test]
    fn test_image_url_is_escaped() {
        let result = DecodedResult::Found(FoundEntry {
            name: "x".into(),
            image_path: "a\"onerror=\"x.jpg".into(),
        });
        let html = renderer().render(SubCommand::SearchPerson, &result).unwrap();
        assert!(!html.contains("a\"onerror"));
        assert!(html.contains("&quot;"));
    }

    #[test]
    fn test_unknown_names_operation() {
        let result = DecodedResult::Unknown { raw: json!({ "status": 1 }) };
        let html = renderer().render(SubCommand::UpdatePerson, &result).unwrap();
        assert!(html.contains("Unknown response from update person"));
    }

    #[test]
    fn test_failure_fragment() {
        let html = renderer().render_failure("image is required").unwrap();
        assert_eq!(html, r#"<p class="error">Error: image is required</p>"#);
    }

    #[test]
    fn test_bad_template_is_rejected() {
        let mut templates = TemplatesFile::embedded().unwrap();
        if let Some(t) = templates.templates.get_mut("error") {
            t.template = "{{#if}}".to_string();
        }
        assert!(matches!(FragmentRenderer::new(templates), Err(RenderError::Template(_))));
    }
}
