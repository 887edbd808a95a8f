//! Facegate-OUT: decoded engine results to HTML fragments
//!
//! Each [`DecodedResult`] variant maps to one named Handlebars template.
//! Fragments are meant to be spliced into a page by the browser, so they
//! carry no document structure of their own.
//!
//! # Example
//!
//! ```ignore
//! use facegate_core::{DecodedResult, SubCommand};
//! use facegate_out::render;
//!
//! let html = render(
//!     SubCommand::SearchName,
//!     &DecodedResult::Success { message: "Updated Ada".to_string() },
//! ).unwrap();
//! assert_eq!(html, r#"<h2 class="result result-success">Updated Ada</h2>"#);
//! ```

pub mod templates;
pub mod renderer;

use facegate_core::{DecodedResult, SubCommand};
use thiserror::Error;

pub use renderer::{FragmentRenderer, IMAGE_ROUTE};
pub use templates::TemplatesFile;

/// Errors that can occur during rendering
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template load failed: {0}")]
    Template(String),
    #[error("Render failed: {0}")]
    Render(String),
}

/// Render with the embedded templates
pub fn render(operation: SubCommand, result: &DecodedResult) -> Result<String, RenderError> {
    FragmentRenderer::embedded()?.render(operation, result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_success() {
        let html = render(
            SubCommand::AddPerson,
            &DecodedResult::Success { message: "Added Ada to the database.".into() },
        )
        .unwrap();
        assert_eq!(html, r#"<h2 class="result result-success">Added Ada to the database.</h2>"#);
    }
}
