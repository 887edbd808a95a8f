//! Integration tests for facegate-out with the shipped templates.
//!
//! These cover the fragment shapes the browser relies on and the escaping
//! of every engine- or user-supplied string.

use facegate_core::{decode, DecodedResult, EngineOutcome, FoundEntry, SubCommand};
use facegate_out::templates::EMBEDDED_TEMPLATES;
use facegate_out::FragmentRenderer;
use serde_json::json;

fn renderer() -> FragmentRenderer<'static> {
    FragmentRenderer::embedded().unwrap()
}

fn decoded(value: serde_json::Value) -> DecodedResult {
    decode(&EngineOutcome::new(value.to_string().into_bytes(), true)).unwrap()
}

// =============================================================================
// Result shapes
// =============================================================================

#[test]
fn test_found_many_grid_in_order() {
    let result = decoded(json!({
        "Success": [
            { "name": "A", "main_image": "/abs/dir/a.jpg" },
            { "name": "B", "main_image": "/abs/dir/b.jpg" }
        ]
    }));
    let html = renderer().render(SubCommand::SearchName, &result).unwrap();

    assert!(html.starts_with(r#"<div class="result-grid">"#));
    assert_eq!(html.matches(r#"<div class="result-card">"#).count(), 2);
    let a = html.find(r#"src="/images/a.jpg""#).unwrap();
    let b = html.find(r#"src="/images/b.jpg""#).unwrap();
    assert!(a < b);
    assert!(!html.contains("/abs/dir"));
}

#[test]
fn test_empty_search_renders_empty_grid() {
    let result = decoded(json!({ "Success": [] }));
    let html = renderer().render(SubCommand::SearchName, &result).unwrap();
    assert_eq!(html, r#"<div class="result-grid"></div>"#);
    assert!(!html.contains("Unknown"));
}

#[test]
fn test_error_wins_and_is_error_styled() {
    let result = decoded(json!({ "Error": "X", "Success": "Y" }));
    let html = renderer().render(SubCommand::AddPerson, &result).unwrap();
    assert!(html.contains("result-error"));
    assert!(html.contains(">X<"));
    assert!(!html.contains("Y"));
}

#[test]
fn test_every_operation_has_unknown_fragment() {
    let result = DecodedResult::Unknown { raw: json!({}) };
    for op in SubCommand::ALL {
        let html = renderer().render(op, &result).unwrap();
        assert!(html.contains(op.label()), "{}", html);
    }
}

// =============================================================================
// Escaping
// =============================================================================

#[test]
fn test_messages_are_escaped() {
    let result = DecodedResult::Error { message: "<script>alert(1)</script>".into() };
    let html = renderer().render(SubCommand::SearchPerson, &result).unwrap();
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
}

#[test]
fn test_names_are_escaped_in_caption_and_alt() {
    let result = DecodedResult::FoundMany {
        entries: vec![FoundEntry {
            name: "\"><img src=x onerror=alert(1)>".into(),
            image_path: "a.jpg".into(),
        }],
    };
    let html = renderer().render(SubCommand::SearchName, &result).unwrap();
    assert!(!html.contains("<img src=x"));
    assert_eq!(html.matches("<img").count(), 1);
}

#[test]
fn test_failure_message_is_escaped() {
    let html = renderer().render_failure("bad <name>").unwrap();
    assert_eq!(html, r#"<p class="error">Error: bad &lt;name&gt;</p>"#);
}

// =============================================================================
// Custom templates
// =============================================================================

#[test]
fn test_custom_templates_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fragments.yaml");
    let yaml = EMBEDDED_TEMPLATES.replace("result-success", "ok");
    std::fs::write(&path, yaml).unwrap();

    let renderer = FragmentRenderer::load(path.to_str().unwrap()).unwrap();
    let html = renderer
        .render(SubCommand::UpdatePerson, &DecodedResult::Success { message: "Updated".into() })
        .unwrap();
    assert_eq!(html, r#"<h2 class="result ok">Updated</h2>"#);
}
