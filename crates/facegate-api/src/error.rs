//! HTTP mapping for pipeline failures.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use facegate_core::PipelineError;
use facegate_out::FragmentRenderer;

const FALLBACK_FRAGMENT: &str = r#"<p class="error">Error: internal error</p>"#;

/// A non-2xx response carrying a `failure` fragment.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub fragment: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: &str, renderer: &FragmentRenderer<'_>) -> Self {
        let fragment = renderer
            .render_failure(message)
            .unwrap_or_else(|_| FALLBACK_FRAGMENT.to_string());
        Self { status, fragment }
    }

    /// Validation failures are the client's fault; everything else is ours.
    pub fn from_pipeline(err: &PipelineError, renderer: &FragmentRenderer<'_>) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self::new(status, &err.to_string(), renderer)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Html(self.fragment)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let renderer = FragmentRenderer::embedded().unwrap();

        let err = ApiError::from_pipeline(&PipelineError::Validation("image is required".into()), &renderer);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.fragment.contains("image is required"));

        for e in [
            PipelineError::Io("disk full".into()),
            PipelineError::EngineLaunch("missing".into()),
            PipelineError::MalformedOutput("eof".into()),
            PipelineError::Render("bad".into()),
        ] {
            assert_eq!(ApiError::from_pipeline(&e, &renderer).status, StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
