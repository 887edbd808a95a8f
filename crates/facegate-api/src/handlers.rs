//! API Handlers
use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, FromRequest, Multipart, Request, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse},
    Form, Json,
};
use facegate_core::{UploadedAsset, FACEGATE_VERSION};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::error::ApiError;
use crate::pipeline::PersonForm;
use crate::AppState;

type FragmentResult = Result<Html<String>, ApiError>;

pub async fn add_person(State(state): State<Arc<AppState>>, FormBody(form): FormBody) -> FragmentResult {
    state.orchestrator.enroll(form).await.map(Html).map_err(|e| state.fail(&e))
}

pub async fn search_person(State(state): State<Arc<AppState>>, FormBody(form): FormBody) -> FragmentResult {
    state.orchestrator.search_by_image(form).await.map(Html).map_err(|e| state.fail(&e))
}

pub async fn search_name(State(state): State<Arc<AppState>>, FormBody(form): FormBody) -> FragmentResult {
    state.orchestrator.search_by_name(form).await.map(Html).map_err(|e| state.fail(&e))
}

pub async fn update_person(State(state): State<Arc<AppState>>, FormBody(form): FormBody) -> FragmentResult {
    state.orchestrator.update(form).await.map(Html).map_err(|e| state.fail(&e))
}

pub async fn health() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok", "version": FACEGATE_VERSION })))
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => {
            warn!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, String::new())
        }
    }
}

/// Person form read from either a urlencoded or a multipart body.
/// Rejections are rendered as `failure` fragments.
pub struct FormBody(pub PersonForm);

/// Urlencoded bodies carry text fields only
#[derive(Debug, Deserialize)]
struct TextFields {
    name: Option<String>,
}

impl FromRequest<Arc<AppState>> for FormBody {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        if is_urlencoded(req.headers()) {
            let Form(fields) = Form::<TextFields>::from_request(req, state)
                .await
                .map_err(|e| rejected(state, e.status(), &e.body_text()))?;
            return Ok(FormBody(PersonForm::new(fields.name.as_deref(), None)));
        }

        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| rejected(state, e.status(), &e.body_text()))?;
        parse_multipart(multipart)
            .await
            .map(FormBody)
            .map_err(|e| rejected(state, e.status(), &e.body_text()))
    }
}

fn is_urlencoded(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/x-www-form-urlencoded"))
}

fn rejected(state: &AppState, status: StatusCode, message: &str) -> ApiError {
    warn!(%status, error = %message, "Rejected form body");
    ApiError::new(status, message, state.orchestrator.renderer())
}

/// Collects `name` and `image`; other fields are ignored. An image part with
/// no content counts as absent.
async fn parse_multipart(mut multipart: Multipart) -> Result<PersonForm, MultipartError> {
    let mut form = PersonForm::default();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => form.name = Some(field.text().await?),
            "image" => {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    form.image = Some(UploadedAsset::new(file_name, bytes.to_vec()));
                }
            }
            _ => {}
        }
    }

    Ok(form)
}
