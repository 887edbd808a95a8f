//! Facegate API: HTML-fragment endpoints in front of the recognition engine
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod pipeline;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use facegate_core::{PipelineError, RecognitionEngine, TempStaging};
use facegate_engine::CliEngine;
use facegate_out::FragmentRenderer;
use tower_http::{services::ServeDir, trace::TraceLayer};

use config::{AppConfig, DEFAULT_MAX_UPLOAD_BYTES};
use error::ApiError;
use metrics::Metrics;
use pipeline::Orchestrator;

pub struct AppState {
    pub orchestrator: Orchestrator,
    pub metrics: Arc<Metrics>,
    /// Engine image directory served under `/images`
    pub images_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        engine: Arc<dyn RecognitionEngine>,
        staging: TempStaging,
        renderer: FragmentRenderer<'static>,
        images_dir: impl Into<PathBuf>,
    ) -> anyhow::Result<Self> {
        let metrics = Arc::new(Metrics::new()?);
        Ok(Self {
            orchestrator: Orchestrator::new(engine, staging, renderer, metrics.clone()),
            metrics,
            images_dir: images_dir.into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        })
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    /// Wire the subprocess engine and templates described by `config`.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let engine = CliEngine::new(config.engine.clone());
        tracing::info!(
            executable = %engine.executable().display(),
            entry_script = %engine.entry_script().display(),
            max_concurrent = ?config.engine.max_concurrent,
            "Engine configured"
        );

        let renderer = match &config.templates_path {
            Some(path) => FragmentRenderer::load(path)?,
            None => FragmentRenderer::embedded()?,
        };

        Ok(Self::new(
            Arc::new(engine),
            TempStaging::new(&config.scratch_dir),
            renderer,
            &config.images_dir,
        )?
        .with_max_upload_bytes(config.max_upload_bytes))
    }

    pub fn fail(&self, err: &PipelineError) -> ApiError {
        ApiError::from_pipeline(err, self.orchestrator.renderer())
    }
}

pub fn create_app(state: Arc<AppState>) -> Router {
    let images = ServeDir::new(&state.images_dir);
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/add_person", post(handlers::add_person))
        .route("/search_person", post(handlers::search_person))
        .route("/search_name", post(handlers::search_name))
        .route("/update_person", post(handlers::update_person))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .nest_service("/images", images)
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::cors())
        .layer(TraceLayer::new_for_http().make_span_with(middleware::request_span))
}

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_config(&config)?);
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(&config.addr).await?;

    tracing::info!("Facegate API listening on {}", config.addr);
    axum::serve(listener, app).await?;
    Ok(())
}
