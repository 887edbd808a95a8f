//! Request orchestrators: validate, stage, invoke, decode, render.
//!
//! Each operation validates its form before anything touches the disk. A
//! staged upload is handed to the task that runs the engine and is released
//! as soon as the engine returns, whether or not the request is still
//! waiting. Dropping the [`StagedFile`] covers every other exit path.
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use facegate_core::{
    decode, EngineError, EngineOutcome, PipelineError, RecognitionEngine, RequestContext,
    StagedFile, SubCommand, TempStaging, UploadedAsset,
};
use facegate_out::FragmentRenderer;
use tracing::{error, info, warn, Instrument};

use crate::metrics::Metrics;

/// Fields accepted by the person endpoints
#[derive(Debug, Default, Clone)]
pub struct PersonForm {
    pub name: Option<String>,
    pub image: Option<UploadedAsset>,
}

impl PersonForm {
    pub fn new(name: Option<&str>, image: Option<UploadedAsset>) -> Self {
        Self {
            name: name.map(str::to_string),
            image,
        }
    }
}

pub struct Orchestrator {
    engine: Arc<dyn RecognitionEngine>,
    staging: TempStaging,
    renderer: FragmentRenderer<'static>,
    metrics: Arc<Metrics>,
}

impl Orchestrator {
    pub fn new(
        engine: Arc<dyn RecognitionEngine>,
        staging: TempStaging,
        renderer: FragmentRenderer<'static>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            engine,
            staging,
            renderer,
            metrics,
        }
    }

    pub fn renderer(&self) -> &FragmentRenderer<'static> {
        &self.renderer
    }

    /// `add-person <name> <image>`
    pub async fn enroll(&self, form: PersonForm) -> Result<String, PipelineError> {
        let op = SubCommand::AddPerson;
        self.observe(op, async {
            let name = required_name(form.name)?;
            let image = required_image(form.image)?;

            let staged = self.stage(image).await?;
            let outcome = self
                .run_staged(staged, move |engine, path| async move {
                    engine.add_person(&name, &path).await
                })
                .await;
            self.finish(op, outcome)
        })
        .await
    }

    /// `search-person <image>`
    pub async fn search_by_image(&self, form: PersonForm) -> Result<String, PipelineError> {
        let op = SubCommand::SearchPerson;
        self.observe(op, async {
            let image = required_image(form.image)?;

            let staged = self.stage(image).await?;
            let outcome = self
                .run_staged(staged, |engine, path| async move {
                    engine.search_person(&path).await
                })
                .await;
            self.finish(op, outcome)
        })
        .await
    }

    /// `search-name <name>`, nothing staged
    pub async fn search_by_name(&self, form: PersonForm) -> Result<String, PipelineError> {
        let op = SubCommand::SearchName;
        self.observe(op, async {
            let name = required_name(form.name)?;

            let outcome = self.engine.search_name(&name).await;
            self.finish(op, outcome)
        })
        .await
    }

    /// `update-person <name> <image>`
    pub async fn update(&self, form: PersonForm) -> Result<String, PipelineError> {
        let op = SubCommand::UpdatePerson;
        self.observe(op, async {
            let name = required_name(form.name)?;
            let image = required_image(form.image)?;

            let staged = self.stage(image).await?;
            let outcome = self
                .run_staged(staged, move |engine, path| async move {
                    engine.update_person(&name, &path).await
                })
                .await;
            self.finish(op, outcome)
        })
        .await
    }

    async fn stage(&self, image: UploadedAsset) -> Result<StagedFile, PipelineError> {
        let staging = self.staging.clone();
        tokio::task::spawn_blocking(move || {
            let ext = image.extension_hint();
            staging.stage(&image.bytes, ext.as_deref())
        })
        .await
        .map_err(|e| PipelineError::Io(format!("staging task failed: {}", e)))?
    }

    /// Runs `call` against the staged file on its own task. The task owns the
    /// file and releases it once the engine returns, even if this request has
    /// been dropped by then.
    async fn run_staged<F, Fut>(
        &self,
        mut staged: StagedFile,
        call: F,
    ) -> Result<EngineOutcome, EngineError>
    where
        F: FnOnce(Arc<dyn RecognitionEngine>, PathBuf) -> Fut + Send + 'static,
        Fut: Future<Output = Result<EngineOutcome, EngineError>> + Send + 'static,
    {
        let engine = self.engine.clone();
        let path = staged.path().to_path_buf();
        let task = tokio::spawn(
            async move {
                let outcome = call(engine, path).await;
                staged.release();
                outcome
            }
            .in_current_span(),
        );

        task.await
            .map_err(|e| EngineError::Io(format!("engine task failed: {}", e)))?
    }

    /// Decode and render whatever the engine produced.
    fn finish(
        &self,
        op: SubCommand,
        outcome: Result<EngineOutcome, EngineError>,
    ) -> Result<String, PipelineError> {
        self.metrics.record_engine(op, &outcome);
        let outcome = outcome?;

        if !outcome.exit_succeeded {
            warn!("Engine exited with failure status, decoding output anyway");
        }

        let decoded = decode(&outcome).inspect_err(|_| {
            error!(output = %outcome.output_text(), "Engine output is not a JSON object");
        })?;

        self.renderer
            .render(op, &decoded)
            .map_err(|e| PipelineError::Render(e.to_string()))
    }

    /// Runs one orchestration inside a request span and records its latency.
    async fn observe<F>(&self, op: SubCommand, work: F) -> Result<String, PipelineError>
    where
        F: Future<Output = Result<String, PipelineError>>,
    {
        let ctx = RequestContext::new(op);
        let span = tracing::info_span!(
            "orchestrate",
            request_id = %ctx.request_id,
            operation = %op,
            engine = self.engine.id(),
        );

        let result = work.instrument(span.clone()).await;
        let latency_ms = ctx.elapsed_ms();
        self.metrics.observe_request(op, latency_ms as f64 / 1000.0);

        let _entered = span.enter();
        match &result {
            Ok(_) => info!(latency_ms, "Request handled"),
            Err(e) if e.is_client_error() => warn!(latency_ms, error = %e, "Request rejected"),
            Err(e) => error!(latency_ms, error = %e, "Request failed"),
        }
        result
    }
}

fn required_name(name: Option<String>) -> Result<String, PipelineError> {
    let name = name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| PipelineError::Validation("name is required".to_string()))?;

    // A leading dash would reach the engine as an option flag.
    if name.starts_with('-') {
        return Err(PipelineError::Validation(
            "name must not start with '-'".to_string(),
        ));
    }
    Ok(name)
}

fn required_image(image: Option<UploadedAsset>) -> Result<UploadedAsset, PipelineError> {
    image
        .filter(|asset| !asset.bytes.is_empty())
        .ok_or_else(|| PipelineError::Validation("image is required".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_name() {
        assert_eq!(required_name(Some("  Ada ".into())).unwrap(), "Ada");
        assert!(matches!(required_name(None), Err(PipelineError::Validation(_))));
        assert!(matches!(required_name(Some("   ".into())), Err(PipelineError::Validation(_))));
        assert!(matches!(required_name(Some("--help".into())), Err(PipelineError::Validation(_))));
    }

    #[test]
    fn test_required_image() {
        let empty = UploadedAsset::new(Some("a.jpg".into()), Vec::new());
        assert!(matches!(required_image(Some(empty)), Err(PipelineError::Validation(_))));
        assert!(matches!(required_image(None), Err(PipelineError::Validation(_))));

        let asset = UploadedAsset::new(Some("a.jpg".into()), b"jpeg".to_vec());
        assert_eq!(required_image(Some(asset)).unwrap().bytes, b"jpeg");
    }
}
