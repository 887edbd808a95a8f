//! Prometheus registry for engine and request metrics, exposed on `/metrics`.
use facegate_core::{EngineError, EngineOutcome, SubCommand};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

pub struct Metrics {
    registry: Registry,
    engine_invocations: IntCounterVec,
    request_duration: HistogramVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let engine_invocations = IntCounterVec::new(
            Opts::new(
                "facegate_engine_invocations_total",
                "Engine invocations by sub-command and outcome",
            ),
            &["subcommand", "outcome"],
        )?;
        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "facegate_request_duration_seconds",
                "Time spent orchestrating a request",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
            &["operation"],
        )?;

        registry.register(Box::new(engine_invocations.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;

        Ok(Self {
            registry,
            engine_invocations,
            request_duration,
        })
    }

    pub fn record_engine(
        &self,
        sub_command: SubCommand,
        outcome: &Result<EngineOutcome, EngineError>,
    ) {
        let label = match outcome {
            Ok(o) if o.exit_succeeded => "exit_ok",
            Ok(_) => "exit_failed",
            Err(_) => "launch_failed",
        };
        self.engine_invocations
            .with_label_values(&[sub_command.as_str(), label])
            .inc();
    }

    pub fn observe_request(&self, operation: SubCommand, seconds: f64) {
        self.request_duration
            .with_label_values(&[operation.as_str()])
            .observe(seconds);
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn encode(&self) -> Result<String, prometheus::Error> {
        encode(&self.registry)
    }
}

pub fn encode(registry: &Registry) -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&registry.gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).to_string())
}
