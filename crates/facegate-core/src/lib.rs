//! Facegate Core: data model, engine contract, staging and decoding
//!
//! Everything the upload-to-engine pipeline needs that does not depend on
//! HTTP or on how the recognition engine is actually reached.

pub mod data_model;
pub mod engine;
pub mod error;
pub mod context;
pub mod staging;
pub mod decoder;

pub use data_model::{
    DecodedResult, EngineInvocation, EngineOutcome, FoundEntry, SubCommand, UploadedAsset,
};
pub use engine::{EngineError, RecognitionEngine};
pub use error::PipelineError;
pub use context::RequestContext;
pub use staging::{StagedFile, TempStaging};
pub use decoder::decode;

/// Facegate version reported by the health endpoint
pub const FACEGATE_VERSION: &str = env!("CARGO_PKG_VERSION");
