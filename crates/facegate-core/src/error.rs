//! Unified Error Model
use thiserror::Error;

use crate::engine::EngineError;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Missing or unusable request field.
    #[error("VALIDATION/{0}")]
    Validation(String),

    /// Staging write or temp-file creation failed.
    #[error("IO/{0}")]
    Io(String),

    #[error("ENGINE/LAUNCH/{0}")]
    EngineLaunch(String),

    /// Engine output was not a JSON object.
    #[error("ENGINE/OUTPUT/{0}")]
    MalformedOutput(String),

    #[error("RENDER/{0}")]
    Render(String),
}

impl PipelineError {
    /// True for failures caused by the request itself rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<EngineError> for PipelineError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Launch(msg) => Self::EngineLaunch(msg),
            EngineError::Io(msg) => Self::Io(msg),
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_validation_is_client_error() {
        assert!(PipelineError::Validation("image is required".into()).is_client_error());
        assert!(!PipelineError::MalformedOutput("eof".into()).is_client_error());
        assert!(!PipelineError::Io("disk full".into()).is_client_error());
    }

    #[test]
    fn test_engine_error_mapping() {
        let err: PipelineError = EngineError::Launch("not found".into()).into();
        assert!(matches!(err, PipelineError::EngineLaunch(_)));
        assert_eq!(err.to_string(), "ENGINE/LAUNCH/not found");
    }
}
