//! Engine Trait: the contract every recognition engine adapter fulfils
use async_trait::async_trait;
use std::path::Path;

use crate::data_model::{EngineInvocation, EngineOutcome};

/// An identity-matching engine reached through four sub-commands.
///
/// Implementors only provide [`RecognitionEngine::invoke`]; the per
/// sub-command methods build the positional argument list.
#[async_trait]
pub trait RecognitionEngine: Send + Sync {
    /// Short adapter name (ex: "cli")
    fn id(&self) -> &'static str;

    /// Runs one invocation to completion.
    ///
    /// A non-zero exit is reported through [`EngineOutcome::exit_succeeded`],
    /// not as an error.
    async fn invoke(&self, invocation: EngineInvocation) -> Result<EngineOutcome, EngineError>;

    async fn add_person(&self, name: &str, image: &Path) -> Result<EngineOutcome, EngineError> {
        self.invoke(EngineInvocation::add_person(name, image)).await
    }

    async fn search_person(&self, image: &Path) -> Result<EngineOutcome, EngineError> {
        self.invoke(EngineInvocation::search_person(image)).await
    }

    async fn search_name(&self, name: &str) -> Result<EngineOutcome, EngineError> {
        self.invoke(EngineInvocation::search_name(name)).await
    }

    async fn update_person(&self, name: &str, image: &Path) -> Result<EngineOutcome, EngineError> {
        self.invoke(EngineInvocation::update_person(name, image)).await
    }
}

#[derive(Debug, Clone)]
pub enum EngineError {
    /// The engine could not be started.
    Launch(String),
    /// The engine started but its output could not be collected.
    Io(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Launch(msg) => write!(f, "ENGINE/LAUNCH: {}", msg),
            Self::Io(msg) => write!(f, "ENGINE/IO: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_model::SubCommand;
    use std::path::PathBuf;
    use std::sync::Mutex;

    struct Recorder {
        calls: Mutex<Vec<EngineInvocation>>,
    }

    #[async_trait]
    impl RecognitionEngine for Recorder {
        fn id(&self) -> &'static str {
            "recorder"
        }

        async fn invoke(&self, invocation: EngineInvocation) -> Result<EngineOutcome, EngineError> {
            self.calls.lock().unwrap().push(invocation);
            Ok(EngineOutcome::new(b"{}".to_vec(), true))
        }
    }

    #[tokio::test]
    async fn test_provided_methods_build_invocations() {
        let engine = Recorder { calls: Mutex::new(Vec::new()) };
        let image = PathBuf::from("/scratch/a.png");

        engine.add_person("Ada", &image).await.unwrap();
        engine.search_person(&image).await.unwrap();
        engine.search_name("Ada").await.unwrap();
        engine.update_person("Ada", &image).await.unwrap();

        let calls = engine.calls.lock().unwrap();
        let commands: Vec<SubCommand> = calls.iter().map(|c| c.sub_command()).collect();
        assert_eq!(commands, SubCommand::ALL.to_vec());
        assert_eq!(calls[0].args(), &["Ada".to_string(), "/scratch/a.png".to_string()]);
        assert_eq!(calls[1].args(), &["/scratch/a.png".to_string()]);
        assert_eq!(calls[2].args(), &["Ada".to_string()]);
        assert_eq!(calls[3].args(), &["Ada".to_string(), "/scratch/a.png".to_string()]);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            EngineError::Launch("No such file".into()).to_string(),
            "ENGINE/LAUNCH: No such file"
        );
    }
}
