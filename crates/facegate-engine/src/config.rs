//! Where the engine lives and how hard it may be driven.
use std::path::{Path, PathBuf};

/// Default interpreter, relative to the engine project root
pub const DEFAULT_EXECUTABLE: &str = "env/bin/python";
/// Default entry script, relative to the engine project root
pub const DEFAULT_ENTRY_SCRIPT: &str = "cli.py";

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory that relative executable and script paths hang off
    pub project_root: PathBuf,
    pub executable: PathBuf,
    pub entry_script: PathBuf,
    /// Upper bound on concurrently running engine processes; `None` is unbounded
    pub max_concurrent: Option<usize>,
}

impl EngineConfig {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            executable: PathBuf::from(DEFAULT_EXECUTABLE),
            entry_script: PathBuf::from(DEFAULT_ENTRY_SCRIPT),
            max_concurrent: None,
        }
    }

    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn with_entry_script(mut self, entry_script: impl Into<PathBuf>) -> Self {
        self.entry_script = entry_script.into();
        self
    }

    pub fn with_max_concurrent(mut self, max_concurrent: Option<usize>) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    /// Executable path, absolute or joined to the project root
    pub fn resolved_executable(&self) -> PathBuf {
        resolve(&self.project_root, &self.executable)
    }

    /// Entry script path, absolute or joined to the project root
    pub fn resolved_entry_script(&self) -> PathBuf {
        resolve(&self.project_root, &self.entry_script)
    }
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
