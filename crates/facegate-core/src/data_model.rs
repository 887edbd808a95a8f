//! Data Model: SubCommand, EngineInvocation, EngineOutcome, DecodedResult
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Sub-commands understood by the recognition engine. Also identifies the
/// operation a request is performing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubCommand {
    AddPerson,
    SearchPerson,
    SearchName,
    UpdatePerson,
}

impl SubCommand {
    pub const ALL: [SubCommand; 4] = [
        SubCommand::AddPerson,
        SubCommand::SearchPerson,
        SubCommand::SearchName,
        SubCommand::UpdatePerson,
    ];

    /// Name passed to the engine as its first positional argument
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddPerson => "add-person",
            Self::SearchPerson => "search-person",
            Self::SearchName => "search-name",
            Self::UpdatePerson => "update-person",
        }
    }

    /// Human-readable label used in rendered fragments
    pub fn label(&self) -> &'static str {
        match self {
            Self::AddPerson => "add person",
            Self::SearchPerson => "search person",
            Self::SearchName => "search name",
            Self::UpdatePerson => "update person",
        }
    }
}

impl fmt::Display for SubCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single engine call. Arguments are positional and order-significant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineInvocation {
    sub_command: SubCommand,
    args: Vec<String>,
}

impl EngineInvocation {
    pub fn new<I, S>(sub_command: SubCommand, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sub_command,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn add_person(name: &str, image: &Path) -> Self {
        Self::new(
            SubCommand::AddPerson,
            [name.to_string(), image.to_string_lossy().into_owned()],
        )
    }

    pub fn search_person(image: &Path) -> Self {
        Self::new(SubCommand::SearchPerson, [image.to_string_lossy().into_owned()])
    }

    pub fn search_name(name: &str) -> Self {
        Self::new(SubCommand::SearchName, [name])
    }

    pub fn update_person(name: &str, image: &Path) -> Self {
        Self::new(
            SubCommand::UpdatePerson,
            [name.to_string(), image.to_string_lossy().into_owned()],
        )
    }

    pub fn sub_command(&self) -> SubCommand {
        self.sub_command
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// What came back from the engine process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOutcome {
    /// stdout followed by stderr
    pub raw_output: Vec<u8>,
    pub exit_succeeded: bool,
}

impl EngineOutcome {
    pub fn new(raw_output: impl Into<Vec<u8>>, exit_succeeded: bool) -> Self {
        Self {
            raw_output: raw_output.into(),
            exit_succeeded,
        }
    }

    /// Lossy text view of the output, for logs
    pub fn output_text(&self) -> String {
        String::from_utf8_lossy(&self.raw_output).into_owned()
    }
}

/// A person reference inside a search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundEntry {
    pub name: String,
    /// Final path component of the engine's `main_image`; empty when absent
    pub image_path: String,
}

/// Classified engine output. Exactly one variant per decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodedResult {
    Error { message: String },
    Success { message: String },
    Found(FoundEntry),
    FoundMany { entries: Vec<FoundEntry> },
    Unknown { raw: serde_json::Value },
}

impl DecodedResult {
    /// Short variant name, for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Error { .. } => "error",
            Self::Success { .. } => "success",
            Self::Found(_) => "found",
            Self::FoundMany { .. } => "found_many",
            Self::Unknown { .. } => "unknown",
        }
    }
}

/// An uploaded file held in memory for the duration of one request.
#[derive(Debug, Clone)]
pub struct UploadedAsset {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedAsset {
    pub fn new(file_name: Option<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name,
            bytes: bytes.into(),
        }
    }

    /// Extension of the declared file name, if it is short and alphanumeric
    pub fn extension_hint(&self) -> Option<String> {
        let name = self.file_name.as_deref()?;
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() || ext.len() > 8 {
            return None;
        }
        if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}
