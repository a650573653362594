/// Wire types exchanged with the host editor
///
/// The host sends one `HostMessage` per line on the bridge input and receives
/// `HostRequest`s back. Unknown fields are ignored so richer host payloads
/// (ranges, versions) pass through unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::constants::alert::FILE_SCHEME;

/// Identity of the edited document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentId {
    /// URI scheme, e.g. "file" or "untitled"
    pub scheme: String,
    /// Filesystem path (or virtual path for non-file documents)
    pub path: PathBuf,
}

impl DocumentId {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        DocumentId {
            scheme: FILE_SCHEME.to_string(),
            path: path.into(),
        }
    }

    pub fn is_file(&self) -> bool {
        self.scheme == FILE_SCHEME
    }

    /// Last path component, falling back to the whole path
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_file() {
            write!(f, "{}", self.path.display())
        } else {
            write!(f, "{}:{}", self.scheme, self.path.display())
        }
    }
}

/// One discrete insertion/replacement within an edit event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeFragment {
    /// Literal text inserted by this fragment (empty for pure deletions)
    #[serde(default)]
    pub text: String,
}

impl ChangeFragment {
    pub fn new(text: impl Into<String>) -> Self {
        ChangeFragment { text: text.into() }
    }

    /// Inserted length in characters
    pub fn inserted_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A notification that a document's text changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditEvent {
    pub document: DocumentId,
    #[serde(default)]
    pub changes: Vec<ChangeFragment>,
}

impl EditEvent {
    pub fn new(document: DocumentId, changes: Vec<ChangeFragment>) -> Self {
        EditEvent { document, changes }
    }
}

/// Messages the host pushes into the monitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostMessage {
    /// A document's text changed
    DidChange(EditEvent),
    /// The user invoked a registered command
    Command { command: String },
    /// The host is shutting the monitor down
    Shutdown,
}

/// Requests the monitor sends back to the host UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostRequest {
    ShowInformationMessage {
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    SetStatusBarMessage {
        message: String,
        timeout_ms: u64,
    },
}
