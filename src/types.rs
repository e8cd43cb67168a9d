// Core data model for the slip verification workflow

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Greeting prefix shown once a student has been resolved
pub const GREETING_PREFIX: &str = "สวัสดี น้อง";

/// User-supplied student identifier. Opaque: only emptiness is ever inspected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A student whose identifier has been looked up successfully
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedStudent {
    pub identifier: Identifier,
    pub display_name: String,
}

impl ResolvedStudent {
    pub fn new(identifier: Identifier, display_name: impl Into<String>) -> Self {
        Self {
            identifier,
            display_name: display_name.into(),
        }
    }

    pub fn greeting(&self) -> String {
        format!("{} {}", GREETING_PREFIX, self.display_name)
    }
}

/// Backend acknowledgement of an uploaded slip. The body is kept for logs only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlipAck {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("failed to read slip image {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{file_name} is empty")]
    Empty { file_name: String },
    #[error("{file_name} is not an image (detected {detected})")]
    NotAnImage { file_name: String, detected: String },
}

/// A locally chosen slip image.
///
/// Owned exclusively by the workflow state: it is moved in on selection and
/// dropped on successful submission or reset. It is intentionally not `Clone`.
#[derive(PartialEq, Eq)]
pub struct SelectedImage {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl SelectedImage {
    /// Accepts the blob only if its content sniffs as an image.
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, SelectionError> {
        let file_name = file_name.into();
        if bytes.is_empty() {
            return Err(SelectionError::Empty { file_name });
        }

        match infer::get(&bytes) {
            Some(kind) if kind.matcher_type() == infer::MatcherType::Image => Ok(Self {
                file_name,
                content_type: kind.mime_type().to_string(),
                bytes,
            }),
            Some(kind) => Err(SelectionError::NotAnImage {
                file_name,
                detected: kind.mime_type().to_string(),
            }),
            None => Err(SelectionError::NotAnImage {
                file_name,
                detected: "unknown".to_string(),
            }),
        }
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SelectionError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|source| SelectionError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self::from_bytes(file_name, bytes)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for SelectedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedImage")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Revocable handle to a local preview, shaped like a browser object URL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewHandle(String);

impl PreviewHandle {
    pub(crate) fn new(url: String) -> Self {
        Self(url)
    }

    pub fn url(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the preview area currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewReference {
    /// Local rendering of the selected image
    Local {
        handle: PreviewHandle,
        file_name: String,
    },
    /// Fixed remote icon shown after a successful upload
    Placeholder { url: String },
}

impl PreviewReference {
    pub fn src(&self) -> &str {
        match self {
            PreviewReference::Local { handle, .. } => handle.url(),
            PreviewReference::Placeholder { url } => url,
        }
    }

    pub fn local_handle(&self) -> Option<&PreviewHandle> {
        match self {
            PreviewReference::Local { handle, .. } => Some(handle),
            PreviewReference::Placeholder { .. } => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, PreviewReference::Placeholder { .. })
    }
}
