//! Core data models used throughout Doc Intake.
//!
//! These types represent the uploaded documents and the application modes
//! that flow through the intake, classification, and browsing pipeline.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blob::ContentRef;

/// Opaque document identifier, `doc-<uuid>`.
///
/// Ids are generated once per upload and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn generate() -> Self {
        Self(format!("doc-{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Raw item produced by file acquisition before it enters the collection.
#[derive(Debug)]
pub struct FileUpload {
    pub name: String,
    pub content: ContentRef,
}

impl FileUpload {
    pub fn new(name: impl Into<String>, content: ContentRef) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }
}

/// One uploaded file plus its metadata and optional classification label.
///
/// `id`, `name`, `content`, and `uploaded_at` are fixed at creation. Only
/// the [`CollectionStore`](crate::store::CollectionStore) rewrites
/// `classification`.
#[derive(Debug)]
pub struct Document {
    id: DocumentId,
    name: String,
    content: ContentRef,
    classification: Option<String>,
    uploaded_at: DateTime<Utc>,
}

impl Document {
    pub(crate) fn from_upload(upload: FileUpload, uploaded_at: DateTime<Utc>) -> Self {
        Self {
            id: DocumentId::generate(),
            name: upload.name,
            content: upload.content,
            classification: None,
            uploaded_at,
        }
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &ContentRef {
        &self.content
    }

    pub fn classification(&self) -> Option<&str> {
        self.classification.as_deref()
    }

    pub fn uploaded_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }

    pub(crate) fn set_classification(&mut self, label: &str) {
        self.classification = Some(label.to_string());
    }

    /// Detached, serializable view of this document.
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            classification: self.classification.clone(),
            uploaded_at: self.uploaded_at,
            size: self.content.len(),
            content_uri: self.content.uri(),
        }
    }
}

/// Serializable snapshot of a [`Document`], without ownership of its bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub name: String,
    pub classification: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub size: usize,
    pub content_uri: String,
}

/// Active top-level screen of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    #[default]
    Upload,
    Classify,
    #[serde(alias = "view")]
    Browse,
    SearchImage,
    SearchPrompt,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Upload,
        Mode::Classify,
        Mode::Browse,
        Mode::SearchImage,
        Mode::SearchPrompt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Upload => "upload",
            Mode::Classify => "classify",
            Mode::Browse => "browse",
            Mode::SearchImage => "search-image",
            Mode::SearchPrompt => "search-prompt",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upload" => Ok(Mode::Upload),
            "classify" => Ok(Mode::Classify),
            "browse" | "view" => Ok(Mode::Browse),
            "search-image" => Ok(Mode::SearchImage),
            "search-prompt" => Ok(Mode::SearchPrompt),
            other => Err(format!(
                "Unknown mode: '{}'. Must be upload, classify, browse, search-image, or search-prompt.",
                other
            )),
        }
    }
}
