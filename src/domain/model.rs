use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Extensions accepted for every upload, lowercase and without the dot.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "txt", "png", "jpg", "jpeg"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Pdf,
    Text,
    Image,
}

impl FileKind {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Text),
            "png" | "jpg" | "jpeg" => Some(Self::Image),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// Exposes extracted fields generically, in display order.
pub trait DocumentFields {
    fn entries(&self) -> Vec<(&'static str, Option<&str>)>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryDocumentFields {
    pub name: Option<String>,
    #[serde(rename = "dob")]
    pub date_of_birth: Option<String>,
    /// Matches `[A-Z]{5}\d{4}[A-Z]` when present.
    #[serde(rename = "pan")]
    pub identifier: Option<String>,
}

impl DocumentFields for PrimaryDocumentFields {
    fn entries(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("Name", self.name.as_deref()),
            ("Date of birth", self.date_of_birth.as_deref()),
            ("PAN", self.identifier.as_deref()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportingDocumentFields {
    /// Best-effort 9 to 12 digit number, not schema validated.
    #[serde(rename = "generic_id")]
    pub generic_identifier: Option<String>,
}

impl DocumentFields for SupportingDocumentFields {
    fn entries(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![("Generic ID", self.generic_identifier.as_deref())]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDocument<F> {
    #[serde(rename = "text")]
    pub raw_text: String,
    #[serde(flatten)]
    pub fields: F,
}

impl<F> ExtractedDocument<F> {
    pub fn new(raw_text: impl Into<String>, fields: F) -> Self {
        Self {
            raw_text: raw_text.into(),
            fields,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationSummary {
    Verified,
    Mismatch,
}

impl fmt::Display for VerificationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verified => write!(f, "Verified ✅"),
            Self::Mismatch => write!(f, "Mismatch found ❌"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub summary: VerificationSummary,
    pub flags: Vec<String>,
}

impl VerificationResult {
    pub fn from_flags(flags: Vec<String>) -> Self {
        let summary = if flags.is_empty() {
            VerificationSummary::Verified
        } else {
            VerificationSummary::Mismatch
        };
        Self { summary, flags }
    }

    pub fn is_verified(&self) -> bool {
        self.summary == VerificationSummary::Verified
    }
}

/// A file as received from the client.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// One primary document plus at least one supporting document, all of an
/// allowed type. Built through `web::upload::UploadForm::into_batch`.
#[derive(Debug, Clone)]
pub struct UploadBatch {
    pub(crate) primary: UploadedFile,
    pub(crate) supporting: Vec<UploadedFile>,
}

impl UploadBatch {
    pub fn primary(&self) -> &UploadedFile {
        &self.primary
    }

    pub fn supporting(&self) -> &[UploadedFile] {
        &self.supporting
    }

    pub fn document_count(&self) -> usize {
        1 + self.supporting.len()
    }
}

/// A file written into a request's scratch directory.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub file_name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct StoredBatch {
    pub primary: StoredDocument,
    pub supporting: Vec<StoredDocument>,
}

#[derive(Debug, Clone)]
pub struct RawBatch {
    pub primary_text: String,
    pub supporting_texts: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ExtractedBatch {
    pub primary: ExtractedDocument<PrimaryDocumentFields>,
    pub supporting: Vec<ExtractedDocument<SupportingDocumentFields>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub request_id: Uuid,
    pub processed_at: DateTime<Utc>,
    pub pan_info: ExtractedDocument<PrimaryDocumentFields>,
    pub other_docs: Vec<ExtractedDocument<SupportingDocumentFields>>,
    #[serde(flatten)]
    pub verification: VerificationResult,
}

impl VerificationReport {
    pub fn new(request_id: Uuid, batch: ExtractedBatch, verification: VerificationResult) -> Self {
        Self {
            request_id,
            processed_at: Utc::now(),
            pan_info: batch.primary,
            other_docs: batch.supporting,
            verification,
        }
    }
}
