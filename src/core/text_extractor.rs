use crate::adapters::pdf::extract_pdf_text;
use crate::domain::model::FileKind;
use crate::domain::ports::OcrEngine;
use crate::utils::error::{Result, VerifyError};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Turns a stored upload into raw text, picking the method from the file
/// extension.
#[derive(Clone)]
pub struct TextExtractor {
    ocr: Arc<dyn OcrEngine>,
    timeout: Duration,
}

impl TextExtractor {
    pub fn new(ocr: Arc<dyn OcrEngine>, timeout: Duration) -> Self {
        Self { ocr, timeout }
    }

    pub fn ocr_engine(&self) -> &Arc<dyn OcrEngine> {
        &self.ocr
    }

    pub async fn extract(&self, path: &Path) -> Result<String> {
        let kind = FileKind::from_path(path).ok_or_else(|| VerifyError::UnsupportedTypeError {
            extension: path
                .extension()
                .map(|ext| ext.to_string_lossy().to_lowercase())
                .unwrap_or_default(),
        })?;
        let file = display_name(path);

        let started = Instant::now();
        let text = tokio::time::timeout(self.timeout, self.extract_kind(kind, path, &file))
            .await
            .map_err(|_| VerifyError::ExtractionTimeoutError {
                file: file.clone(),
                seconds: self.timeout.as_secs().max(1),
            })??;

        tracing::debug!(
            "Extracted {} chars from {} ({:?}) in {:?}",
            text.len(),
            file,
            kind,
            started.elapsed()
        );
        Ok(text)
    }

    async fn extract_kind(&self, kind: FileKind, path: &Path, file: &str) -> Result<String> {
        match kind {
            FileKind::Pdf => extract_pdf_text(path).await,
            FileKind::Text => {
                let bytes = tokio::fs::read(path).await?;
                String::from_utf8(bytes).map_err(|e| VerifyError::CorruptDocumentError {
                    file: file.to_string(),
                    reason: format!("text file is not valid UTF-8: {}", e.utf8_error()),
                })
            }
            FileKind::Image => Ok(self.ocr.recognize(path).await?.join("\n")),
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
