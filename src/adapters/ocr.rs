use crate::domain::ports::OcrEngine;
use crate::utils::error::{Result, VerifyError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Instant;
use tokio::process::Command;
use tokio::sync::OnceCell;

/// Tesseract driven through its command line interface.
///
/// The binary is checked once (`tesseract --version`); the result is cached
/// for the lifetime of the process.
pub struct TesseractOcr {
    binary: String,
    language: String,
    version: OnceCell<String>,
}

impl TesseractOcr {
    pub fn new(binary: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
            version: OnceCell::new(),
        }
    }

    pub fn version(&self) -> Option<&str> {
        self.version.get().map(String::as_str)
    }

    async fn detect_version(&self) -> Result<String> {
        let started = Instant::now();
        let output = Command::new(&self.binary)
            .arg("--version")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(VerifyError::OcrUnavailableError {
                message: format!("'{} --version' exited with {}", self.binary, output.status),
            });
        }

        // 有些版本把版本資訊印在 stderr
        let banner = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).into_owned()
        } else {
            String::from_utf8_lossy(&output.stdout).into_owned()
        };
        let version = banner.lines().next().unwrap_or("tesseract").trim().to_string();

        tracing::info!(
            "🔤 OCR engine ready: {} (startup took {:?})",
            version,
            started.elapsed()
        );
        Ok(version)
    }

    fn spawn_error(&self, e: std::io::Error) -> VerifyError {
        if e.kind() == ErrorKind::NotFound {
            VerifyError::OcrUnavailableError {
                message: format!("'{}' was not found on PATH", self.binary),
            }
        } else {
            VerifyError::OcrUnavailableError {
                message: format!("failed to start '{}': {}", self.binary, e),
            }
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn warm_up(&self) -> Result<()> {
        self.version.get_or_try_init(|| self.detect_version()).await?;
        Ok(())
    }

    async fn recognize(&self, image_path: &Path) -> Result<Vec<String>> {
        self.warm_up().await?;

        let file = image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let output = Command::new(&self.binary)
            .arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VerifyError::UnreadableImageError {
                file,
                reason: stderr.trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout);
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}
