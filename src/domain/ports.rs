use crate::domain::model::{ExtractedBatch, RawBatch, StoredBatch, VerificationResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Scratch space for uploaded files. Every request gets its own workspace.
pub trait Storage: Send + Sync {
    fn create_workspace(
        &self,
        request_id: &str,
    ) -> impl std::future::Future<Output = Result<PathBuf>> + Send;
    fn write_file(
        &self,
        workspace: &Path,
        name: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<PathBuf>> + Send;
    fn remove_workspace(
        &self,
        workspace: &Path,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn bind_addr(&self) -> &str;
    fn upload_dir(&self) -> &str;
    fn max_upload_bytes(&self) -> usize;
    fn extraction_timeout(&self) -> Duration;
    fn ocr_binary(&self) -> &str;
    fn ocr_language(&self) -> &str;
    fn monitoring_enabled(&self) -> bool;
}

/// Optical character recognition backend.
///
/// One instance lives for the whole process; `warm_up` pays the startup cost
/// once and later calls reuse it.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &str;
    async fn warm_up(&self) -> Result<()>;
    /// Recognised text lines, top to bottom.
    async fn recognize(&self, image_path: &Path) -> Result<Vec<String>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self, batch: &StoredBatch) -> Result<RawBatch>;
    async fn transform(&self, raw: RawBatch) -> Result<ExtractedBatch>;
    async fn verify(&self, extracted: &ExtractedBatch) -> Result<VerificationResult>;
}
