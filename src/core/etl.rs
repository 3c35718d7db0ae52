use crate::core::{Pipeline, Storage, StoredBatch, StoredDocument, VerificationReport};
use crate::domain::model::{ExtractedBatch, UploadBatch, UploadedFile, VerificationResult};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::path::Path;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Runs one verification request end to end.
///
/// Uploaded bytes only ever live in a per-request workspace, and that
/// workspace is removed before `run` returns, whatever the outcome.
pub struct VerificationEngine<S: Storage, P: Pipeline> {
    storage: S,
    pipeline: P,
    monitor: Arc<SystemMonitor>,
}

impl<S: Storage, P: Pipeline> VerificationEngine<S, P> {
    pub fn new(storage: S, pipeline: P) -> Self {
        Self::new_with_monitoring(storage, pipeline, false)
    }

    pub fn new_with_monitoring(storage: S, pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            storage,
            pipeline,
            monitor: Arc::new(SystemMonitor::new(monitor_enabled)),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn monitor(&self) -> &SystemMonitor {
        &self.monitor
    }

    pub async fn run(&self, batch: UploadBatch) -> Result<VerificationReport> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("verification", %request_id);
        self.run_request(request_id, batch).instrument(span).await
    }

    async fn run_request(&self, request_id: Uuid, batch: UploadBatch) -> Result<VerificationReport> {
        tracing::info!(
            "📥 Verifying {} documents (primary: {})",
            batch.document_count(),
            batch.primary().file_name
        );

        let workspace = self.storage.create_workspace(&request_id.to_string()).await?;
        let outcome = self.process(&workspace, &batch).await;

        // 不論成功或失敗都要清掉上傳的檔案
        match self.storage.remove_workspace(&workspace).await {
            Ok(()) => tracing::debug!("🧹 Removed workspace {}", workspace.display()),
            Err(e) => tracing::error!(
                "❌ Failed to remove workspace {}: {}",
                workspace.display(),
                e
            ),
        }

        match outcome {
            Ok((extracted, verification)) => {
                tracing::info!(
                    "✅ {} with {} flag(s)",
                    verification.summary,
                    verification.flags.len()
                );
                Ok(VerificationReport::new(request_id, extracted, verification))
            }
            Err(e) => {
                tracing::warn!(
                    "⚠️ Verification failed: {} (Category: {:?}, Severity: {:?})",
                    e,
                    e.category(),
                    e.severity()
                );
                Err(e)
            }
        }
    }

    async fn process(
        &self,
        workspace: &Path,
        batch: &UploadBatch,
    ) -> Result<(ExtractedBatch, VerificationResult)> {
        let stored = self.store(workspace, batch).await?;

        let raw = self.pipeline.extract(&stored).await?;
        self.monitor.log_stats("Extract");

        let extracted = self.pipeline.transform(raw).await?;
        self.monitor.log_stats("Transform");

        let verification = self.pipeline.verify(&extracted).await?;
        self.monitor.log_stats("Verify");

        Ok((extracted, verification))
    }

    async fn store(&self, workspace: &Path, batch: &UploadBatch) -> Result<StoredBatch> {
        let primary = self
            .store_file(workspace, "primary", batch.primary())
            .await?;

        let mut supporting = Vec::with_capacity(batch.supporting().len());
        for (index, file) in batch.supporting().iter().enumerate() {
            let prefix = format!("supporting_{}", index + 1);
            supporting.push(self.store_file(workspace, &prefix, file).await?);
        }

        Ok(StoredBatch {
            primary,
            supporting,
        })
    }

    async fn store_file(
        &self,
        workspace: &Path,
        prefix: &str,
        file: &UploadedFile,
    ) -> Result<StoredDocument> {
        // 只用角色與副檔名命名，客戶端檔名不影響存放路徑
        let name = match Path::new(&file.file_name).extension() {
            Some(ext) => format!("{}.{}", prefix, ext.to_string_lossy()),
            None => prefix.to_string(),
        };
        let path = self.storage.write_file(workspace, &name, &file.bytes).await?;
        Ok(StoredDocument {
            file_name: file.file_name.clone(),
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::LocalStorage;
    use crate::core::{ExtractedDocument, RawBatch};
    use crate::domain::model::{PrimaryDocumentFields, VerificationSummary};
    use crate::utils::error::VerifyError;
    use crate::web::upload::UploadForm;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records the paths it was given and fails if asked to.
    struct RecordingPipeline {
        seen: Mutex<Vec<std::path::PathBuf>>,
        fail: bool,
    }

    impl RecordingPipeline {
        fn new(fail: bool) -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    #[async_trait]
    impl Pipeline for RecordingPipeline {
        async fn extract(&self, batch: &StoredBatch) -> Result<RawBatch> {
            {
                let mut seen = self.seen.lock().unwrap();
                seen.push(batch.primary.path.clone());
                seen.extend(batch.supporting.iter().map(|d| d.path.clone()));
            }
            assert!(batch.primary.path.exists());

            if self.fail {
                return Err(VerifyError::CorruptDocumentError {
                    file: batch.primary.file_name.clone(),
                    reason: "boom".to_string(),
                });
            }
            Ok(RawBatch {
                primary_text: String::new(),
                supporting_texts: vec![String::new(); batch.supporting.len()],
            })
        }

        async fn transform(&self, raw: RawBatch) -> Result<ExtractedBatch> {
            Ok(ExtractedBatch {
                primary: ExtractedDocument::new(
                    raw.primary_text,
                    PrimaryDocumentFields {
                        name: Some("Jane".to_string()),
                        ..Default::default()
                    },
                ),
                supporting: vec![],
            })
        }

        async fn verify(&self, _extracted: &ExtractedBatch) -> Result<VerificationResult> {
            Ok(VerificationResult::from_flags(vec![]))
        }
    }

    fn batch() -> UploadBatch {
        let mut form = UploadForm::default();
        form.set_primary("pan.txt", b"pan".to_vec());
        form.add_supporting("other.txt", b"one".to_vec());
        form.add_supporting("other.txt", b"two".to_vec());
        form.into_batch().unwrap()
    }

    #[tokio::test]
    async fn test_workspace_removed_after_success() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());
        let engine = VerificationEngine::new(storage, RecordingPipeline::new(false));

        let report = engine.run(batch()).await.unwrap();

        assert_eq!(report.verification.summary, VerificationSummary::Verified);
        assert_eq!(report.pan_info.fields.name.as_deref(), Some("Jane"));
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);

        // 同名檔案各自保存
        let seen = engine.pipeline().seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 3);
        assert_ne!(seen[1], seen[2]);
        assert!(seen.iter().all(|p| p.starts_with(temp_dir.path())));
    }

    #[tokio::test]
    async fn test_client_directories_do_not_collide() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());
        let engine = VerificationEngine::new(storage, RecordingPipeline::new(false));

        let mut form = UploadForm::default();
        form.set_primary("x/card.txt", b"pan".to_vec());
        form.add_supporting("a/card.txt", b"one".to_vec());
        form.add_supporting("b/card.TXT", b"two".to_vec());
        engine.run(form.into_batch().unwrap()).await.unwrap();

        let seen = engine.pipeline().seen.lock().unwrap().clone();
        let names: Vec<_> = seen
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["primary.txt", "supporting_1.txt", "supporting_2.TXT"]);
    }

    #[tokio::test]
    async fn test_workspace_removed_after_failure() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());
        let engine = VerificationEngine::new(storage, RecordingPipeline::new(true));

        let err = engine.run(batch()).await.unwrap_err();

        assert!(matches!(err, VerifyError::CorruptDocumentError { .. }));
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_each_request_gets_its_own_workspace() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());
        let engine = VerificationEngine::new(storage, RecordingPipeline::new(false));

        let (first, second) = tokio::join!(engine.run(batch()), engine.run(batch()));
        assert_ne!(first.unwrap().request_id, second.unwrap().request_id);

        let seen = engine.pipeline().seen.lock().unwrap().clone();
        let workspaces: std::collections::HashSet<_> =
            seen.iter().filter_map(|p| p.parent()).collect();
        assert_eq!(workspaces.len(), 2);
    }
}
