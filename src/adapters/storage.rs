use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Scratch storage rooted at the upload directory.
///
/// Each request writes into `<base>/<request id>/`, which is removed as a
/// whole once the request finishes.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// 建立上傳根目錄，並清掉上次異常結束留下的工作目錄
    pub async fn prepare(&self) -> Result<usize> {
        tokio::fs::create_dir_all(&self.base_path).await?;

        let mut purged = 0;
        let mut entries = tokio::fs::read_dir(&self.base_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let removed = if entry.file_type().await?.is_dir() {
                tokio::fs::remove_dir_all(&path).await
            } else {
                tokio::fs::remove_file(&path).await
            };
            match removed {
                Ok(()) => purged += 1,
                Err(e) => tracing::warn!("⚠️ Could not purge {}: {}", path.display(), e),
            }
        }

        if purged > 0 {
            tracing::info!("🧹 Purged {} stale entries from {}", purged, self.base_path.display());
        }
        Ok(purged)
    }
}

impl Storage for LocalStorage {
    async fn create_workspace(&self, request_id: &str) -> Result<PathBuf> {
        let workspace = self.base_path.join(request_id);
        tokio::fs::create_dir_all(&workspace).await?;
        tracing::debug!("Created workspace {}", workspace.display());
        Ok(workspace)
    }

    async fn write_file(&self, workspace: &Path, name: &str, data: &[u8]) -> Result<PathBuf> {
        let full_path = workspace.join(sanitize_file_name(name));
        tokio::fs::write(&full_path, data).await?;
        tracing::debug!("Stored {} bytes at {}", data.len(), full_path.display());
        Ok(full_path)
    }

    async fn remove_workspace(&self, workspace: &Path) -> Result<()> {
        match tokio::fs::remove_dir_all(workspace).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// 只保留檔名部分，避免路徑穿越；保留副檔名
pub fn sanitize_file_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}
