use crate::domain::model::{UploadBatch, UploadedFile};
use crate::utils::error::{Result, VerifyError};
use crate::utils::validation::{is_allowed_file, unsupported_files};
use axum::extract::Multipart;

pub const PRIMARY_FIELD: &str = "pan_document";
pub const SUPPORTING_FIELD: &str = "other_documents";

pub const MISSING_PRIMARY: &str = "Please upload your PAN card (mandatory).";
pub const INVALID_PRIMARY: &str = "PAN card must be PDF, TXT, or image (PNG/JPG/JPEG).";
pub const MISSING_SUPPORTING: &str = "Please upload at least one other document for verification.";

/// Files collected from the submitted form, not yet validated.
#[derive(Debug, Default)]
pub struct UploadForm {
    primary: Option<UploadedFile>,
    supporting: Vec<UploadedFile>,
}

impl UploadForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let field_name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().unwrap_or_default().to_string();

            match field_name.as_str() {
                PRIMARY_FIELD => {
                    let bytes = field.bytes().await?;
                    form.set_primary(file_name, bytes.to_vec());
                }
                SUPPORTING_FIELD => {
                    let bytes = field.bytes().await?;
                    form.add_supporting(file_name, bytes.to_vec());
                }
                other => tracing::debug!("Ignoring unexpected form field '{}'", other),
            }
        }

        Ok(form)
    }

    /// Only the first primary document is kept.
    pub fn set_primary(&mut self, file_name: impl Into<String>, bytes: Vec<u8>) {
        if self.primary.is_none() {
            self.primary = Some(UploadedFile::new(file_name, bytes));
        }
    }

    pub fn add_supporting(&mut self, file_name: impl Into<String>, bytes: Vec<u8>) {
        self.supporting.push(UploadedFile::new(file_name, bytes));
    }

    /// 依序檢查：主要文件、主要文件類型、其他文件數量、其他文件類型
    pub fn into_batch(self) -> Result<UploadBatch> {
        let primary = match self.primary {
            Some(file) if !file.file_name.is_empty() => file,
            _ => return Err(VerifyError::user_input(MISSING_PRIMARY)),
        };

        if !is_allowed_file(&primary.file_name) {
            return Err(VerifyError::user_input(INVALID_PRIMARY));
        }

        // 瀏覽器在沒選檔案時仍會送出空檔名的欄位
        let supporting: Vec<UploadedFile> = self
            .supporting
            .into_iter()
            .filter(|file| !file.file_name.is_empty())
            .collect();

        if supporting.is_empty() {
            return Err(VerifyError::user_input(MISSING_SUPPORTING));
        }

        let invalid = unsupported_files(supporting.iter().map(|f| f.file_name.as_str()));
        if !invalid.is_empty() {
            return Err(VerifyError::user_input(format!(
                "Unsupported file type(s): {}",
                invalid.join(", ")
            )));
        }

        Ok(UploadBatch {
            primary,
            supporting,
        })
    }
}
