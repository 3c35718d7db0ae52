use crate::utils::error::{Result, VerifyError};
use std::path::Path;

/// Text of every page, concatenated in page order.
///
/// The parser is synchronous and may panic on malformed input, so it runs on
/// the blocking pool and a panic is reported as a corrupt document.
pub async fn extract_pdf_text(path: &Path) -> Result<String> {
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let owned = path.to_path_buf();

    match tokio::task::spawn_blocking(move || pdf_extract::extract_text(&owned)).await {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(VerifyError::CorruptDocumentError {
            file,
            reason: e.to_string(),
        }),
        Err(join_error) if join_error.is_panic() => Err(VerifyError::CorruptDocumentError {
            file,
            reason: "PDF parser aborted on malformed input".to_string(),
        }),
        Err(join_error) => Err(VerifyError::CorruptDocumentError {
            file,
            reason: join_error.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_page_text_is_returned_line_by_line() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/pan_card.pdf");

        let text = extract_pdf_text(&path).await.unwrap();
        let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        assert_eq!(
            lines,
            vec![
                "INCOME TAX DEPARTMENT",
                "Permanent Account Number Card",
                "ABCDE1234F",
                "Jane Doe",
                "Date of Birth",
                "01/01/1990",
            ]
        );
    }

    #[tokio::test]
    async fn test_garbage_pdf_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf at all").unwrap();

        let err = extract_pdf_text(&path).await.unwrap_err();
        match err {
            VerifyError::CorruptDocumentError { file, .. } => assert_eq!(file, "broken.pdf"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
