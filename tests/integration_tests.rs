use async_trait::async_trait;
use doc_verify::core::{OcrEngine, VerificationSummary};
use doc_verify::web::upload::UploadForm;
use doc_verify::{DocumentPipeline, LocalStorage, TextExtractor, VerificationEngine, VerifyError};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Returns the same recognised lines for every image.
struct FakeOcr {
    lines: Vec<String>,
}

#[async_trait]
impl OcrEngine for FakeOcr {
    fn name(&self) -> &str {
        "fake"
    }

    async fn warm_up(&self) -> doc_verify::Result<()> {
        Ok(())
    }

    async fn recognize(&self, _image_path: &Path) -> doc_verify::Result<Vec<String>> {
        Ok(self.lines.clone())
    }
}

fn engine(upload_dir: &Path, ocr_lines: &[&str]) -> VerificationEngine<LocalStorage, DocumentPipeline> {
    let ocr = FakeOcr {
        lines: ocr_lines.iter().map(|l| l.to_string()).collect(),
    };
    let extractor = TextExtractor::new(Arc::new(ocr), Duration::from_secs(5));
    VerificationEngine::new(LocalStorage::new(upload_dir), DocumentPipeline::new(extractor))
}

fn assert_empty(dir: &Path) {
    let leftovers: Vec<_> = std::fs::read_dir(dir).unwrap().collect();
    assert!(leftovers.is_empty(), "upload dir not empty: {:?}", leftovers);
}

#[tokio::test]
async fn test_end_to_end_with_text_documents() {
    let temp_dir = TempDir::new().unwrap();
    let engine = engine(temp_dir.path(), &[]);

    let mut form = UploadForm::default();
    form.set_primary(
        "pan.txt",
        b"INCOME TAX DEPARTMENT\nPermanent Account Number Card\nABCDE1234F\nJane Doe\nDate of Birth\n01/01/1990\n".to_vec(),
    );
    form.add_supporting("aadhaar.txt", b"Government of India\nJANE DOE\n1234 5678 9012\n".to_vec());
    let report = engine.run(form.into_batch().unwrap()).await.unwrap();

    assert_eq!(report.pan_info.fields.name.as_deref(), Some("Jane Doe"));
    assert_eq!(report.pan_info.fields.identifier.as_deref(), Some("ABCDE1234F"));
    assert_eq!(report.pan_info.fields.date_of_birth.as_deref(), Some("01/01/1990"));
    assert_eq!(
        report.other_docs[0].fields.generic_identifier.as_deref(),
        Some("123456789012")
    );
    assert_eq!(report.verification.summary, VerificationSummary::Verified);
    assert!(report.verification.flags.is_empty());
    assert_empty(temp_dir.path());
}

#[tokio::test]
async fn test_image_primary_goes_through_ocr() {
    let temp_dir = TempDir::new().unwrap();
    let engine = engine(
        temp_dir.path(),
        &["Permanent Account Number Card", "XYZAB9876C", "Ravi Kumar", "DOB", "02-03-1985"],
    );

    let mut form = UploadForm::default();
    form.set_primary("pan.JPG", b"\xff\xd8\xff\xe0".to_vec());
    form.add_supporting("bill.txt", b"Bill for Anita Sharma".to_vec());
    form.add_supporting("letter.txt", b"Dear R A V I Kumar".to_vec());
    let report = engine.run(form.into_batch().unwrap()).await.unwrap();

    assert_eq!(report.pan_info.fields.identifier.as_deref(), Some("XYZAB9876C"));
    assert_eq!(report.pan_info.fields.date_of_birth.as_deref(), Some("02-03-1985"));
    assert_eq!(
        report.pan_info.raw_text,
        "Permanent Account Number Card\nXYZAB9876C\nRavi Kumar\nDOB\n02-03-1985"
    );
    assert_eq!(report.verification.summary, VerificationSummary::Mismatch);
    assert_eq!(
        report.verification.flags,
        vec!["Document 1: First name from PAN not found.".to_string()]
    );
    assert_empty(temp_dir.path());
}

#[tokio::test]
async fn test_missing_pan_name_only_raises_one_flag() {
    let temp_dir = TempDir::new().unwrap();
    let engine = engine(temp_dir.path(), &[]);

    let mut form = UploadForm::default();
    form.set_primary("pan.txt", b"just some text without the card title".to_vec());
    form.add_supporting("a.txt", b"unrelated".to_vec());
    form.add_supporting("b.txt", b"also unrelated".to_vec());
    let report = engine.run(form.into_batch().unwrap()).await.unwrap();

    assert_eq!(report.verification.summary, VerificationSummary::Mismatch);
    assert_eq!(report.verification.flags, vec!["PAN card Name not found.".to_string()]);
}

#[tokio::test]
async fn test_corrupt_pdf_fails_and_still_cleans_up() {
    let temp_dir = TempDir::new().unwrap();
    let engine = engine(temp_dir.path(), &[]);

    let mut form = UploadForm::default();
    form.set_primary("pan.txt", b"Permanent Account Number Card\nABCDE1234F\nJane".to_vec());
    form.add_supporting("statement.pdf", b"%PDF-1.4 truncated garbage".to_vec());
    let err = engine.run(form.into_batch().unwrap()).await.unwrap_err();

    match err {
        VerifyError::CorruptDocumentError { file, .. } => {
            assert_eq!(file, "statement.pdf")
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_empty(temp_dir.path());
}

#[tokio::test]
async fn test_pdf_primary_card() {
    let temp_dir = TempDir::new().unwrap();
    let engine = engine(temp_dir.path(), &[]);
    let pdf = std::fs::read(Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/pan_card.pdf")).unwrap();

    let mut form = UploadForm::default();
    form.set_primary("pan.pdf", pdf);
    form.add_supporting("aadhaar.txt", b"Jane Doe\n1234 5678 9012".to_vec());
    let report = engine.run(form.into_batch().unwrap()).await.unwrap();

    assert_eq!(report.pan_info.fields.name.as_deref(), Some("Jane Doe"));
    assert_eq!(report.pan_info.fields.identifier.as_deref(), Some("ABCDE1234F"));
    assert_eq!(report.pan_info.fields.date_of_birth.as_deref(), Some("01/01/1990"));
    assert_eq!(report.verification.summary, VerificationSummary::Verified);
    assert_empty(temp_dir.path());
}

#[tokio::test]
async fn test_same_client_names_in_different_folders_stay_separate() {
    let temp_dir = TempDir::new().unwrap();
    let engine = engine(temp_dir.path(), &[]);

    let mut form = UploadForm::default();
    form.set_primary(
        "x/card.txt",
        b"Permanent Account Number Card\nABCDE1234F\nJane Doe\n".to_vec(),
    );
    form.add_supporting("a/card.txt", b"bob only".to_vec());
    form.add_supporting("b/card.txt", b"Jane again".to_vec());
    let report = engine.run(form.into_batch().unwrap()).await.unwrap();

    assert_eq!(report.pan_info.fields.name.as_deref(), Some("Jane Doe"));
    assert_eq!(report.other_docs[0].raw_text, "bob only");
    assert_eq!(report.other_docs[1].raw_text, "Jane again");
    assert_eq!(
        report.verification.flags,
        vec!["Document 1: First name from PAN not found.".to_string()]
    );
    assert_empty(temp_dir.path());
}
