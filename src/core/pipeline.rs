use crate::core::fields::{extract_primary_fields, extract_supporting_fields};
use crate::core::text_extractor::TextExtractor;
use crate::core::verifier::verify_documents;
use crate::core::{
    ExtractedBatch, Pipeline, RawBatch, StoredBatch, StoredDocument, VerificationResult,
};
use crate::utils::error::Result;

/// Text extraction, field extraction and cross-document verification, in
/// that order.
#[derive(Clone)]
pub struct DocumentPipeline {
    extractor: TextExtractor,
}

impl DocumentPipeline {
    pub fn new(extractor: TextExtractor) -> Self {
        Self { extractor }
    }

    pub fn extractor(&self) -> &TextExtractor {
        &self.extractor
    }

    async fn extract_document(&self, doc: &StoredDocument) -> Result<String> {
        self.extractor
            .extract(&doc.path)
            .await
            .map_err(|e| e.with_file(&doc.file_name))
    }
}

#[async_trait::async_trait]
impl Pipeline for DocumentPipeline {
    async fn extract(&self, batch: &StoredBatch) -> Result<RawBatch> {
        tracing::debug!("Extracting text from primary document {}", batch.primary.file_name);
        let primary_text = self.extract_document(&batch.primary).await?;

        // 依序處理，第一個失敗就中止
        let mut supporting_texts = Vec::with_capacity(batch.supporting.len());
        for doc in &batch.supporting {
            tracing::debug!("Extracting text from supporting document {}", doc.file_name);
            supporting_texts.push(self.extract_document(doc).await?);
        }

        Ok(RawBatch {
            primary_text,
            supporting_texts,
        })
    }

    async fn transform(&self, raw: RawBatch) -> Result<ExtractedBatch> {
        let primary = extract_primary_fields(&raw.primary_text);
        tracing::debug!(
            "Primary fields: name found={}, dob found={}, pan found={}",
            primary.fields.name.is_some(),
            primary.fields.date_of_birth.is_some(),
            primary.fields.identifier.is_some()
        );

        let supporting = raw
            .supporting_texts
            .iter()
            .map(|text| extract_supporting_fields(text))
            .collect();

        Ok(ExtractedBatch {
            primary,
            supporting,
        })
    }

    async fn verify(&self, extracted: &ExtractedBatch) -> Result<VerificationResult> {
        Ok(verify_documents(
            &extracted.primary.fields,
            &extracted.supporting,
        ))
    }
}
