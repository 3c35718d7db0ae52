pub mod etl;
pub mod fields;
pub mod pipeline;
pub mod text_extractor;
pub mod verifier;

pub use crate::domain::model::{
    ExtractedBatch, ExtractedDocument, RawBatch, StoredBatch, StoredDocument, VerificationReport,
    VerificationResult, VerificationSummary,
};
pub use crate::domain::ports::{ConfigProvider, OcrEngine, Pipeline, Storage};
pub use crate::utils::error::Result;
