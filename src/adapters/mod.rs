// Adapters layer: concrete implementations for external systems (filesystem, OCR, PDF).

pub mod ocr;
pub mod pdf;
pub mod storage;

pub use ocr::TesseractOcr;
pub use storage::LocalStorage;
