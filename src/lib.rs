pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;
pub mod web;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::toml_config::TomlConfig;

pub use adapters::{LocalStorage, TesseractOcr};
pub use self::core::{etl::VerificationEngine, pipeline::DocumentPipeline, text_extractor::TextExtractor};
pub use utils::error::{Result, VerifyError};
