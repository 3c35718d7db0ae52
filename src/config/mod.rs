pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "cli")]
use std::time::Duration;

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_MAX_UPLOAD_MB: usize = 20;
pub const DEFAULT_EXTRACT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_OCR_BINARY: &str = "tesseract";
pub const DEFAULT_OCR_LANGUAGE: &str = "eng";

pub const MAX_UPLOAD_MB_LIMIT: usize = 512;
pub const MAX_EXTRACT_TIMEOUT_SECS: u64 = 600;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "doc-verify")]
#[command(about = "Upload an ID card and supporting documents to cross-check the cardholder's name")]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_BIND)]
    pub bind: String,

    #[arg(long, default_value = DEFAULT_UPLOAD_DIR)]
    pub upload_dir: String,

    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_MB)]
    pub max_upload_mb: usize,

    #[arg(long, default_value_t = DEFAULT_EXTRACT_TIMEOUT_SECS)]
    pub extract_timeout_secs: u64,

    #[arg(long, default_value = DEFAULT_OCR_BINARY)]
    pub ocr_binary: String,

    #[arg(long, default_value = DEFAULT_OCR_LANGUAGE)]
    pub ocr_language: String,

    #[arg(short, long, help = "Load settings from a TOML file instead of flags")]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per pipeline stage")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn bind_addr(&self) -> &str {
        &self.bind
    }

    fn upload_dir(&self) -> &str {
        &self.upload_dir
    }

    fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }

    fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extract_timeout_secs)
    }

    fn ocr_binary(&self) -> &str {
        &self.ocr_binary
    }

    fn ocr_language(&self) -> &str {
        &self.ocr_language
    }

    fn monitoring_enabled(&self) -> bool {
        self.monitor
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_socket_addr("bind", &self.bind)?;
        validation::validate_path("upload_dir", &self.upload_dir)?;
        validation::validate_range("max_upload_mb", self.max_upload_mb, 1, MAX_UPLOAD_MB_LIMIT)?;
        validation::validate_range(
            "extract_timeout_secs",
            self.extract_timeout_secs,
            1,
            MAX_EXTRACT_TIMEOUT_SECS,
        )?;
        validation::validate_non_empty_string("ocr_binary", &self.ocr_binary)?;
        validation::validate_non_empty_string("ocr_language", &self.ocr_language)?;
        Ok(())
    }
}
