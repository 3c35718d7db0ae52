use crate::config::{
    DEFAULT_BIND, DEFAULT_EXTRACT_TIMEOUT_SECS, DEFAULT_MAX_UPLOAD_MB, DEFAULT_OCR_BINARY,
    DEFAULT_OCR_LANGUAGE, DEFAULT_UPLOAD_DIR, MAX_EXTRACT_TIMEOUT_SECS, MAX_UPLOAD_MB_LIMIT,
};
use crate::core::ConfigProvider;
use crate::utils::error::{Result, VerifyError};
use crate::utils::validation::{self, Validate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

static ENV_VAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub uploads: UploadsConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub max_upload_mb: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            max_upload_mb: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadsConfig {
    pub dir: String,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: DEFAULT_UPLOAD_DIR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub binary: String,
    pub language: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_OCR_BINARY.to_string(),
            language: DEFAULT_OCR_LANGUAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(VerifyError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| VerifyError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${UPLOAD_DIR})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn max_upload_mb(&self) -> usize {
        self.server.max_upload_mb.unwrap_or(DEFAULT_MAX_UPLOAD_MB)
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.extraction
            .timeout_seconds
            .unwrap_or(DEFAULT_EXTRACT_TIMEOUT_SECS)
    }
}

impl ConfigProvider for TomlConfig {
    fn bind_addr(&self) -> &str {
        &self.server.bind
    }

    fn upload_dir(&self) -> &str {
        &self.uploads.dir
    }

    fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb() * 1024 * 1024
    }

    fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds())
    }

    fn ocr_binary(&self) -> &str {
        &self.ocr.binary
    }

    fn ocr_language(&self) -> &str {
        &self.ocr.language
    }

    fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_socket_addr("server.bind", &self.server.bind)?;
        validation::validate_path("uploads.dir", &self.uploads.dir)?;
        validation::validate_range(
            "server.max_upload_mb",
            self.max_upload_mb(),
            1,
            MAX_UPLOAD_MB_LIMIT,
        )?;
        validation::validate_range(
            "extraction.timeout_seconds",
            self.timeout_seconds(),
            1,
            MAX_EXTRACT_TIMEOUT_SECS,
        )?;
        validation::validate_non_empty_string("ocr.binary", &self.ocr.binary)?;
        validation::validate_non_empty_string("ocr.language", &self.ocr.language)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[server]
bind = "0.0.0.0:8080"
max_upload_mb = 10

[uploads]
dir = "/var/tmp/doc-verify"

[extraction]
timeout_seconds = 30

[ocr]
binary = "/usr/bin/tesseract"
language = "eng+hin"

[monitoring]
enabled = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.max_upload_bytes(), 10 * 1024 * 1024);
        assert_eq!(config.upload_dir(), "/var/tmp/doc-verify");
        assert_eq!(config.extraction_timeout(), Duration::from_secs(30));
        assert_eq!(config.ocr_language(), "eng+hin");
        assert!(config.monitoring_enabled());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.bind_addr(), DEFAULT_BIND);
        assert_eq!(config.upload_dir(), DEFAULT_UPLOAD_DIR);
        assert_eq!(config.ocr_binary(), DEFAULT_OCR_BINARY);
        assert_eq!(config.extraction_timeout(), Duration::from_secs(60));
        assert!(!config.monitoring_enabled());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("DOC_VERIFY_TEST_UPLOAD_DIR", "/srv/uploads");

        let toml_content = r#"
[uploads]
dir = "${DOC_VERIFY_TEST_UPLOAD_DIR}"

[ocr]
binary = "${DOC_VERIFY_TEST_UNSET_VAR}"
language = "eng"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.upload_dir(), "/srv/uploads");
        assert_eq!(config.ocr_binary(), "${DOC_VERIFY_TEST_UNSET_VAR}");

        std::env::remove_var("DOC_VERIFY_TEST_UPLOAD_DIR");
    }

    #[test]
    fn test_config_validation() {
        let config = TomlConfig::from_toml_str(
            r#"
[server]
bind = "localhost"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config = TomlConfig::from_toml_str(
            r#"
[extraction]
timeout_seconds = 0
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[server\nbind = 1").unwrap_err();
        assert!(matches!(err, VerifyError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nbind = \"127.0.0.1:9000\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
    }
}
