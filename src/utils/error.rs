use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("{message}")]
    UserInputError { message: String },

    #[error("Upload could not be read: {0}")]
    UploadError(#[from] axum::extract::multipart::MultipartError),

    #[error("Upload exceeds the {limit_bytes} byte limit")]
    UploadTooLargeError { limit_bytes: usize },

    #[error("Unsupported file type: {extension:?}")]
    UnsupportedTypeError { extension: String },

    #[error("Document '{file}' could not be parsed: {reason}")]
    CorruptDocumentError { file: String, reason: String },

    #[error("Image '{file}' could not be recognised: {reason}")]
    UnreadableImageError { file: String, reason: String },

    #[error("OCR engine unavailable: {message}")]
    OcrUnavailableError { message: String },

    #[error("Extraction of '{file}' exceeded {seconds}s")]
    ExtractionTimeoutError { file: String, seconds: u64 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    UserInput,
    Extraction,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl VerifyError {
    pub fn user_input(message: impl Into<String>) -> Self {
        Self::UserInputError {
            message: message.into(),
        }
    }

    /// Replaces the file name carried by extraction errors, e.g. to report
    /// the client's name instead of the scratch file name.
    pub fn with_file(self, name: &str) -> Self {
        match self {
            Self::CorruptDocumentError { reason, .. } => Self::CorruptDocumentError {
                file: name.to_string(),
                reason,
            },
            Self::UnreadableImageError { reason, .. } => Self::UnreadableImageError {
                file: name.to_string(),
                reason,
            },
            Self::ExtractionTimeoutError { seconds, .. } => Self::ExtractionTimeoutError {
                file: name.to_string(),
                seconds,
            },
            other => other,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UserInputError { .. }
            | Self::UploadError(_)
            | Self::UploadTooLargeError { .. } => ErrorCategory::UserInput,
            Self::UnsupportedTypeError { .. }
            | Self::CorruptDocumentError { .. }
            | Self::UnreadableImageError { .. }
            | Self::ExtractionTimeoutError { .. } => ErrorCategory::Extraction,
            Self::ConfigValidationError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            Self::OcrUnavailableError { .. } | Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::UserInput => ErrorSeverity::Low,
            ErrorCategory::Extraction => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 顯示給使用者的訊息，每種失敗原因各自不同
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::UserInputError { message } => message.clone(),
            Self::UploadError(_) => "The upload could not be read. Please try again.".to_string(),
            Self::UploadTooLargeError { limit_bytes } => format!(
                "The upload is larger than the {} limit.",
                human_size(*limit_bytes)
            ),
            Self::UnsupportedTypeError { extension } => format!(
                "Files of type '{}' are not supported. Use PDF, TXT, PNG, JPG or JPEG.",
                extension
            ),
            Self::CorruptDocumentError { file, .. } => format!(
                "The document '{}' could not be read. It may be corrupt or password protected.",
                file
            ),
            Self::UnreadableImageError { file, .. } => {
                format!("No text could be recognised in the image '{}'.", file)
            }
            Self::OcrUnavailableError { .. } => {
                "Image recognition is currently unavailable.".to_string()
            }
            Self::ExtractionTimeoutError { file, seconds } => format!(
                "Processing '{}' took longer than {} seconds and was stopped.",
                file, seconds
            ),
            Self::ConfigValidationError { .. } | Self::InvalidConfigValueError { .. } => {
                format!("Configuration problem: {}", self)
            }
            Self::IoError(_) => {
                "An internal error occurred while processing your documents.".to_string()
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::UserInputError { .. } | Self::UploadError(_) => {
                "Check the selected files and submit the form again"
            }
            Self::UploadTooLargeError { .. } => {
                "Upload fewer or smaller files, or raise --max-upload-mb"
            }
            Self::UnsupportedTypeError { .. } => "Convert the file to PDF, TXT or an image",
            Self::CorruptDocumentError { .. } => "Re-export the document or upload a scan of it",
            Self::UnreadableImageError { .. } => "Upload a sharper, well lit scan",
            Self::OcrUnavailableError { .. } => {
                "Install tesseract-ocr or point --ocr-binary at an existing installation"
            }
            Self::ExtractionTimeoutError { .. } => {
                "Upload a smaller file or raise --extract-timeout-secs"
            }
            Self::ConfigValidationError { .. } | Self::InvalidConfigValueError { .. } => {
                "Fix the configuration and restart the server"
            }
            Self::IoError(_) => {
                "Check disk space and permissions on the upload directory"
            }
        }
    }
}

fn human_size(bytes: usize) -> String {
    const MIB: usize = 1024 * 1024;
    if bytes >= MIB {
        format!("{} MB", bytes / MIB)
    } else {
        format!("{} KB", bytes.div_ceil(1024))
    }
}

pub type Result<T> = std::result::Result<T, VerifyError>;
