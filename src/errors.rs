use indicatif::style::TemplateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Cannot read image: {path}")]
    ImageDecodeError {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("Unsupported image type '{media_type}' for {path}. Only PNG and JPEG are supported")]
    UnsupportedImageType { path: String, media_type: String },
    #[error("OCR extraction with {extractor} failed: {message}")]
    OcrExtractionError { extractor: String, message: String },
    #[error("OCR extraction with {extractor} timed out after {seconds}s")]
    OcrExtractionTimeout { extractor: String, seconds: u64 },
    #[error("OCR config error: {message}")]
    OcrConfigError { message: String },
    #[error("Verdict thresholds error: {message}")]
    VerdictThresholdsError { message: String },
    #[error("Input/output error")]
    InputOutputError(#[from] std::io::Error),
    #[error("HTTP client error:\n{0}")]
    HttpClientError(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Template error: {0}")]
    TemplateError(#[from] TemplateError),
    #[error("Image conversion error: {0}")]
    ImageError(#[from] image::ImageError),
    #[error("Background task error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
    #[error("System error: {message}")]
    SystemError { message: String },
}
