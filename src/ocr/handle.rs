use crate::args::OcrType;
use crate::common_types::ExtractedText;
use crate::ocr::{Ocr, OcrBackends, OcrOptions};
use crate::AppResult;
use image::DynamicImage;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Lazily initialized OCR backend owned by the command that created it.
///
/// Model loading or executable checks happen on the first extraction only, so an
/// unused fallback backend costs nothing. Once initialized the backend is reused
/// for every following extraction.
pub struct OcrHandle {
    options: OcrOptions,
    backend: OnceCell<OcrBackends>,
}

impl OcrHandle {
    pub fn new(options: OcrOptions) -> Self {
        Self {
            options,
            backend: OnceCell::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.backend.initialized()
    }

    pub async fn backend(&self) -> AppResult<&OcrBackends> {
        self.backend
            .get_or_try_init(|| async {
                tracing::debug!(ocr = %self.options, "Initializing OCR backend");
                OcrBackends::new_ocr(&self.options).await
            })
            .await
    }
}

impl Ocr for OcrHandle {
    async fn image_to_text(&self, image: Arc<DynamicImage>) -> AppResult<ExtractedText> {
        self.backend().await?.image_to_text(image).await
    }

    fn ocr_type(&self) -> OcrType {
        self.options.ocr_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use crate::ocr::{OcrProviderOptions, TesseractOcrOptions};
    use std::path::PathBuf;

    #[tokio::test]
    async fn failed_initialization_is_reported_and_not_cached() {
        let handle = OcrHandle::new(OcrOptions {
            provider_options: OcrProviderOptions::Tesseract(TesseractOcrOptions {
                tesseract_path: Some(PathBuf::from("/nonexistent/bin/tesseract")),
                ..TesseractOcrOptions::default()
            }),
        });
        assert_eq!(handle.ocr_type(), OcrType::Tesseract);
        assert!(!handle.is_initialized());

        let image = Arc::new(DynamicImage::new_rgb8(4, 4));
        let result = handle.image_to_text(image).await;
        assert!(matches!(result, Err(AppError::OcrConfigError { .. })));
        assert!(!handle.is_initialized());
    }
}
