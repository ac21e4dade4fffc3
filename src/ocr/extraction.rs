use crate::args::OcrType;
use crate::common_types::ExtractedText;
use crate::errors::AppError;
use crate::ocr::Ocr;
use crate::AppResult;
use image::DynamicImage;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    pub text: ExtractedText,
    pub extractor: OcrType,
    /// The primary backend failed and the text comes from the fallback.
    pub degraded: bool,
    pub primary_error: Option<String>,
}

pub async fn extract_with_timeout<O: Ocr>(
    ocr: &O,
    image: Arc<DynamicImage>,
    timeout: Duration,
) -> AppResult<ExtractedText> {
    match tokio::time::timeout(timeout, ocr.image_to_text(image)).await {
        Ok(result) => result,
        Err(_) => Err(AppError::OcrExtractionTimeout {
            extractor: ocr.ocr_type().to_string(),
            seconds: timeout.as_secs(),
        }),
    }
}

/// Runs the primary backend, switching to the fallback on any error or timeout.
/// Without a fallback the primary error is returned as is.
pub async fn extract_with_fallback<P: Ocr, F: Ocr>(
    primary: &P,
    fallback: Option<&F>,
    image: Arc<DynamicImage>,
    timeout: Duration,
) -> AppResult<ExtractionOutcome> {
    match extract_with_timeout(primary, image.clone(), timeout).await {
        Ok(text) => Ok(ExtractionOutcome {
            text,
            extractor: primary.ocr_type(),
            degraded: false,
            primary_error: None,
        }),
        Err(err) => match fallback {
            Some(fallback) => {
                tracing::warn!(
                    primary = %primary.ocr_type(),
                    fallback = %fallback.ocr_type(),
                    error = %err,
                    "Primary OCR failed, using fallback"
                );
                let text = extract_with_timeout(fallback, image, timeout).await?;
                Ok(ExtractionOutcome {
                    text,
                    extractor: fallback.ocr_type(),
                    degraded: true,
                    primary_error: Some(err.to_string()),
                })
            }
            None => Err(err),
        },
    }
}

#[cfg(test)]
pub(crate) mod test_ocr {
    use super::*;

    pub enum FixedOcrBehavior {
        Text(String),
        Fail,
        Hang,
    }

    /// Returns a fixed result per image, keyed by the image width.
    pub struct FixedOcr {
        pub ocr_type: OcrType,
        pub behaviors: Vec<(u32, FixedOcrBehavior)>,
    }

    impl FixedOcr {
        pub fn text(ocr_type: OcrType, width: u32, text: &str) -> Self {
            Self {
                ocr_type,
                behaviors: vec![(width, FixedOcrBehavior::Text(text.to_string()))],
            }
        }

        pub fn with(mut self, width: u32, behavior: FixedOcrBehavior) -> Self {
            self.behaviors.push((width, behavior));
            self
        }
    }

    impl Ocr for FixedOcr {
        async fn image_to_text(&self, image: Arc<DynamicImage>) -> AppResult<ExtractedText> {
            match self
                .behaviors
                .iter()
                .find(|(width, _)| *width == image.width())
                .map(|(_, behavior)| behavior)
            {
                Some(FixedOcrBehavior::Text(text)) => Ok(text.clone().into()),
                Some(FixedOcrBehavior::Hang) => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(String::new().into())
                }
                Some(FixedOcrBehavior::Fail) | None => Err(AppError::OcrExtractionError {
                    extractor: self.ocr_type.to_string(),
                    message: "engine crashed".to_string(),
                }),
            }
        }

        fn ocr_type(&self) -> OcrType {
            self.ocr_type
        }
    }

    pub fn image_of_width(width: u32) -> Arc<DynamicImage> {
        Arc::new(DynamicImage::new_rgb8(width, 4))
    }
}
