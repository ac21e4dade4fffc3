use crate::args::OcrType;
use crate::common_types::ExtractedText;
use crate::AppResult;
use image::DynamicImage;
use std::fmt::Display;
use std::sync::Arc;

#[cfg(feature = "ocrs-engine")]
mod ocrs_engine;
#[cfg(feature = "ocrs-engine")]
pub use ocrs_engine::*;

mod ocrs_models;
pub use ocrs_models::*;

mod tesseract;
pub use tesseract::*;

mod open_ai_vision;
pub use open_ai_vision::*;

mod handle;
pub use handle::*;

mod extraction;
pub use extraction::*;
#[cfg(test)]
pub(crate) use extraction::test_ocr;

#[derive(Debug, Clone)]
pub struct OcrOptions {
    pub provider_options: OcrProviderOptions,
}

#[derive(Debug, Clone)]
pub enum OcrProviderOptions {
    Ocrs(OcrsOptions),
    Tesseract(TesseractOcrOptions),
    OpenAiVision(OpenAiVisionOcrOptions),
}

impl OcrOptions {
    pub fn ocr_type(&self) -> OcrType {
        match self.provider_options {
            OcrProviderOptions::Ocrs(_) => OcrType::Ocrs,
            OcrProviderOptions::Tesseract(_) => OcrType::Tesseract,
            OcrProviderOptions::OpenAiVision(_) => OcrType::OpenAiVision,
        }
    }
}

impl Display for OcrOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.ocr_type().fmt(f)
    }
}

/// Converts an image to the text it contains.
///
/// Recognized lines are concatenated without a separator. An image with no
/// detectable text yields an empty string, not an error.
pub trait Ocr {
    async fn image_to_text(&self, image: Arc<DynamicImage>) -> AppResult<ExtractedText>;

    fn ocr_type(&self) -> OcrType;
}

pub enum OcrBackends {
    #[cfg(feature = "ocrs-engine")]
    Ocrs(OcrsEngine),
    Tesseract(TesseractOcr),
    OpenAiVision(OpenAiVisionOcr),
}

impl OcrBackends {
    pub async fn new_ocr(ocr_options: &OcrOptions) -> AppResult<Self> {
        match ocr_options.provider_options {
            #[cfg(feature = "ocrs-engine")]
            OcrProviderOptions::Ocrs(ref options) => {
                Ok(OcrBackends::Ocrs(OcrsEngine::new(options.clone()).await?))
            }
            #[cfg(not(feature = "ocrs-engine"))]
            OcrProviderOptions::Ocrs(_) => Err(crate::errors::AppError::OcrConfigError {
                message: "ocrs support is not compiled in. Enable the 'ocrs-engine' feature"
                    .to_string(),
            }),
            OcrProviderOptions::Tesseract(ref options) => Ok(OcrBackends::Tesseract(
                TesseractOcr::new(options.clone()).await?,
            )),
            OcrProviderOptions::OpenAiVision(ref options) => Ok(OcrBackends::OpenAiVision(
                OpenAiVisionOcr::new(options.clone()).await?,
            )),
        }
    }
}

impl Ocr for OcrBackends {
    async fn image_to_text(&self, image: Arc<DynamicImage>) -> AppResult<ExtractedText> {
        match self {
            #[cfg(feature = "ocrs-engine")]
            OcrBackends::Ocrs(ocr) => ocr.image_to_text(image).await,
            OcrBackends::Tesseract(ocr) => ocr.image_to_text(image).await,
            OcrBackends::OpenAiVision(ocr) => ocr.image_to_text(image).await,
        }
    }

    fn ocr_type(&self) -> OcrType {
        match self {
            #[cfg(feature = "ocrs-engine")]
            OcrBackends::Ocrs(ocr) => ocr.ocr_type(),
            OcrBackends::Tesseract(ocr) => ocr.ocr_type(),
            OcrBackends::OpenAiVision(ocr) => ocr.ocr_type(),
        }
    }
}

pub(crate) fn join_recognized_lines<I, S>(lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .map(|line| line.as_ref().trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<String>>()
        .join("")
}
