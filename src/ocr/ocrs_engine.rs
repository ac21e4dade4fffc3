use crate::args::OcrType;
use crate::common_types::ExtractedText;
use crate::errors::AppError;
use crate::ocr::{join_recognized_lines, Ocr, OcrsOptions};
use crate::AppResult;
use image::DynamicImage;
use ocrs::{ImageSource, OcrEngine, OcrEngineParams, OcrInput};
use std::sync::Arc;

/// Neural OCR running locally on the ocrs detection and recognition models.
pub struct OcrsEngine {
    ocr_engine: Arc<OcrEngine>,
}

impl OcrsEngine {
    pub async fn new(options: OcrsOptions) -> AppResult<Self> {
        let model_paths = options.find_model_paths()?;
        tracing::info!(
            detection_model = %model_paths.detection_model.to_string_lossy(),
            recognition_model = %model_paths.recognition_model.to_string_lossy(),
            "Loading ocrs models"
        );
        let ocr_engine = tokio::task::spawn_blocking(move || {
            let detection_model = rten::Model::load_file(&model_paths.detection_model)
                .map_err(|e| Self::config_error("detection", e))?;
            let recognition_model = rten::Model::load_file(&model_paths.recognition_model)
                .map_err(|e| Self::config_error("recognition", e))?;
            OcrEngine::new(OcrEngineParams {
                detection_model: Some(detection_model),
                recognition_model: Some(recognition_model),
                ..Default::default()
            })
            .map_err(|e| AppError::OcrConfigError {
                message: format!("Failed to create ocrs engine: {}", e),
            })
        })
        .await??;
        Ok(Self {
            ocr_engine: Arc::new(ocr_engine),
        })
    }

    fn config_error<E: std::fmt::Display>(model: &str, err: E) -> AppError {
        AppError::OcrConfigError {
            message: format!("Failed to load ocrs {} model: {}", model, err),
        }
    }

    fn extraction_error<E: std::fmt::Display>(err: E) -> AppError {
        AppError::OcrExtractionError {
            extractor: OcrType::Ocrs.to_string(),
            message: err.to_string(),
        }
    }

    fn recognize(ocr_engine: &OcrEngine, image: &DynamicImage) -> AppResult<String> {
        let rgb_image = image.to_rgb8();
        let image_source = ImageSource::from_bytes(rgb_image.as_raw(), rgb_image.dimensions())
            .map_err(Self::extraction_error)?;
        let input: OcrInput = ocr_engine
            .prepare_input(image_source)
            .map_err(Self::extraction_error)?;
        let word_rects = ocr_engine
            .detect_words(&input)
            .map_err(Self::extraction_error)?;
        let line_rects = ocr_engine.find_text_lines(&input, &word_rects);
        let lines = ocr_engine
            .recognize_text(&input, &line_rects)
            .map_err(Self::extraction_error)?;
        Ok(join_recognized_lines(
            lines.into_iter().flatten().map(|line| line.to_string()),
        ))
    }
}

impl Ocr for OcrsEngine {
    async fn image_to_text(&self, image: Arc<DynamicImage>) -> AppResult<ExtractedText> {
        let ocr_engine = self.ocr_engine.clone();
        let text =
            tokio::task::spawn_blocking(move || Self::recognize(&ocr_engine, &image)).await??;
        tracing::debug!(chars = text.chars().count(), "ocrs extraction finished");
        Ok(text.into())
    }

    fn ocr_type(&self) -> OcrType {
        OcrType::Ocrs
    }
}
