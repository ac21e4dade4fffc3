use base64::Engine;
use image::DynamicImage;
use rvstruct::ValueStruct;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::sync::Arc;

use crate::args::OcrType;
use crate::common_types::{ExtractedText, OpenAiApiKey, OpenAiModelName};
use crate::errors::AppError;
use crate::ocr::{join_recognized_lines, Ocr};
use crate::AppResult;

#[derive(Debug, Clone)]
pub struct OpenAiVisionOcrOptions {
    pub api_key: OpenAiApiKey,
    pub model: Option<OpenAiModelName>,
}

/// Neural OCR delegated to an OpenAI vision capable chat model.
#[derive(Clone)]
pub struct OpenAiVisionOcr {
    client: reqwest::Client,
    open_ai_options: OpenAiVisionOcrOptions,
}

#[derive(Serialize, Clone, Debug)]
struct OpenAiVisionRequest {
    model: String,
    temperature: f32,
    messages: Vec<OpenAiVisionMessage>,
}

#[derive(Serialize, Clone, Debug)]
struct OpenAiVisionMessage {
    role: String,
    content: OpenAiVisionContent,
}

#[derive(Serialize, Clone, Debug)]
#[serde(untagged)]
enum OpenAiVisionContent {
    Text(String),
    Parts(Vec<OpenAiVisionContentPart>),
}

#[derive(Serialize, Clone, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OpenAiVisionContentPart {
    Text { text: String },
    ImageUrl { image_url: OpenAiVisionImageUrl },
}

#[derive(Serialize, Clone, Debug)]
struct OpenAiVisionImageUrl {
    url: String,
}

#[derive(Deserialize, Clone, Debug)]
struct OpenAiVisionResponse {
    choices: Vec<OpenAiVisionChoice>,
}

#[derive(Deserialize, Clone, Debug)]
struct OpenAiVisionChoice {
    message: OpenAiVisionResponseMessage,
}

#[derive(Deserialize, Clone, Debug)]
struct OpenAiVisionResponseMessage {
    content: Option<String>,
}

impl OpenAiVisionOcr {
    const DEFAULT_MODEL: &'static str = "gpt-4o-mini";
    const CHAT_COMPLETIONS_URL: &'static str = "https://api.openai.com/v1/chat/completions";
    const NO_TEXT_MARKER: &'static str = "<NO_TEXT>";

    pub async fn new(open_ai_options: OpenAiVisionOcrOptions) -> AppResult<Self> {
        let client = reqwest::Client::new();
        Ok(Self {
            client,
            open_ai_options,
        })
    }

    fn model_name(&self) -> String {
        self.open_ai_options
            .model
            .as_ref()
            .map(|v| v.value().clone())
            .unwrap_or_else(|| Self::DEFAULT_MODEL.to_string())
    }

    fn create_request(&self, png: &[u8]) -> OpenAiVisionRequest {
        let encoded = base64::engine::general_purpose::STANDARD.encode(png);
        OpenAiVisionRequest {
            model: self.model_name(),
            temperature: 0.0,
            messages: vec![
                OpenAiVisionMessage {
                    role: "system".to_string(),
                    content: OpenAiVisionContent::Text(format!(
                        "You are an OCR engine. Transcribe all text visible in the image exactly as written, line by line, including Japanese text. Do not translate, summarize, correct or describe anything. Do not add any other words. If the image contains no text, reply with {} only.",
                        Self::NO_TEXT_MARKER
                    )),
                },
                OpenAiVisionMessage {
                    role: "user".to_string(),
                    content: OpenAiVisionContent::Parts(vec![
                        OpenAiVisionContentPart::Text {
                            text: "Transcribe the text in this image.".to_string(),
                        },
                        OpenAiVisionContentPart::ImageUrl {
                            image_url: OpenAiVisionImageUrl {
                                url: format!("data:{};base64,{}", mime::IMAGE_PNG, encoded),
                            },
                        },
                    ]),
                },
            ],
        }
    }

    fn response_to_text(mut response: OpenAiVisionResponse) -> AppResult<String> {
        match response.choices.pop() {
            Some(choice) => {
                let content = choice.message.content.unwrap_or_default();
                if content.trim() == Self::NO_TEXT_MARKER {
                    Ok(String::new())
                } else {
                    Ok(join_recognized_lines(content.lines()))
                }
            }
            None => Err(AppError::OcrExtractionError {
                extractor: OcrType::OpenAiVision.to_string(),
                message: "No content item in the response".to_string(),
            }),
        }
    }
}

impl Ocr for OpenAiVisionOcr {
    async fn image_to_text(&self, image: Arc<DynamicImage>) -> AppResult<ExtractedText> {
        let png = tokio::task::spawn_blocking(move || {
            let mut png = Vec::new();
            image.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;
            Ok::<Vec<u8>, AppError>(png)
        })
        .await??;

        let request = self.create_request(&png);
        let response = self
            .client
            .post(Self::CHAT_COMPLETIONS_URL)
            .header(
                "Authorization",
                format!("Bearer {}", self.open_ai_options.api_key.value()),
            )
            .json(&request)
            .send()
            .await?;
        if !response.status().is_success()
            || response
                .headers()
                .get("content-type")
                .iter()
                .all(|v| !v.as_bytes().starts_with(mime::APPLICATION_JSON.as_ref().as_bytes()))
        {
            let response_status = response.status();
            let response_text = response.text().await.unwrap_or_default();
            return Err(AppError::OcrExtractionError {
                extractor: OcrType::OpenAiVision.to_string(),
                message: format!(
                    "Failed to recognize text: {}. HTTP status: {}.",
                    response_text, response_status
                ),
            });
        }
        let open_ai_response: OpenAiVisionResponse = response.json().await?;
        let text = Self::response_to_text(open_ai_response)?;
        tracing::debug!(chars = text.chars().count(), "OpenAI vision extraction finished");
        Ok(text.into())
    }

    fn ocr_type(&self) -> OcrType {
        OcrType::OpenAiVision
    }
}
