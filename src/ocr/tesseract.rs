use crate::args::OcrType;
use crate::common_types::ExtractedText;
use crate::errors::AppError;
use crate::ocr::{join_recognized_lines, Ocr};
use crate::AppResult;
use image::DynamicImage;
use std::io::Cursor;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct TesseractOcrOptions {
    pub lang: String,
    pub dpi: Option<u32>,
    pub psm: Option<u8>,
    pub tesseract_path: Option<PathBuf>,
}

impl TesseractOcrOptions {
    pub const DEFAULT_LANG: &'static str = "jpn+eng";
    const DEFAULT_EXECUTABLE: &'static str = "tesseract";

    pub fn executable(&self) -> PathBuf {
        self.tesseract_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_EXECUTABLE))
    }

    /// Arguments for reading the image from stdin and writing plain text to stdout.
    pub fn command_args(&self) -> Vec<String> {
        let mut args = vec![
            "stdin".to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.lang.clone(),
        ];
        if let Some(dpi) = self.dpi {
            args.push("--dpi".to_string());
            args.push(dpi.to_string());
        }
        if let Some(psm) = self.psm {
            args.push("--psm".to_string());
            args.push(psm.to_string());
        }
        args
    }
}

impl Default for TesseractOcrOptions {
    fn default() -> Self {
        Self {
            lang: Self::DEFAULT_LANG.to_string(),
            dpi: None,
            psm: None,
            tesseract_path: None,
        }
    }
}

/// Classical OCR through the `tesseract` executable.
pub struct TesseractOcr {
    options: TesseractOcrOptions,
}

impl TesseractOcr {
    pub async fn new(options: TesseractOcrOptions) -> AppResult<Self> {
        let executable = options.executable();
        let available = Command::new(&executable)
            .arg("--version")
            .stdout(Stdio::null())
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false);
        if !available {
            return Err(AppError::OcrConfigError {
                message: format!(
                    "Tesseract executable is not available: {}",
                    executable.to_string_lossy()
                ),
            });
        }
        tracing::info!(
            executable = %executable.to_string_lossy(),
            lang = %options.lang,
            "Using tesseract"
        );
        Ok(Self { options })
    }

    fn extraction_error<S: Into<String>>(message: S) -> AppError {
        AppError::OcrExtractionError {
            extractor: OcrType::Tesseract.to_string(),
            message: message.into(),
        }
    }
}

impl Ocr for TesseractOcr {
    async fn image_to_text(&self, image: Arc<DynamicImage>) -> AppResult<ExtractedText> {
        let png = tokio::task::spawn_blocking(move || {
            let mut png = Vec::new();
            image.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;
            Ok::<Vec<u8>, AppError>(png)
        })
        .await??;

        let mut process = Command::new(self.options.executable())
            .args(self.options.command_args())
            .stdout(Stdio::piped())
            .stdin(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;
        {
            let mut stdin = process
                .stdin
                .take()
                .ok_or_else(|| Self::extraction_error("Tesseract stdin is not available"))?;
            stdin.write_all(&png).await?;
        }
        let output = process.wait_with_output().await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stdout.trim().is_empty() {
                return Err(Self::extraction_error(format!(
                    "{}. {}",
                    output.status,
                    stderr.trim()
                )));
            }
            tracing::warn!(stderr = %stderr.trim(), "Tesseract reported a failure but produced text");
        }
        Ok(join_recognized_lines(stdout.lines()).into())
    }

    fn ocr_type(&self) -> OcrType {
        OcrType::Tesseract
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rvstruct::ValueStruct;

    #[test]
    fn test_command_args() {
        let options = TesseractOcrOptions {
            lang: "eng".to_string(),
            dpi: Some(300),
            psm: Some(6),
            tesseract_path: None,
        };
        assert_eq!(
            options.command_args(),
            vec!["stdin", "stdout", "-l", "eng", "--dpi", "300", "--psm", "6"]
        );
        assert_eq!(options.executable(), PathBuf::from("tesseract"));
        assert_eq!(
            TesseractOcrOptions::default().command_args(),
            vec!["stdin", "stdout", "-l", "jpn+eng"]
        );
    }

    #[tokio::test]
    async fn test_missing_executable() {
        let result = TesseractOcr::new(TesseractOcrOptions {
            tesseract_path: Some(PathBuf::from("/nonexistent/bin/tesseract")),
            ..TesseractOcrOptions::default()
        })
        .await;
        assert!(matches!(result, Err(AppError::OcrConfigError { .. })));
    }

    #[tokio::test]
    #[cfg_attr(not(feature = "ci-tesseract"), ignore)]
    async fn test_blank_image_yields_empty_text() -> AppResult<()> {
        let ocr = TesseractOcr::new(TesseractOcrOptions {
            lang: "eng".to_string(),
            ..TesseractOcrOptions::default()
        })
        .await?;
        let image = image::RgbImage::from_pixel(64, 32, image::Rgb([255, 255, 255]));
        let text = ocr
            .image_to_text(Arc::new(DynamicImage::ImageRgb8(image)))
            .await?;
        assert!(text.value().is_empty());
        Ok(())
    }
}
