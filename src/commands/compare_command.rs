use crate::common_types::{ExtractedText, NormalizedText, SimilarityScore, VerdictLabel};
use crate::file_tools::{load_image, LoadedImage};
use crate::ocr::{extract_with_fallback, ExtractionOutcome, Ocr};
use crate::reporter::AppReporter;
use crate::text_tools::{compare_texts, TextNormalizer, VerdictScheme};
use crate::AppResult;
use console::{Style, Term};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use rvstruct::ValueStruct;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct CompareCommandOptions {
    pub normalizer: TextNormalizer,
    pub verdict_scheme: VerdictScheme,
    pub timeout: Duration,
}

impl CompareCommandOptions {
    pub fn new(normalizer: TextNormalizer, verdict_scheme: VerdictScheme, timeout: Duration) -> Self {
        CompareCommandOptions {
            normalizer,
            verdict_scheme,
            timeout,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageTextReport {
    pub path: String,
    pub extractor: String,
    pub raw_text: ExtractedText,
    pub normalized_text: NormalizedText,
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompareCommandResult {
    pub first: ImageTextReport,
    pub second: ImageTextReport,
    pub score: SimilarityScore,
    pub verdict: VerdictLabel,
}

impl CompareCommandResult {
    pub fn is_degraded(&self) -> bool {
        self.first.degraded || self.second.degraded
    }
}

pub async fn command_compare<P: Ocr, F: Ocr>(
    term: &Term,
    first_image: &Path,
    second_image: &Path,
    options: CompareCommandOptions,
    primary_ocr: &P,
    fallback_ocr: Option<&F>,
) -> AppResult<CompareCommandResult> {
    let bold_style = Style::new().bold();
    let fallback_output = fallback_ocr
        .map(|ocr| ocr.ocr_type().to_string())
        .unwrap_or_else(|| "none".to_string());
    term.write_line(
        format!(
            "Comparing {} and {}.\nOCR: {} (fallback: {}).",
            bold_style.clone().white().apply_to(first_image.to_string_lossy()),
            bold_style.clone().white().apply_to(second_image.to_string_lossy()),
            bold_style.clone().green().apply_to(primary_ocr.ocr_type()),
            bold_style.clone().yellow().apply_to(fallback_output),
        )
        .as_str(),
    )?;

    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] {msg}",
    )?);
    bar.enable_steady_tick(Duration::from_millis(100));
    let app_reporter = AppReporter::from(&bar);

    bar.set_message("Loading images...");
    let loaded_images = tokio::try_join!(load_image(first_image), load_image(second_image));
    if loaded_images.is_err() {
        bar.finish_and_clear();
    }
    let (first_loaded, second_loaded) = loaded_images?;

    bar.set_message("Extracting text...");
    let extraction_started = Instant::now();
    let extraction_result = tokio::try_join!(
        extract_image_text(&first_loaded, primary_ocr, fallback_ocr, &options),
        extract_image_text(&second_loaded, primary_ocr, fallback_ocr, &options)
    );
    if let Ok((first_outcome, second_outcome)) = &extraction_result {
        for (loaded, outcome) in [(&first_loaded, first_outcome), (&second_loaded, second_outcome)]
        {
            if outcome.degraded {
                app_reporter.warn(format!(
                    "Text of {} was extracted by fallback {}: {}",
                    loaded.path.to_string_lossy(),
                    outcome.extractor,
                    outcome.primary_error.as_deref().unwrap_or("unknown error")
                ))?;
            }
        }
        app_reporter.report(format!(
            "Text extracted in {}.",
            HumanDuration(extraction_started.elapsed())
        ))?;
    }
    bar.finish_and_clear();
    let (first_outcome, second_outcome) = extraction_result?;

    Ok(create_compare_result(
        &options,
        &first_loaded,
        first_outcome,
        &second_loaded,
        second_outcome,
    ))
}

async fn extract_image_text<P: Ocr, F: Ocr>(
    loaded: &LoadedImage,
    primary_ocr: &P,
    fallback_ocr: Option<&F>,
    options: &CompareCommandOptions,
) -> AppResult<ExtractionOutcome> {
    let outcome = extract_with_fallback(
        primary_ocr,
        fallback_ocr,
        Arc::new(loaded.image.clone()),
        options.timeout,
    )
    .await?;
    tracing::debug!(
        path = %loaded.path.to_string_lossy(),
        media_type = %loaded.media_type,
        extractor = %outcome.extractor,
        chars = outcome.text.value().chars().count(),
        "Text extracted"
    );
    Ok(outcome)
}

fn create_compare_result(
    options: &CompareCommandOptions,
    first_loaded: &LoadedImage,
    first_outcome: ExtractionOutcome,
    second_loaded: &LoadedImage,
    second_outcome: ExtractionOutcome,
) -> CompareCommandResult {
    let comparison = compare_texts(
        &options.normalizer,
        &options.verdict_scheme,
        &first_outcome.text,
        &second_outcome.text,
    );
    CompareCommandResult {
        first: ImageTextReport {
            path: first_loaded.path.to_string_lossy().to_string(),
            extractor: first_outcome.extractor.to_string(),
            raw_text: first_outcome.text,
            normalized_text: comparison.first_normalized,
            degraded: first_outcome.degraded,
            primary_error: first_outcome.primary_error,
        },
        second: ImageTextReport {
            path: second_loaded.path.to_string_lossy().to_string(),
            extractor: second_outcome.extractor.to_string(),
            raw_text: second_outcome.text,
            normalized_text: comparison.second_normalized,
            degraded: second_outcome.degraded,
            primary_error: second_outcome.primary_error,
        },
        score: comparison.score,
        verdict: comparison.verdict,
    }
}

pub fn write_compare_result(
    term: &Term,
    result: &CompareCommandResult,
    verdict_scheme: &VerdictScheme,
) -> AppResult<()> {
    let bold_style = Style::new().bold();
    let dimmed_style = Style::new().dim();

    term.write_line(format!("\n{}", bold_style.apply_to("Extracted text")).as_str())?;
    for (index, report) in [&result.first, &result.second].iter().enumerate() {
        term.write_line(
            format!(
                "  Image {} {}: {}",
                index + 1,
                dimmed_style.apply_to(format!("({}, {})", report.path, report.extractor)),
                report.raw_text.value()
            )
            .as_str(),
        )?;
    }

    term.write_line(format!("\n{}", bold_style.apply_to("Normalized text")).as_str())?;
    for (index, report) in [&result.first, &result.second].iter().enumerate() {
        let degraded = if report.degraded {
            Style::new().yellow().apply_to(" (degraded)").to_string()
        } else {
            String::new()
        };
        term.write_line(
            format!(
                "  Image {}: {}{}",
                index + 1,
                report.normalized_text.value(),
                degraded
            )
            .as_str(),
        )?;
    }

    write_score_and_verdict(term, &result.score, &result.verdict, verdict_scheme)
}

pub fn write_score_and_verdict(
    term: &Term,
    score: &SimilarityScore,
    verdict: &VerdictLabel,
    verdict_scheme: &VerdictScheme,
) -> AppResult<()> {
    let bold_style = Style::new().bold();
    let verdict_style = if verdict_scheme.is_top_label(verdict) {
        bold_style.clone().green()
    } else {
        bold_style.clone().yellow()
    };
    term.write_line(
        format!(
            "\nSimilarity: {}\nVerdict: {}",
            bold_style.apply_to(format!("{:.2}", score.value())),
            verdict_style.apply_to(verdict.value())
        )
        .as_str(),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::OcrType;
    use crate::errors::AppError;
    use crate::ocr::test_ocr::{FixedOcr, FixedOcrBehavior};
    use std::path::PathBuf;

    fn write_blank_png(dir: &Path, name: &str, width: u32) -> PathBuf {
        let path = dir.join(name);
        image::RgbImage::from_pixel(width, 8, image::Rgb([255, 255, 255]))
            .save(&path)
            .unwrap();
        path
    }

    fn options() -> CompareCommandOptions {
        CompareCommandOptions::new(
            TextNormalizer::default(),
            VerdictScheme::graded(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn compare_high_similarity_test() -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    {
        let term = Term::stdout();
        let temp_dir = tempfile::TempDir::with_prefix("compare_command_tests_high")?;
        let first = write_blank_png(temp_dir.path(), "first.png", 10);
        let second = write_blank_png(temp_dir.path(), "second.png", 20);
        let ocr = FixedOcr::text(OcrType::Ocrs, 10, "Hello World").with(
            20,
            FixedOcrBehavior::Text("Hello Word".to_string()),
        );

        let result =
            command_compare(&term, &first, &second, options(), &ocr, None::<&FixedOcr>).await?;
        assert_eq!(result.first.raw_text.value(), "Hello World");
        assert_eq!(result.first.normalized_text.value(), "helloworld");
        assert_eq!(result.second.normalized_text.value(), "helloword");
        assert!((*result.score.value() - 0.9).abs() < 1e-9);
        assert_eq!(result.verdict.value(), "high");
        assert!(!result.is_degraded());
        write_compare_result(&term, &result, &VerdictScheme::graded())?;
        Ok(())
    }

    #[tokio::test]
    async fn compare_blank_image_test() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let term = Term::stdout();
        let temp_dir = tempfile::TempDir::with_prefix("compare_command_tests_blank")?;
        let first = write_blank_png(temp_dir.path(), "blank.png", 10);
        let second = write_blank_png(temp_dir.path(), "text.png", 20);
        let ocr = FixedOcr::text(OcrType::Ocrs, 10, "")
            .with(20, FixedOcrBehavior::Text("Hello World".to_string()));

        let result =
            command_compare(&term, &first, &second, options(), &ocr, None::<&FixedOcr>).await?;
        assert_eq!(result.first.normalized_text.value(), "");
        assert_eq!(*result.score.value(), 0.0);
        assert_eq!(result.verdict.value(), "low");
        Ok(())
    }

    #[tokio::test]
    async fn compare_with_fallback_test() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let term = Term::stdout();
        let temp_dir = tempfile::TempDir::with_prefix("compare_command_tests_fallback")?;
        let first = write_blank_png(temp_dir.path(), "first.png", 10);
        let second = write_blank_png(temp_dir.path(), "second.png", 20);
        let primary = FixedOcr::text(OcrType::Ocrs, 10, "Hello World")
            .with(20, FixedOcrBehavior::Fail);
        let fallback = FixedOcr::text(OcrType::Tesseract, 20, "Hello World");

        let result =
            command_compare(&term, &first, &second, options(), &primary, Some(&fallback)).await?;
        assert!(!result.first.degraded);
        assert!(result.second.degraded);
        assert_eq!(result.second.extractor, "tesseract");
        assert!(result.is_degraded());
        assert_eq!(result.verdict.value(), "exact");

        let json = serde_json::to_value(&result)?;
        assert_eq!(json["second"]["degraded"], true);
        assert_eq!(json["first"]["normalized_text"], "helloworld");
        assert!(json["first"].get("primary_error").is_none());
        assert_eq!(json["score"], 1.0);
        Ok(())
    }

    #[tokio::test]
    async fn compare_unreadable_image_test() -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    {
        let term = Term::stdout();
        let temp_dir = tempfile::TempDir::with_prefix("compare_command_tests_unreadable")?;
        let first = write_blank_png(temp_dir.path(), "first.png", 10);
        let second = temp_dir.path().join("broken.jpg");
        tokio::fs::write(&second, b"not a jpeg").await?;
        let ocr = FixedOcr::text(OcrType::Ocrs, 10, "Hello World");

        let result =
            command_compare(&term, &first, &second, options(), &ocr, None::<&FixedOcr>).await;
        assert!(matches!(result, Err(AppError::ImageDecodeError { .. })));
        Ok(())
    }
}
