use crate::common_types::{OpenAiApiKey, OpenAiModelName};
use crate::errors::AppError;
use crate::ocr::{
    OcrOptions, OcrProviderOptions, OcrsOptions, OpenAiVisionOcrOptions, TesseractOcrOptions,
};
use crate::text_tools::{TextNormalizerOptions, VerdictScheme};
use clap::*;
use std::fmt::Display;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, about)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    #[command(about = "Extract text from two images and compare it")]
    Compare {
        #[arg(help = "First image (PNG or JPEG)")]
        first_image: PathBuf,
        #[arg(help = "Second image (PNG or JPEG)")]
        second_image: PathBuf,

        #[command(flatten)]
        ocr_args: OcrArgs,

        #[arg(
            long,
            help = "Maximum time in seconds for a single OCR extraction",
            default_value = "120"
        )]
        timeout_secs: u64,

        #[command(flatten)]
        text_args: TextCompareArgs,
    },
    #[command(about = "Compare two texts without OCR")]
    Score {
        #[arg(help = "First text")]
        first_text: String,
        #[arg(help = "Second text")]
        second_text: String,

        #[command(flatten)]
        text_args: TextCompareArgs,
    },
    #[command(about = "Print the normalized form of a text")]
    Normalize {
        #[arg(help = "Text to normalize")]
        text: String,

        #[arg(
            long,
            help = "Transliterate non-Latin scripts to ASCII before filtering (erases Japanese text)",
            default_value = "false"
        )]
        transliterate: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcrType {
    Ocrs,
    Tesseract,
    OpenAiVision,
}

impl std::str::FromStr for OcrType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ocrs" => Ok(OcrType::Ocrs),
            "tesseract" => Ok(OcrType::Tesseract),
            "open-ai-vision" => Ok(OcrType::OpenAiVision),
            _ => Err(format!("Unknown OCR type: {}", s)),
        }
    }
}

impl Display for OcrType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OcrType::Ocrs => write!(f, "ocrs"),
            OcrType::Tesseract => write!(f, "tesseract"),
            OcrType::OpenAiVision => write!(f, "open-ai-vision"),
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictType {
    Graded,
    Binary,
}

#[derive(Args, Debug, Clone)]
pub struct OcrArgs {
    #[arg(long, value_enum, help = "OCR backend", default_value = "ocrs")]
    pub ocr: OcrType,

    #[arg(
        long,
        value_enum,
        help = "OCR backend to use when the primary one fails. Results are marked as degraded"
    )]
    pub fallback_ocr: Option<OcrType>,

    #[arg(
        long,
        help = "Directory with ocrs models (text-detection.rten, text-recognition.rten). Also OCRMATCH_MODELS_DIR"
    )]
    pub models_dir: Option<PathBuf>,

    #[arg(
        long,
        help = "Tesseract languages",
        default_value = TesseractOcrOptions::DEFAULT_LANG
    )]
    pub tesseract_lang: String,

    #[arg(long, help = "Tesseract DPI hint")]
    pub tesseract_dpi: Option<u32>,

    #[arg(long, help = "Tesseract page segmentation mode")]
    pub tesseract_psm: Option<u8>,

    #[arg(long, help = "Path to the tesseract executable")]
    pub tesseract_path: Option<PathBuf>,

    #[arg(long, help = "OpenAI API key. Also OPENAI_API_KEY")]
    pub open_ai_api_key: Option<OpenAiApiKey>,

    #[arg(long, help = "OpenAI model name")]
    pub open_ai_model: Option<OpenAiModelName>,
}

#[derive(Args, Debug, Clone)]
pub struct TextCompareArgs {
    #[arg(
        long,
        value_enum,
        help = "Verdict scheme",
        default_value = "graded",
        conflicts_with = "thresholds"
    )]
    pub verdict: VerdictType,

    #[arg(
        long,
        help = "Custom verdict thresholds such as '1.0=exact,0.8=high,0.5=medium,0=low'"
    )]
    pub thresholds: Option<String>,

    #[arg(
        long,
        help = "Transliterate non-Latin scripts to ASCII before filtering (erases Japanese text)",
        default_value = "false"
    )]
    pub transliterate: bool,

    #[arg(long, help = "Print the result as JSON", default_value = "false")]
    pub json: bool,
}

impl OcrArgs {
    pub fn to_ocr_options(&self, ocr_type: OcrType) -> Result<OcrOptions, AppError> {
        let provider_options = match ocr_type {
            OcrType::Ocrs => OcrProviderOptions::Ocrs(OcrsOptions {
                models_dir: self.models_dir.clone().or_else(|| {
                    crate::config_env_var("OCRMATCH_MODELS_DIR")
                        .ok()
                        .map(PathBuf::from)
                }),
            }),
            OcrType::Tesseract => OcrProviderOptions::Tesseract(TesseractOcrOptions {
                lang: self.tesseract_lang.clone(),
                dpi: self.tesseract_dpi,
                psm: self.tesseract_psm,
                tesseract_path: self.tesseract_path.clone(),
            }),
            OcrType::OpenAiVision => {
                let api_key = match self.open_ai_api_key.clone() {
                    Some(api_key) => Ok(api_key),
                    None => crate::config_env_var("OPENAI_API_KEY")
                        .map(OpenAiApiKey::from)
                        .map_err(|message| AppError::OcrConfigError {
                            message: format!("OpenAI API key is required: {}", message),
                        }),
                }?;
                OcrProviderOptions::OpenAiVision(OpenAiVisionOcrOptions {
                    api_key,
                    model: self.open_ai_model.clone(),
                })
            }
        };
        Ok(OcrOptions { provider_options })
    }
}

impl TextCompareArgs {
    pub fn verdict_scheme(&self) -> Result<VerdictScheme, AppError> {
        match (&self.thresholds, self.verdict) {
            (Some(thresholds), _) => thresholds.parse(),
            (None, VerdictType::Graded) => Ok(VerdictScheme::graded()),
            (None, VerdictType::Binary) => Ok(VerdictScheme::binary()),
        }
    }

    pub fn normalizer_options(&self) -> TextNormalizerOptions {
        TextNormalizerOptions {
            transliterate: self.transliterate,
        }
    }
}

pub fn timeout_from_secs(timeout_secs: u64) -> Result<Duration, AppError> {
    if timeout_secs == 0 {
        return Err(AppError::OcrConfigError {
            message: "Timeout must be more than zero seconds".to_string(),
        });
    }
    Ok(Duration::from_secs(timeout_secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compare_command() {
        let cli = CliArgs::parse_from([
            "ocrmatch",
            "compare",
            "a.png",
            "b.jpg",
            "--ocr",
            "tesseract",
            "--fallback-ocr",
            "ocrs",
            "--tesseract-lang",
            "eng",
            "--verdict",
            "binary",
        ]);
        match cli.command {
            CliCommand::Compare {
                first_image,
                second_image,
                ocr_args,
                timeout_secs,
                text_args,
            } => {
                assert_eq!(first_image, PathBuf::from("a.png"));
                assert_eq!(second_image, PathBuf::from("b.jpg"));
                assert_eq!(ocr_args.ocr, OcrType::Tesseract);
                assert_eq!(ocr_args.fallback_ocr, Some(OcrType::Ocrs));
                assert_eq!(timeout_secs, 120);
                assert_eq!(text_args.verdict_scheme().unwrap(), VerdictScheme::binary());
                match ocr_args
                    .to_ocr_options(OcrType::Tesseract)
                    .unwrap()
                    .provider_options
                {
                    OcrProviderOptions::Tesseract(options) => assert_eq!(options.lang, "eng"),
                    other => panic!("Unexpected provider options: {:?}", other),
                }
            }
            other => panic!("Unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_custom_thresholds_conflict_with_verdict() {
        let result = CliArgs::try_parse_from([
            "ocrmatch",
            "score",
            "a",
            "b",
            "--verdict",
            "binary",
            "--thresholds",
            "1=same,0=different",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_custom_thresholds() {
        let cli = CliArgs::parse_from([
            "ocrmatch",
            "score",
            "a",
            "b",
            "--thresholds",
            "1=same,0=different",
            "--json",
        ]);
        match cli.command {
            CliCommand::Score { text_args, .. } => {
                assert!(text_args.json);
                let scheme = text_args.verdict_scheme().unwrap();
                assert_eq!(scheme.thresholds().len(), 2);
            }
            other => panic!("Unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        assert!(timeout_from_secs(0).is_err());
        assert_eq!(timeout_from_secs(5).unwrap(), Duration::from_secs(5));
    }

    #[test]
    fn test_ocr_type_names() {
        for ocr_type in [OcrType::Ocrs, OcrType::Tesseract, OcrType::OpenAiVision] {
            assert_eq!(
                ocr_type.to_string().parse::<OcrType>().unwrap(),
                ocr_type
            );
        }
    }
}
