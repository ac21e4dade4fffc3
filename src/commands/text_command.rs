use crate::common_types::{ExtractedText, NormalizedText};
use crate::text_tools::{compare_texts, TextComparison, TextNormalizer, VerdictScheme};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct ScoreCommandOptions {
    pub normalizer: TextNormalizer,
    pub verdict_scheme: VerdictScheme,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreCommandResult {
    pub first_text: ExtractedText,
    pub second_text: ExtractedText,
    #[serde(flatten)]
    pub comparison: TextComparison,
}

pub fn command_score(
    first_text: &str,
    second_text: &str,
    options: &ScoreCommandOptions,
) -> ScoreCommandResult {
    let first_text: ExtractedText = first_text.to_string().into();
    let second_text: ExtractedText = second_text.to_string().into();
    let comparison = compare_texts(
        &options.normalizer,
        &options.verdict_scheme,
        &first_text,
        &second_text,
    );
    ScoreCommandResult {
        first_text,
        second_text,
        comparison,
    }
}

pub fn command_normalize(text: &str, normalizer: &TextNormalizer) -> NormalizedText {
    normalizer.normalize_str(text).into()
}
