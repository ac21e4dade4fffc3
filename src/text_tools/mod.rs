use crate::common_types::{ExtractedText, NormalizedText, SimilarityScore, VerdictLabel};
use serde::Serialize;

mod normalizer;
pub use normalizer::*;

mod similarity;
pub use similarity::*;

mod verdict;
pub use verdict::*;

#[derive(Debug, Clone, Serialize)]
pub struct TextComparison {
    pub first_normalized: NormalizedText,
    pub second_normalized: NormalizedText,
    pub score: SimilarityScore,
    pub verdict: VerdictLabel,
}

/// Normalizes both texts, scores them and classifies the score.
pub fn compare_texts(
    normalizer: &TextNormalizer,
    verdict_scheme: &VerdictScheme,
    first: &ExtractedText,
    second: &ExtractedText,
) -> TextComparison {
    let first_normalized = normalizer.normalize(first);
    let second_normalized = normalizer.normalize(second);
    let score = similarity(&first_normalized, &second_normalized);
    let verdict = verdict_scheme.classify(&score);
    TextComparison {
        first_normalized,
        second_normalized,
        score,
        verdict,
    }
}
