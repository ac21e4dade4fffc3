use crate::common_types::{NormalizedText, SimilarityScore};
use rvstruct::ValueStruct;

/// Levenshtein-based similarity in `[0, 1]`.
///
/// An empty string on either side, including both, scores 0.0: "no text detected"
/// never reads as a match.
pub fn similarity(a: &NormalizedText, b: &NormalizedText) -> SimilarityScore {
    similarity_str(a.value(), b.value()).into()
}

pub fn similarity_str(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let max_len = a.chars().count().max(b.chars().count());
    let distance = strsim::levenshtein(a, b);
    (1.0 - distance as f64 / max_len as f64).clamp(0.0, 1.0)
}
