use crate::common_types::{ExtractedText, NormalizedText};
use regex::Regex;
use rvstruct::ValueStruct;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

// Word characters plus Hiragana, Katakana and the common CJK ideograph block.
static DISALLOWED_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\w\x{3041}-\x{3093}\x{30A1}-\x{30F3}\x{4E00}-\x{9FA5}]+")
        .expect("static normalizer pattern is valid")
});

#[derive(Debug, Clone, Default)]
pub struct TextNormalizerOptions {
    /// Convert non-Latin scripts to ASCII approximations before filtering.
    /// Erases Japanese text entirely, so it stays off unless explicitly asked for.
    pub transliterate: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TextNormalizer {
    options: TextNormalizerOptions,
}

impl TextNormalizer {
    pub fn new(options: TextNormalizerOptions) -> Self {
        Self { options }
    }

    pub fn normalize(&self, text: &ExtractedText) -> NormalizedText {
        self.normalize_str(text.value()).into()
    }

    pub fn normalize_str(&self, text: &str) -> String {
        let canonical: String = text.nfkc().collect();
        let canonical = if self.options.transliterate {
            deunicode::deunicode(&canonical)
        } else {
            canonical
        };
        let lowercased = canonical.to_lowercase();
        let filtered = DISALLOWED_CHARS.replace_all(&lowercased, "");
        // Filtering can leave a base letter next to a combining mark.
        filtered.chars().filter(|c| !c.is_whitespace()).nfc().collect()
    }
}
