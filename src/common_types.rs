use rvstruct::ValueStruct;
use serde::Serialize;

/// Text as returned by an OCR backend, before any normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ValueStruct)]
pub struct ExtractedText(String);

/// Output of the text normalizer. Normalizing it again yields the same value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ValueStruct)]
pub struct NormalizedText(String);

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, ValueStruct)]
pub struct SimilarityScore(f64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ValueStruct)]
pub struct VerdictLabel(String);

#[derive(Debug, Clone, ValueStruct)]
pub struct OpenAiApiKey(String);

#[derive(Debug, Clone, ValueStruct)]
pub struct OpenAiModelName(String);
