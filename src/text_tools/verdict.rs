use crate::common_types::{SimilarityScore, VerdictLabel};
use crate::errors::AppError;
use rvstruct::ValueStruct;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct VerdictThreshold {
    pub lower_bound: f64,
    pub label: VerdictLabel,
}

/// Maps a similarity score to a user facing label.
///
/// Thresholds are kept sorted by descending lower bound; the first one the score
/// reaches wins. A score below every bound gets the label of the lowest one.
#[derive(Debug, Clone, PartialEq)]
pub struct VerdictScheme {
    thresholds: Vec<VerdictThreshold>,
}

impl VerdictScheme {
    pub fn new<L>(thresholds: Vec<(f64, L)>) -> Result<Self, AppError>
    where
        L: Into<String>,
    {
        if thresholds.is_empty() {
            return Err(AppError::VerdictThresholdsError {
                message: "At least one threshold is required".to_string(),
            });
        }
        let mut thresholds = thresholds
            .into_iter()
            .map(|(lower_bound, label)| {
                let label: String = label.into();
                if !(0.0..=1.0).contains(&lower_bound) {
                    return Err(AppError::VerdictThresholdsError {
                        message: format!(
                            "Lower bound {} for '{}' is outside of [0, 1]",
                            lower_bound, label
                        ),
                    });
                }
                if label.trim().is_empty() {
                    return Err(AppError::VerdictThresholdsError {
                        message: format!("Empty label for lower bound {}", lower_bound),
                    });
                }
                Ok(VerdictThreshold {
                    lower_bound,
                    label: label.trim().to_string().into(),
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;
        thresholds.sort_by(|a, b| b.lower_bound.total_cmp(&a.lower_bound));
        Ok(Self { thresholds })
    }

    pub fn graded() -> Self {
        Self {
            thresholds: vec![
                VerdictThreshold {
                    lower_bound: 1.0,
                    label: "exact".to_string().into(),
                },
                VerdictThreshold {
                    lower_bound: 0.8,
                    label: "high".to_string().into(),
                },
                VerdictThreshold {
                    lower_bound: 0.5,
                    label: "medium".to_string().into(),
                },
                VerdictThreshold {
                    lower_bound: 0.0,
                    label: "low".to_string().into(),
                },
            ],
        }
    }

    pub fn binary() -> Self {
        Self {
            thresholds: vec![
                VerdictThreshold {
                    lower_bound: 1.0,
                    label: "match".to_string().into(),
                },
                VerdictThreshold {
                    lower_bound: 0.0,
                    label: "no match".to_string().into(),
                },
            ],
        }
    }

    pub fn thresholds(&self) -> &[VerdictThreshold] {
        &self.thresholds
    }

    pub fn classify(&self, score: &SimilarityScore) -> VerdictLabel {
        let score = *score.value();
        self.thresholds
            .iter()
            .find(|threshold| score >= threshold.lower_bound)
            .or_else(|| self.thresholds.last())
            .map(|threshold| threshold.label.clone())
            .unwrap_or_else(|| VerdictLabel::from(String::new()))
    }

    /// Whether the label is the one of the highest threshold.
    pub fn is_top_label(&self, label: &VerdictLabel) -> bool {
        self.thresholds
            .first()
            .iter()
            .any(|threshold| &threshold.label == label)
    }
}

impl Default for VerdictScheme {
    fn default() -> Self {
        Self::graded()
    }
}

impl FromStr for VerdictScheme {
    type Err = AppError;

    /// Parses `1.0=exact,0.8=high,0=low`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let thresholds = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(|part| {
                let (bound, label) =
                    part.split_once('=')
                        .ok_or_else(|| AppError::VerdictThresholdsError {
                            message: format!("Expected '<bound>=<label>', got '{}'", part.trim()),
                        })?;
                let bound = bound.trim().parse::<f64>().map_err(|e| {
                    AppError::VerdictThresholdsError {
                        message: format!("Invalid bound '{}': {}", bound.trim(), e),
                    }
                })?;
                Ok((bound, label.to_string()))
            })
            .collect::<Result<Vec<_>, AppError>>()?;
        VerdictScheme::new(thresholds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(scheme: &VerdictScheme, score: f64) -> String {
        scheme.classify(&score.into()).value().clone()
    }

    #[test]
    fn test_graded_scheme() {
        let scheme = VerdictScheme::default();
        assert_eq!(label(&scheme, 1.0), "exact");
        assert_eq!(label(&scheme, 0.9), "high");
        assert_eq!(label(&scheme, 0.8), "high");
        assert_eq!(label(&scheme, 0.79), "medium");
        assert_eq!(label(&scheme, 0.5), "medium");
        assert_eq!(label(&scheme, 0.49), "low");
        assert_eq!(label(&scheme, 0.0), "low");
    }

    #[test]
    fn test_binary_scheme() {
        let scheme = VerdictScheme::binary();
        assert_eq!(label(&scheme, 1.0), "match");
        assert_eq!(label(&scheme, 0.999), "no match");
        assert_eq!(label(&scheme, 0.0), "no match");
        assert!(scheme.is_top_label(&"match".to_string().into()));
        assert!(!scheme.is_top_label(&"no match".to_string().into()));
    }

    #[test]
    fn test_parse_custom_thresholds_sorts_bounds() {
        let scheme: VerdictScheme = "0=far, 1.0=same ,0.9=close".parse().unwrap();
        let bounds: Vec<f64> = scheme.thresholds().iter().map(|t| t.lower_bound).collect();
        assert_eq!(bounds, vec![1.0, 0.9, 0.0]);
        assert_eq!(label(&scheme, 0.95), "close");
        assert_eq!(label(&scheme, 1.0), "same");
        assert_eq!(label(&scheme, 0.2), "far");
    }

    #[test]
    fn test_score_below_every_bound_gets_lowest_label() {
        let scheme: VerdictScheme = "1.0=exact,0.5=partial".parse().unwrap();
        assert_eq!(label(&scheme, 0.1), "partial");
    }

    #[test]
    fn test_parse_rejects_invalid_thresholds() {
        assert!("".parse::<VerdictScheme>().is_err());
        assert!("high".parse::<VerdictScheme>().is_err());
        assert!("abc=high".parse::<VerdictScheme>().is_err());
        assert!("1.5=high".parse::<VerdictScheme>().is_err());
        assert!("0.5=".parse::<VerdictScheme>().is_err());
    }
}
