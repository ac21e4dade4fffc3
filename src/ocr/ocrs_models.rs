use crate::errors::AppError;
use crate::AppResult;
use std::path::{Path, PathBuf};

pub const OCRS_DETECTION_MODEL_FILE: &str = "text-detection.rten";
pub const OCRS_RECOGNITION_MODEL_FILE: &str = "text-recognition.rten";

#[derive(Debug, Clone, Default)]
pub struct OcrsOptions {
    pub models_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OcrsModelPaths {
    pub detection_model: PathBuf,
    pub recognition_model: PathBuf,
}

impl OcrsModelPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            detection_model: dir.join(OCRS_DETECTION_MODEL_FILE),
            recognition_model: dir.join(OCRS_RECOGNITION_MODEL_FILE),
        }
    }

    fn exist(&self) -> bool {
        self.detection_model.exists() && self.recognition_model.exists()
    }
}

impl OcrsOptions {
    /// Candidate directories in lookup order: the explicit one, next to the
    /// executable, the `share` dir of an install prefix, the user cache.
    pub fn candidate_models_dirs(&self) -> Vec<PathBuf> {
        let current_dir = std::env::current_exe()
            .ok()
            .and_then(|executable| executable.parent().map(|p| p.to_path_buf()));

        vec![
            self.models_dir.clone(),
            current_dir.clone().map(|p| p.join("models").join("ocrs")),
            current_dir.and_then(|p| p.parent().map(|p| p.join("share").join("ocrs"))),
            dirs::home_dir().map(|p| p.join(".cache").join("ocrs")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn find_model_paths(&self) -> AppResult<OcrsModelPaths> {
        if let Some(models_dir) = &self.models_dir {
            let paths = OcrsModelPaths::in_dir(models_dir);
            return if paths.exist() {
                Ok(paths)
            } else {
                Err(AppError::OcrConfigError {
                    message: format!(
                        "{} and {} are expected in {}",
                        OCRS_DETECTION_MODEL_FILE,
                        OCRS_RECOGNITION_MODEL_FILE,
                        models_dir.to_string_lossy()
                    ),
                })
            };
        }
        self.candidate_models_dirs()
            .iter()
            .map(|dir| OcrsModelPaths::in_dir(dir))
            .find(|paths| paths.exist())
            .ok_or_else(|| AppError::OcrConfigError {
                message: "Could not find ocrs models directory. Use --models-dir".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_models_dir() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let temp_dir = tempfile::TempDir::with_prefix("ocrs_models_tests")?;
        std::fs::write(temp_dir.path().join(OCRS_DETECTION_MODEL_FILE), b"")?;
        let options = OcrsOptions {
            models_dir: Some(temp_dir.path().to_path_buf()),
        };
        assert!(matches!(
            options.find_model_paths(),
            Err(AppError::OcrConfigError { .. })
        ));

        std::fs::write(temp_dir.path().join(OCRS_RECOGNITION_MODEL_FILE), b"")?;
        assert_eq!(
            options.find_model_paths()?,
            OcrsModelPaths::in_dir(temp_dir.path())
        );
        Ok(())
    }

    #[test]
    fn test_explicit_dir_comes_first() {
        let options = OcrsOptions {
            models_dir: Some(PathBuf::from("/opt/models")),
        };
        assert_eq!(
            options.candidate_models_dirs().first(),
            Some(&PathBuf::from("/opt/models"))
        );
    }
}
