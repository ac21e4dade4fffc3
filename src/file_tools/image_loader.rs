use crate::errors::AppError;
use crate::AppResult;
use image::ImageFormat;
use mime::Mime;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub path: PathBuf,
    pub media_type: Mime,
    pub image: image::DynamicImage,
}

pub fn is_supported_image_mime(media_type: &Mime) -> bool {
    media_type.type_() == mime::IMAGE
        && (media_type.subtype() == mime::PNG || media_type.subtype() == mime::JPEG)
}

pub async fn load_image(path: &Path) -> AppResult<LoadedImage> {
    let path_str = path.to_string_lossy().to_string();
    let media_type = mime_guess::from_path(path)
        .first()
        .ok_or_else(|| AppError::UnsupportedImageType {
            path: path_str.clone(),
            media_type: "unknown".to_string(),
        })?;
    if !is_supported_image_mime(&media_type) {
        return Err(AppError::UnsupportedImageType {
            path: path_str,
            media_type: media_type.to_string(),
        });
    }
    let image_format =
        ImageFormat::from_mime_type(&media_type).ok_or_else(|| AppError::UnsupportedImageType {
            path: path_str.clone(),
            media_type: media_type.to_string(),
        })?;

    let data = tokio::fs::read(path).await?;
    let image = image::load_from_memory_with_format(&data, image_format).map_err(|source| {
        AppError::ImageDecodeError {
            path: path_str.clone(),
            source,
        }
    })?;
    tracing::debug!(
        path = %path_str,
        width = image.width(),
        height = image.height(),
        "Image loaded"
    );
    Ok(LoadedImage {
        path: path.to_path_buf(),
        media_type,
        image,
    })
}
