use crate::common_types::ImageAsset;
use crate::errors::AppError;
use crate::AppResult;
use bytes::Bytes;
use image::ImageFormat;
use mime::Mime;
use std::io::ErrorKind;
use std::path::Path;

/// Reads and validates an image from the local filesystem.
///
/// The bytes are sent to the inference service as they are on disk; decoding
/// only rejects files the `image` crate can't read before any request is made.
pub async fn load_image_asset(image_path: &str) -> AppResult<ImageAsset> {
    let path = Path::new(image_path);
    let data = match tokio::fs::read(path).await {
        Ok(data) => data,
        Err(err) if err.kind() == ErrorKind::NotFound || path.is_dir() => {
            return Err(AppError::ImageNotFound {
                path: image_path.to_string(),
            })
        }
        Err(err) => return Err(err.into()),
    };

    let image_format = detect_image_format(path, &data)?;
    let image = image::load_from_memory_with_format(&data, image_format)?;
    tracing::debug!(
        "Loaded {} ({}x{}, {:?}, {} bytes)",
        image_path,
        image.width(),
        image.height(),
        image_format,
        data.len()
    );

    Ok(ImageAsset {
        path: image_path.to_string(),
        mime_type: image_mime_type(image_format)?,
        data: Bytes::from(data),
    })
}

fn detect_image_format(path: &Path, data: &[u8]) -> AppResult<ImageFormat> {
    match image::guess_format(data) {
        Ok(format) => Ok(format),
        Err(err) => mime_guess::from_path(path)
            .first()
            .filter(|mime| mime.type_() == mime::IMAGE)
            .and_then(|mime| ImageFormat::from_mime_type(&mime))
            .ok_or_else(|| AppError::from(err)),
    }
}

fn image_mime_type(image_format: ImageFormat) -> AppResult<Mime> {
    image_format
        .to_mime_type()
        .parse()
        .map_err(|e| AppError::SystemError {
            message: format!("Invalid image mime type for {:?}: {}", image_format, e),
        })
}
