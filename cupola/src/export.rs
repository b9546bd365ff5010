//! Saving rendered images to disk.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use image::{DynamicImage, ImageFormat};
use thiserror::Error;
use tracing::info;

/// Errors that can occur while saving an image.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to create directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("No image is being viewed")]
    NoActiveImage,
}

/// `<collection>_img<position + 1>_<YYYYmmdd_HHMMSS>.png`, spaces replaced
/// with underscores.
pub fn default_filename<Tz: TimeZone>(
    collection: &str,
    position: usize,
    timestamp: &DateTime<Tz>,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}_img{}_{}.png",
        collection.replace(' ', "_"),
        position + 1,
        timestamp.format("%Y%m%d_%H%M%S")
    )
}

/// [`default_filename`] stamped with the current local time, inside `dir`.
pub fn default_path(dir: &Path, collection: &str, position: usize) -> PathBuf {
    dir.join(default_filename(collection, position, &Local::now()))
}

/// Writes `image` to `path`. The format follows the extension, PNG otherwise.
pub fn save_image(image: &DynamicImage, path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ExportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let format = ImageFormat::from_path(path).unwrap_or(ImageFormat::Png);
    // JPEG has no alpha channel.
    let result = if format == ImageFormat::Jpeg && image.color().has_alpha() {
        DynamicImage::ImageRgb8(image.to_rgb8()).save_with_format(path, format)
    } else {
        image.save_with_format(path, format)
    };
    result.map_err(|source| ExportError::Encode {
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "Saved image"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    #[test]
    fn test_default_filename() {
        let timestamp = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            default_filename("Window 3", 0, &timestamp),
            "Window_3_img1_20240309_140507.png"
        );
    }

    #[test]
    fn test_default_path_in_directory() {
        let path = default_path(Path::new("/tmp/out"), "Window 0", 4);
        assert!(path.starts_with("/tmp/out"));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("Window_0_img5_"));
        assert!(name.ends_with(".png"));
    }

    #[test]
    fn test_save_png_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shots").join("out.png");
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(3, 2, Rgba([9, 8, 7, 255])));

        save_image(&image, &path).unwrap();

        let reloaded = image::open(&path).unwrap();
        assert_eq!(reloaded.width(), 3);
        assert_eq!(reloaded.height(), 2);
    }

    #[test]
    fn test_save_jpeg_drops_alpha() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.jpg");
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([200, 10, 10, 128])));

        save_image(&image, &path).unwrap();
        assert!(path.exists());
    }
}
