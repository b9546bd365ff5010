//! Image decoding for fetched bytes.

use std::io::Cursor;

use image::{ColorType, DynamicImage, ImageFormat, ImageReader};

use super::types::DecodeError;
use crate::record::ImageMetadata;

/// A decoded bitmap together with its descriptive metadata.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub image: DynamicImage,
    pub metadata: ImageMetadata,
}

/// Trait for turning fetched bytes into a bitmap.
pub trait Decoder: Send + Sync {
    /// Decodes `bytes`, sniffing the format from the data itself.
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, DecodeError>;
}

/// Decoder backed by the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateDecoder;

impl Decoder for ImageCrateDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| DecodeError::Malformed(e.to_string()))?;

        let format = reader.format().ok_or(DecodeError::UnsupportedFormat)?;
        let image = reader
            .decode()
            .map_err(|e| DecodeError::Malformed(e.to_string()))?;

        let metadata = ImageMetadata {
            width: image.width(),
            height: image.height(),
            format: format_name(format).to_string(),
            color_mode: color_mode(image.color()).to_string(),
        };

        Ok(DecodedImage { image, metadata })
    }
}

/// Short upper-case name of a container format.
fn format_name(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "PNG",
        ImageFormat::Jpeg => "JPEG",
        ImageFormat::Gif => "GIF",
        ImageFormat::WebP => "WEBP",
        ImageFormat::Bmp => "BMP",
        ImageFormat::Tiff => "TIFF",
        ImageFormat::Ico => "ICO",
        ImageFormat::Tga => "TGA",
        ImageFormat::Pnm => "PNM",
        ImageFormat::Avif => "AVIF",
        ImageFormat::Hdr => "HDR",
        ImageFormat::OpenExr => "EXR",
        ImageFormat::Qoi => "QOI",
        _ => "Unknown",
    }
}

/// Color mode label for a pixel layout.
pub(crate) fn color_mode(color: ColorType) -> &'static str {
    match color {
        ColorType::L8 => "L",
        ColorType::La8 => "LA",
        ColorType::Rgb8 => "RGB",
        ColorType::Rgba8 => "RGBA",
        ColorType::L16 => "L16",
        ColorType::La16 => "LA16",
        ColorType::Rgb16 => "RGB16",
        ColorType::Rgba16 => "RGBA16",
        ColorType::Rgb32F => "RGB32F",
        ColorType::Rgba32F => "RGBA32F",
        _ => "Unknown",
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    /// Encodes a `width`×`height` gradient as PNG bytes.
    pub fn test_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, 128])
        });
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_png_metadata() {
        let decoded = ImageCrateDecoder.decode(&test_png(12, 8)).unwrap();

        assert_eq!(decoded.metadata.width, 12);
        assert_eq!(decoded.metadata.height, 8);
        assert_eq!(decoded.metadata.format, "PNG");
        assert_eq!(decoded.metadata.color_mode, "RGB");
        assert_eq!(decoded.image.width(), 12);
    }

    #[test]
    fn test_decode_garbage_is_unsupported() {
        let result = ImageCrateDecoder.decode(b"definitely not an image");
        assert_eq!(result.unwrap_err(), DecodeError::UnsupportedFormat);
    }

    #[test]
    fn test_decode_truncated_png_is_malformed() {
        let bytes = test_png(16, 16);
        let result = ImageCrateDecoder.decode(&bytes[..bytes.len() / 2]);
        assert!(matches!(result, Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_color_mode_labels() {
        assert_eq!(color_mode(ColorType::L8), "L");
        assert_eq!(color_mode(ColorType::Rgba8), "RGBA");
        assert_eq!(color_mode(ColorType::Rgb16), "RGB16");
    }
}
