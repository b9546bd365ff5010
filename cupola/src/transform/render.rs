//! Rendering an original into a display bitmap.
//!
//! The stages run in a fixed order, which matters for the output:
//!
//! ```text
//! brightness → contrast → rotation → fit-to-viewport × zoom → Lanczos resize
//! ```
//!
//! Pan is not applied here; it positions the result inside the viewport.

use image::imageops::FilterType;
use image::DynamicImage;
use thiserror::Error;

use super::state::{Rotation, TransformState};

/// Space kept free around the image when fitting it to the viewport.
pub const DEFAULT_VIEWPORT_MARGIN: u32 = 100;

/// Errors that can occur while rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransformError {
    /// The viewport is too small to hold any pixels yet.
    ///
    /// Not a user-facing failure: retry once the viewport can be measured.
    #[error("Viewport {width}x{height} is not ready for rendering")]
    ViewportNotReady { width: u32, height: u32 },
}

/// Measured size of the area an image is displayed in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Deterministic transform pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Renderer {
    margin: u32,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWPORT_MARGIN)
    }
}

impl Renderer {
    /// Creates a renderer keeping `margin` pixels free on each axis.
    pub fn new(margin: u32) -> Self {
        Self { margin }
    }

    pub fn margin(&self) -> u32 {
        self.margin
    }

    /// Scale that fits a `width`×`height` image into the viewport.
    ///
    /// Each viewport axis is reduced by the margin; the smaller of the two
    /// axis ratios wins.
    pub fn fit_scale(&self, width: u32, height: u32, viewport: Viewport) -> f64 {
        let margin = f64::from(self.margin);
        let scale_x = (f64::from(viewport.width) - margin) / f64::from(width.max(1));
        let scale_y = (f64::from(viewport.height) - margin) / f64::from(height.max(1));
        scale_x.min(scale_y)
    }

    /// Output dimensions for `original` under `state`, or `ViewportNotReady`.
    pub fn output_size(
        &self,
        original: &DynamicImage,
        state: &TransformState,
        viewport: Viewport,
    ) -> Result<(u32, u32), TransformError> {
        let not_ready = TransformError::ViewportNotReady {
            width: viewport.width,
            height: viewport.height,
        };
        if viewport.width <= 1 || viewport.height <= 1 {
            return Err(not_ready);
        }

        let (width, height) = if state.rotation().swaps_axes() {
            (original.height(), original.width())
        } else {
            (original.width(), original.height())
        };

        let scale = self.fit_scale(width, height, viewport) * state.zoom();
        let new_width = (f64::from(width) * scale) as i64;
        let new_height = (f64::from(height) * scale) as i64;
        if new_width <= 0 || new_height <= 0 {
            return Err(not_ready);
        }

        Ok((
            new_width.min(i64::from(u32::MAX)) as u32,
            new_height.min(i64::from(u32::MAX)) as u32,
        ))
    }

    /// Renders `original` for display. Never modifies `original`.
    pub fn render(
        &self,
        original: &DynamicImage,
        state: &TransformState,
        viewport: Viewport,
    ) -> Result<DynamicImage, TransformError> {
        // Sizing depends only on dimensions, so an unready viewport is
        // rejected before any pixel work.
        let (width, height) = self.output_size(original, state, viewport)?;

        let mut image = original.clone();
        if state.brightness() != 1.0 {
            image = adjust_brightness(image, state.brightness());
        }
        if state.contrast() != 1.0 {
            image = adjust_contrast(image, state.contrast());
        }
        image = rotate(image, state.rotation());

        Ok(image.resize_exact(width, height, FilterType::Lanczos3))
    }
}

fn rotate(image: DynamicImage, rotation: Rotation) -> DynamicImage {
    match rotation {
        Rotation::Deg0 => image,
        Rotation::Deg90 => image.rotate90(),
        Rotation::Deg180 => image.rotate180(),
        Rotation::Deg270 => image.rotate270(),
    }
}

/// Scales every color channel by `factor` (blend toward black).
fn adjust_brightness(image: DynamicImage, factor: f64) -> DynamicImage {
    let lut = build_lut(|v| v * factor);
    map_color_channels(image, &lut)
}

/// Blends every color channel toward/away from the mean luminance.
fn adjust_contrast(image: DynamicImage, factor: f64) -> DynamicImage {
    let mean = mean_luminance(&image).round();
    let lut = build_lut(|v| mean + factor * (v - mean));
    map_color_channels(image, &lut)
}

fn build_lut(f: impl Fn(f64) -> f64) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        *entry = f(i as f64).clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Applies `lut` to the color channels, leaving alpha as is.
///
/// 8-bit gray images stay gray. Anything else comes out as 8-bit RGB or
/// RGBA, the depth display bitmaps are shown at.
fn map_color_channels(image: DynamicImage, lut: &[u8; 256]) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(mut buf) => {
            for pixel in buf.pixels_mut() {
                pixel.0[0] = lut[pixel.0[0] as usize];
            }
            DynamicImage::ImageLuma8(buf)
        }
        DynamicImage::ImageLumaA8(mut buf) => {
            for pixel in buf.pixels_mut() {
                pixel.0[0] = lut[pixel.0[0] as usize];
            }
            DynamicImage::ImageLumaA8(buf)
        }
        image if image.color().has_alpha() => {
            let mut buf = image.into_rgba8();
            for pixel in buf.pixels_mut() {
                for c in &mut pixel.0[..3] {
                    *c = lut[*c as usize];
                }
            }
            DynamicImage::ImageRgba8(buf)
        }
        image => {
            let mut buf = image.into_rgb8();
            for pixel in buf.pixels_mut() {
                for c in &mut pixel.0 {
                    *c = lut[*c as usize];
                }
            }
            DynamicImage::ImageRgb8(buf)
        }
    }
}

/// Mean ITU-R 601 luma of the image, 0-255.
fn mean_luminance(image: &DynamicImage) -> f64 {
    let rgb = image.to_rgb8();
    let count = rgb.pixels().len();
    if count == 0 {
        return 0.0;
    }
    let sum: u64 = rgb
        .pixels()
        .map(|p| {
            let [r, g, b] = p.0;
            (u64::from(r) * 299 + u64::from(g) * 587 + u64::from(b) * 114) / 1000
        })
        .sum();
    sum as f64 / count as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{
        ColorType, GenericImageView, GrayAlphaImage, GrayImage, ImageBuffer, Luma, LumaA, Rgb,
        RgbImage, Rgba, RgbaImage,
    };

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 2) as u8, (y * 4) as u8, 100])
        }))
    }

    #[test]
    fn test_fit_scale_scenario() {
        // 300x200 viewport minus a 100px margin leaves 200x100.
        let renderer = Renderer::default();
        let original = gradient(100, 50);

        assert_eq!(renderer.fit_scale(100, 50, Viewport::new(300, 200)), 2.0);

        let out = renderer
            .render(&original, &TransformState::identity(), Viewport::new(300, 200))
            .unwrap();
        assert_eq!(out.dimensions(), (200, 100));
    }

    #[test]
    fn test_fit_takes_smaller_axis() {
        let renderer = Renderer::new(0);
        assert_eq!(renderer.fit_scale(100, 100, Viewport::new(400, 200)), 2.0);
    }

    #[test]
    fn test_zoom_multiplies_fit_scale() {
        let renderer = Renderer::default();
        let mut state = TransformState::identity();
        state.zoom_out();

        // 2.0 / 1.2, truncated.
        let size = renderer
            .output_size(&gradient(100, 50), &state, Viewport::new(300, 200))
            .unwrap();
        assert_eq!(size, (166, 83));
    }

    #[test]
    fn test_rotation_expands_canvas() {
        let renderer = Renderer::new(0);
        let mut state = TransformState::identity();
        state.rotate_right();

        let out = renderer
            .render(&gradient(40, 20), &state, Viewport::new(20, 40))
            .unwrap();
        assert_eq!(out.dimensions(), (20, 40));
    }

    #[test]
    fn test_rotation_is_clockwise() {
        // Mark the top-left pixel; after a clockwise quarter turn it is top-right.
        let mut img = RgbImage::new(4, 2);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        let rotated = rotate(DynamicImage::ImageRgb8(img), Rotation::Deg90).to_rgb8();

        assert_eq!(rotated.dimensions(), (2, 4));
        assert_eq!(rotated.get_pixel(1, 0), &Rgb([255, 0, 0]));
    }

    #[test]
    fn test_viewport_not_ready() {
        let renderer = Renderer::default();
        let state = TransformState::identity();
        let original = gradient(100, 50);

        assert_eq!(
            renderer
                .render(&original, &state, Viewport::new(1, 1))
                .unwrap_err(),
            TransformError::ViewportNotReady {
                width: 1,
                height: 1
            }
        );
        // Larger than 1px but smaller than the margin.
        assert!(renderer
            .render(&original, &state, Viewport::new(80, 80))
            .is_err());
    }

    #[test]
    fn test_render_does_not_touch_original() {
        let renderer = Renderer::new(0);
        let original = gradient(10, 10);
        let copy = original.clone();
        let mut state = TransformState::identity();
        state.toggle_brightness();
        state.toggle_contrast();
        state.rotate_left();

        renderer
            .render(&original, &state, Viewport::new(30, 30))
            .unwrap();
        assert_eq!(original.as_bytes(), copy.as_bytes());
    }

    #[test]
    fn test_brightness_scales_channels() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([100, 200, 10])));
        let out = adjust_brightness(img, 1.5).to_rgb8();
        assert_eq!(out.get_pixel(0, 0), &Rgb([150, 255, 15]));
    }

    #[test]
    fn test_contrast_around_mean() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([100, 100, 100]));
        img.put_pixel(1, 0, Rgb([200, 200, 200]));
        let out = adjust_contrast(DynamicImage::ImageRgb8(img), 1.5).to_rgb8();

        // Mean luminance is 150.
        assert_eq!(out.get_pixel(0, 0), &Rgb([75, 75, 75]));
        assert_eq!(out.get_pixel(1, 0), &Rgb([225, 225, 225]));
    }

    #[test]
    fn test_enhancement_preserves_alpha() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([100, 100, 100, 42])));
        let out = adjust_brightness(img, 1.5).to_rgba8();
        assert_eq!(out.get_pixel(0, 0), &Rgba([150, 150, 150, 42]));
    }

    #[test]
    fn test_enhancement_keeps_gray_images_gray() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(1, 1, Luma([100])));
        let out = adjust_brightness(img, 1.5);
        assert_eq!(out.color(), ColorType::L8);
        assert_eq!(out.to_luma8().get_pixel(0, 0), &Luma([150]));

        let mut img = GrayAlphaImage::new(2, 1);
        img.put_pixel(0, 0, LumaA([100, 7]));
        img.put_pixel(1, 0, LumaA([200, 9]));
        let out = adjust_contrast(DynamicImage::ImageLumaA8(img), 1.5);
        assert_eq!(out.color(), ColorType::La8);
        let out = out.to_luma_alpha8();
        assert_eq!(out.get_pixel(0, 0), &LumaA([75, 7]));
        assert_eq!(out.get_pixel(1, 0), &LumaA([225, 9]));
    }

    #[test]
    fn test_enhancement_reduces_deep_images_to_8_bit() {
        let img = DynamicImage::ImageRgb16(ImageBuffer::from_pixel(1, 1, Rgb([25700u16; 3])));
        let out = adjust_brightness(img, 1.5);
        assert_eq!(out.color(), ColorType::Rgb8);
        assert_eq!(out.to_rgb8().get_pixel(0, 0), &Rgb([150, 150, 150]));
    }

    #[test]
    fn test_brightness_before_contrast() {
        // Brightness clips the light tone, so swapping the stages changes
        // the contrast mean.
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([40, 40, 40]));
        img.put_pixel(1, 0, Rgb([200, 200, 200]));
        let img = DynamicImage::ImageRgb8(img);

        let forward = adjust_contrast(adjust_brightness(img.clone(), 1.5), 1.5).to_rgb8();
        let reverse = adjust_brightness(adjust_contrast(img, 1.5), 1.5).to_rgb8();
        assert_ne!(forward.as_raw(), reverse.as_raw());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            #[test]
            fn test_render_is_idempotent(
                width in 1u32..24,
                height in 1u32..24,
                quarter_turns in 0u8..4,
                zoom_steps in -3i32..4,
                brighten in any::<bool>(),
                contrast in any::<bool>(),
            ) {
                let renderer = Renderer::new(10);
                let original = gradient(width, height);
                let mut state = TransformState::identity();
                for _ in 0..quarter_turns {
                    state.rotate_right();
                }
                for _ in 0..zoom_steps.max(0) {
                    state.zoom_in();
                }
                for _ in 0..(-zoom_steps).max(0) {
                    state.zoom_out();
                }
                if brighten {
                    state.toggle_brightness();
                }
                if contrast {
                    state.toggle_contrast();
                }

                let viewport = Viewport::new(60, 50);
                let first = renderer.render(&original, &state, viewport);
                let second = renderer.render(&original, &state, viewport);
                match (first, second) {
                    (Ok(a), Ok(b)) => {
                        prop_assert_eq!(a.dimensions(), b.dimensions());
                        prop_assert_eq!(a.as_bytes(), b.as_bytes());
                    }
                    (Err(a), Err(b)) => prop_assert_eq!(a, b),
                    _ => prop_assert!(false, "render outcome differed between runs"),
                }
            }
        }
    }
}
