//! View parameters applied on top of an original image.

use std::fmt;

/// Lower zoom bound.
pub const MIN_ZOOM: f64 = 0.1;

/// Upper zoom bound.
pub const MAX_ZOOM: f64 = 5.0;

/// Factor applied by one zoom step.
pub const ZOOM_STEP: f64 = 1.2;

/// Brightness/contrast factor used when an enhancement is toggled on.
pub const ENHANCED_FACTOR: f64 = 1.5;

/// Rotation in quarter turns, clockwise as seen on screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Angle in degrees.
    pub fn degrees(&self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Builds a rotation from any multiple of 90 degrees (negative allowed).
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        if degrees % 90 != 0 {
            return None;
        }
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            _ => Some(Rotation::Deg270),
        }
    }

    /// One quarter turn clockwise.
    pub fn clockwise(self) -> Self {
        match self {
            Rotation::Deg0 => Rotation::Deg90,
            Rotation::Deg90 => Rotation::Deg180,
            Rotation::Deg180 => Rotation::Deg270,
            Rotation::Deg270 => Rotation::Deg0,
        }
    }

    /// One quarter turn counter-clockwise.
    pub fn counter_clockwise(self) -> Self {
        match self {
            Rotation::Deg0 => Rotation::Deg270,
            Rotation::Deg90 => Rotation::Deg0,
            Rotation::Deg180 => Rotation::Deg90,
            Rotation::Deg270 => Rotation::Deg180,
        }
    }

    /// Whether this rotation swaps width and height.
    pub fn swaps_axes(&self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Per-session view parameters.
///
/// Not tied to any image: switching the active image or collection resets
/// it to identity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformState {
    zoom: f64,
    rotation: Rotation,
    pan: (i32, i32),
    brightness: f64,
    contrast: f64,
}

impl Default for TransformState {
    fn default() -> Self {
        Self::identity()
    }
}

impl TransformState {
    /// Zoom 1.0, no rotation, no pan, neutral brightness and contrast.
    pub fn identity() -> Self {
        Self {
            zoom: 1.0,
            rotation: Rotation::Deg0,
            pan: (0, 0),
            brightness: 1.0,
            contrast: 1.0,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Offset of the rendered bitmap inside the viewport, in pixels.
    pub fn pan(&self) -> (i32, i32) {
        self.pan
    }

    pub fn brightness(&self) -> f64 {
        self.brightness
    }

    pub fn contrast(&self) -> f64 {
        self.contrast
    }

    /// Zoom as a whole percentage, truncated.
    pub fn zoom_percent(&self) -> u32 {
        (self.zoom * 100.0) as u32
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Multiplies zoom by [`ZOOM_STEP`], capped at [`MAX_ZOOM`].
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * ZOOM_STEP).min(MAX_ZOOM);
    }

    /// Divides zoom by [`ZOOM_STEP`], floored at [`MIN_ZOOM`].
    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / ZOOM_STEP).max(MIN_ZOOM);
    }

    /// Zoom back to 1.0 and clear the pan. Rotation and enhancements stay.
    pub fn reset_zoom(&mut self) {
        self.zoom = 1.0;
        self.pan = (0, 0);
    }

    /// Reset brightness, contrast, rotation and zoom. Pan stays.
    pub fn reset_enhancements(&mut self) {
        self.brightness = 1.0;
        self.contrast = 1.0;
        self.rotation = Rotation::Deg0;
        self.zoom = 1.0;
    }

    /// Every parameter back to identity.
    pub fn reset_all(&mut self) {
        *self = Self::identity();
    }

    pub fn rotate_right(&mut self) {
        self.rotation = self.rotation.clockwise();
    }

    pub fn rotate_left(&mut self) {
        self.rotation = self.rotation.counter_clockwise();
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    /// Toggle brightness between 1.0 and [`ENHANCED_FACTOR`].
    pub fn toggle_brightness(&mut self) {
        self.brightness = toggled(self.brightness);
    }

    /// Toggle contrast between 1.0 and [`ENHANCED_FACTOR`].
    pub fn toggle_contrast(&mut self) {
        self.contrast = toggled(self.contrast);
    }

    /// Sets an arbitrary brightness factor (1.0 = unchanged, clamped at 0).
    pub fn set_brightness(&mut self, factor: f64) {
        self.brightness = factor.max(0.0);
    }

    /// Sets an arbitrary contrast factor (1.0 = unchanged, clamped at 0).
    pub fn set_contrast(&mut self, factor: f64) {
        self.contrast = factor.max(0.0);
    }

    /// Accumulates a drag of `(dx, dy)` pixels.
    pub fn pan_by(&mut self, dx: i32, dy: i32) {
        self.pan = (self.pan.0.saturating_add(dx), self.pan.1.saturating_add(dy));
    }
}

fn toggled(factor: f64) -> f64 {
    if factor == 1.0 {
        ENHANCED_FACTOR
    } else {
        1.0
    }
}
