//! Display transforms.
//!
//! A [`TransformState`] describes how the active image should be shown; a
//! [`Renderer`] turns an original plus a state plus a [`Viewport`] into a
//! display bitmap. Originals are never modified, and the same inputs always
//! produce the same output.

mod cache;
mod render;
mod state;

pub use cache::DisplayCache;
pub use render::{Renderer, TransformError, Viewport, DEFAULT_VIEWPORT_MARGIN};
pub use state::{Rotation, TransformState, ENHANCED_FACTOR, MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};
