//! Cupola - image acquisition and viewing for the ISS Cupola windows
//!
//! This library fetches a catalog of remote images on a background worker
//! with bounded retries, publishes each result atomically, and lets a
//! presentation layer browse the loaded images with zoom, rotation,
//! enhancement and slideshow controls.
//!
//! # Modules
//!
//! - [`catalog`]: ordered collections of image locators
//! - [`record`]: per-image load state and the publish-once record store
//! - [`provider`]: HTTP fetcher and image decoder collaborators
//! - [`acquisition`]: the background worker, retry policy and event stream
//! - [`transform`]: the deterministic render pipeline
//! - [`session`]: navigation and slideshow
//! - [`export`]: saving images
//! - [`config`]: the INI configuration file
//! - [`logging`]: tracing subscriber setup
//! - [`app`]: the context object tying it all together

pub mod acquisition;
pub mod app;
pub mod catalog;
pub mod config;
pub mod export;
pub mod logging;
pub mod provider;
pub mod record;
pub mod session;
pub mod transform;

/// Version of the library, from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_not_empty() {
        assert!(!VERSION.is_empty(), "Version should not be empty");
    }
}
