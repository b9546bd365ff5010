//! CLI command implementations.

pub mod catalog;
pub mod common;
pub mod config;
pub mod fetch;
pub mod render;
pub mod slideshow;
