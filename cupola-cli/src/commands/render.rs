//! Render command - show one image with view transforms and save it.

use std::path::PathBuf;

use console::style;
use cupola::config::ConfigFile;
use cupola::transform::Viewport;

use super::common::{acquire, build_context};
use crate::error::CliError;

/// Arguments for the render command.
pub struct RenderArgs {
    pub catalog: Option<PathBuf>,
    pub collection: String,
    pub index: usize,
    pub zoom_in: u32,
    pub zoom_out: u32,
    pub rotate_right: u32,
    pub rotate_left: u32,
    pub brighten: bool,
    pub contrast: bool,
    pub viewport: Viewport,
    pub output: Option<PathBuf>,
}

/// Run the render command.
pub fn run(args: RenderArgs, config: &ConfigFile) -> Result<(), CliError> {
    let mut ctx = build_context(config, args.catalog.as_deref())?;
    acquire(&ctx)?;

    let key = ctx.show_image(&args.collection, args.index)?;
    if key.position != args.index {
        println!(
            "Image {} is not available; showing image {} instead",
            args.index + 1,
            key.position + 1
        );
    }

    let transform = ctx.transform_mut();
    for _ in 0..args.zoom_in {
        transform.zoom_in();
    }
    for _ in 0..args.zoom_out {
        transform.zoom_out();
    }
    for _ in 0..args.rotate_right {
        transform.rotate_right();
    }
    for _ in 0..args.rotate_left {
        transform.rotate_left();
    }
    if args.brighten {
        transform.toggle_brightness();
    }
    if args.contrast {
        transform.toggle_contrast();
    }
    let transform = *transform;

    let rendered = ctx.render_current(args.viewport)?;
    let path = ctx.save_current(args.output.as_deref())?;

    if let Some(label) = ctx.position_label() {
        println!("{}", style(label).bold());
    }
    if let Some(metadata) = ctx.records().get(key).and_then(|r| r.metadata().cloned()) {
        println!("Original: {}", metadata.info_line());
    }
    println!(
        "Rendered {}x{} at {}% zoom, rotation {}",
        rendered.width(),
        rendered.height(),
        transform.zoom_percent(),
        transform.rotation()
    );
    println!("Saved to {}", style(path.display()).cyan());
    Ok(())
}
