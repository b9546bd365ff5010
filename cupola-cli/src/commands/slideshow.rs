//! Slideshow command - step through a collection on a timer.

use std::path::PathBuf;

use console::style;
use cupola::config::ConfigFile;

use super::common::{acquire, build_context};
use crate::error::CliError;

/// Arguments for the slideshow command.
pub struct SlideshowArgs {
    pub catalog: Option<PathBuf>,
    pub collection: String,
    pub index: usize,
    pub count: u32,
    pub interval_ms: Option<u64>,
}

/// Run the slideshow command.
pub fn run(args: SlideshowArgs, mut config: ConfigFile) -> Result<(), CliError> {
    if let Some(ms) = args.interval_ms {
        config.viewer.slideshow_interval_ms = ms.max(1);
    }

    let mut ctx = build_context(&config, args.catalog.as_deref())?;
    acquire(&ctx)?;
    ctx.show_image(&args.collection, args.index)?;
    print_label(ctx.position_label());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    ctx.toggle_slideshow(runtime.handle())?;

    // The context is only borrowed here: it owns a blocking HTTP client,
    // which must not be dropped inside the runtime.
    runtime.block_on(async {
        for _ in 0..args.count {
            if ctx.advance_slideshow().await.is_none() {
                break;
            }
            print_label(ctx.position_label());
        }
    });

    ctx.return_to_overview();
    Ok(())
}

fn print_label(label: Option<String>) {
    if let Some(label) = label {
        println!("{} {}", style("▶").green(), label);
    }
}
