//! Fetch command - acquire the whole catalog and report what loaded.

use std::path::PathBuf;

use console::style;
use cupola::config::ConfigFile;
use cupola::record::RecordStatus;

use super::common::{acquire, build_context, retry};
use crate::error::CliError;

/// Arguments for the fetch command.
pub struct FetchArgs {
    pub catalog: Option<PathBuf>,
    pub retry_rounds: u32,
}

/// Run the fetch command.
pub fn run(args: FetchArgs, config: &ConfigFile) -> Result<(), CliError> {
    let ctx = build_context(config, args.catalog.as_deref())?;

    acquire(&ctx)?;
    retry(&ctx, args.retry_rounds)?;

    println!();
    for (id, collection) in ctx.catalog().collections() {
        let records = ctx.records().collection(id);
        let loaded = records.iter().filter(|r| r.is_loaded()).count();
        println!(
            "{:<12} {}/{} loaded",
            collection.name(),
            loaded,
            collection.len()
        );
        for record in records
            .iter()
            .filter(|r| r.status() == RecordStatus::Failed)
        {
            println!(
                "  {} image {}: {}",
                style("failed").red(),
                record.key().position + 1,
                record.last_error().unwrap_or("unknown error")
            );
        }
    }
    Ok(())
}
