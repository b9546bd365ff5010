//! Helpers shared across CLI commands.

use std::path::Path;

use console::style;
use cupola::acquisition::{event_channel, AcquisitionEvent, AcquisitionSummary, ItemOutcome};
use cupola::app::ViewerContext;
use cupola::catalog::Catalog;
use cupola::config::{config_file_path, ConfigError, ConfigFile};
use cupola::transform::Viewport;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::CliError;

/// Loads the config file, falling back to defaults when it cannot be read.
///
/// The read error comes back alongside the defaults, so it can be reported
/// once logging has been set up from them.
pub fn load_config() -> (ConfigFile, Option<ConfigError>) {
    load_config_from(&config_file_path())
}

fn load_config_from(path: &Path) -> (ConfigFile, Option<ConfigError>) {
    match ConfigFile::load_from(path) {
        Ok(config) => (config, None),
        Err(e) => (ConfigFile::default(), Some(e)),
    }
}

/// Builds the viewer context. `catalog` overrides the configured catalog.
pub fn build_context(
    config: &ConfigFile,
    catalog: Option<&Path>,
) -> Result<ViewerContext, CliError> {
    let ctx = match catalog {
        Some(path) => {
            let catalog = Catalog::load(path).map_err(cupola::app::AppError::from)?;
            ViewerContext::with_catalog(catalog, config)?
        }
        None => ViewerContext::from_config(config)?,
    };
    Ok(ctx)
}

/// Runs the initial acquisition pass with a progress bar and prints the
/// summary line.
pub fn acquire(ctx: &ViewerContext) -> Result<AcquisitionSummary, CliError> {
    let (tx, mut rx) = event_channel();
    let worker = ctx.start_acquisition(tx)?;

    let bar = ProgressBar::new(ctx.catalog().total() as u64);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {wide_msg}",
        )
        .map_err(|e| CliError::InvalidArgument(e.to_string()))?
        .progress_chars("=> "),
    );

    while let Some(event) = rx.blocking_recv() {
        match &event {
            AcquisitionEvent::ItemStarted { .. } => bar.set_message(event.describe()),
            AcquisitionEvent::ItemFinished {
                outcome: ItemOutcome::Failed(_),
                ..
            } => bar.println(format!("{} {}", style("✗").red(), event.describe())),
            AcquisitionEvent::AggregateProgress(progress) => {
                bar.set_position(progress.processed() as u64)
            }
            AcquisitionEvent::AcquisitionComplete(_) => break,
            _ => {}
        }
    }
    bar.finish_and_clear();

    let summary = worker
        .join()
        .map_err(|_| CliError::WorkerPanicked("acquisition"))?;
    print_status(&summary.status_line(), summary.has_failures());
    Ok(summary)
}

/// Runs up to `rounds` retry-failed passes, stopping early once nothing is
/// left to retry.
pub fn retry(ctx: &ViewerContext, rounds: u32) -> Result<(), CliError> {
    for round in 1..=rounds {
        if ctx.records().counts().failed == 0 {
            break;
        }
        println!("Retry round {}/{}", round, rounds);

        let (tx, _rx) = event_channel();
        let summary = ctx
            .retry_failed(tx)?
            .join()
            .map_err(|_| CliError::WorkerPanicked("retry"))?;
        print_status(&summary.status_line(), summary.recovered < summary.retried);
    }
    Ok(())
}

fn print_status(line: &str, degraded: bool) {
    if degraded {
        println!("{}", style(line).yellow());
    } else {
        println!("{}", style(line).green());
    }
}

/// Parses a `WIDTHxHEIGHT` viewport argument.
pub fn parse_viewport(s: &str) -> Result<Viewport, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let width = w
        .trim()
        .parse()
        .map_err(|_| format!("invalid width '{}'", w))?;
    let height = h
        .trim()
        .parse()
        .map_err(|_| format!("invalid height '{}'", h))?;
    Ok(Viewport::new(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_unreadable_config_falls_back_with_error() {
        let dir = TempDir::new().unwrap();
        // A directory exists but cannot be read as a file.
        let (config, error) = load_config_from(dir.path());
        assert_eq!(config, ConfigFile::default());
        assert!(matches!(error, Some(ConfigError::Io { .. })));
    }

    #[test]
    fn test_missing_config_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let (config, error) = load_config_from(&dir.path().join("config.ini"));
        assert_eq!(config, ConfigFile::default());
        assert!(error.is_none());
    }

    #[test]
    fn test_parse_viewport() {
        assert_eq!(parse_viewport("1200x800").unwrap(), Viewport::new(1200, 800));
        assert_eq!(parse_viewport("300X200").unwrap(), Viewport::new(300, 200));
        assert!(parse_viewport("1200").is_err());
        assert!(parse_viewport("wide x 3").is_err());
    }
}
