//! Catalog command - list collections without fetching anything.

use std::path::PathBuf;

use cupola::catalog::Catalog;
use cupola::config::ConfigFile;

use crate::error::CliError;

/// Run the catalog command.
pub fn run(
    catalog: Option<PathBuf>,
    show_locators: bool,
    config: &ConfigFile,
) -> Result<(), CliError> {
    let path = catalog.or_else(|| config.catalog.path.clone());
    let catalog = match &path {
        Some(path) => Catalog::load(path).map_err(cupola::app::AppError::from)?,
        None => Catalog::cupola(),
    };

    match &path {
        Some(path) => println!("Catalog: {}", path.display()),
        None => println!("Catalog: built-in"),
    }
    println!();

    for (_, collection) in catalog.collections() {
        println!("{:<12} {} images", collection.name(), collection.len());
        if show_locators {
            for (position, locator) in collection.locators().iter().enumerate() {
                println!("  {:>2}. {}", position + 1, locator);
            }
        }
    }

    println!();
    println!(
        "{} collections, {} images",
        catalog.collection_count(),
        catalog.total()
    );
    Ok(())
}
