//! Config command - read and change settings in `config.ini`.

use clap::Subcommand;
use console::style;
use cupola::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

/// The four sections of the config file, in file order.
const SECTIONS: [(&str, &str); 4] = [
    ("acquisition", "downloading and retries"),
    ("viewer", "rendering, slideshow and saving"),
    ("logging", "log level and log files"),
    ("catalog", "where image locators come from"),
];

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one setting, e.g. `acquisition.max_attempts`
    Get { key: String },

    /// Change one setting; an empty value clears an optional path
    Set { key: String, value: String },

    /// Print every setting, grouped by section
    List,

    /// Print where the config file lives
    Path,
}

/// Run a config subcommand against the already loaded `config`.
pub fn run(command: ConfigCommands, config: &ConfigFile) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => {
            let key = parse_key(&key)?;
            println!("{}", describe(key, config));
        }
        ConfigCommands::Set { key, value } => set(&key, &value)?,
        ConfigCommands::List => list(config),
        ConfigCommands::Path => println!("{}", config_file_path().display()),
    }
    Ok(())
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        let known: Vec<String> = ConfigKey::all().iter().map(ConfigKey::name).collect();
        CliError::Config(format!(
            "unknown key '{}' (expected one of: {})",
            key,
            known.join(", ")
        ))
    })
}

fn set(key: &str, value: &str) -> Result<(), CliError> {
    let key = parse_key(key)?;

    // Re-read strictly: a file that failed to load must not be overwritten
    // with defaults.
    let mut config = ConfigFile::load()?;
    key.set(&mut config, value)?;
    config.save()?;

    println!("{} = {}", key.name(), describe(key, &config));
    Ok(())
}

fn list(config: &ConfigFile) {
    for (section, about) in SECTIONS {
        println!("[{}] {}", style(section).bold(), style(about).dim());
        for key in ConfigKey::all().iter().filter(|k| k.section() == section) {
            println!("  {:<22} {}", key.key_name(), describe(*key, config));
        }
        println!();
    }
    println!("File: {}", config_file_path().display());
}

/// The value of `key`, or what an unset optional path falls back to.
fn describe(key: ConfigKey, config: &ConfigFile) -> String {
    let value = key.get(config);
    if !value.is_empty() {
        return value;
    }
    match key {
        ConfigKey::ViewerSaveDirectory => "(unset: current directory)".to_string(),
        ConfigKey::LoggingDirectory => "(unset: stderr only)".to_string(),
        ConfigKey::CatalogPath => "(unset: built-in Cupola catalog)".to_string(),
        _ => "(unset)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_sections_cover_every_key() {
        for key in ConfigKey::all() {
            assert!(
                SECTIONS.iter().any(|(name, _)| *name == key.section()),
                "{} has no section",
                key.name()
            );
        }
    }

    #[test]
    fn test_describe_unset_paths() {
        let mut config = ConfigFile::default();
        assert_eq!(
            describe(ConfigKey::CatalogPath, &config),
            "(unset: built-in Cupola catalog)"
        );

        config.catalog.path = Some(PathBuf::from("/tmp/catalog.json"));
        assert_eq!(describe(ConfigKey::CatalogPath, &config), "/tmp/catalog.json");
        assert_eq!(describe(ConfigKey::AcquisitionMaxAttempts, &config), "3");
    }

    #[test]
    fn test_unknown_key_lists_known_keys() {
        let err = parse_key("viewer.colour").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("viewer.colour"));
        assert!(message.contains("viewer.slideshow_interval_ms"));
    }
}
