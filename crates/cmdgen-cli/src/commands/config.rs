//! Config command implementation.
//!
//! Manages CLI configuration.

use std::path::Path;

use anyhow::Result;
use cmdgen_ops::{Config, CONFIG_KEYS};

/// Show current configuration.
pub fn show(config: &Config, path: Option<&Path>) -> Result<()> {
    println!("cmdgen Configuration");
    println!("{:-<40}", "");

    println!("Base Path:        {}", config.base_path.display());
    println!("Domain Directory: {}", config.domain_dir.display());
    println!("Schema Directory: {}", config.schema_dir.display());
    println!("Namespace:        {}", config.namespace);
    println!("Listen:           {}", config.listen);

    if let Some(config_path) = path {
        println!("\nConfig file: {}", config_path.display());
    }

    Ok(())
}

/// Set a configuration value.
pub fn set(config: &mut Config, path: Option<&Path>, key: &str, value: &str) -> Result<()> {
    config.set(key, value)?;

    match path {
        Some(path) => config.save_to(path)?,
        None => anyhow::bail!("No config file location available"),
    }

    println!("Set {} to: {}", key, value);
    Ok(())
}

/// Get a configuration value.
pub fn get(config: &Config, key: &str) -> Result<()> {
    match config.get(key) {
        Some(value) => {
            println!("{}", value);
            Ok(())
        }
        None => anyhow::bail!(
            "Unknown config key: {}. Valid keys: {}",
            key,
            CONFIG_KEYS.join(", ")
        ),
    }
}

/// Reset configuration to defaults.
pub fn reset(path: Option<&Path>) -> Result<()> {
    if let Some(path) = path {
        Config::default().save_to(path)?;
    }
    println!("Configuration reset to defaults");
    Ok(())
}
