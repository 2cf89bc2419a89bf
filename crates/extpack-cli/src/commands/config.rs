use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use extpack_config::{Config, CONFIG_KEYS};
use extpack_logger as logger;
use std::fs;
use std::path::Path;

use crate::GlobalOpts;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show the current configuration
    Show,
    /// Set a configuration value (browser, manifest-version, src-dir, build-dir)
    Set { key: String, value: String },
    /// Get or set the path to the config file.
    /// If `new_path` is provided, the CLI will use that file from now on.
    /// If omitted, the CLI will print the current configuration file path.
    Path {
        /// Optional new config path to set
        new_path: Option<String>,
    },
}

pub fn handle_config(action: ConfigAction, opts: &GlobalOpts) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = Config::load().context("Failed to load config")?;
            show_config(&config, opts);
            Ok(())
        }
        ConfigAction::Set { key, value } => {
            set_value(&Config::path(), &key, value.clone())?;
            logger::success(&format!("Set {} = {}", key, value));
            Ok(())
        }
        ConfigAction::Path { new_path } => {
            let config_path = Config::path();
            logger::debug(&format!("Reading config from: {}", config_path.display()));

            match new_path {
                Some(p) => {
                    set_config_path(&Config::pointer_path(), &p)?;
                    logger::success(&format!("Config path set to {}", p));
                }
                None => {
                    println!("{}", config_path.display());

                    let pointer_path = Config::pointer_path();
                    if let Ok(contents) = fs::read_to_string(&pointer_path) {
                        let trimmed = contents.trim();
                        if !trimmed.is_empty() {
                            println!("{} {}", "overridden-by".cyan(), trimmed);
                        }
                    }
                }
            }
            Ok(())
        }
    }
}

fn show_config(config: &Config, opts: &GlobalOpts) {
    println!("{}", "Configuration:".bold().green());
    if config.is_empty() {
        if opts.verbosity_level() > 0 {
            println!("  {}", "(empty)".yellow());
        }
    } else {
        for (key, value) in config.values_iter() {
            println!("  {}: {}", key.cyan(), value);
        }
    }
}

/// Update one key in the config file at `path`
pub fn set_value(path: &Path, key: &str, value: String) -> Result<Config> {
    let mut config = Config::load_from_path(path).context("Failed to load config")?;
    config.set(key, value).with_context(|| {
        format!(
            "Cannot set '{}'. Supported keys: {}",
            key,
            CONFIG_KEYS.join(", ")
        )
    })?;
    config.save_to_path(path).context("Failed to save config")?;
    Ok(config)
}

/// Point future runs at `new_path` through the pointer file
pub fn set_config_path(pointer_path: &Path, new_path: &str) -> Result<()> {
    if let Some(parent) = pointer_path.parent() {
        fs::create_dir_all(parent).context("Failed to set config path")?;
    }
    fs::write(pointer_path, new_path.as_bytes()).context("Failed to set config path")?;
    Ok(())
}
