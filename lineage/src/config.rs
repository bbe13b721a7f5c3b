//! Command-line flags and the TOML config file.
//!
//! Flags select the site and may override the database path. Everything else
//! comes from `$XDG_CONFIG_HOME/lineage/config.toml`; every key is optional.

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

/// Browse and review document lineages for one site.
#[derive(Debug, Parser)]
#[command(name = "lineage", version)]
pub struct Cli {
    /// Site whose documents are browsed.
    pub site_id: String,

    /// JSON document list to import as the site's snapshot before browsing.
    #[arg(long, value_name = "FILE")]
    pub import: Option<PathBuf>,

    /// SQLite database path (overrides `db_path` from the config file).
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Config file path.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Settings read from `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: String,
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "catppuccin-mocha".to_owned(),
            db_path: PathBuf::from(".lineage/reviews.db"),
            log_dir: PathBuf::from(".lineage"),
        }
    }
}

impl Config {
    /// Reads the config at `path`.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        Self::parse(&raw)
    }

    /// Parses config text; absent keys keep their defaults.
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}

/// Returns the path to the default config file.
///
/// Prefers `$XDG_CONFIG_HOME/lineage/config.toml`; falls back to
/// `~/.config/lineage/config.toml` when the env var is absent.
pub fn default_config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join("lineage").join("config.toml")
}
