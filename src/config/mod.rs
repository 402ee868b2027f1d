pub mod merge;
pub mod schema;

pub use schema::*;

use crate::cli::{Cli, Commands};
use crate::error::ConfigError;
use anyhow::Context;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory and the global config dir.
pub const CONFIG_FILE_NAME: &str = "scribe.toml";

/// Merged configuration plus the problems met in optional config files.
///
/// Broken optional files are skipped rather than fatal; the caller reports
/// `issues` once logging is up.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub issues: Vec<ConfigError>,
}

/// Load configuration by merging global, local, and CLI sources.
/// Precedence: CLI > --config file (or ./scribe.toml) > global config > defaults.
///
/// Missing config files are handled gracefully (defaults apply). An explicit
/// `--config` path that cannot be read or parsed is an error.
pub fn load_config(cli: &Cli) -> anyhow::Result<LoadedConfig> {
    let global = global_config_path();
    if global.is_none() {
        tracing::debug!("Could not determine global config directory");
    }
    load_config_from(cli, Path::new(CONFIG_FILE_NAME), global.as_deref())
}

/// Layered load with explicit locations for the local and global files.
fn load_config_from(
    cli: &Cli,
    local_path: &Path,
    global_path: Option<&Path>,
) -> anyhow::Result<LoadedConfig> {
    let mut issues = Vec::new();
    let mut optional = |path: &Path| match load_toml_file(path) {
        Ok(partial) => partial.unwrap_or_default(),
        Err(e) => {
            issues.push(e);
            PartialConfig::default()
        }
    };

    // Layer 1: Global config (~/.config/scribe/scribe.toml or platform equivalent)
    let global = global_path.map(&mut optional).unwrap_or_default();

    // Layer 2: Explicit --config file, otherwise ./scribe.toml if present
    let local = match cli_config_path(cli) {
        Some(path) => load_required_toml_file(path)?,
        None => optional(local_path),
    };

    // Layer 3: CLI args (converted to PartialConfig)
    let cli_partial = cli_to_partial(cli);

    let config = cli_partial
        .with_fallback(local)
        .with_fallback(global)
        .finalize();
    Ok(LoadedConfig { config, issues })
}

/// Load and parse an optional TOML config file into a PartialConfig.
/// Returns `Ok(None)` on file-not-found.
fn load_toml_file(path: &Path) -> Result<Option<PartialConfig>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let partial = parse_config(&contents, path)?;
            tracing::debug!("Loaded config from {}", path.display());
            Ok(Some(partial))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Ok(None)
        }
        Err(source) => Err(ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Load a config file the user asked for by name. Every failure is fatal.
fn load_required_toml_file(path: &Path) -> anyhow::Result<PartialConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    let partial = parse_config(&contents, path)?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(partial)
}

/// Parse scribe.toml contents.
pub fn parse_config(contents: &str, path: &Path) -> Result<PartialConfig, ConfigError> {
    toml::from_str::<ConfigFile>(contents)
        .map(|config_file| config_file.to_partial())
        .map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Resolve the platform-specific global config path.
/// Linux: ~/.config/scribe/scribe.toml
/// macOS: ~/Library/Application Support/scribe/scribe.toml
fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "scribe")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

fn cli_config_path(cli: &Cli) -> Option<&Path> {
    match &cli.command {
        Commands::Replay { config, .. } => config.as_deref(),
    }
}

/// Convert CLI arguments to a PartialConfig for merging.
fn cli_to_partial(cli: &Cli) -> PartialConfig {
    match &cli.command {
        Commands::Replay {
            delay_ms, quiet, ..
        } => PartialConfig {
            replay_delay_ms: *delay_ms,
            stream_text: quiet.then_some(false),
            ..Default::default()
        },
    }
}
