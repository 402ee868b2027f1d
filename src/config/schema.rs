use serde::Deserialize;

/// The TOML file structure for scribe.toml.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub replay: Option<ReplayConfig>,
    pub display: Option<DisplayConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize)]
pub struct ReplayConfig {
    /// Pause before each replayed event, in milliseconds.
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct DisplayConfig {
    /// Echo narrative text to stdout as it streams in.
    pub stream_text: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Default tracing directive when `RUST_LOG` is unset (e.g. "info", "scribe=debug").
    pub level: Option<String>,
}

impl ConfigFile {
    pub fn to_partial(&self) -> PartialConfig {
        PartialConfig {
            replay_delay_ms: self.replay.as_ref().and_then(|r| r.delay_ms),
            stream_text: self.display.as_ref().and_then(|d| d.stream_text),
            log_level: self.logging.as_ref().and_then(|l| l.level.clone()),
        }
    }
}

/// Fully-resolved runtime configuration. All fields have values.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub replay_delay_ms: u64,
    pub stream_text: bool,
    pub log_level: String,
}

/// Partial config used during merge. All fields are Option so that
/// missing fields don't override lower-priority values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialConfig {
    pub replay_delay_ms: Option<u64>,
    pub stream_text: Option<bool>,
    pub log_level: Option<String>,
}
