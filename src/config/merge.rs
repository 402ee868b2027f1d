use super::schema::{AppConfig, PartialConfig};

impl PartialConfig {
    /// Merge self with a lower-priority fallback.
    /// Self's non-None values take precedence.
    pub fn with_fallback(self, fallback: PartialConfig) -> PartialConfig {
        PartialConfig {
            replay_delay_ms: self.replay_delay_ms.or(fallback.replay_delay_ms),
            stream_text: self.stream_text.or(fallback.stream_text),
            log_level: self.log_level.or(fallback.log_level),
        }
    }

    /// Convert to AppConfig, filling any remaining gaps with defaults.
    pub fn finalize(self) -> AppConfig {
        AppConfig {
            replay_delay_ms: self.replay_delay_ms.unwrap_or(0),
            stream_text: self.stream_text.unwrap_or(true),
            log_level: self.log_level.unwrap_or_else(|| "info".to_string()),
        }
    }
}
