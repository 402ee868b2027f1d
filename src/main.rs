use anyhow::Context;
use clap::Parser;

use scribe::cli::{Cli, Commands};
use scribe::config::{self, LoadedConfig};
use scribe::console::run_replay;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt, reload};

const DEFAULT_LOG_LEVEL: &str = "info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing. The filter starts at RUST_LOG (or info) so config
    // loading is logged; the configured level is swapped in afterwards.
    let env_filter = EnvFilter::try_from_default_env().ok();
    let from_env = env_filter.is_some();
    let (filter, filter_handle) =
        reload::Layer::new(env_filter.unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_LEVEL)));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let LoadedConfig { config, issues } = config::load_config(&cli)?;
    for issue in &issues {
        tracing::warn!("Ignoring config file: {issue}");
    }
    if !from_env {
        filter_handle
            .reload(EnvFilter::new(&config.log_level))
            .context("Failed to apply configured log level")?;
    }

    tracing::info!(
        delay_ms = config.replay_delay_ms,
        stream_text = config.stream_text,
        "Scribe starting"
    );

    match cli.command {
        Commands::Replay {
            events,
            input,
            text,
            ..
        } => {
            let input = match (input, text) {
                (Some(path), _) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read transcript {}", path.display()))?,
                (None, Some(text)) => text,
                (None, None) => {
                    tracing::warn!("No transcript given; submitting an empty input");
                    String::new()
                }
            };

            let state = run_replay(&config, &events, input).await?;
            println!("{}", serde_json::to_string_pretty(&state)?);

            if let Some(error) = state.error {
                anyhow::bail!("Agent run failed: {error}");
            }
        }
    }

    Ok(())
}
