use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "scribe", version, about = "Follow a meeting-transcript agent run")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a recorded agent run (JSONL event log) through the session manager
    Replay {
        /// Path to the JSONL event log
        events: PathBuf,

        /// File holding the transcript submitted as the run's input
        #[arg(short, long, conflicts_with = "text")]
        input: Option<PathBuf>,

        /// Transcript text submitted as the run's input
        #[arg(short, long)]
        text: Option<String>,

        /// Pause before each replayed event, in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Path to config file (overrides ./scribe.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Do not echo streamed text; print only the final state
        #[arg(short, long)]
        quiet: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_replay_arguments() {
        let cli = Cli::parse_from([
            "scribe", "replay", "run.jsonl", "--text", "notes", "--delay-ms", "15", "-q",
        ]);
        let Commands::Replay {
            events,
            input,
            text,
            delay_ms,
            config,
            quiet,
        } = cli.command;
        assert_eq!(events, PathBuf::from("run.jsonl"));
        assert_eq!(input, None);
        assert_eq!(text.as_deref(), Some("notes"));
        assert_eq!(delay_ms, Some(15));
        assert_eq!(config, None);
        assert!(quiet);
    }

    #[test]
    fn input_file_and_text_conflict() {
        let result = Cli::try_parse_from([
            "scribe", "replay", "run.jsonl", "--input", "t.txt", "--text", "notes",
        ]);
        assert!(result.is_err());
    }
}
