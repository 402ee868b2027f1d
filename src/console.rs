//! Terminal driver for `scribe replay`.
//!
//! Subscribes to a [`SessionController`] and prints what changed between
//! two published states: new narrative text, the tool that started, and
//! tools that a snapshot reported as completed.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use crate::config::AppConfig;
use crate::session::{SessionController, SessionState};
use crate::transport::ReplayClient;

/// What to print for one observed state.
#[derive(Debug, Default, PartialEq)]
pub struct Progress {
    /// Narrative text not printed yet.
    pub text: String,
    /// One-line notices about tools.
    pub notices: Vec<String>,
}

/// Tracks how much of the state has already been printed.
#[derive(Debug, Default)]
pub struct ProgressPrinter {
    printed_text: usize,
    last_tool: Option<String>,
    completed_seen: usize,
}

impl ProgressPrinter {
    pub fn observe(&mut self, state: &SessionState) -> Progress {
        let mut progress = Progress::default();

        // Text only grows within a run; anything else means a new run.
        match state.text_content.get(self.printed_text..) {
            Some(rest) => progress.text.push_str(rest),
            None => progress.text.push_str(&state.text_content),
        }
        self.printed_text = state.text_content.len();

        if state.current_tool != self.last_tool {
            if let Some(tool) = &state.current_tool {
                progress.notices.push(format!("> running {tool}"));
            }
            self.last_tool = state.current_tool.clone();
        }

        if state.completed_tools.len() < self.completed_seen {
            self.completed_seen = 0;
        }
        for label in &state.completed_tools[self.completed_seen..] {
            progress.notices.push(format!("+ completed {label}"));
        }
        self.completed_seen = state.completed_tools.len();

        progress
    }
}

/// Replay `events` through a fresh controller, echoing progress unless
/// `config.stream_text` is off. Ctrl-C cancels the run. Returns the final state.
pub async fn run_replay(
    config: &AppConfig,
    events: &Path,
    input: String,
) -> anyhow::Result<SessionState> {
    let client = ReplayClient::new(events)
        .with_delay(Duration::from_millis(config.replay_delay_ms));
    let controller = SessionController::new(client);
    let mut updates = controller.subscribe();
    let mut printer = ProgressPrinter::default();

    controller.start(input);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let state = updates.borrow_and_update().clone();
        if config.stream_text {
            let progress = printer.observe(&state);
            print_progress(&progress)?;
        }
        if !state.is_streaming {
            break;
        }

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = &mut ctrl_c => {
                tracing::info!("Interrupted; cancelling run");
                controller.cancel();
            }
        }
    }

    if config.stream_text {
        println!();
    }
    Ok(controller.state())
}

fn print_progress(progress: &Progress) -> anyhow::Result<()> {
    for notice in &progress.notices {
        eprintln!("{notice}");
    }
    if !progress.text.is_empty() {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(progress.text.as_bytes())?;
        stdout.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(text: &str, tool: Option<&str>, completed: &[&str]) -> SessionState {
        SessionState {
            is_streaming: true,
            text_content: text.to_string(),
            current_tool: tool.map(str::to_string),
            completed_tools: completed.iter().map(|s| s.to_string()).collect(),
            ..SessionState::default()
        }
    }

    #[test]
    fn prints_only_new_text() {
        let mut printer = ProgressPrinter::default();
        assert_eq!(printer.observe(&state("Hello ", None, &[])).text, "Hello ");
        assert_eq!(printer.observe(&state("Hello world", None, &[])).text, "world");
        assert_eq!(printer.observe(&state("Hello world", None, &[])).text, "");
    }

    #[test]
    fn reports_tool_start_once() {
        let mut printer = ProgressPrinter::default();
        let first = printer.observe(&state("", Some("create_calendar_reminder"), &[]));
        assert_eq!(first.notices, vec!["> running create_calendar_reminder"]);
        let again = printer.observe(&state("", Some("create_calendar_reminder"), &[]));
        assert!(again.notices.is_empty());
    }

    #[test]
    fn reports_each_completion_once() {
        let mut printer = ProgressPrinter::default();
        let first = printer.observe(&state("", None, &["calendar"]));
        assert_eq!(first.notices, vec!["+ completed calendar"]);
        let second = printer.observe(&state("", None, &["calendar", "decision_record"]));
        assert_eq!(second.notices, vec!["+ completed decision_record"]);
    }

    #[test]
    fn restarts_after_state_reset() {
        let mut printer = ProgressPrinter::default();
        printer.observe(&state("long text from run one", None, &["calendar", "incident_report"]));
        let progress = printer.observe(&state("new", None, &["calendar"]));
        assert_eq!(progress.text, "new");
        assert_eq!(progress.notices, vec!["+ completed calendar"]);
    }
}
