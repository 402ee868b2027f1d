//! Replays a recorded run from a JSONL event log.
//!
//! One event object per line, in arrival order. Blank lines are skipped and
//! lines that do not decode become [`AgentEvent::Unknown`], exactly as a
//! live stream would treat them. An optional delay paces the replay so a
//! subscriber sees the state advance the way it did live.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use futures::stream;

use super::{AgentRunClient, EventStream, RunRequest};
use crate::error::{ReplayError, TransportError};
use crate::protocol::AgentEvent;

/// Client that answers every run with the same recorded events.
#[derive(Debug, Clone)]
pub struct ReplayClient {
    path: PathBuf,
    delay: Duration,
}

impl ReplayClient {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delay: Duration::ZERO,
        }
    }

    /// Wait `delay` before each event.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AgentRunClient for ReplayClient {
    fn open_run(&self, request: RunRequest) -> EventStream {
        let path = self.path.clone();
        let delay = self.delay;
        tracing::info!(
            run_id = %request.run_id,
            path = %path.display(),
            input_len = request.input().len(),
            "Replaying recorded run"
        );

        stream::once(async move { load_event_log(&path).await })
            .flat_map(move |loaded| match loaded {
                Ok(events) => stream::iter(events)
                    .then(move |event| async move {
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                        Ok::<_, TransportError>(event)
                    })
                    .boxed(),
                Err(e) => stream::once(async move { Err(TransportError::from(e)) }).boxed(),
            })
            .boxed()
    }
}

/// Read and decode a JSONL event log.
pub async fn load_event_log(path: &Path) -> Result<Vec<AgentEvent>, ReplayError> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ReplayError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(ReplayError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let events = parse_event_log(&contents);
    tracing::debug!(path = %path.display(), events = events.len(), "Loaded event log");
    Ok(events)
}

/// Decode the events of a JSONL document, skipping blank lines.
pub fn parse_event_log(contents: &str) -> Vec<AgentEvent> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(AgentEvent::parse)
        .collect()
}
