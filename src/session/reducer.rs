//! Event reducer: one transition per event kind.
//!
//! [`reduce`] is the dispatch table. It maps each [`AgentEvent`] variant to
//! the transition for that kind and never fails; missing payload fields are
//! read as their neutral value. The controller calls [`SessionState::apply_event`]
//! for every event of the live run, in arrival order.
//!
//! Precedence between incremental and authoritative data:
//! - `TOOL_CALL_*` events only drive the "in progress" fields
//!   (`current_tool`, `current_tool_args`).
//! - `STATE_SNAPSHOT` (and a successfully applied `STATE_DELTA`) replaces
//!   `agent_state`, `current_tool` and `completed_tools` wholesale. A snapshot
//!   always wins over whatever the tool-call events said before it.
//! - Completion is never inferred from `TOOL_CALL_END` or `TOOL_CALL_RESULT`.
//!   A tool that ends without a later snapshot is not listed as completed.

use serde_json::Value;

use super::state::SessionState;
use crate::protocol::{AgentEvent, AgentSnapshot};

/// Message used when `RUN_ERROR` carries none.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error occurred";

/// Apply one event to `state` and return the next state.
pub fn reduce(mut state: SessionState, event: &AgentEvent) -> SessionState {
    state.apply_event(event);
    state
}

impl SessionState {
    /// Apply an event in place. This is the sole mutation path for
    /// run-originated changes.
    pub fn apply_event(&mut self, event: &AgentEvent) {
        match event {
            AgentEvent::RunStarted { .. }
            | AgentEvent::TextMessageStart { .. }
            | AgentEvent::TextMessageEnd { .. }
            | AgentEvent::ToolCallResult { .. }
            | AgentEvent::Raw { .. }
            | AgentEvent::Custom { .. }
            | AgentEvent::Unknown => {}

            AgentEvent::TextMessageContent { delta, .. } => {
                on_text_delta(self, delta.as_deref());
            }
            AgentEvent::ToolCallStart { tool_call_name, .. } => {
                on_tool_call_start(self, tool_call_name.as_deref());
            }
            AgentEvent::ToolCallArgs { delta, .. } => {
                on_tool_call_args(self, delta.as_deref());
            }
            AgentEvent::ToolCallEnd { .. } => on_tool_call_end(self),
            AgentEvent::StateSnapshot { snapshot } => {
                adopt_snapshot(self, snapshot.clone().unwrap_or_default());
            }
            AgentEvent::StateDelta { delta } => on_state_delta(self, delta.as_ref()),
            AgentEvent::RunFinished { .. } => finish_run(self),
            AgentEvent::RunError { message, .. } => fail_run(self, message.as_deref()),
        }
    }
}

fn on_text_delta(state: &mut SessionState, delta: Option<&str>) {
    state.text_content.push_str(delta.unwrap_or_default());
}

fn on_tool_call_start(state: &mut SessionState, name: Option<&str>) {
    state.current_tool = name.map(str::to_string);
    state.current_tool_args.clear();
}

fn on_tool_call_args(state: &mut SessionState, delta: Option<&str>) {
    state.current_tool_args.push_str(delta.unwrap_or_default());
}

/// `current_tool` stays set until a snapshot or the next start replaces it.
fn on_tool_call_end(state: &mut SessionState) {
    state.current_tool_args.clear();
}

/// Replace the snapshot-derived fields wholesale.
fn adopt_snapshot(state: &mut SessionState, snapshot: AgentSnapshot) {
    state.current_tool = snapshot.current_tool.clone();
    state.completed_tools = snapshot.completed_labels();
    state.agent_state = Some(snapshot);
}

/// Apply an RFC 6902 patch to the current snapshot.
///
/// The patch is applied to a copy; the state changes only if every
/// operation succeeds and the result still decodes as an [`AgentSnapshot`].
fn on_state_delta(state: &mut SessionState, delta: Option<&Value>) {
    let Some(delta) = delta else {
        return;
    };

    let patch: json_patch::Patch = match serde_json::from_value(delta.clone()) {
        Ok(patch) => patch,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring STATE_DELTA that is not a JSON Patch");
            return;
        }
    };
    if patch.0.is_empty() {
        return;
    }

    let mut document = match &state.agent_state {
        Some(snapshot) => match serde_json::to_value(snapshot) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(error = %e, "Could not serialize agent state for STATE_DELTA");
                return;
            }
        },
        None => Value::Object(serde_json::Map::new()),
    };

    if let Err(e) = json_patch::patch(&mut document, &patch) {
        tracing::warn!(error = %e, "Ignoring STATE_DELTA that does not apply to agent state");
        return;
    }

    match serde_json::from_value::<AgentSnapshot>(document) {
        Ok(snapshot) => adopt_snapshot(state, snapshot),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring STATE_DELTA that produces an invalid agent state");
        }
    }
}

/// Clean end of a run (`RUN_FINISHED`, or the stream closing on its own).
pub fn finish_run(state: &mut SessionState) {
    state.is_streaming = false;
    state.current_tool = None;
}

/// Failed end of a run. An absent or empty message falls back to
/// [`UNKNOWN_ERROR_MESSAGE`].
pub fn fail_run(state: &mut SessionState, message: Option<&str>) {
    let message = message
        .filter(|m| !m.is_empty())
        .unwrap_or(UNKNOWN_ERROR_MESSAGE);
    state.is_streaming = false;
    state.error = Some(message.to_string());
    state.current_tool = None;
}
