//! Session state projection.
//!
//! [`SessionState`] is the single value the presentation layer renders.
//! It has no behavior of its own beyond construction; every change goes
//! through [`crate::session::reducer`] or the controller's terminal
//! transitions. Each run starts from a fresh value.

use serde::Serialize;

use crate::protocol::AgentSnapshot;

/// Everything a renderer needs to draw one agent run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// True from run start until a terminal event, a cancel, or stream end.
    pub is_streaming: bool,
    /// Narrative text, append-only within a run.
    pub text_content: String,
    /// Last authoritative snapshot.
    pub agent_state: Option<AgentSnapshot>,
    /// Tool the agent is running right now.
    pub current_tool: Option<String>,
    /// Argument text streamed for `current_tool` so far.
    pub current_tool_args: String,
    /// Type labels of finished tools, as reported by the last snapshot.
    pub completed_tools: Vec<String>,
    /// Terminal failure message.
    pub error: Option<String>,
}

impl SessionState {
    /// State before any run, and after `reset`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh state for a run that is about to open.
    pub fn streaming() -> Self {
        Self {
            is_streaming: true,
            ..Self::default()
        }
    }
}
