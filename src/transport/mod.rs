//! Seam to the external agent-run client.
//!
//! The session core does not own a network protocol. It asks an
//! [`AgentRunClient`] to open one run per `start` and reads an ordered
//! [`EventStream`] back. Dropping the stream is the abort signal; how the
//! client tears down its connection afterwards is its own business.
//!
//! Two clients ship with the crate: [`channel::ChannelClient`] for hosts
//! that already receive frames some other way, and [`replay::ReplayClient`]
//! for recorded runs.

pub mod channel;
pub mod replay;

use chrono::{Duration, Utc};
use futures::stream::BoxStream;
use serde::Serialize;
use uuid::Uuid;

use crate::error::TransportError;
use crate::protocol::AgentEvent;

pub use channel::{ChannelClient, RunFeed};
pub use replay::ReplayClient;

/// Ordered events of one run. Connection failures arrive as the first
/// `Err` item; the controller stops reading after any `Err`.
pub type EventStream = BoxStream<'static, Result<AgentEvent, TransportError>>;

/// Something that can open agent runs.
pub trait AgentRunClient: Send + Sync + 'static {
    /// Submit `request` and return its event stream.
    fn open_run(&self, request: RunRequest) -> EventStream;
}

/// Everything the remote agent needs to start one run.
///
/// Serializes to the AG-UI `RunAgentInput` shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    pub thread_id: String,
    pub run_id: String,
    /// The run's single driving message.
    pub messages: Vec<InputMessage>,
    /// Initial agent state: date context, no results yet.
    pub state: InitialAgentState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputMessage {
    pub id: String,
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitialAgentState {
    pub tool_results: Vec<serde_json::Value>,
    pub current_tool: Option<String>,
    pub processing_status: String,
    pub current_date: String,
    pub one_week_from_now: String,
}

impl RunRequest {
    /// Build a request for `input` with fresh thread, run and message ids.
    pub fn new(input: impl Into<String>) -> Self {
        let today = Utc::now().date_naive();
        let week_out = today + Duration::days(7);
        Self {
            thread_id: Uuid::new_v4().to_string(),
            run_id: Uuid::new_v4().to_string(),
            messages: vec![InputMessage {
                id: Uuid::new_v4().to_string(),
                role: "user".to_string(),
                content: input.into(),
            }],
            state: InitialAgentState {
                tool_results: Vec::new(),
                current_tool: None,
                processing_status: "idle".to_string(),
                current_date: today.format("%Y-%m-%d").to_string(),
                one_week_from_now: week_out.format("%Y-%m-%d").to_string(),
            },
        }
    }

    /// Text of the driving message.
    pub fn input(&self) -> &str {
        self.messages
            .first()
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }
}
